//! Opens one window and waits for a key press, button press, or close request.

use sinkgui::{logging, Session};

fn main() {
    logging::init();

    let mut session = match Session::open() {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to open a display session: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = session.run() {
        eprintln!("Session error: {}", e);
        std::process::exit(1);
    }
}
