//! # sinkgui
//!
//! One top-level X11 window that lives until the first key press, mouse
//! button press, or window manager close request, then destroys itself.
//!
//! The [`Session`] owns a display backend behind the
//! [`display::DisplayServer`] trait, walks it through the linear lifecycle
//! (create, subscribe, register the close protocol, map), and blocks on the
//! event loop until a terminating event arrives. Keeping the backend behind
//! a trait lets tests drive the session with a scripted display server.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sinkgui::Session;
//!
//! fn main() -> Result<(), sinkgui::SessionError> {
//!     let mut session = Session::open()?;
//!     session.run()
//! }
//! ```

pub mod display;
pub mod logging;

mod session;

pub use session::{Session, SessionError, SessionState};
