//! X11 display backend
//!
//! Speaks the X protocol through `x11rb`'s pure-Rust connection. Each trait
//! operation maps onto one or two core protocol requests; the session layer
//! above decides when they run.

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    AtomEnum, ChangeWindowAttributesAux, ConnectionExt, CreateWindowAux, EventMask, PropMode,
    Window, WindowClass,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use crate::display::backend::{
    CloseToken, DisplayError, DisplayEvent, DisplayResult, DisplayServer, WindowConfig,
};

/// X11 connection plus the one window created through it
pub struct X11Display {
    conn: RustConnection,
    root: Window,
    window: Option<Window>,
}

impl X11Display {
    /// Connect to the display server named by `$DISPLAY`
    pub fn connect() -> DisplayResult<Self> {
        let (conn, screen_num) = x11rb::connect(None)?;
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        log::info!("connected to X server, screen {}, root window {:#x}", screen_num, root);

        Ok(Self {
            conn,
            root,
            window: None,
        })
    }

    fn window(&self) -> DisplayResult<Window> {
        self.window.ok_or(DisplayError::NoWindow)
    }
}

impl DisplayServer for X11Display {
    fn create_window(&mut self, config: &WindowConfig) -> DisplayResult<()> {
        let window = self.conn.generate_id()?;
        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            window,
            self.root,
            config.x,
            config.y,
            config.width,
            config.height,
            config.border_width,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::new().background_pixel(config.background),
        )?;

        self.window = Some(window);
        log::debug!("created window {:#x}", window);
        Ok(())
    }

    fn select_input(&mut self) -> DisplayResult<()> {
        let window = self.window()?;
        let attributes = ChangeWindowAttributesAux::new()
            .event_mask(EventMask::KEY_PRESS | EventMask::BUTTON_PRESS);
        self.conn.change_window_attributes(window, &attributes)?;
        Ok(())
    }

    fn register_close_protocol(&mut self) -> DisplayResult<CloseToken> {
        let window = self.window()?;
        let protocols = self.conn.intern_atom(false, b"WM_PROTOCOLS")?.reply()?.atom;
        let delete_window = self.conn.intern_atom(false, b"WM_DELETE_WINDOW")?.reply()?.atom;
        self.conn
            .change_property32(PropMode::REPLACE, window, protocols, AtomEnum::ATOM, &[delete_window])?;

        Ok(CloseToken::from_raw(delete_window))
    }

    fn map_window(&mut self) -> DisplayResult<()> {
        let window = self.window()?;
        self.conn.map_window(window)?;
        // Push the map request out now, the next call blocks on events
        self.conn.flush()?;
        Ok(())
    }

    fn next_event(&mut self) -> DisplayResult<DisplayEvent> {
        let event = self.conn.wait_for_event()?;
        Ok(match event {
            Event::KeyPress(_) => DisplayEvent::KeyPress,
            Event::ButtonPress(_) => DisplayEvent::ButtonPress,
            Event::ClientMessage(message) => DisplayEvent::ClientMessage {
                first: message.data.as_data32()[0],
            },
            _ => DisplayEvent::Other,
        })
    }

    fn destroy_window(&mut self) -> DisplayResult<()> {
        let window = self.window()?;
        self.conn.destroy_window(window)?;
        self.conn.flush()?;
        self.window = None;
        log::debug!("destroyed window {:#x}", window);
        Ok(())
    }
}
