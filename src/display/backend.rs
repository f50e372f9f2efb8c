//! Backend-agnostic display server contract
//!
//! Defines the trait every display backend must implement, along with the
//! event, configuration, and error types shared by all backends. The session
//! only ever sees this interface, so a scripted mock can stand in for a real
//! display server in tests.

use thiserror::Error;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};

/// Display server errors
#[derive(Error, Debug)]
pub enum DisplayError {
    /// No display server could be reached at connection time
    #[error("failed to connect to the display server: {0}")]
    Connect(#[from] ConnectError),

    /// The established connection broke while sending a request
    #[error("display connection failed: {0}")]
    Connection(#[from] ConnectionError),

    /// The display server rejected a request
    #[error("display request failed: {0}")]
    Reply(#[from] ReplyError),

    /// No more resource ids could be allocated for the window
    #[error("failed to allocate a window id: {0}")]
    IdAllocation(#[from] ReplyOrIdError),

    /// A window operation was issued before any window existed
    #[error("no window has been created on this connection")]
    NoWindow,
}

/// Result alias for display backend operations
pub type DisplayResult<T> = Result<T, DisplayError>;

/// Geometry and appearance of the one window a backend creates
///
/// The defaults are the only values the program ever uses: a 500x500 window
/// at the origin with no border and a dark background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// Horizontal position relative to the root window
    pub x: i16,
    /// Vertical position relative to the root window
    pub y: i16,
    /// Client area width in pixels
    pub width: u16,
    /// Client area height in pixels
    pub height: u16,
    /// Border width in pixels
    pub border_width: u16,
    /// Background color as a packed RGB pixel value
    pub background: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 500,
            height: 500,
            border_width: 0,
            background: 0x0022_2228,
        }
    }
}

/// Opaque identifier for a window manager close request
///
/// Backends hand one of these out when the close protocol is registered.
/// A [`DisplayEvent::ClientMessage`] whose first data field matches the
/// token's raw value is a request to close the window gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseToken(u32);

impl CloseToken {
    /// Wrap a backend-specific protocol identifier
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The backend-specific identifier this token wraps
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A single event delivered by the display server
///
/// Only the distinctions the session acts on are preserved; everything else
/// collapses into [`DisplayEvent::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    /// A keyboard key was pressed
    KeyPress,
    /// A mouse button was pressed
    ButtonPress,
    /// A generic message from another client or the window manager
    ClientMessage {
        /// First data field of the message payload
        first: u32,
    },
    /// Any event the session does not act on
    Other,
}

/// Contract for display server backends
///
/// Implementations own the connection and the single window created through
/// it. The session drives these operations strictly in order: create, select
/// input, register the close protocol, map, then alternate between
/// [`next_event`](DisplayServer::next_event) and, exactly once,
/// [`destroy_window`](DisplayServer::destroy_window).
pub trait DisplayServer {
    /// Create the top-level window with the given geometry and background
    fn create_window(&mut self, config: &WindowConfig) -> DisplayResult<()>;

    /// Register interest in key press and button press events on the window
    fn select_input(&mut self) -> DisplayResult<()>;

    /// Intern the platform's "delete window" protocol and attach it to the
    /// window, so window manager close requests arrive as client messages
    /// instead of killing the connection
    fn register_close_protocol(&mut self) -> DisplayResult<CloseToken>;

    /// Make the window visible
    fn map_window(&mut self) -> DisplayResult<()>;

    /// Block until the display server delivers the next event
    fn next_event(&mut self) -> DisplayResult<DisplayEvent>;

    /// Destroy the window
    fn destroy_window(&mut self) -> DisplayResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_config() {
        let config = WindowConfig::default();

        assert_eq!((config.x, config.y), (0, 0));
        assert_eq!((config.width, config.height), (500, 500));
        assert_eq!(config.border_width, 0);
        assert_eq!(config.background, 0x0022_2228);
    }

    #[test]
    fn test_close_token_round_trip() {
        let token = CloseToken::from_raw(314);

        assert_eq!(token.raw(), 314);
        assert_eq!(token, CloseToken::from_raw(314));
        assert_ne!(token, CloseToken::from_raw(315));
    }
}
