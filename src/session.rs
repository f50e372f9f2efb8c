//! Window session lifecycle
//!
//! The [`Session`] owns one display backend and walks it through the fixed
//! lifecycle: create the window, select input, register the close protocol,
//! map, then block on events until the first key press, button press, or
//! window manager close request destroys the window.

use thiserror::Error;

use crate::display::{
    CloseToken, DisplayError, DisplayEvent, DisplayServer, WindowConfig, X11Display,
};

/// Session-level errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// Display backend error propagated to the session level
    #[error("display error: {0}")]
    Display(#[from] DisplayError),

    /// An operation was invoked out of lifecycle order
    #[error("{operation} is not valid while the session is {state:?}")]
    InvalidState {
        /// The operation that was attempted
        operation: &'static str,
        /// The state the session was in at the time
        state: SessionState,
    },
}

/// Where the session is in its lifecycle
///
/// Transitions are strictly linear; `Waiting` is the only state the session
/// stays in across events, and `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected to the display server, no window yet
    Connected,
    /// The window exists but receives no input
    WindowCreated,
    /// Input events are selected on the window
    Subscribed,
    /// The window is mapped and visible
    Visible,
    /// Blocked on the event loop
    Waiting,
    /// The window has been destroyed
    Closed,
}

/// One connection, one window, one event loop
///
/// The display server sits behind [`DisplayServer`], so tests can drive the
/// session with a scripted backend instead of a live connection.
pub struct Session {
    display: Box<dyn DisplayServer>,
    close_token: Option<CloseToken>,
    state: SessionState,
}

impl Session {
    /// Connect to the X display server
    ///
    /// This is the one unrecoverable failure point: with no display there is
    /// nothing to clean up and nothing else to do.
    pub fn open() -> Result<Self, SessionError> {
        let display = X11Display::connect()?;
        Ok(Self::with_display(Box::new(display)))
    }

    /// Build a session over an already connected backend
    pub fn with_display(display: Box<dyn DisplayServer>) -> Self {
        Self {
            display,
            close_token: None,
            state: SessionState::Connected,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Create the top-level window with the default geometry
    pub fn create_window(&mut self) -> Result<(), SessionError> {
        self.expect_state("create_window", SessionState::Connected)?;
        self.display.create_window(&WindowConfig::default())?;
        self.state = SessionState::WindowCreated;
        log::debug!("window created");
        Ok(())
    }

    /// Register interest in key press and button press events
    pub fn subscribe(&mut self) -> Result<(), SessionError> {
        self.expect_state("subscribe", SessionState::WindowCreated)?;
        self.display.select_input()?;
        self.state = SessionState::Subscribed;
        log::debug!("subscribed to key and button presses");
        Ok(())
    }

    /// Register the window manager close protocol on the window
    ///
    /// Afterwards a close request from the window manager arrives as a
    /// client message carrying the returned token instead of a forced kill.
    pub fn register_close_protocol(&mut self) -> Result<(), SessionError> {
        self.expect_state("register_close_protocol", SessionState::Subscribed)?;
        let token = self.display.register_close_protocol()?;
        log::debug!("close protocol registered as {:?}", token);
        self.close_token = Some(token);
        Ok(())
    }

    /// Map the window, making it visible
    ///
    /// Requires [`register_close_protocol`](Session::register_close_protocol)
    /// to have run, so a close request can never race the mapped window.
    pub fn show(&mut self) -> Result<(), SessionError> {
        self.expect_state("show", SessionState::Subscribed)?;
        if self.close_token.is_none() {
            return Err(SessionError::InvalidState {
                operation: "show",
                state: self.state,
            });
        }
        self.display.map_window()?;
        self.state = SessionState::Visible;
        log::debug!("window mapped");
        Ok(())
    }

    /// Block on display events until a terminating input arrives
    ///
    /// Key presses, button presses, and close protocol messages all end the
    /// loop by destroying the window. Everything else is ignored and the
    /// session keeps waiting.
    pub fn run_event_loop(&mut self) -> Result<(), SessionError> {
        self.expect_state("run_event_loop", SessionState::Visible)?;
        self.state = SessionState::Waiting;
        log::info!("waiting for input");

        loop {
            match self.display.next_event()? {
                DisplayEvent::KeyPress | DisplayEvent::ButtonPress => {
                    log::debug!("input received, closing");
                    self.close()?;
                    return Ok(());
                }
                DisplayEvent::ClientMessage { first } if self.is_close_request(first) => {
                    log::debug!("close requested by the window manager");
                    self.close()?;
                    return Ok(());
                }
                ignored => log::debug!("ignoring event {:?}", ignored),
            }
        }
    }

    /// Destroy the window
    ///
    /// Runs exactly once per session; a second call is an
    /// [`InvalidState`](SessionError::InvalidState) error.
    pub fn close(&mut self) -> Result<(), SessionError> {
        self.expect_state("close", SessionState::Waiting)?;
        self.display.destroy_window()?;
        self.state = SessionState::Closed;
        log::info!("window closed");
        Ok(())
    }

    /// Drive the whole lifecycle: setup, show, then the event loop
    pub fn run(&mut self) -> Result<(), SessionError> {
        self.create_window()?;
        self.subscribe()?;
        self.register_close_protocol()?;
        self.show()?;
        self.run_event_loop()
    }

    fn is_close_request(&self, first: u32) -> bool {
        self.close_token == Some(CloseToken::from_raw(first))
    }

    fn expect_state(
        &self,
        operation: &'static str,
        expected: SessionState,
    ) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Token value the mock hands out for the close protocol
    const CLOSE_ID: u32 = 0xCAFE;

    #[derive(Default)]
    struct MockState {
        events: VecDeque<DisplayEvent>,
        calls: Vec<&'static str>,
        created_with: Option<WindowConfig>,
        destroy_calls: usize,
    }

    /// Scripted display backend recording every call it receives
    struct MockDisplay(Rc<RefCell<MockState>>);

    impl DisplayServer for MockDisplay {
        fn create_window(&mut self, config: &WindowConfig) -> crate::display::DisplayResult<()> {
            let mut state = self.0.borrow_mut();
            state.calls.push("create_window");
            state.created_with = Some(*config);
            Ok(())
        }

        fn select_input(&mut self) -> crate::display::DisplayResult<()> {
            self.0.borrow_mut().calls.push("select_input");
            Ok(())
        }

        fn register_close_protocol(&mut self) -> crate::display::DisplayResult<CloseToken> {
            self.0.borrow_mut().calls.push("register_close_protocol");
            Ok(CloseToken::from_raw(CLOSE_ID))
        }

        fn map_window(&mut self) -> crate::display::DisplayResult<()> {
            self.0.borrow_mut().calls.push("map_window");
            Ok(())
        }

        fn next_event(&mut self) -> crate::display::DisplayResult<DisplayEvent> {
            let mut state = self.0.borrow_mut();
            state.calls.push("next_event");
            Ok(state.events.pop_front().expect("event script exhausted"))
        }

        fn destroy_window(&mut self) -> crate::display::DisplayResult<()> {
            let mut state = self.0.borrow_mut();
            state.calls.push("destroy_window");
            state.destroy_calls += 1;
            Ok(())
        }
    }

    fn scripted_session(events: Vec<DisplayEvent>) -> (Session, Rc<RefCell<MockState>>) {
        let state = Rc::new(RefCell::new(MockState {
            events: events.into(),
            ..MockState::default()
        }));
        let session = Session::with_display(Box::new(MockDisplay(Rc::clone(&state))));
        (session, state)
    }

    #[test]
    fn test_setup_sequence() {
        let (mut session, state) = scripted_session(vec![]);

        session.create_window().unwrap();
        assert_eq!(session.state(), SessionState::WindowCreated);
        session.subscribe().unwrap();
        assert_eq!(session.state(), SessionState::Subscribed);
        session.register_close_protocol().unwrap();
        session.show().unwrap();
        assert_eq!(session.state(), SessionState::Visible);

        let state = state.borrow();
        assert_eq!(
            state.calls,
            ["create_window", "select_input", "register_close_protocol", "map_window"]
        );
        assert_eq!(state.created_with, Some(WindowConfig::default()));
    }

    #[test]
    fn test_key_press_closes_window() {
        let (mut session, state) = scripted_session(vec![DisplayEvent::KeyPress]);

        session.run().unwrap();

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(state.borrow().destroy_calls, 1);
    }

    #[test]
    fn test_button_press_closes_window() {
        let (mut session, state) = scripted_session(vec![DisplayEvent::ButtonPress]);

        session.run().unwrap();

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(state.borrow().destroy_calls, 1);
    }

    #[test]
    fn test_close_request_closes_window() {
        let (mut session, state) =
            scripted_session(vec![DisplayEvent::ClientMessage { first: CLOSE_ID }]);

        session.run().unwrap();

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(state.borrow().destroy_calls, 1);
    }

    #[test]
    fn test_foreign_client_message_is_ignored() {
        let (mut session, state) = scripted_session(vec![
            DisplayEvent::ClientMessage { first: CLOSE_ID + 1 },
            DisplayEvent::KeyPress,
        ]);

        session.run().unwrap();

        // The loop kept waiting past the unrelated message
        let state = state.borrow();
        assert!(state.events.is_empty());
        assert_eq!(state.destroy_calls, 1);
    }

    #[test]
    fn test_unrelated_events_are_ignored() {
        let (mut session, state) = scripted_session(vec![
            DisplayEvent::Other,
            DisplayEvent::Other,
            DisplayEvent::ButtonPress,
        ]);

        session.run().unwrap();

        let state = state.borrow();
        assert!(state.events.is_empty());
        assert_eq!(state.destroy_calls, 1);
    }

    #[test]
    fn test_no_events_consumed_after_terminal() {
        let (mut session, state) =
            scripted_session(vec![DisplayEvent::ButtonPress, DisplayEvent::KeyPress]);

        session.run().unwrap();

        // The second event was never pulled from the server
        let state = state.borrow();
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.destroy_calls, 1);
    }

    #[test]
    fn test_window_destroyed_exactly_once() {
        let (mut session, state) = scripted_session(vec![DisplayEvent::KeyPress]);

        session.run().unwrap();
        let second_close = session.close();

        assert!(matches!(
            second_close,
            Err(SessionError::InvalidState { operation: "close", .. })
        ));
        assert_eq!(state.borrow().destroy_calls, 1);
    }

    #[test]
    fn test_operations_require_lifecycle_order() {
        let (mut session, _) = scripted_session(vec![]);

        assert!(matches!(
            session.subscribe(),
            Err(SessionError::InvalidState { operation: "subscribe", .. })
        ));
        assert!(matches!(
            session.run_event_loop(),
            Err(SessionError::InvalidState { .. })
        ));
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[test]
    fn test_show_requires_close_protocol() {
        let (mut session, _) = scripted_session(vec![]);

        session.create_window().unwrap();
        session.subscribe().unwrap();

        assert!(matches!(
            session.show(),
            Err(SessionError::InvalidState { operation: "show", .. })
        ));
        assert_eq!(session.state(), SessionState::Subscribed);
    }
}
