//! Display server boundary
//!
//! This module isolates everything that talks to the windowing system so the
//! session logic above it stays backend-agnostic and testable.
//!
//! # Architecture Overview
//!
//! The display subsystem follows a layered architecture:
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │     Session (session.rs)        │
//! └─────────────┬───────────────────┘
//!               │ Owns Box<dyn DisplayServer>
//!      ┌────────▼────────┐
//!      │ DisplayServer   │ ← Trait contract (backend.rs)
//!      │ trait           │
//!      └────────┬────────┘
//!               │ Implemented by
//!   ┌───────────▼───────────┐
//!   │ x11::X11Display       │ ← Concrete backend (x11.rs)
//!   │ tests::MockDisplay    │ ← Scripted backend in unit tests
//!   └───────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - **`backend`**: the trait contract plus the backend-agnostic event,
//!   configuration, and error types
//! - **`x11`**: the only real backend, speaking the X protocol via `x11rb`

pub mod backend;
pub mod x11;

pub use backend::{CloseToken, DisplayError, DisplayEvent, DisplayResult, DisplayServer, WindowConfig};
pub use x11::X11Display;
