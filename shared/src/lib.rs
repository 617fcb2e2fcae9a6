//! Shared types for the Easel module bridge.
//!
//! Everything here is plain data: the host and the execution thread both
//! depend on it, and nothing in this crate knows about wasmtime.
//!
//! - [`protocol`] - Tagged-union wire format between the two threads
//! - [`transform`] - Module space <-> pixel space mapping
//! - [`keys`] - Two-character key codes
//! - [`constants`] - Status codes, export names, defaults

pub mod constants;
pub mod keys;
pub mod protocol;
pub mod transform;

pub use keys::KeyCode;
pub use protocol::{
    Color, Control, DrawCommand, InputEvent, ModuleMessage, ProtocolError, ToHost, ToModule,
};
pub use transform::Viewport;
