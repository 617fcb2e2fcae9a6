//! Host side of the bridge
//!
//! Everything here runs on the presentation thread:
//! - [`canvas`] - Offscreen RGBA buffer the commands are painted into
//! - [`surface`] - On-screen targets the canvas is presented to
//! - [`scheduler`] - Frame pacing and message application
//! - [`relay`] - Pixel-space input to module-space events
//! - [`bridge`] - Facade tying these to an execution thread

pub mod bridge;
pub mod canvas;
pub mod relay;
pub mod scheduler;
pub mod surface;

pub use bridge::Bridge;
pub use canvas::Canvas;
pub use relay::InputRelay;
pub use scheduler::{FrameScheduler, FrameStats};
pub use surface::{ImageSurface, Surface};
