//! Easel Player
//!
//! Headless host for Easel modules. Stands in for a browser or desktop
//! window: paces frames at a fixed refresh rate, replays scripted input and
//! captures the presented frame.

pub mod pacer;
pub mod player;
pub mod script;
