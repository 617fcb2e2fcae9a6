//! Frame scheduler
//!
//! Host-side half of the frame protocol. Applies module messages to the
//! offscreen canvas in arrival order and decides, on each display tick,
//! whether the module may run another frame.
//!
//! A frame is only requested once the previous request's sentinel has
//! arrived, so the module is never more than one frame ahead of what has
//! been presented.

use easel_shared::constants::MAX_CANVAS_SIDE;
use easel_shared::{Color, Control, DrawCommand, ModuleMessage, ToHost, ToModule, Viewport};
use tracing::{debug, trace, warn};

use super::canvas::Canvas;
use super::surface::Surface;

/// Pacing counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame requests sent
    pub requested: u64,
    /// Sentinels received
    pub completed: u64,
    /// Display ticks that found the previous frame still running
    pub skipped: u64,
}

pub struct FrameScheduler {
    canvas: Option<Canvas>,
    surfaces: Vec<Box<dyn Surface>>,
    /// Commands that arrived before `initialize`, applied once the canvas exists
    pending: Vec<DrawCommand>,
    awaiting_sentinel: bool,
    title: String,
    background: Option<Color>,
    fullscreen: bool,
    stats: FrameStats,
    /// Canvas sides are clamped to this before anything is allocated
    max_side: u32,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::with_max_side(MAX_CANVAS_SIDE)
    }

    pub fn with_max_side(max_side: u32) -> Self {
        Self {
            canvas: None,
            surfaces: Vec::new(),
            pending: Vec::new(),
            awaiting_sentinel: false,
            title: String::new(),
            background: None,
            fullscreen: false,
            stats: FrameStats::default(),
            max_side: max_side.max(1),
        }
    }

    /// Keep a requested size within `1..=max_side` on both axes
    fn clamp_size(&self, width: u32, height: u32) -> (u32, u32) {
        let clamped = (
            width.clamp(1, self.max_side),
            height.clamp(1, self.max_side),
        );
        if clamped != (width, height) {
            warn!(
                "Canvas size {}x{} clamped to {}x{}",
                width, height, clamped.0, clamped.1
            );
        }
        clamped
    }

    /// Bind an on-screen surface. A surface bound after `initialize` is
    /// brought up to date immediately.
    pub fn attach(&mut self, mut surface: Box<dyn Surface>) {
        if let Some(canvas) = &self.canvas {
            surface.resize(canvas.width(), canvas.height());
            surface.set_title(&self.title);
            if self.surfaces.is_empty() && self.fullscreen {
                surface.set_fullscreen(true);
            }
        }
        if let Some(color) = self.background {
            surface.set_background(color);
        }
        self.surfaces.push(surface);
    }

    pub fn is_initialized(&self) -> bool {
        self.canvas.is_some()
    }

    pub fn awaiting_sentinel(&self) -> bool {
        self.awaiting_sentinel
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.canvas.as_ref().map(|c| *c.viewport())
    }

    /// Apply one message from the execution thread
    pub fn receive(&mut self, message: ToHost) {
        match message {
            ToHost::FrameDone => {
                if self.awaiting_sentinel {
                    self.awaiting_sentinel = false;
                    self.stats.completed += 1;
                } else {
                    warn!("Frame sentinel without an outstanding request");
                }
            }
            ToHost::Message(ModuleMessage::Control(control)) => self.control(control),
            ToHost::Message(ModuleMessage::Draw(command)) => self.command(command),
        }
    }

    fn control(&mut self, control: Control) {
        match control {
            Control::Initialize {
                width,
                height,
                title,
            } => self.initialize(width, height, title),
            Control::Batch { commands } => {
                trace!("Applying batch of {} commands", commands.len());
                for command in commands {
                    self.command(command);
                }
            }
            Control::Alert { message } => {
                for surface in &mut self.surfaces {
                    surface.alert(&message);
                }
            }
        }
    }

    fn initialize(&mut self, width: u32, height: u32, title: String) {
        if self.canvas.is_some() {
            warn!("Ignoring repeated initialize");
            return;
        }
        let (width, height) = self.clamp_size(width, height);
        debug!("Canvas {}x{} for {:?}", width, height, title);
        self.canvas = Some(Canvas::new(width, height));
        for surface in &mut self.surfaces {
            surface.resize(width, height);
            surface.set_title(&title);
        }
        self.title = title;

        for command in std::mem::take(&mut self.pending) {
            self.command(command);
        }
    }

    fn command(&mut self, command: DrawCommand) {
        let command = match command {
            DrawCommand::Resize { size: [width, height] } => {
                let (width, height) = self.clamp_size(width, height);
                DrawCommand::Resize {
                    size: [width, height],
                }
            }
            other => other,
        };
        let Some(canvas) = self.canvas.as_mut() else {
            self.pending.push(command);
            return;
        };
        match command {
            DrawCommand::SetBackground { color } => {
                self.background = Some(color);
                for surface in &mut self.surfaces {
                    surface.set_background(color);
                }
            }
            DrawCommand::Resize { size: [width, height] } => {
                canvas.resize(width, height);
                for surface in &mut self.surfaces {
                    surface.resize(width, height);
                }
            }
            DrawCommand::Fullscreen { full } => {
                // Only the primary surface can take over the display
                self.fullscreen = full;
                if let Some(surface) = self.surfaces.first_mut() {
                    surface.set_fullscreen(full);
                }
            }
            other => canvas.apply(&other),
        }
    }

    /// The host window changed size; the canvas and viewport follow it
    pub fn host_resized(&mut self, width: u32, height: u32) {
        self.command(DrawCommand::Resize {
            size: [width, height],
        });
    }

    /// Display tick
    ///
    /// Presents the finished frame to every surface, clears the canvas and
    /// returns the next frame request. Returns `None` before `initialize` or
    /// while the previous frame is still running.
    pub fn on_vsync(&mut self) -> Option<ToModule> {
        let canvas = self.canvas.as_mut()?;
        if self.awaiting_sentinel {
            self.stats.skipped += 1;
            return None;
        }
        for surface in &mut self.surfaces {
            surface.present(canvas.image());
        }
        canvas.clear();
        self.awaiting_sentinel = true;
        self.stats.requested += 1;
        Some(ToModule::NextFrame)
    }
}
