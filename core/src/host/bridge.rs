//! One module, one execution thread, one frame scheduler
//!
//! [`Bridge`] is what a host embeds: hand it module bytes and surfaces, call
//! [`Bridge::tick`] from the display refresh callback and forward input.

use std::time::{Duration, Instant};

use easel_shared::{InputEvent, KeyCode, ToModule};
use glam::DVec2;
use tracing::{debug, info};

use super::relay::InputRelay;
use super::scheduler::FrameScheduler;
use super::surface::Surface;
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::wasm::WasmEngine;
use crate::worker::{ExecutionThread, WorkerHandle};

pub struct Bridge {
    worker: WorkerHandle,
    scheduler: FrameScheduler,
    relay: InputRelay,
    destroyed: bool,
}

impl Bridge {
    /// Start an execution thread and hand it the module
    ///
    /// Returns as soon as the bytes are queued; compile errors surface later
    /// from [`Bridge::pump`] or [`Bridge::wait_initialized`] as
    /// [`BridgeError::Load`].
    pub fn launch(
        engine: &WasmEngine,
        module: Vec<u8>,
        config: BridgeConfig,
    ) -> Result<Self, BridgeError> {
        info!("Launching module ({} bytes)", module.len());
        let scheduler = FrameScheduler::with_max_side(config.runtime.max_canvas_side);
        let worker = ExecutionThread::spawn(engine, config)?;
        worker.send(ToModule::Load(module))?;
        Ok(Self {
            worker,
            scheduler,
            relay: InputRelay::new(),
            destroyed: false,
        })
    }

    pub fn attach(&mut self, surface: impl Surface + 'static) {
        self.scheduler.attach(Box::new(surface));
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn is_initialized(&self) -> bool {
        self.scheduler.is_initialized()
    }

    /// Apply every message waiting from the execution thread
    pub fn pump(&mut self) -> Result<usize, BridgeError> {
        let mut applied = 0;
        loop {
            match self.worker.try_recv() {
                Ok(Some(message)) => {
                    self.scheduler.receive(message);
                    applied += 1;
                }
                Ok(None) => return Ok(applied),
                Err(e) => return Err(self.worker_gone(e)),
            }
        }
    }

    /// Block until the module has announced its window
    pub fn wait_initialized(&mut self, timeout: Duration) -> Result<(), BridgeError> {
        let deadline = Instant::now() + timeout;
        while !self.scheduler.is_initialized() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.worker.recv_timeout(remaining) {
                Ok(Some(message)) => self.scheduler.receive(message),
                Ok(None) => return Err(BridgeError::InitTimeout(timeout)),
                Err(e) => return Err(self.worker_gone(e)),
            }
        }
        Ok(())
    }

    /// Display refresh callback
    ///
    /// Drains pending messages, then presents and requests the next frame if
    /// the previous one is complete. Returns whether a frame was requested.
    pub fn tick(&mut self) -> Result<bool, BridgeError> {
        self.pump()?;
        match self.scheduler.on_vsync() {
            Some(request) => {
                self.worker.send(request)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Block until the outstanding frame's sentinel arrives
    ///
    /// Returns `false` if it did not arrive within `timeout`.
    pub fn finish_frame(&mut self, timeout: Duration) -> Result<bool, BridgeError> {
        let deadline = Instant::now() + timeout;
        while self.scheduler.awaiting_sentinel() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.worker.recv_timeout(remaining) {
                Ok(Some(message)) => self.scheduler.receive(message),
                Ok(None) => return Ok(false),
                Err(e) => return Err(self.worker_gone(e)),
            }
        }
        Ok(true)
    }

    /// Pointer moved to `pixel` on the canvas. Ignored until the canvas exists.
    pub fn pointer_moved(&mut self, pixel: DVec2) -> Result<(), BridgeError> {
        let Some(viewport) = self.scheduler.viewport() else {
            debug!("Pointer move before initialize ignored");
            return Ok(());
        };
        let event = self.relay.pointer_moved(&viewport, pixel);
        self.forward(event)
    }

    pub fn pointer_down(&mut self) -> Result<(), BridgeError> {
        let event = self.relay.pointer_down();
        self.forward(event)
    }

    pub fn pointer_up(&mut self) -> Result<(), BridgeError> {
        let event = self.relay.pointer_up();
        self.forward(event)
    }

    pub fn key_down(&mut self, key: KeyCode) -> Result<(), BridgeError> {
        let event = self.relay.key_down(key);
        self.forward(event)
    }

    pub fn key_up(&mut self, key: KeyCode) -> Result<(), BridgeError> {
        let event = self.relay.key_up(key);
        self.forward(event)
    }

    /// The host resized the canvas element
    pub fn host_resized(&mut self, width: u32, height: u32) {
        self.scheduler.host_resized(width, height);
        self.relay.reset();
    }

    fn forward(&self, event: InputEvent) -> Result<(), BridgeError> {
        self.worker.send(ToModule::Event(event))
    }

    /// Tear the execution thread down, interrupting any running module call
    pub fn destroy(&mut self) -> Result<(), BridgeError> {
        if self.destroyed {
            return Ok(());
        }
        self.destroyed = true;
        let stats = self.scheduler.stats();
        info!(
            "Destroying bridge after {} frames ({} requested, {} ticks skipped)",
            stats.completed, stats.requested, stats.skipped
        );
        self.worker.terminate()
    }

    /// The channel closed: report why the thread ended, if it said
    fn worker_gone(&mut self, err: BridgeError) -> BridgeError {
        match self.worker.join() {
            Err(reason) => reason,
            Ok(()) => err,
        }
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            debug!("Bridge teardown: {}", e);
        }
    }
}
