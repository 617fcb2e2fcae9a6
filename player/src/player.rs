//! Headless player
//!
//! Drives one module through a [`Bridge`] with a fixed-rate pacer standing in
//! for vertical sync, optionally replaying scripted input and saving the last
//! presented frame.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use easel_core::{Bridge, BridgeConfig, BridgeError, ImageSurface, WasmEngine, config};
use glam::DVec2;

use crate::pacer::Pacer;
use crate::script::{InputScript, ScriptInput};

/// Player configuration passed from CLI
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub module_path: PathBuf,
    /// Stop after this many completed frames; `None` runs until the module
    /// thread ends
    pub frames: Option<u64>,
    /// Host canvas size, overriding what the module asks for
    pub size: Option<(u32, u32)>,
    pub input_script: Option<PathBuf>,
    /// PNG file, or a directory for a timestamped file
    pub capture: Option<PathBuf>,
    pub bridge: BridgeConfig,
}

/// Frames the player saw, for the exit summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerReport {
    pub completed: u64,
    pub skipped: u64,
    pub late_ticks: u64,
}

/// Run the player to completion
pub fn run(config: PlayerConfig) -> Result<PlayerReport> {
    tracing::info!("Module: {}", config.module_path.display());
    let module = std::fs::read(&config.module_path)
        .with_context(|| format!("Failed to read {}", config.module_path.display()))?;
    let mut script = match &config.input_script {
        Some(path) => InputScript::load(path)?,
        None => InputScript::default(),
    };

    let engine = WasmEngine::new()?;
    let init_timeout = Duration::from_millis(config.bridge.runtime.init_timeout_ms);
    let mut pacer = Pacer::new(config.bridge.runtime.refresh_rate);
    let mut bridge = Bridge::launch(&engine, module, config.bridge.clone())?;

    let surface = Rc::new(RefCell::new(ImageSurface::default()));
    bridge.attach(surface.clone());
    bridge.wait_initialized(init_timeout)?;
    if let Some((width, height)) = config.size {
        bridge.host_resized(width, height);
    }
    tracing::info!(
        "Running '{}' at {} Hz",
        bridge.scheduler().title(),
        config.bridge.runtime.refresh_rate
    );

    loop {
        let stats = bridge.scheduler().stats();
        if config.frames.is_some_and(|limit| stats.completed >= limit) {
            break;
        }
        pacer.wait();

        if !bridge.scheduler().awaiting_sentinel() {
            for input in script.due(stats.requested) {
                if let ScriptInput::Move { x, y } = input
                    && let Some(viewport) = bridge.scheduler().viewport()
                    && !viewport.contains_pixel(DVec2::new(x, y))
                {
                    tracing::warn!(
                        "Scripted pointer at ({}, {}) is outside the drawing area",
                        x,
                        y
                    );
                }
                input.send(&mut bridge)?;
            }
        }
        match bridge.tick() {
            Ok(_) => {}
            Err(BridgeError::Disconnected) => {
                tracing::info!("Module thread ended");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    // One more tick presents the last completed frame
    if bridge.scheduler().stats().completed > 0 && !bridge.scheduler().awaiting_sentinel() {
        if let Err(e) = bridge.tick() {
            tracing::debug!("Final present skipped: {}", e);
        }
    }
    let stats = bridge.scheduler().stats();
    bridge.destroy()?;

    if let Some(path) = &config.capture {
        save_capture(&surface.borrow(), path)?;
    }

    Ok(PlayerReport {
        completed: stats.completed,
        skipped: stats.skipped,
        late_ticks: pacer.late(),
    })
}

/// Write the effective settings to `path`, or to the platform config file
pub fn save_config(config: &BridgeConfig, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => config::save_to(config, path)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => config::save(config).context("Failed to write config.toml")?,
    }
    Ok(())
}

fn save_capture(surface: &ImageSurface, path: &Path) -> Result<()> {
    if path.is_dir() {
        surface.save_png_in(path)?;
    } else {
        surface.save_png(path)?;
    }
    Ok(())
}
