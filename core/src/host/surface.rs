//! On-screen surfaces the scheduler presents to

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use easel_shared::Color;
use easel_shared::constants::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use image::{Rgba, RgbaImage};

use super::canvas::blend;

/// A display target bound to a bridge.
///
/// The scheduler keeps every bound surface the same size as the canvas and
/// hands it each finished frame. A window, a texture or an in-memory image
/// can all sit behind this.
pub trait Surface {
    fn resize(&mut self, width: u32, height: u32);
    fn set_title(&mut self, title: &str);
    fn set_background(&mut self, color: Color);
    fn set_fullscreen(&mut self, full: bool);
    /// Surface a diagnostic prominently (a dialog on desktop hosts)
    fn alert(&mut self, message: &str);
    /// Show a finished frame. `frame` is the transparent canvas; the surface
    /// composites it over its own background.
    fn present(&mut self, frame: &RgbaImage);
}

/// Shared surfaces stay inspectable by the code that attached them
impl<S: Surface> Surface for Rc<RefCell<S>> {
    fn resize(&mut self, width: u32, height: u32) {
        self.borrow_mut().resize(width, height);
    }

    fn set_title(&mut self, title: &str) {
        self.borrow_mut().set_title(title);
    }

    fn set_background(&mut self, color: Color) {
        self.borrow_mut().set_background(color);
    }

    fn set_fullscreen(&mut self, full: bool) {
        self.borrow_mut().set_fullscreen(full);
    }

    fn alert(&mut self, message: &str) {
        self.borrow_mut().alert(message);
    }

    fn present(&mut self, frame: &RgbaImage) {
        self.borrow_mut().present(frame);
    }
}

/// Headless surface holding the last presented frame in memory
pub struct ImageSurface {
    title: String,
    background: Color,
    fullscreen: bool,
    alerts: Vec<String>,
    frame: RgbaImage,
    presents: u64,
}

impl Default for ImageSurface {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl ImageSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            title: String::new(),
            background: Color::TRANSPARENT,
            fullscreen: false,
            alerts: Vec::new(),
            frame: RgbaImage::new(width, height),
            presents: 0,
        }
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Frames presented so far
    pub fn presents(&self) -> u64 {
        self.presents
    }

    /// Write the last presented frame as PNG
    pub fn save_png(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        self.frame
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Frame saved: {}", path.display());
        Ok(())
    }

    /// Save into `dir` under a timestamped name derived from the title
    pub fn save_png_in(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(capture_filename(&self.title));
        self.save_png(&path)?;
        Ok(path)
    }
}

impl Surface for ImageSurface {
    fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != self.frame.dimensions() {
            self.frame = RgbaImage::from_pixel(width, height, Rgba(self.background.0));
        }
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    fn set_fullscreen(&mut self, full: bool) {
        self.fullscreen = full;
    }

    fn alert(&mut self, message: &str) {
        tracing::warn!("Alert: {}", message);
        self.alerts.push(message.to_string());
    }

    fn present(&mut self, frame: &RgbaImage) {
        let background = Rgba(self.background.0);
        for (x, y, out) in self.frame.enumerate_pixels_mut() {
            *out = match frame.get_pixel_checked(x, y) {
                Some(src) => blend(background, Color(src.0)),
                None => background,
            };
        }
        self.presents += 1;
    }
}

/// Lowercased title with runs of other characters collapsed to `_`
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let joined = cleaned
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if joined.is_empty() {
        "easel".to_string()
    } else {
        joined
    }
}

fn capture_filename(title: &str) -> String {
    let now = chrono::Local::now();
    format!(
        "{}_{}.png",
        sanitize_filename(title),
        now.format("%Y-%m-%d_%H-%M-%S")
    )
}
