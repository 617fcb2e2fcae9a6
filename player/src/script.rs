//! Scripted input
//!
//! One JSON object per line, in host pixel space:
//!
//! ```text
//! {"frame": 0, "input": {"kind": "move", "x": 400, "y": 300}}
//! {"frame": 2, "input": {"kind": "down"}}
//! {"frame": 5, "input": {"kind": "key_down", "key": "ca"}}
//! ```
//!
//! An entry is delivered just before the frame with that index is requested.
//! Blank lines and lines starting with `#` are skipped.

use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use easel_core::{Bridge, BridgeError};
use easel_shared::KeyCode;
use glam::DVec2;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptInput {
    Move { x: f64, y: f64 },
    Down,
    Up,
    KeyDown { key: KeyCode },
    KeyUp { key: KeyCode },
}

impl ScriptInput {
    /// Relay through the bridge exactly as live input would be
    pub fn send(&self, bridge: &mut Bridge) -> Result<(), BridgeError> {
        match self {
            ScriptInput::Move { x, y } => bridge.pointer_moved(DVec2::new(*x, *y)),
            ScriptInput::Down => bridge.pointer_down(),
            ScriptInput::Up => bridge.pointer_up(),
            ScriptInput::KeyDown { key } => bridge.key_down(*key),
            ScriptInput::KeyUp { key } => bridge.key_up(*key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptEntry {
    pub frame: u64,
    pub input: ScriptInput,
}

#[derive(Debug, Default)]
pub struct InputScript {
    entries: VecDeque<ScriptEntry>,
}

impl InputScript {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input script {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid input script {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let entry: ScriptEntry = serde_json::from_str(line)
                .with_context(|| format!("line {}", index + 1))?;
            entries.push(entry);
        }
        // Stable: entries for the same frame keep file order
        entries.sort_by_key(|e| e.frame);
        Ok(Self {
            entries: entries.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every entry due at or before `frame`
    pub fn due(&mut self, frame: u64) -> Vec<ScriptInput> {
        let mut out = Vec::new();
        while self.entries.front().is_some_and(|e| e.frame <= frame) {
            if let Some(entry) = self.entries.pop_front() {
                out.push(entry.input);
            }
        }
        out
    }
}
