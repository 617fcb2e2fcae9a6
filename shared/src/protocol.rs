//! Wire protocol between the host and the execution thread.
//!
//! Messages are JSON-shaped tagged records (`{"type": "draw/circle", ...}`).
//! Inside one process they travel as these Rust values over ordered channels;
//! the JSON form is used for tracing, scripting and any out-of-process host.
//!
//! # Framing
//!
//! ```text
//! host                                   execution thread
//!  | -- Load(bytes) ---------------------> |  instantiate, mode check, setup
//!  | <------------- multiple{commands} --- |  setup batch
//!  | <------------- initialize{w,h,title}- |
//!  | -- null (next frame) ---------------> |  loop()
//!  | <------------- multiple{commands} --- |
//!  | <------------- null (frame done) ---- |
//!  | -- event/... -----------------------> |  input state update, no loop
//! ```
//!
//! The batched `multiple` form is preferred. Single `draw/...` messages are
//! still accepted on decode for hosts and modules speaking the older framing.

use glam::DVec2;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::keys::KeyCode;

/// RGBA color, serialized as `[r, g, b, a]` with alpha in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const TRANSPARENT: Color = Color([0, 0, 0, 0]);
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const WHITE: Color = Color([255, 255, 255, 255]);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Build from the four color arguments of a module import. Out-of-range
    /// values are clamped, matching how `uint8_t` parameters arrive as `i32`.
    pub fn from_module_args(r: i32, g: i32, b: i32, a: i32) -> Self {
        let c = |v: i32| v.clamp(0, 255) as u8;
        Self([c(r), c(g), c(b), c(a)])
    }

    pub fn alpha(&self) -> u8 {
        self.0[3]
    }
}

/// One drawing intent, in module coordinates. Paint order is list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DrawCommand {
    #[serde(rename = "draw/line")]
    Line {
        start: DVec2,
        stop: DVec2,
        /// Stroke width in module units
        size: f64,
        color: Color,
    },
    /// Axis-aligned rectangle centered on `pos`
    #[serde(rename = "draw/rect")]
    Rect { pos: DVec2, size: DVec2, color: Color },
    /// Rectangle centered on `pos` with rounded corners
    #[serde(rename = "draw/roundrect")]
    RoundRect {
        pos: DVec2,
        size: DVec2,
        radius: f64,
        color: Color,
    },
    #[serde(rename = "draw/circle")]
    Circle { pos: DVec2, radius: f64, color: Color },
    #[serde(rename = "draw/triangle")]
    Triangle {
        a: DVec2,
        b: DVec2,
        c: DVec2,
        color: Color,
    },
    /// Text centered on `pos`; `size` is the glyph height in module units
    #[serde(rename = "draw/text")]
    Text {
        pos: DVec2,
        text: String,
        font: String,
        size: f64,
        style: u8,
        color: Color,
    },
    /// Background color of every bound on-screen surface
    #[serde(rename = "set/bg")]
    SetBackground { color: Color },
    /// New pixel size of the canvas
    #[serde(rename = "resize")]
    Resize { size: [u32; 2] },
    #[serde(rename = "fullscreen")]
    Fullscreen { full: bool },
}

impl DrawCommand {
    /// Wire tag of this command, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            DrawCommand::Line { .. } => "draw/line",
            DrawCommand::Rect { .. } => "draw/rect",
            DrawCommand::RoundRect { .. } => "draw/roundrect",
            DrawCommand::Circle { .. } => "draw/circle",
            DrawCommand::Triangle { .. } => "draw/triangle",
            DrawCommand::Text { .. } => "draw/text",
            DrawCommand::SetBackground { .. } => "set/bg",
            DrawCommand::Resize { .. } => "resize",
            DrawCommand::Fullscreen { .. } => "fullscreen",
        }
    }
}

/// Non-drawing messages from the execution thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Control {
    /// Sent once after setup: window title and initial pixel size
    #[serde(rename = "initialize")]
    Initialize {
        width: u32,
        height: u32,
        title: String,
    },
    /// A whole command batch (one setup or one frame)
    #[serde(rename = "multiple")]
    Batch { commands: Vec<DrawCommand> },
    /// User-facing diagnostic the host should surface prominently
    #[serde(rename = "alert")]
    Alert { message: String },
}

/// Any non-sentinel message from the execution thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleMessage {
    Control(Control),
    /// Legacy single-command framing
    Draw(DrawCommand),
}

impl From<Control> for ModuleMessage {
    fn from(control: Control) -> Self {
        ModuleMessage::Control(control)
    }
}

impl From<DrawCommand> for ModuleMessage {
    fn from(command: DrawCommand) -> Self {
        ModuleMessage::Draw(command)
    }
}

/// Execution thread -> host.
#[derive(Debug, Clone, PartialEq)]
pub enum ToHost {
    Message(ModuleMessage),
    /// Frame sentinel: every command of the requested frame has been sent.
    /// Encoded as `null`.
    FrameDone,
}

impl Serialize for ToHost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ToHost::Message(message) => message.serialize(serializer),
            ToHost::FrameDone => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for ToHost {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<ModuleMessage>::deserialize(deserializer)?
            .map_or(ToHost::FrameDone, ToHost::Message))
    }
}

/// Input activity forwarded from the host, already in module space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputEvent {
    #[serde(rename = "event/mousemove")]
    PointerMove { position: DVec2, movement: DVec2 },
    #[serde(rename = "event/mousedown")]
    PointerDown,
    #[serde(rename = "event/mouseup")]
    PointerUp,
    #[serde(rename = "event/keydown")]
    KeyDown { key: KeyCode },
    #[serde(rename = "event/keyup")]
    KeyUp { key: KeyCode },
}

/// Host -> execution thread.
#[derive(Debug, Clone, PartialEq)]
pub enum ToModule {
    /// Raw module bytes. First message only; binary transfer, never JSON.
    Load(Vec<u8>),
    /// Run the next frame. Encoded as `null`.
    NextFrame,
    Event(InputEvent),
}

/// Errors from the JSON codec
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("module bytes are a binary transfer and have no JSON form")]
    BinaryPayload,
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode an execution-thread message as JSON
pub fn encode_to_host(message: &ToHost) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}

/// Decode an execution-thread message. Accepts batched and single-command
/// framing alike.
pub fn decode_to_host(json: &str) -> Result<ToHost, ProtocolError> {
    Ok(serde_json::from_str(json)?)
}

/// Encode a host message as JSON
pub fn encode_to_module(message: &ToModule) -> Result<String, ProtocolError> {
    match message {
        ToModule::Load(_) => Err(ProtocolError::BinaryPayload),
        ToModule::NextFrame => Ok(serde_json::to_string(&None::<InputEvent>)?),
        ToModule::Event(event) => Ok(serde_json::to_string(event)?),
    }
}

/// Decode a host message. `null` is a frame request, anything else an event.
pub fn decode_to_module(json: &str) -> Result<ToModule, ProtocolError> {
    let event: Option<InputEvent> = serde_json::from_str(json)?;
    Ok(event.map_or(ToModule::NextFrame, ToModule::Event))
}
