//! Drawing FFI functions
//!
//! Each call appends one command to the frame's queue. Coordinates and sizes
//! stay in module space; the host converts them when it paints.

use easel_shared::{Color, DrawCommand};
use glam::DVec2;
use wasmtime::Caller;

use super::system::module_string;
use crate::wasm::BridgeContext;

fn push(caller: &mut Caller<'_, BridgeContext>, command: DrawCommand) -> i32 {
    caller.data_mut().queue.push(command);
    0
}

#[allow(clippy::too_many_arguments)]
pub(super) fn draw_line(
    mut caller: Caller<'_, BridgeContext>,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    thickness: f64,
    r: i32,
    g: i32,
    b: i32,
    a: i32,
) -> i32 {
    push(
        &mut caller,
        DrawCommand::Line {
            start: DVec2::new(x1, y1),
            stop: DVec2::new(x2, y2),
            size: thickness,
            color: Color::from_module_args(r, g, b, a),
        },
    )
}

#[allow(clippy::too_many_arguments)]
pub(super) fn draw_rect(
    mut caller: Caller<'_, BridgeContext>,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    r: i32,
    g: i32,
    b: i32,
    a: i32,
) -> i32 {
    push(
        &mut caller,
        DrawCommand::Rect {
            pos: DVec2::new(x, y),
            size: DVec2::new(w, h),
            color: Color::from_module_args(r, g, b, a),
        },
    )
}

#[allow(clippy::too_many_arguments)]
pub(super) fn draw_rounded_rect(
    mut caller: Caller<'_, BridgeContext>,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    radius: f64,
    r: i32,
    g: i32,
    b: i32,
    a: i32,
) -> i32 {
    push(
        &mut caller,
        DrawCommand::RoundRect {
            pos: DVec2::new(x, y),
            size: DVec2::new(w, h),
            radius,
            color: Color::from_module_args(r, g, b, a),
        },
    )
}

#[allow(clippy::too_many_arguments)]
pub(super) fn draw_circle(
    mut caller: Caller<'_, BridgeContext>,
    x: f64,
    y: f64,
    radius: f64,
    r: i32,
    g: i32,
    b: i32,
    a: i32,
) -> i32 {
    push(
        &mut caller,
        DrawCommand::Circle {
            pos: DVec2::new(x, y),
            radius,
            color: Color::from_module_args(r, g, b, a),
        },
    )
}

#[allow(clippy::too_many_arguments)]
pub(super) fn draw_triangle(
    mut caller: Caller<'_, BridgeContext>,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    x3: f64,
    y3: f64,
    r: i32,
    g: i32,
    b: i32,
    a: i32,
) -> i32 {
    push(
        &mut caller,
        DrawCommand::Triangle {
            a: DVec2::new(x1, y1),
            b: DVec2::new(x2, y2),
            c: DVec2::new(x3, y3),
            color: Color::from_module_args(r, g, b, a),
        },
    )
}

#[allow(clippy::too_many_arguments)]
pub(super) fn draw_text(
    mut caller: Caller<'_, BridgeContext>,
    x: f64,
    y: f64,
    height: f64,
    text: u32,
    font: u32,
    style: i32,
    r: i32,
    g: i32,
    b: i32,
    a: i32,
) -> i32 {
    let text = module_string(&mut caller, text);
    let font = module_string(&mut caller, font);
    push(
        &mut caller,
        DrawCommand::Text {
            pos: DVec2::new(x, y),
            text,
            font,
            size: height,
            style: style.clamp(0, u8::MAX as i32) as u8,
            color: Color::from_module_args(r, g, b, a),
        },
    )
}
