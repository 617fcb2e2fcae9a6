//! Module lifecycle tests (load → setup → initialize → frames)

use easel_shared::{Color, Control, DrawCommand, ModuleMessage, ToHost, ToModule};
use glam::DVec2;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::lifecycle::LifecycleState;

use super::test_utils::*;

/// A well-behaved module: mode 2, sets its window and background in setup,
/// draws one circle per frame
const DEMO: &str = r#"
    (module
        (import "gapi" "init" (func $init (param i32 i32 i32) (result i32)))
        (import "gapi" "set_bg_color" (func $bg (param i32 i32 i32 i32)))
        (import "gapi" "draw_circle"
            (func $circle (param f64 f64 f64 i32 i32 i32 i32) (result i32)))
        (memory (export "memory") 1)
        (data (i32.const 64) "Demo\00")
        (global $frames (mut i32) (i32.const 0))

        (func (export "mode") (result i32) (i32.const 2))
        (func (export "setup")
            (drop (call $init (i32.const 800) (i32.const 600) (i32.const 64)))
            (call $bg (i32.const 0) (i32.const 0) (i32.const 0) (i32.const 255))
        )
        (func (export "loop")
            (global.set $frames (i32.add (global.get $frames) (i32.const 1)))
            (drop (call $circle (f64.const 0) (f64.const 0) (f64.const 0.5)
                (i32.const 255) (i32.const 0) (i32.const 0) (i32.const 255)))
        )
    )
"#;

fn red_circle() -> DrawCommand {
    DrawCommand::Circle {
        pos: DVec2::ZERO,
        radius: 0.5,
        color: Color::rgba(255, 0, 0, 255),
    }
}

#[test]
fn test_setup_batch_precedes_initialize() {
    let mut controller = new_controller();
    let replies = load(&mut controller, DEMO);

    assert_eq!(
        replies,
        vec![
            ToHost::Message(
                Control::Batch {
                    commands: vec![DrawCommand::SetBackground {
                        color: Color::BLACK
                    }]
                }
                .into()
            ),
            ToHost::Message(
                Control::Initialize {
                    width: 800,
                    height: 600,
                    title: "Demo".into()
                }
                .into()
            ),
        ]
    );
    assert_eq!(controller.state(), LifecycleState::Ready);
}

#[test]
fn test_frame_emits_batch_then_sentinel() {
    let mut controller = new_controller();
    load(&mut controller, DEMO);

    for n in 1..=3 {
        let replies = frame(&mut controller);
        assert_eq!(
            replies,
            vec![
                ToHost::Message(
                    Control::Batch {
                        commands: vec![red_circle()]
                    }
                    .into()
                ),
                ToHost::FrameDone,
            ]
        );
        assert_eq!(controller.frames(), n);
    }
}

#[test]
fn test_unbatched_framing_sends_single_commands() {
    let mut config = BridgeConfig::default();
    config.protocol.batch_commands = false;
    let mut controller = new_controller_with(config);
    load(&mut controller, DEMO);

    let replies = frame(&mut controller);
    assert_eq!(
        replies,
        vec![
            ToHost::Message(ModuleMessage::Draw(red_circle())),
            ToHost::FrameDone
        ]
    );
}

#[test]
fn test_mode_mismatch_alerts_and_continues() {
    let wat = r#"
        (module
            (import "gapi" "set_bg_color" (func $bg (param i32 i32 i32 i32)))
            (memory (export "memory") 1)
            (func (export "mode") (result i32) (i32.const 1))
            (func (export "setup")
                (call $bg (i32.const 1) (i32.const 2) (i32.const 3) (i32.const 255)))
        )
    "#;
    let mut controller = new_controller();
    let replies = load(&mut controller, wat);

    assert!(matches!(
        &replies[0],
        ToHost::Message(ModuleMessage::Control(Control::Alert { message })) if message.contains("mode 1")
    ));
    // Setup still ran and the module still reached ready
    assert_eq!(
        commands(&replies),
        vec![DrawCommand::SetBackground {
            color: Color::rgba(1, 2, 3, 255)
        }]
    );
    assert!(matches!(
        replies.last(),
        Some(ToHost::Message(ModuleMessage::Control(Control::Initialize { .. })))
    ));
    assert_eq!(controller.state(), LifecycleState::Ready);
}

#[test]
fn test_missing_mode_export_alerts() {
    let mut controller = new_controller();
    let replies = load(&mut controller, r#"(module (memory (export "memory") 1))"#);
    assert!(matches!(
        &replies[0],
        ToHost::Message(ModuleMessage::Control(Control::Alert { .. }))
    ));
    assert_eq!(controller.state(), LifecycleState::Ready);
}

#[test]
fn test_load_failure_is_terminal() {
    let mut controller = new_controller();
    let result = controller.handle(ToModule::Load(b"\0asm garbage".to_vec()));
    assert!(matches!(result, Err(BridgeError::Load(_))));
    assert_eq!(controller.state(), LifecycleState::Destroyed);

    // Nothing is retried or processed afterwards
    assert_eq!(frame(&mut controller), Vec::new());
    assert!(controller.handle(ToModule::Load(Vec::new())).unwrap().is_empty());
}

#[test]
fn test_missing_import_namespace_fails_to_load() {
    let wat = r#"
        (module
            (import "sdl" "open_window" (func))
            (memory (export "memory") 1)
        )
    "#;
    let mut controller = new_controller();
    let wasm = wat::parse_str(wat).unwrap();
    let err = controller.handle(ToModule::Load(wasm)).unwrap_err();
    assert!(err.to_string().contains("module failed to load"));
}

#[test]
fn test_frame_request_before_load_is_ignored() {
    let mut controller = new_controller();
    assert!(frame(&mut controller).is_empty());
    assert_eq!(controller.state(), LifecycleState::Unready);
}

#[test]
fn test_trap_in_loop_still_completes_frame() {
    let wat = r#"
        (module
            (import "gapi" "draw_circle"
                (func $circle (param f64 f64 f64 i32 i32 i32 i32) (result i32)))
            (memory (export "memory") 1)
            (func (export "mode") (result i32) (i32.const 2))
            (func (export "loop")
                (drop (call $circle (f64.const 0) (f64.const 0) (f64.const 0.5)
                    (i32.const 255) (i32.const 0) (i32.const 0) (i32.const 255)))
                unreachable
            )
        )
    "#;
    let mut controller = new_controller();
    load(&mut controller, wat);

    for _ in 0..2 {
        let replies = frame(&mut controller);
        assert_eq!(commands(&replies), vec![red_circle()]);
        assert_eq!(replies.last(), Some(&ToHost::FrameDone));
    }
    assert_eq!(controller.state(), LifecycleState::Ready);
}

#[test]
fn test_trap_in_setup_still_initializes() {
    let wat = r#"
        (module
            (memory (export "memory") 1)
            (func (export "mode") (result i32) (i32.const 2))
            (func (export "setup") unreachable)
        )
    "#;
    let mut controller = new_controller();
    let replies = load(&mut controller, wat);
    assert!(matches!(
        replies.last(),
        Some(ToHost::Message(ModuleMessage::Control(Control::Initialize { width: 500, height: 500, .. })))
    ));
    assert_eq!(controller.state(), LifecycleState::Ready);
}

#[test]
fn test_empty_frame_sends_only_sentinel() {
    let wat = r#"
        (module
            (memory (export "memory") 1)
            (func (export "mode") (result i32) (i32.const 2))
            (func (export "loop"))
        )
    "#;
    let mut controller = new_controller();
    load(&mut controller, wat);
    assert_eq!(frame(&mut controller), vec![ToHost::FrameDone]);
}

#[test]
fn test_destroy_stops_processing() {
    let mut controller = new_controller();
    load(&mut controller, DEMO);
    controller.destroy();
    assert_eq!(controller.state(), LifecycleState::Destroyed);
    assert!(controller.instance().is_none());
    assert!(frame(&mut controller).is_empty());
}

#[test]
fn test_wasi_hello_world_module_runs() {
    // What a C toolchain emits for printf in setup plus an unused file API
    let wat = r#"
        (module
            (import "wasi_snapshot_preview1" "fd_write"
                (func $fd_write (param i32 i32 i32 i32) (result i32)))
            (import "wasi_snapshot_preview1" "path_open"
                (func $path_open (param i32 i32 i32 i32 i32 i64 i64 i32 i32) (result i32)))
            (import "wasi_snapshot_preview1" "proc_exit" (func $exit (param i32)))
            (memory (export "memory") 1)
            (data (i32.const 8) "hello\n")
            (func (export "mode") (result i32) (i32.const 2))
            (func (export "setup")
                (i32.store (i32.const 0) (i32.const 8))
                (i32.store (i32.const 4) (i32.const 6))
                (drop (call $fd_write (i32.const 1) (i32.const 0) (i32.const 1) (i32.const 32)))
            )
            (func (export "loop"))
        )
    "#;
    let mut controller = new_controller();
    let replies = load(&mut controller, wat);
    assert_eq!(controller.state(), LifecycleState::Ready);
    assert_eq!(replies.len(), 1);
    assert_eq!(frame(&mut controller), vec![ToHost::FrameDone]);
}
