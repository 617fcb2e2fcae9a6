//! Integration tests for the Easel bridge
//!
//! Tests the module lifecycle, input delivery across frames, and the full
//! host loop from launch to teardown.

#[cfg(test)]
mod lifecycle_tests;

#[cfg(test)]
pub(crate) mod test_utils {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use easel_shared::{Control, DrawCommand, ModuleMessage, ToHost, ToModule};

    use crate::config::BridgeConfig;
    use crate::lifecycle::ModuleController;
    use crate::wasm::WasmEngine;

    pub fn new_controller() -> ModuleController {
        new_controller_with(BridgeConfig::default())
    }

    pub fn new_controller_with(config: BridgeConfig) -> ModuleController {
        let engine = WasmEngine::new().unwrap();
        ModuleController::new(engine, config, Arc::new(AtomicBool::new(false)))
    }

    /// Load a WAT module, returning the setup replies
    pub fn load(controller: &mut ModuleController, wat: &str) -> Vec<ToHost> {
        let wasm = wat::parse_str(wat).unwrap();
        controller.handle(ToModule::Load(wasm)).unwrap()
    }

    pub fn frame(controller: &mut ModuleController) -> Vec<ToHost> {
        controller.handle(ToModule::NextFrame).unwrap()
    }

    /// Every draw command in the replies, batched or not, in order
    pub fn commands(replies: &[ToHost]) -> Vec<DrawCommand> {
        let mut out = Vec::new();
        for reply in replies {
            match reply {
                ToHost::Message(ModuleMessage::Control(Control::Batch { commands })) => {
                    out.extend(commands.iter().cloned())
                }
                ToHost::Message(ModuleMessage::Draw(command)) => out.push(command.clone()),
                _ => {}
            }
        }
        out
    }
}
