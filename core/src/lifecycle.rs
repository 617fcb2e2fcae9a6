//! Module lifecycle controller
//!
//! Drives one module through load, setup and per-frame execution in response
//! to host messages. Runs on the execution thread; every reply goes back to
//! the host in the order returned.
//!
//! ```text
//! Unready --Load--> Loaded --setup done--> Ready --NextFrame--> Ready
//!    |                                       |
//!    +--load failure--> Destroyed <--interrupt/destroy
//! ```

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use easel_shared::constants::SETUP_MODE;
use easel_shared::{Control, ToHost, ToModule};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::wasm::{ModuleInstance, WasmEngine, is_interrupt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Waiting for module bytes
    Unready,
    /// Instantiated; setup in progress
    Loaded,
    /// Setup done and announced; frames and events accepted
    Ready,
    /// Torn down or failed to load; every message is ignored
    Destroyed,
}

pub struct ModuleController {
    engine: WasmEngine,
    config: BridgeConfig,
    state: LifecycleState,
    instance: Option<ModuleInstance>,
    frames: u64,
    cancelled: Arc<AtomicBool>,
}

impl ModuleController {
    /// `cancelled` is handed to the module's store; setting it and then
    /// calling [`WasmEngine::interrupt`] stops guest code mid-call.
    pub fn new(engine: WasmEngine, config: BridgeConfig, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            engine,
            config,
            state: LifecycleState::Unready,
            instance: None,
            frames: 0,
            cancelled,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn instance(&self) -> Option<&ModuleInstance> {
        self.instance.as_ref()
    }

    /// Handle one host message, returning the replies in send order
    ///
    /// Only a load failure is an error; it leaves the controller `Destroyed`.
    pub fn handle(&mut self, message: ToModule) -> Result<Vec<ToHost>, BridgeError> {
        match (self.state, message) {
            (LifecycleState::Unready, ToModule::Load(bytes)) => self.load(&bytes),
            (LifecycleState::Ready, ToModule::NextFrame) => Ok(self.run_frame()),
            (LifecycleState::Ready, ToModule::Event(event)) => {
                if let Some(instance) = self.instance.as_mut() {
                    instance.context_mut().input.apply(&event);
                }
                Ok(Vec::new())
            }
            (LifecycleState::Destroyed, _) => Ok(Vec::new()),
            (state, message) => {
                tracing::debug!("Ignoring {} while {:?}", describe(&message), state);
                Ok(Vec::new())
            }
        }
    }

    fn load(&mut self, bytes: &[u8]) -> Result<Vec<ToHost>, BridgeError> {
        let cancelled = self.cancelled.clone();
        let mut instance = match ModuleInstance::instantiate(&self.engine, bytes, &self.config, cancelled)
        {
            Ok(instance) => instance,
            Err(e) => {
                tracing::error!("Failed to load module: {:#}", e);
                self.state = LifecycleState::Destroyed;
                return Err(BridgeError::Load(format!("{e:#}")));
            }
        };
        self.state = LifecycleState::Loaded;
        let mut replies = Vec::new();

        if let Some(message) = check_mode(&mut instance) {
            tracing::error!("{}", message);
            replies.push(ToHost::Message(Control::Alert { message }.into()));
        }

        if let Err(e) = instance.setup() {
            if is_interrupt(&e) {
                return Ok(self.interrupted());
            }
            tracing::error!("{:#}", e);
        }

        let batched = self.config.protocol.batch_commands;
        replies.extend(instance.context_mut().queue.flush(batched));

        let window = instance.context().window.clone();
        tracing::info!(
            "Module ready: {}x{} {:?}",
            window.width,
            window.height,
            window.title
        );
        replies.push(ToHost::Message(
            Control::Initialize {
                width: window.width,
                height: window.height,
                title: window.title,
            }
            .into(),
        ));

        self.instance = Some(instance);
        self.state = LifecycleState::Ready;
        Ok(replies)
    }

    /// Run the per-frame entry point, flush its commands and close the frame
    ///
    /// A trap is logged and the frame still completes, so the host never
    /// waits on a sentinel that will not come.
    fn run_frame(&mut self) -> Vec<ToHost> {
        let Some(instance) = self.instance.as_mut() else {
            return Vec::new();
        };
        let result = instance.run_loop();
        if let Err(e) = &result
            && is_interrupt(e)
        {
            return self.interrupted();
        }
        if let Err(e) = result {
            tracing::error!("Frame {}: {:#}", self.frames, e);
        }

        let batched = self.config.protocol.batch_commands;
        let mut replies = instance.context_mut().queue.flush(batched);
        replies.push(ToHost::FrameDone);
        instance.context_mut().input.end_frame();
        self.frames += 1;
        replies
    }

    fn interrupted(&mut self) -> Vec<ToHost> {
        tracing::debug!("Module interrupted");
        self.destroy();
        Vec::new()
    }

    /// Drop the instance; no further messages are processed
    pub fn destroy(&mut self) {
        self.instance = None;
        self.state = LifecycleState::Destroyed;
    }
}

/// `None` when the module runs in the expected mode, otherwise the
/// diagnostic to log and surface
fn check_mode(instance: &mut ModuleInstance) -> Option<String> {
    match instance.mode() {
        Ok(Some(SETUP_MODE)) => None,
        Ok(Some(mode)) => Some(format!(
            "Module runs in mode {mode}, expected {SETUP_MODE}; it may not behave correctly"
        )),
        Ok(None) => Some(format!(
            "Module exports no mode query, expected mode {SETUP_MODE}; it may not behave correctly"
        )),
        Err(e) => Some(format!("Module mode query failed: {e:#}")),
    }
}

fn describe(message: &ToModule) -> &'static str {
    match message {
        ToModule::Load(_) => "load",
        ToModule::NextFrame => "frame request",
        ToModule::Event(_) => "input event",
    }
}
