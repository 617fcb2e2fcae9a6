//! Execution thread
//!
//! Runs one untrusted module on its own thread. The host talks to it only
//! through two ordered channels; the module never touches host state.
//!
//! ```text
//! Host thread                         Execution thread
//!     │                                     │
//! [send ToModule]────(channel)────────►[ModuleController::handle]
//!     │                                     │
//! [pump ToHost] ◄────(channel)─────────[replies, in order]
//! ```
//!
//! Teardown is unconditional: the handle raises the store's cancel flag,
//! bumps the engine epoch so guest code traps at its next check, drops the
//! sender and joins.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use easel_shared::protocol::{encode_to_host, encode_to_module};
use easel_shared::{ToHost, ToModule};
use tracing::{debug, trace, warn};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::lifecycle::{LifecycleState, ModuleController};
use crate::wasm::WasmEngine;

/// Thread name, visible in panics and profilers
const THREAD_NAME: &str = "easel-module";

pub struct ExecutionThread {
    rx: Receiver<ToModule>,
    tx: Sender<ToHost>,
    controller: ModuleController,
    trace_messages: bool,
}

impl ExecutionThread {
    /// Spawn the execution thread
    ///
    /// Nothing runs until the first [`ToModule::Load`] arrives.
    pub fn spawn(engine: &WasmEngine, config: BridgeConfig) -> Result<WorkerHandle, BridgeError> {
        let (to_module, rx) = mpsc::channel::<ToModule>();
        let (tx, from_module) = mpsc::channel::<ToHost>();
        let cancelled = Arc::new(AtomicBool::new(false));

        let trace_messages = config.protocol.trace_messages;
        let controller = ModuleController::new(engine.clone(), config, cancelled.clone());

        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || {
                let worker = Self {
                    rx,
                    tx,
                    controller,
                    trace_messages,
                };
                worker.run()
            })?;

        Ok(WorkerHandle {
            tx: Some(to_module),
            rx: from_module,
            handle: Some(handle),
            engine: engine.clone(),
            cancelled,
        })
    }

    /// Process messages until the host hangs up or the module is destroyed
    fn run(mut self) -> Result<(), BridgeError> {
        debug!("Execution thread started");

        while let Ok(message) = self.rx.recv() {
            if self.trace_messages {
                trace_incoming(&message);
            }

            let replies = self.controller.handle(message)?;
            for reply in replies {
                if self.trace_messages {
                    match encode_to_host(&reply) {
                        Ok(json) => trace!("module -> host {}", json),
                        Err(e) => warn!("Failed to encode reply for tracing: {}", e),
                    }
                }
                if self.tx.send(reply).is_err() {
                    debug!("Host hung up; execution thread exiting");
                    return Ok(());
                }
            }

            if self.controller.state() == LifecycleState::Destroyed {
                break;
            }
        }

        debug!(
            "Execution thread finished after {} frames",
            self.controller.frames()
        );
        Ok(())
    }
}

fn trace_incoming(message: &ToModule) {
    match message {
        ToModule::Load(bytes) => trace!("host -> module <{} module bytes>", bytes.len()),
        other => match encode_to_module(other) {
            Ok(json) => trace!("host -> module {}", json),
            Err(e) => warn!("Failed to encode request for tracing: {}", e),
        },
    }
}

/// Handle to the execution thread
///
/// Returned from [`ExecutionThread::spawn`]. Dropping it tears the thread down.
pub struct WorkerHandle {
    /// Option so the sender can be dropped before joining
    tx: Option<Sender<ToModule>>,
    rx: Receiver<ToHost>,
    handle: Option<JoinHandle<Result<(), BridgeError>>>,
    engine: WasmEngine,
    cancelled: Arc<AtomicBool>,
}

impl WorkerHandle {
    pub fn send(&self, message: ToModule) -> Result<(), BridgeError> {
        let Some(tx) = self.tx.as_ref() else {
            return Err(BridgeError::Disconnected);
        };
        tx.send(message).map_err(|_| BridgeError::Disconnected)
    }

    /// Next reply if one is waiting
    ///
    /// `Err(Disconnected)` once the thread has exited and every reply has
    /// been drained.
    pub fn try_recv(&self) -> Result<Option<ToHost>, BridgeError> {
        match self.rx.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(BridgeError::Disconnected),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<ToHost>, BridgeError> {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => Ok(Some(message)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::Disconnected),
        }
    }

    /// Check if the execution thread is still running
    pub fn is_alive(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Hang up and wait for the thread, returning how it ended
    ///
    /// Waits for any in-flight module call to return; use
    /// [`WorkerHandle::terminate`] to cut it short.
    pub fn join(&mut self) -> Result<(), BridgeError> {
        drop(self.tx.take());
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| BridgeError::WorkerPanicked)?,
            None => Ok(()),
        }
    }

    /// Stop the module mid-call if needed and join the thread
    pub fn terminate(&mut self) -> Result<(), BridgeError> {
        self.cancelled.store(true, Ordering::Release);
        self.engine.interrupt();
        self.join()
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if self.handle.is_none() {
            return;
        }
        // The sender must go before join or the thread never sees the hangup
        if let Err(e) = self.terminate() {
            debug!("Execution thread ended with: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_shared::Control;

    const SPIN: &str = r#"
        (module
            (memory (export "memory") 1)
            (func (export "mode") (result i32) (i32.const 2))
            (func (export "loop") (loop $spin (br $spin)))
        )
    "#;

    fn spawn() -> WorkerHandle {
        let engine = WasmEngine::new().unwrap();
        ExecutionThread::spawn(&engine, BridgeConfig::default()).unwrap()
    }

    fn recv(handle: &WorkerHandle) -> ToHost {
        handle
            .recv_timeout(Duration::from_secs(5))
            .unwrap()
            .expect("reply within timeout")
    }

    #[test]
    fn test_load_replies_with_initialize() {
        let handle = spawn();
        handle
            .send(ToModule::Load(wat::parse_str(SPIN).unwrap()))
            .unwrap();
        match recv(&handle) {
            ToHost::Message(message) => assert_eq!(
                message,
                Control::Initialize {
                    width: 500,
                    height: 500,
                    title: "easel app".into()
                }
                .into()
            ),
            other => panic!("expected initialize, got {other:?}"),
        }
    }

    #[test]
    fn test_load_failure_ends_thread_with_error() {
        let mut handle = spawn();
        handle.send(ToModule::Load(b"garbage".to_vec())).unwrap();
        assert!(matches!(
            handle.recv_timeout(Duration::from_secs(5)),
            Err(BridgeError::Disconnected)
        ));
        assert!(matches!(handle.join(), Err(BridgeError::Load(_))));
        assert!(!handle.is_alive());
    }

    #[test]
    fn test_terminate_interrupts_runaway_frame() {
        let mut handle = spawn();
        handle
            .send(ToModule::Load(wat::parse_str(SPIN).unwrap()))
            .unwrap();
        recv(&handle);
        handle.send(ToModule::NextFrame).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert!(handle.is_alive());

        assert!(handle.terminate().is_ok());
        assert!(!handle.is_alive());
        assert!(handle.send(ToModule::NextFrame).is_err());
    }

    #[test]
    fn test_drop_without_load_joins_cleanly() {
        let handle = spawn();
        drop(handle);
    }
}
