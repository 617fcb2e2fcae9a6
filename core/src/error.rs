//! Bridge-level errors reported to the host

use easel_shared::ProtocolError;

/// Failures the host observes while driving a module.
///
/// Traps inside `setup`/`loop` are not errors at this level: they are logged
/// on the execution thread and the frame still completes.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Compilation, linking or instantiation failed. Reported once; the
    /// execution thread has already shut down.
    #[error("module failed to load: {0}")]
    Load(String),
    /// The execution thread is gone (it exited after a load failure or teardown)
    #[error("execution thread disconnected")]
    Disconnected,
    /// The execution thread panicked
    #[error("execution thread panicked")]
    WorkerPanicked,
    /// No `initialize` message arrived in time
    #[error("module did not initialize within {0:?}")]
    InitTimeout(std::time::Duration),
    #[error("failed to spawn execution thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
