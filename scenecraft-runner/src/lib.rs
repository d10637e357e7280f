//! Scenecraft Runner
//!
//! The execution backend: takes a generated script and produces a video or a
//! failure report, never both.
//!
//! Architecture:
//! - Configuration: load settings from environment or defaults
//! - Backend: validation, render lock, run directory, transport selection
//! - Transport: the render server client, with failure classification
//! - Engine: the local render process, shared with the render server
//! - Locator: finding the video the engine produced
//! - Bridge: running async work from the synchronous backend API

pub mod backend;
pub mod bridge;
pub mod config;
pub mod engine;
pub mod locator;
pub mod lock;
pub mod transport;
pub mod workspace;

pub use backend::{ExecutionBackend, LOCK_CONTENTION_MESSAGE, RenderBackend};
pub use bridge::run_blocking;
pub use config::RunnerConfig;
pub use engine::{EngineCommand, EngineRun, EngineStatus};
pub use locator::ArtifactLocator;
pub use lock::{RenderGuard, RenderLock};
pub use transport::{RenderTransport, TransportError};
pub use workspace::{RunWorkspace, SCRIPT_FILE_NAME};
