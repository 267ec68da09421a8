//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, arena construction and content
//! loading so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{ConfigError, WorldError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a world before building")]
    MissingWorld,

    #[error("async pathfinding needs a running tokio runtime")]
    NoAsyncRuntime(#[source] tokio::runtime::TryCurrentError),

    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to load content: {0}")]
    Content(String),
}
