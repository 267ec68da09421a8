//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up the command channel and
//! the event bus, and exposes a builder-based API for clients to drive the
//! arena.

use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use game_content::ContentFactory;
use game_core::{Arena, DeferredPathfinder, GameConfig, Millis, PathService, World};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::pathing::AsyncPathService;
use crate::workers::{Command, SimulationWorker};

/// Where flee paths are searched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PathfindingMode {
    /// On the simulation task, resolved at the start of the next tick.
    Deferred,
    /// On tokio's blocking pool; results may take several ticks.
    #[default]
    Async,
}

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Logical length of one tick.
    pub tick_ms: Millis,
    /// Seed of the arena's random stream.
    pub seed: u64,
    pub pathfinding: PathfindingMode,
    /// Tick on the wall clock from the start instead of waiting for
    /// `step` calls.
    pub realtime: bool,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            seed: 0,
            pathfinding: PathfindingMode::default(),
            realtime: false,
            event_buffer_size: 256,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that drives one arena.
///
/// Design: Runtime owns the worker task. [`RuntimeHandle`] provides a
/// cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully. The worker stops once every handle
    /// clone has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<World>,
    game_config: GameConfig,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
            game_config: GameConfig::default(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide the world to simulate
    pub fn world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    /// Override the rules tuning
    pub fn game_config(mut self, game_config: GameConfig) -> Self {
        self.game_config = game_config;
        self
    }

    /// Loads tuning and scenario `name` from a content directory.
    pub fn content(mut self, factory: &ContentFactory, name: &str) -> Result<Self> {
        self.game_config = factory
            .load_config()
            .map_err(|e| RuntimeError::Content(format!("{e:#}")))?;
        let (world, _) = factory
            .load_scenario(name)
            .and_then(|scenario| scenario.build_world())
            .map_err(|e| RuntimeError::Content(format!("{e:#}")))?;
        self.world = Some(world);
        Ok(self)
    }

    /// Build the runtime and spawn its worker.
    pub async fn build(self) -> Result<Runtime> {
        let world = self.world.ok_or(RuntimeError::MissingWorld)?;

        let paths: Box<dyn PathService + Send> = match self.config.pathfinding {
            PathfindingMode::Deferred => Box::new(DeferredPathfinder::new()),
            PathfindingMode::Async => {
                let runtime = Handle::try_current().map_err(RuntimeError::NoAsyncRuntime)?;
                Box::new(AsyncPathService::new(runtime))
            }
        };
        let arena = Arena::with_path_service(world, self.game_config, self.config.seed, paths)?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        info!(
            target: "runtime",
            seed = self.config.seed,
            tick_ms = self.config.tick_ms,
            pathfinding = %self.config.pathfinding,
            "starting runtime"
        );

        let sim_worker = SimulationWorker::new(
            arena,
            command_rx,
            event_bus,
            self.config.tick_ms,
            self.config.realtime,
        );
        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            sim_worker_handle,
        })
    }
}
