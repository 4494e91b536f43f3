//! Daemon setup and lifecycle management

use crate::config::DaemonConfig;
use crate::error::DaemonResult;
use crate::state::StateFile;
use grc_workflow_engine::{
    InMemoryDirectory, JsonlHistory, MemoryCatalog, SweepScheduler, TemplateRegistry,
    WorkflowEngine, WorkflowStore,
};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

/// Workflow daemon: owns the engine and drives its sweeps.
///
/// The state file is rewritten after every committed change, so a
/// restart never replays work the history already records.
pub struct Daemon {
    config: DaemonConfig,
    engine: Arc<Mutex<WorkflowEngine>>,
    catalog: Arc<MemoryCatalog>,
    state: StateFile,
}

impl Daemon {
    /// Build the engine from the configured files and any saved state
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let templates = TemplateRegistry::load_file(&config.templates_path)?;

        let directory = match &config.directory_path {
            Some(path) => InMemoryDirectory::load_file(path)?,
            None => InMemoryDirectory::new(),
        };

        let history = JsonlHistory::open(config.history_path.clone())?;

        let state = StateFile::new(config.state_path.clone());
        let store = match state.load()? {
            Some(snapshot) => WorkflowStore::from_snapshot(snapshot),
            None => WorkflowStore::new(),
        };

        tracing::info!(
            templates = templates.count(),
            users = directory.user_count(),
            instances = store.instance_count(),
            "Workflow state loaded"
        );

        let catalog = Arc::new(MemoryCatalog::new());
        let persist = state.clone();
        let engine = WorkflowEngine::new(templates, Arc::new(directory), catalog.clone())
            .with_history(Arc::new(history))
            .with_store(store)
            .with_commit_hook(move |store| {
                if let Err(e) = persist.save(&store.snapshot()) {
                    tracing::error!(error = %e, "Failed to save workflow state");
                }
            });

        Ok(Self {
            config,
            engine: Arc::new(Mutex::new(engine)),
            catalog,
            state,
        })
    }

    /// Shared handle for embedding callers
    pub fn engine(&self) -> Arc<Mutex<WorkflowEngine>> {
        self.engine.clone()
    }

    /// Live facts about workflow targets; embedding callers keep it current
    pub fn catalog(&self) -> Arc<MemoryCatalog> {
        self.catalog.clone()
    }

    pub fn save_state(&self) -> DaemonResult<()> {
        let snapshot = self.engine.lock().snapshot();
        self.state.save(&snapshot)
    }

    /// Run the sweeps until `shutdown` resolves, then save state
    pub async fn run_until<F>(self, shutdown: F) -> DaemonResult<()>
    where
        F: Future<Output = ()>,
    {
        let scheduler = SweepScheduler::new(self.engine.clone(), self.config.scheduler.clone());

        tracing::info!(
            templates = %self.config.templates_path.display(),
            history = %self.config.history_path.display(),
            state = %self.config.state_path.display(),
            "Workflow daemon running"
        );

        scheduler.run(shutdown).await;

        tracing::info!("Workflow daemon shutting down");
        self.save_state()
    }

    /// Run the sweeps until Ctrl+C or SIGTERM
    pub async fn run(self) -> DaemonResult<()> {
        self.run_until(shutdown_signal()).await
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
