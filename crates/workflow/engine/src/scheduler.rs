//! Sweep scheduler: drives the periodic engine passes
//!
//! Four independent intervals: the escalation sweep (`tick`), delivery
//! of pending escalation notices, due-soon reminders and the overdue
//! task sweep. Each pass locks the engine only for its own duration.

use crate::{EscalationReport, WorkflowEngine};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Scheduler intervals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Escalation sweep interval in seconds
    #[serde(default = "default_escalation_interval")]
    pub escalation_interval_secs: u64,

    /// Escalation notice interval in seconds
    #[serde(default = "default_notice_interval")]
    pub escalation_notice_interval_secs: u64,

    /// Reminder sweep interval in seconds
    #[serde(default = "default_reminder_interval")]
    pub reminder_interval_secs: u64,

    /// Overdue task sweep interval in seconds
    #[serde(default = "default_task_overdue_interval")]
    pub task_overdue_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            escalation_interval_secs: default_escalation_interval(),
            escalation_notice_interval_secs: default_notice_interval(),
            reminder_interval_secs: default_reminder_interval(),
            task_overdue_interval_secs: default_task_overdue_interval(),
        }
    }
}

fn default_escalation_interval() -> u64 {
    3600
}

fn default_notice_interval() -> u64 {
    4 * 3600
}

fn default_reminder_interval() -> u64 {
    24 * 3600
}

fn default_task_overdue_interval() -> u64 {
    3600
}

type SweepHook = Box<dyn Fn(&WorkflowEngine) + Send + Sync>;

/// Runs engine sweeps on fixed intervals until shut down
pub struct SweepScheduler {
    engine: Arc<Mutex<WorkflowEngine>>,
    config: SchedulerConfig,
    after_sweep: Option<SweepHook>,
}

impl SweepScheduler {
    pub fn new(engine: Arc<Mutex<WorkflowEngine>>, config: SchedulerConfig) -> Self {
        Self {
            engine,
            config,
            after_sweep: None,
        }
    }

    /// Run `hook` with the engine still locked after every pass
    pub fn with_after_sweep<F>(mut self, hook: F) -> Self
    where
        F: Fn(&WorkflowEngine) + Send + Sync + 'static,
    {
        self.after_sweep = Some(Box::new(hook));
        self
    }

    pub fn run_escalation_sweep(&self) -> EscalationReport {
        let mut engine = self.engine.lock();
        let report = engine.tick();
        self.finish(&engine);
        report
    }

    pub fn run_escalation_notices(&self) -> usize {
        let mut engine = self.engine.lock();
        let processed = engine.process_escalations();
        self.finish(&engine);
        processed
    }

    pub fn run_reminders(&self) -> usize {
        let mut engine = self.engine.lock();
        let sent = engine.send_reminders();
        self.finish(&engine);
        sent
    }

    pub fn run_task_sweep(&self) -> usize {
        let mut engine = self.engine.lock();
        let marked = engine.mark_overdue_tasks();
        self.finish(&engine);
        marked
    }

    /// Loop until `shutdown` resolves. Every interval fires once at start.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut escalations = Self::interval_of(self.config.escalation_interval_secs);
        let mut notices = Self::interval_of(self.config.escalation_notice_interval_secs);
        let mut reminders = Self::interval_of(self.config.reminder_interval_secs);
        let mut tasks = Self::interval_of(self.config.task_overdue_interval_secs);
        tokio::pin!(shutdown);

        tracing::info!(
            escalation_secs = self.config.escalation_interval_secs,
            notice_secs = self.config.escalation_notice_interval_secs,
            reminder_secs = self.config.reminder_interval_secs,
            task_secs = self.config.task_overdue_interval_secs,
            "Scheduler started"
        );

        loop {
            tokio::select! {
                _ = escalations.tick() => {
                    self.run_escalation_sweep();
                }
                _ = notices.tick() => {
                    self.run_escalation_notices();
                }
                _ = reminders.tick() => {
                    self.run_reminders();
                }
                _ = tasks.tick() => {
                    self.run_task_sweep();
                }
                _ = &mut shutdown => break,
            }
        }

        tracing::info!("Scheduler stopped");
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn interval_of(secs: u64) -> tokio::time::Interval {
        let mut ticker = interval(Duration::from_secs(secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    fn finish(&self, engine: &WorkflowEngine) {
        if let Some(hook) = &self.after_sweep {
            hook(engine);
        }
    }
}
