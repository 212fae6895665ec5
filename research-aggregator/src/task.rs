//! The task manager: accepts research requests, owns the task table, and
//! spawns a background aggregator run per task.
//!
//! Progress is modeled as an append-only queue on the task record
//! ([`Task::partial_metrics`]) observed by polling [`TaskManager::get`], not
//! as a push notification channel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use research_baskets::BasketRegistry;
use research_core::types::{Artifact, MetricEvent, Task, TaskStatus};
use research_types::ResearchError;
use uuid::Uuid;

use crate::aggregator::Aggregator;
use crate::ticker;

/// An in-memory task table plus the background aggregator runs it owns.
pub struct TaskManager {
    tasks: Arc<Mutex<HashMap<String, Task>>>,
    registry: Arc<BasketRegistry>,
    metric_delay: Option<Duration>,
}

impl TaskManager {
    /// Build a task manager over a shared basket registry. Reads the
    /// `METRIC_DELAY_MS` environment variable, if set, as an artificial
    /// pacing delay applied between streamed metric events.
    #[must_use]
    pub fn new(registry: Arc<BasketRegistry>) -> Self {
        let metric_delay = std::env::var("METRIC_DELAY_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis);
        Self { tasks: Arc::new(Mutex::new(HashMap::new())), registry, metric_delay }
    }

    /// Resolve `message` to a ticker, record a submitted task, and spawn its
    /// aggregator run in the background.
    ///
    /// # Errors
    /// Returns [`ResearchError::InvalidParams`] if no ticker can be resolved
    /// from `message`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, message)))]
    pub fn submit(&self, message: &str) -> Result<Task, ResearchError> {
        let resolved = ticker::resolve(message)?;
        let id = Uuid::new_v4().to_string();
        let task = Task::submitted(id.clone(), message);
        lock(&self.tasks).insert(id.clone(), task.clone());

        let tasks = Arc::clone(&self.tasks);
        let registry = Arc::clone(&self.registry);
        let metric_delay = self.metric_delay;
        tokio::spawn(run_task(tasks, registry, id, resolved, metric_delay));

        Ok(task)
    }

    /// Snapshot a task's current state.
    ///
    /// # Errors
    /// Returns [`ResearchError::TaskNotFound`] if `task_id` is unknown.
    pub fn get(&self, task_id: &str) -> Result<Task, ResearchError> {
        lock(&self.tasks).get(task_id).cloned().ok_or_else(|| ResearchError::task_not_found(task_id))
    }

    /// Cancel a task. Idempotent: canceling an already-terminal task just
    /// returns its current (unchanged) state.
    ///
    /// # Errors
    /// Returns [`ResearchError::TaskNotFound`] if `task_id` is unknown.
    pub fn cancel(&self, task_id: &str) -> Result<Task, ResearchError> {
        let mut tasks = lock(&self.tasks);
        let task = tasks.get_mut(task_id).ok_or_else(|| ResearchError::task_not_found(task_id))?;
        if !task.status.is_terminal() {
            task.status = TaskStatus::Canceled;
            task.updated_at = Utc::now();
        }
        Ok(task.clone())
    }

    /// Number of tasks currently tracked, for liveness reporting.
    #[must_use]
    pub fn task_count(&self) -> usize {
        lock(&self.tasks).len()
    }
}

fn lock(tasks: &Arc<Mutex<HashMap<String, Task>>>) -> MutexGuard<'_, HashMap<String, Task>> {
    tasks.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_task(
    tasks: Arc<Mutex<HashMap<String, Task>>>,
    registry: Arc<BasketRegistry>,
    task_id: String,
    resolved: research_core::types::Ticker,
    metric_delay: Option<Duration>,
) {
    {
        let mut guard = lock(&tasks);
        match guard.get_mut(&task_id) {
            Some(task) if !task.status.is_terminal() => {
                task.status = TaskStatus::Working;
                task.updated_at = Utc::now();
            }
            _ => return,
        }
    }

    let aggregator = Aggregator::new(registry);
    let emit_tasks = Arc::clone(&tasks);
    let emit_task_id = task_id.clone();
    let cancel_tasks = Arc::clone(&tasks);
    let cancel_task_id = task_id.clone();

    let handle = tokio::spawn(async move {
        aggregator
            .run(
                &resolved,
                move |event: MetricEvent| {
                    record_metric(&emit_tasks, &emit_task_id, event);
                    if let Some(delay) = metric_delay {
                        std::thread::sleep(delay);
                    }
                },
                move || {
                    lock(&cancel_tasks)
                        .get(&cancel_task_id)
                        .is_none_or(|task| task.status == TaskStatus::Canceled)
                },
            )
            .await
    });

    match handle.await {
        Ok(artifact) => {
            let mut guard = lock(&tasks);
            if let Some(task) = guard.get_mut(&task_id) {
                if task.status != TaskStatus::Canceled {
                    task.status = TaskStatus::Completed;
                    task.artifacts = Some(vec![Artifact { data: artifact }]);
                    task.updated_at = Utc::now();
                }
            }
        }
        Err(join_error) => {
            let mut guard = lock(&tasks);
            if let Some(task) = guard.get_mut(&task_id) {
                task.status = TaskStatus::Failed;
                task.error = Some(join_error.to_string());
                task.updated_at = Utc::now();
            }
        }
    }
}

fn record_metric(tasks: &Arc<Mutex<HashMap<String, Task>>>, task_id: &str, event: MetricEvent) {
    let mut guard = lock(tasks);
    if let Some(task) = guard.get_mut(task_id) {
        if !task.status.is_terminal() {
            task.partial_metrics.push(event);
            task.updated_at = Utc::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_fetch::UpstreamFetcher;
    use tokio::time::{sleep, Duration as TokioDuration};

    fn manager() -> TaskManager {
        let registry = Arc::new(BasketRegistry::new(Arc::new(UpstreamFetcher::new())).expect("registry"));
        TaskManager::new(registry)
    }

    #[test]
    fn submit_rejects_unresolvable_tickers() {
        let manager = manager();
        let err = manager.submit("###").unwrap_err();
        assert!(matches!(err, ResearchError::InvalidParams(_)));
    }

    #[test]
    fn get_reports_task_not_found_for_unknown_id() {
        let manager = manager();
        let err = manager.get("does-not-exist").unwrap_err();
        assert!(matches!(err, ResearchError::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn submit_then_poll_reaches_a_terminal_state() {
        let manager = manager();
        let task = manager.submit("Research Tesla").expect("resolvable ticker");

        let mut current = task;
        for _ in 0..200 {
            if current.status.is_terminal() {
                break;
            }
            sleep(TokioDuration::from_millis(20)).await;
            current = manager.get(&current.id).expect("task still tracked");
        }

        assert!(current.status.is_terminal());
    }

    #[tokio::test]
    async fn cancel_is_idempotent_on_a_terminal_task() {
        let manager = manager();
        let task = manager.submit("Research Tesla").expect("resolvable ticker");

        let mut current = task.clone();
        for _ in 0..200 {
            if current.status.is_terminal() {
                break;
            }
            sleep(TokioDuration::from_millis(20)).await;
            current = manager.get(&current.id).expect("task still tracked");
        }

        let first_cancel = manager.cancel(&task.id).expect("task known");
        let second_cancel = manager.cancel(&task.id).expect("task known");
        assert_eq!(first_cancel.status, second_cancel.status);
    }
}
