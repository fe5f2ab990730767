use chrono::{Local, NaiveDateTime};

use crate::errors::{AppError, AppResult};
use crate::models::{CompletedTask, TaskState};
use crate::services::RecordStore;

/// Points awarded for completing a normal task.
pub const POINTS_NORMAL: u32 = 3;
/// Points awarded for completing a hardcore task.
pub const POINTS_HARDCORE: u32 = 5;

/// Outcome of a completion attempt. Completing an already-completed task is
/// a distinct signal rather than a failure, so the caller can render
/// "already done"; it changes nothing and awards nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Awarded(u32),
    AlreadyCompleted,
}

/// A task as listed to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub name: String,
    pub hardcore: bool,
}

/// A completion-history entry as listed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedEntry {
    pub name: String,
    pub hardcore: bool,
    pub time: NaiveDateTime,
}

/// Task bookkeeping within a user's record: add, complete, list, and the
/// derived progress toward the goal threshold.
#[derive(Clone)]
pub struct TaskLedger {
    store: RecordStore,
}

impl TaskLedger {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Adds a new incomplete task. Names are unique and case-sensitive.
    pub async fn add_task(&self, identity: &str, name: &str, hardcore: bool) -> AppResult<()> {
        RecordStore::validate_identity(identity)?;
        if name.is_empty() {
            return Err(AppError::InvalidTaskName);
        }

        let _guard = self.store.lock(identity).await;
        let mut record = self
            .store
            .load(identity)
            .await
            .ok_or_else(|| AppError::NoData(identity.to_string()))?;

        if !record.tasks.insert(
            name,
            TaskState {
                completed: false,
                hardcore,
            },
        ) {
            return Err(AppError::TaskExists(name.to_string()));
        }

        self.store.save(identity, &record).await?;
        tracing::info!("added task {:?} for {} (hardcore: {})", name, identity, hardcore);
        Ok(())
    }

    /// Marks a task completed: one-way transition that appends a history
    /// entry and awards points exactly once. Repeat attempts report
    /// `AlreadyCompleted` and leave the record untouched.
    pub async fn complete_task(&self, identity: &str, name: &str) -> AppResult<Completion> {
        RecordStore::validate_identity(identity)?;

        let _guard = self.store.lock(identity).await;
        let mut record = self
            .store
            .load(identity)
            .await
            .ok_or_else(|| AppError::NoData(identity.to_string()))?;

        let task = record
            .tasks
            .get_mut(name)
            .ok_or_else(|| AppError::TaskNotFound(name.to_string()))?;
        if task.completed {
            return Ok(Completion::AlreadyCompleted);
        }

        task.completed = true;
        let awarded = if task.hardcore {
            POINTS_HARDCORE
        } else {
            POINTS_NORMAL
        };
        record.completed_tasks.push(CompletedTask {
            name: name.to_string(),
            time: Local::now().naive_local(),
        });
        record.points += awarded;

        self.store.save(identity, &record).await?;
        tracing::info!(
            "completed task {:?} for {} (+{} points, total {})",
            name,
            identity,
            awarded,
            record.points
        );
        Ok(Completion::Awarded(awarded))
    }

    /// Incomplete tasks in the order they were added.
    pub async fn list_incomplete(&self, identity: &str) -> AppResult<Vec<PendingTask>> {
        RecordStore::validate_identity(identity)?;
        let record = self
            .store
            .load(identity)
            .await
            .ok_or_else(|| AppError::NoData(identity.to_string()))?;

        Ok(record
            .tasks
            .iter()
            .filter(|(_, state)| !state.completed)
            .map(|(name, state)| PendingTask {
                name: name.to_string(),
                hardcore: state.hardcore,
            })
            .collect())
    }

    /// Completion history in chronological (append) order.
    pub async fn list_completed(&self, identity: &str) -> AppResult<Vec<CompletedEntry>> {
        RecordStore::validate_identity(identity)?;
        let record = self
            .store
            .load(identity)
            .await
            .ok_or_else(|| AppError::NoData(identity.to_string()))?;

        Ok(record
            .completed_tasks
            .iter()
            .map(|done| CompletedEntry {
                name: done.name.clone(),
                hardcore: record
                    .tasks
                    .get(&done.name)
                    .map(|state| state.hardcore)
                    .unwrap_or(false),
                time: done.time,
            })
            .collect())
    }

    /// Accumulated points over the goal threshold, clamped to 1.0.
    pub async fn progress_ratio(&self, identity: &str) -> AppResult<f64> {
        RecordStore::validate_identity(identity)?;
        let record = self
            .store
            .load(identity)
            .await
            .ok_or_else(|| AppError::NoData(identity.to_string()))?;
        Ok(record.progress_ratio())
    }
}
