use crate::errors::{AppError, AppResult};
use crate::services::RecordStore;

/// Result of a completion check. Purely a read; whether to celebrate once or
/// on every visit is the caller's decision to track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    Achieved,
    InProgress,
}

/// Snapshot of the goal page state: current goal text, points and progress.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalOverview {
    pub goal: Option<String>,
    pub points: u32,
    pub progress: f64,
}

/// The single active goal: its text, completion check and reset.
#[derive(Clone)]
pub struct GoalSession {
    store: RecordStore,
}

impl GoalSession {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Sets the goal text, overwriting whatever was there.
    pub async fn set_goal(&self, identity: &str, text: &str) -> AppResult<()> {
        RecordStore::validate_identity(identity)?;

        let _guard = self.store.lock(identity).await;
        let mut record = self
            .store
            .load(identity)
            .await
            .ok_or_else(|| AppError::NoData(identity.to_string()))?;

        record.goal = Some(text.to_string());
        self.store.save(identity, &record).await?;
        tracing::info!("goal set for {}: {:?}", identity, text);
        Ok(())
    }

    /// Current goal text, points and progress ratio in one read.
    pub async fn overview(&self, identity: &str) -> AppResult<GoalOverview> {
        RecordStore::validate_identity(identity)?;
        let record = self
            .store
            .load(identity)
            .await
            .ok_or_else(|| AppError::NoData(identity.to_string()))?;

        Ok(GoalOverview {
            progress: record.progress_ratio(),
            points: record.points,
            goal: record.goal,
        })
    }

    /// Achieved iff the progress gauge is full.
    pub async fn check_completion(&self, identity: &str) -> AppResult<GoalStatus> {
        RecordStore::validate_identity(identity)?;
        let record = self
            .store
            .load(identity)
            .await
            .ok_or_else(|| AppError::NoData(identity.to_string()))?;

        if record.progress_ratio() >= 1.0 {
            Ok(GoalStatus::Achieved)
        } else {
            Ok(GoalStatus::InProgress)
        }
    }

    /// Clears the goal, the point total and the completion history. The
    /// tasks map is left alone: previously completed tasks keep their
    /// completed flag, so they neither reappear as pending nor count toward
    /// points again. Long-standing quirk, kept as-is.
    pub async fn reset(&self, identity: &str) -> AppResult<()> {
        RecordStore::validate_identity(identity)?;

        let _guard = self.store.lock(identity).await;
        let mut record = self
            .store
            .load(identity)
            .await
            .ok_or_else(|| AppError::NoData(identity.to_string()))?;

        record.goal = None;
        record.points = 0;
        record.completed_tasks.clear();

        self.store.save(identity, &record).await?;
        tracing::info!("reset goal, points and history for {}", identity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{AccountManager, Completion, TaskLedger};

    async fn session_with_user(identity: &str) -> (tempfile::TempDir, GoalSession, TaskLedger) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path()).unwrap();
        AccountManager::new(store.clone())
            .register(identity, "pw1")
            .await
            .unwrap();
        (dir, GoalSession::new(store.clone()), TaskLedger::new(store))
    }

    #[tokio::test]
    async fn test_set_goal_and_overview() {
        let (_dir, goals, _ledger) = session_with_user("alice").await;
        assert_eq!(goals.overview("alice").await.unwrap().goal, None);

        goals.set_goal("alice", "run a marathon").await.unwrap();
        let overview = goals.overview("alice").await.unwrap();
        assert_eq!(overview.goal.as_deref(), Some("run a marathon"));
        assert_eq!(overview.points, 0);
        assert_eq!(overview.progress, 0.0);

        // Overwrite is unconditional.
        goals.set_goal("alice", "swim the channel").await.unwrap();
        assert_eq!(
            goals.overview("alice").await.unwrap().goal.as_deref(),
            Some("swim the channel")
        );
    }

    #[tokio::test]
    async fn test_check_completion_at_threshold() {
        let (_dir, goals, ledger) = session_with_user("alice").await;
        goals.set_goal("alice", "fill the gauge").await.unwrap();

        // 9 hardcore completions = 45 points, one short of the threshold.
        for i in 0..9 {
            let name = format!("task{}", i);
            ledger.add_task("alice", &name, true).await.unwrap();
            ledger.complete_task("alice", &name).await.unwrap();
        }
        assert_eq!(
            goals.check_completion("alice").await.unwrap(),
            GoalStatus::InProgress
        );

        ledger.add_task("alice", "final", true).await.unwrap();
        ledger.complete_task("alice", "final").await.unwrap();
        assert_eq!(
            goals.check_completion("alice").await.unwrap(),
            GoalStatus::Achieved
        );
    }

    #[tokio::test]
    async fn test_reset_clears_counters_but_not_task_flags() {
        let (_dir, goals, ledger) = session_with_user("alice").await;
        goals.set_goal("alice", "get fit").await.unwrap();
        ledger.add_task("alice", "run", false).await.unwrap();
        ledger.add_task("alice", "lift", true).await.unwrap();
        ledger.complete_task("alice", "run").await.unwrap();

        goals.reset("alice").await.unwrap();

        let overview = goals.overview("alice").await.unwrap();
        assert_eq!(overview.goal, None);
        assert_eq!(overview.points, 0);
        assert_eq!(overview.progress, 0.0);
        assert!(ledger.list_completed("alice").await.unwrap().is_empty());

        // The completed flag on "run" survives the reset: it does not come
        // back as pending, and completing it again awards nothing.
        let pending: Vec<String> = ledger
            .list_incomplete("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(pending, vec!["lift"]);
        assert_eq!(
            ledger.complete_task("alice", "run").await.unwrap(),
            Completion::AlreadyCompleted
        );
        assert_eq!(ledger.progress_ratio("alice").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_reset_without_record() {
        let (_dir, goals, _ledger) = session_with_user("alice").await;
        assert!(matches!(
            goals.reset("ghost").await,
            Err(AppError::NoData(_))
        ));
    }
}
