mod record;

pub use record::{CompletedTask, TaskSet, TaskState, UserRecord, GOAL_TARGET_POINTS};
