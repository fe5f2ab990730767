mod account;
mod goal;
mod ledger;
mod store;

pub use account::AccountManager;
pub use goal::{GoalOverview, GoalSession, GoalStatus};
pub use ledger::{
    CompletedEntry, Completion, PendingTask, TaskLedger, POINTS_HARDCORE, POINTS_NORMAL,
};
pub use store::RecordStore;
