//! Core of a personal goal-tracking application: accounts, a single active
//! goal, discrete tasks and a point total accumulated toward a fixed
//! threshold. Every record lives in one JSON file per identity; every
//! mutation is a full load-modify-save cycle against that file.
//!
//! The UI layer is an external collaborator. It owns session lifecycle and
//! threads the logged-in identity into every call here as a plain string
//! context; nothing in this crate holds ambient session state.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;

pub use config::Config;
pub use errors::{AppError, AppResult};
pub use models::{CompletedTask, TaskState, UserRecord, GOAL_TARGET_POINTS};
pub use services::{
    AccountManager, CompletedEntry, Completion, GoalOverview, GoalSession, GoalStatus,
    PendingTask, RecordStore, TaskLedger,
};
