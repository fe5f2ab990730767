use chrono::NaiveDateTime;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Points at which the goal gauge is full.
pub const GOAL_TARGET_POINTS: u32 = 50;

/// One durable record per user identity. Serializes to the on-disk JSON
/// document: `profile.password`, `tasks`, `completed_tasks`, `goal`,
/// `points`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserRecord {
    profile: Profile,
    pub tasks: TaskSet,
    pub completed_tasks: Vec<CompletedTask>,
    pub goal: Option<String>,
    pub points: u32,
}

impl UserRecord {
    /// Fresh record as created at registration: no tasks, no history, no
    /// goal, zero points.
    pub fn new(credential: &str) -> Self {
        Self {
            profile: Profile {
                password: credential.to_string(),
            },
            tasks: TaskSet::default(),
            completed_tasks: Vec::new(),
            goal: None,
            points: 0,
        }
    }

    /// Verbatim string comparison against the stored credential. The
    /// credential itself is never handed back out; this predicate is the
    /// only access.
    pub fn verify_credential(&self, supplied: &str) -> bool {
        self.profile.password == supplied
    }

    /// Points over the fixed threshold, clamped to 1.0.
    pub fn progress_ratio(&self) -> f64 {
        (f64::from(self.points) / f64::from(GOAL_TARGET_POINTS)).min(1.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TaskState {
    pub completed: bool,
    pub hardcore: bool,
}

/// Entry of the append-only completion history. `time` is local wall-clock,
/// stored as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CompletedTask {
    pub name: String,
    #[serde(with = "timestamp")]
    pub time: NaiveDateTime,
}

/// Task name -> state map that keeps insertion order, so incomplete-task
/// listings come back in the order tasks were added. Serializes as a plain
/// JSON object keyed by task name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskSet(Vec<(String, TaskState)>);

impl TaskSet {
    /// Inserts a new task; returns false without modifying anything if the
    /// name is already present (names are unique, case-sensitive).
    pub fn insert(&mut self, name: &str, state: TaskState) -> bool {
        if self.contains(name) {
            return false;
        }
        self.0.push((name.to_string(), state));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&TaskState> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TaskState> {
        self.0.iter_mut().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaskState)> {
        self.0.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for TaskSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, state) in &self.0 {
            map.serialize_entry(name, state)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TaskSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TaskSetVisitor;

        impl<'de> Visitor<'de> for TaskSetVisitor {
            type Value = TaskSet;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of task name to task state")
            }

            // JSON objects deserialize in document order, which is the
            // order entries were inserted at write time.
            fn visit_map<A>(self, mut access: A) -> Result<TaskSet, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, state)) = access.next_entry::<String, TaskState>()? {
                    entries.push((name, state));
                }
                Ok(TaskSet(entries))
            }
        }

        deserializer.deserialize_map(TaskSetVisitor)
    }
}

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_record() {
        let record = UserRecord::new("pw1");
        assert!(record.verify_credential("pw1"));
        assert!(!record.verify_credential("pw2"));
        assert!(record.tasks.is_empty());
        assert!(record.completed_tasks.is_empty());
        assert_eq!(record.goal, None);
        assert_eq!(record.points, 0);
        assert_eq!(record.progress_ratio(), 0.0);
    }

    #[test]
    fn test_task_set_keeps_insertion_order() {
        let mut tasks = TaskSet::default();
        for name in ["zulu", "alpha", "mike"] {
            assert!(tasks.insert(
                name,
                TaskState {
                    completed: false,
                    hardcore: false,
                }
            ));
        }
        let names: Vec<&str> = tasks.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn test_task_set_rejects_duplicates() {
        let mut tasks = TaskSet::default();
        let state = TaskState {
            completed: false,
            hardcore: true,
        };
        assert!(tasks.insert("run", state));
        assert!(!tasks.insert(
            "run",
            TaskState {
                completed: true,
                hardcore: false,
            }
        ));
        assert_eq!(tasks.len(), 1);
        // First insert wins untouched.
        assert_eq!(tasks.get("run"), Some(&state));
    }

    #[test]
    fn test_record_json_shape() {
        let mut record = UserRecord::new("secret");
        record.tasks.insert(
            "run",
            TaskState {
                completed: true,
                hardcore: false,
            },
        );
        record.completed_tasks.push(CompletedTask {
            name: "run".to_string(),
            time: NaiveDateTime::parse_from_str("2026-08-28 07:30:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
        });
        record.points = 3;

        let json: serde_json::Value = serde_json::from_str(
            &serde_json::to_string(&record).unwrap(),
        )
        .unwrap();
        assert_eq!(json["profile"]["password"], "secret");
        assert_eq!(json["tasks"]["run"]["completed"], true);
        assert_eq!(json["tasks"]["run"]["hardcore"], false);
        assert_eq!(json["completed_tasks"][0]["name"], "run");
        assert_eq!(json["completed_tasks"][0]["time"], "2026-08-28 07:30:00");
        assert_eq!(json["goal"], serde_json::Value::Null);
        assert_eq!(json["points"], 3);
    }

    #[test]
    fn test_record_round_trip_preserves_task_order() {
        let mut record = UserRecord::new("pw");
        for name in ["third", "first", "second"] {
            record.tasks.insert(
                name,
                TaskState {
                    completed: false,
                    hardcore: name == "first",
                },
            );
        }
        let json = serde_json::to_string(&record).unwrap();
        let back: UserRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        let names: Vec<&str> = back.tasks.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["third", "first", "second"]);
    }

    #[test]
    fn test_progress_ratio_clamps() {
        let mut record = UserRecord::new("pw");
        record.points = 25;
        assert_eq!(record.progress_ratio(), 0.5);
        record.points = 50;
        assert_eq!(record.progress_ratio(), 1.0);
        record.points = 85;
        assert_eq!(record.progress_ratio(), 1.0);
    }
}
