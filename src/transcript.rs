use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::directory::User;
use crate::validate::Validation;

/// Append-only JSONL log of everything that happened in a session.
pub struct Transcript {
    pub path: PathBuf,
    session_id: String,
    file: File,
}

#[derive(Serialize)]
struct Event<'a> {
    ts: DateTime<Utc>,
    session_id: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    #[serde(flatten)]
    data: serde_json::Value,
}

impl Transcript {
    pub fn new(path: &Path, session_id: &str) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            session_id: session_id.to_string(),
            file,
        })
    }

    pub fn log(&mut self, event_type: &str, data: serde_json::Value) -> Result<()> {
        let event = Event {
            ts: Utc::now(),
            session_id: &self.session_id,
            event_type,
            data,
        };
        let line = serde_json::to_string(&event)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn session_start(&mut self, user_count: usize) -> Result<()> {
        self.log(
            "session_start",
            serde_json::json!({ "user_count": user_count }),
        )
    }

    pub fn session_end(&mut self, user_count: usize) -> Result<()> {
        self.log(
            "session_end",
            serde_json::json!({ "user_count": user_count }),
        )
    }

    pub fn user_added(&mut self, user: &User) -> Result<()> {
        self.log("user_added", serde_json::to_value(user)?)
    }

    pub fn user_updated(&mut self, user: &User) -> Result<()> {
        self.log("user_updated", serde_json::to_value(user)?)
    }

    /// Log a delete. `removed` is false when the id did not exist.
    pub fn user_removed(&mut self, id: u64, removed: bool) -> Result<()> {
        self.log(
            "user_removed",
            serde_json::json!({ "id": id, "removed": removed }),
        )
    }

    pub fn search(&mut self, query: &str, hits: usize) -> Result<()> {
        self.log(
            "search",
            serde_json::json!({ "query": query, "hits": hits }),
        )
    }

    pub fn validation_failed(&mut self, action: &str, validation: &Validation) -> Result<()> {
        self.log(
            "validation_failed",
            serde_json::json!({
                "action": action,
                "name_error": validation.name_error.map(|e| e.message()),
                "email_error": validation.email_error.map(|e| e.message()),
            }),
        )
    }
}
