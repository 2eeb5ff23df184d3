//! Append-only JSONL log of session activity.
//!
//! One file per REPL session under `~/.tally/logs/`. Logging never fails a
//! user-facing operation; callers ignore the result.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

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

    pub fn login_ok(&mut self, email: &str, role: &str) -> Result<()> {
        self.log("login_ok", serde_json::json!({ "email": email, "role": role }))
    }

    pub fn login_err(&mut self, email: &str, error: &str) -> Result<()> {
        self.log(
            "login_err",
            serde_json::json!({ "email": email, "error": error }),
        )
    }

    pub fn logout(&mut self) -> Result<()> {
        self.log("logout", serde_json::json!({}))
    }

    pub fn screen_opened(&mut self, screen: &str) -> Result<()> {
        self.log("screen_opened", serde_json::json!({ "screen": screen }))
    }

    pub fn screen_denied(&mut self, screen: &str, role: &str) -> Result<()> {
        self.log(
            "screen_denied",
            serde_json::json!({ "screen": screen, "role": role }),
        )
    }

    pub fn value_submitted(&mut self, department: &str, indicator: &str, ok: bool) -> Result<()> {
        self.log(
            "value_submitted",
            serde_json::json!({
                "department": department,
                "indicator": indicator,
                "ok": ok,
            }),
        )
    }

    pub fn mutation(&mut self, entity: &str, action: &str, ok: bool) -> Result<()> {
        self.log(
            "mutation",
            serde_json::json!({
                "entity": entity,
                "action": action,
                "ok": ok,
            }),
        )
    }

    pub fn chat_prompt(&mut self, prompt: &str) -> Result<()> {
        self.log("chat_prompt", serde_json::json!({ "prompt": prompt }))
    }

    pub fn chat_fallback(&mut self) -> Result<()> {
        self.log("chat_fallback", serde_json::json!({}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_append_as_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        let mut transcript = Transcript::new(&path, "s-1").unwrap();
        transcript.login_ok("a@b.c", "ADMIN").unwrap();
        transcript.screen_opened("/departments").unwrap();
        transcript.logout().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "login_ok");
        assert_eq!(first["session_id"], "s-1");
        assert_eq!(first["role"], "ADMIN");
    }
}
