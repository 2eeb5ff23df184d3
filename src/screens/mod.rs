//! The application's screens: one module per form or list surface.
//!
//! Each screen fetches what it needs, prompts for input, issues its REST
//! call through the [`Backend`](crate::api::Backend) trait, and reports a
//! one-line result. After any successful mutation the owning list is
//! refetched from the server; nothing is patched locally.

pub mod auth;
pub mod chat;
pub mod departments;
pub mod history;
pub mod indicators;
pub mod users;
pub mod values;

use crate::api::ApiError;
use anyhow::Result;
use rustyline::DefaultEditor;

/// Explicit result of a mutation, returned to the calling screen instead of
/// being wired back through callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied(String),
    Rejected(String),
}

impl MutationOutcome {
    /// Wrap a backend mutation result, substituting `fallback` when the
    /// server sent no message of its own.
    pub fn from_api(result: Result<Option<String>, ApiError>, fallback: &str) -> Self {
        match result {
            Ok(Some(message)) => Self::Applied(message),
            Ok(None) => Self::Applied(fallback.to_string()),
            Err(err) => Self::Rejected(err.to_string()),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn report(&self) {
        match self {
            Self::Applied(message) => println!("Success: {}", message),
            Self::Rejected(message) => println!("Error: {}", message),
        }
    }
}

/// Read one line of input, trimmed.
pub(crate) fn prompt(rl: &mut DefaultEditor, label: &str) -> Result<String> {
    let line = rl.readline(&format!("{}: ", label))?;
    Ok(line.trim().to_string())
}

/// Read one line, falling back to a default when the user just hits enter.
pub(crate) fn prompt_or(rl: &mut DefaultEditor, label: &str, default: &str) -> Result<String> {
    let line = rl.readline(&format!("{} [{}]: ", label, default))?;
    let line = line.trim();
    Ok(if line.is_empty() {
        default.to_string()
    } else {
        line.to_string()
    })
}

/// Two-option confirmation before destructive calls.
pub(crate) fn confirm(rl: &mut DefaultEditor, question: &str) -> Result<bool> {
    let answer = rl.readline(&format!("{} [y/N]: ", question))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_server_message() {
        let outcome = MutationOutcome::from_api(Ok(Some("Saved".to_string())), "Done");
        assert_eq!(outcome, MutationOutcome::Applied("Saved".to_string()));
    }

    #[test]
    fn test_outcome_fallback_message() {
        let outcome = MutationOutcome::from_api(Ok(None), "Done");
        assert_eq!(outcome, MutationOutcome::Applied("Done".to_string()));
    }

    #[test]
    fn test_outcome_from_error() {
        let outcome = MutationOutcome::from_api(
            Err(ApiError::Rejected("Name taken".to_string())),
            "Done",
        );
        assert_eq!(outcome, MutationOutcome::Rejected("Name taken".to_string()));
        assert!(!outcome.is_applied());
    }

    /// Admin walks the whole path: new department, new indicator, record a
    /// value, and the weekly history reports it for today.
    #[test]
    fn test_admin_end_to_end_scenario() {
        use crate::api::mock::MockBackend;
        use crate::api::Backend;
        use crate::screens::values::{Outcome, Scope, Submission, ValueForm};
        use chrono::{Datelike, Local};

        let backend = MockBackend::new();

        assert!(departments::create(&backend, "Packaging").is_applied());
        assert!(indicators::create(&backend, "Defect Rate", "Packaging", "5").is_applied());

        let scope = Scope::Admin {
            user_id: "1".to_string(),
            department: "Packaging".to_string(),
        };
        let form = ValueForm {
            indicator: Some("Defect Rate".to_string()),
            value: "3".to_string(),
            date: None,
        };
        let outcome = Submission::new().run(&backend, &scope, &form);
        assert!(matches!(outcome, Outcome::Submitted { .. }));

        let history = backend.weekly_history().unwrap();
        let packaging = history
            .iter()
            .find(|d| d.department == "Packaging")
            .expect("department in history");
        let defect_rate = packaging
            .indicators
            .iter()
            .find(|i| i.indicator == "Defect Rate")
            .expect("indicator in history");
        assert_eq!(defect_rate.target_per_week, 5.0);
        let today = Local::now().date_naive().weekday().to_string();
        assert!(defect_rate.weeks[0]
            .daily
            .iter()
            .any(|d| d.day == today && d.value == 3.0));
    }
}
