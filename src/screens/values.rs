//! Recording and amending indicator values.
//!
//! Two variants of the same workflow: admins pick the department and
//! indicator explicitly; team members are scoped to the department in
//! their session, so only the indicator picker shows. Amending carries a
//! date and targets an existing entry, recording appends a new one.
//!
//! Each attempt walks a fixed state machine:
//! `Idle -> Validating -> Submitting -> (Success | Failed)`, where
//! validation gates on an indicator being selected and the value being
//! non-empty. A validation failure issues no network call. A failed
//! submission surfaces the error and returns the attempt to `Idle`; it is
//! never retried automatically. A successful submission refetches the
//! department's indicator list so displayed names and targets stay current.

use crate::api::Backend;
use crate::cli::Context;
use crate::model::{Indicator, NewValue, Role, ValueUpdate};
use crate::screens::{prompt, prompt_or};
use crate::session::Session;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use rustyline::DefaultEditor;

/// States of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

/// Who is submitting, and for which department.
#[derive(Debug, Clone)]
pub enum Scope {
    /// Admin picked the department explicitly.
    Admin { user_id: String, department: String },
    /// Team member; department comes from the session, the backend scopes
    /// the write to their user id.
    TeamMember { user_id: String, department: String },
}

impl Scope {
    pub fn department(&self) -> &str {
        match self {
            Self::Admin { department, .. } => department,
            Self::TeamMember { department, .. } => department,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            Self::Admin { user_id, .. } => user_id,
            Self::TeamMember { user_id, .. } => user_id,
        }
    }
}

/// Form state for one attempt. The value stays an untyped string; the
/// backend parses and validates it.
#[derive(Debug, Clone, Default)]
pub struct ValueForm {
    pub indicator: Option<String>,
    pub value: String,
    /// Present only when amending a historical entry.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Gating failed; no network call was issued.
    Invalid(String),
    /// The write landed; carries the refetched indicator list.
    Submitted {
        message: String,
        indicators: Vec<Indicator>,
    },
    Failed(String),
}

/// One submission attempt. Holds the state so callers (and tests) can
/// observe where an attempt ended up.
#[derive(Debug)]
pub struct Submission {
    pub state: SubmitState,
}

impl Default for Submission {
    fn default() -> Self {
        Self::new()
    }
}

impl Submission {
    pub fn new() -> Self {
        Self {
            state: SubmitState::Idle,
        }
    }

    /// Drive one attempt through the state machine.
    pub fn run(&mut self, backend: &dyn Backend, scope: &Scope, form: &ValueForm) -> Outcome {
        self.state = SubmitState::Validating;

        let indicator = match &form.indicator {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => {
                self.state = SubmitState::Idle;
                return Outcome::Invalid("Please select an indicator".to_string());
            }
        };
        if form.value.trim().is_empty() {
            self.state = SubmitState::Idle;
            return Outcome::Invalid("Please enter a value".to_string());
        }

        self.state = SubmitState::Submitting;
        let department = scope.department().to_string();

        let result = match (&form.date, scope) {
            (Some(date), _) => {
                backend.update_value(
                    scope.user_id(),
                    &ValueUpdate {
                        department_name: department.clone(),
                        indicator_name: indicator,
                        date: *date,
                        value: form.value.trim().to_string(),
                    },
                )
            }
            (None, Scope::Admin { .. }) => backend.set_value(&NewValue {
                department_name: department.clone(),
                indicator_name: indicator,
                value: form.value.trim().to_string(),
            }),
            (None, Scope::TeamMember { user_id, .. }) => backend.set_team_member_value(
                user_id,
                &NewValue {
                    department_name: department.clone(),
                    indicator_name: indicator,
                    value: form.value.trim().to_string(),
                },
            ),
        };

        match result {
            Ok(message) => {
                self.state = SubmitState::Success;
                // Keep displayed targets/names current; no optimistic update.
                let indicators = backend
                    .indicators_by_department_name(&department)
                    .unwrap_or_default();
                Outcome::Submitted {
                    message: message.unwrap_or_else(|| "Value saved".to_string()),
                    indicators,
                }
            }
            Err(err) => {
                self.state = SubmitState::Failed;
                let outcome = Outcome::Failed(err.to_string());
                // Surfaced to the user; the attempt goes back to idle so
                // they can correct input and resubmit.
                self.state = SubmitState::Idle;
                outcome
            }
        }
    }
}

/// Resolve the submission scope from the session. Admins must pick a
/// department; team members use the one recorded at login.
fn scope_for(
    ctx: &Context,
    rl: &mut DefaultEditor,
    session: &Session,
) -> Result<Option<Scope>> {
    match session.role {
        Role::Admin => {
            let departments = match ctx.api.all_departments() {
                Ok(d) => d,
                Err(err) => {
                    println!("Error: {}", err);
                    return Ok(None);
                }
            };
            if departments.is_empty() {
                println!("No departments yet. Create one with /departments add <name>.");
                return Ok(None);
            }
            println!("Departments:");
            for (i, dept) in departments.iter().enumerate() {
                println!("  [{}] {}", i + 1, dept.name);
            }
            let choice = prompt(rl, "Department #")?;
            match choice.parse::<usize>() {
                Ok(n) if n >= 1 && n <= departments.len() => Ok(Some(Scope::Admin {
                    user_id: session.user_id.clone(),
                    department: departments[n - 1].name.clone(),
                })),
                _ => {
                    println!("Error: Please pick a department from the list");
                    Ok(None)
                }
            }
        }
        _ => match &session.department {
            Some(department) => Ok(Some(Scope::TeamMember {
                user_id: session.user_id.clone(),
                department: department.clone(),
            })),
            None => {
                println!("Your account has no department assigned. Ask an administrator.");
                Ok(None)
            }
        },
    }
}

/// Show the department's indicators and let the user pick one by number.
/// Returns `None` without erroring when nothing was picked; validation
/// reports that case.
fn pick_indicator(
    ctx: &Context,
    rl: &mut DefaultEditor,
    department: &str,
) -> Result<Option<String>> {
    let indicators = match ctx.api.indicators_by_department_name(department) {
        Ok(i) => i,
        Err(err) => {
            println!("Error: {}", err);
            return Ok(None);
        }
    };
    if indicators.is_empty() {
        println!("No indicators in {} yet.", department);
        return Ok(None);
    }
    println!("Indicators in {}:", department);
    for (i, ind) in indicators.iter().enumerate() {
        println!(
            "  [{}] {} (target {}/week)",
            i + 1,
            ind.name,
            ind.target_per_week
        );
    }
    let choice = prompt(rl, "Indicator #")?;
    Ok(choice
        .parse::<usize>()
        .ok()
        .filter(|n| *n >= 1 && *n <= indicators.len())
        .map(|n| indicators[n - 1].name.clone()))
}

fn report(ctx: &Context, scope: &Scope, form: &ValueForm, outcome: &Outcome) {
    match outcome {
        Outcome::Invalid(message) => println!("Error: {}", message),
        Outcome::Failed(message) => {
            println!("Error: {}", message);
            let _ = ctx.transcript.borrow_mut().value_submitted(
                scope.department(),
                form.indicator.as_deref().unwrap_or(""),
                false,
            );
        }
        Outcome::Submitted {
            message,
            indicators,
        } => {
            println!("Success: {}", message);
            let _ = ctx.transcript.borrow_mut().value_submitted(
                scope.department(),
                form.indicator.as_deref().unwrap_or(""),
                true,
            );
            if !indicators.is_empty() {
                println!("Current indicators for {}:", scope.department());
                for ind in indicators {
                    println!("  {} (target {}/week)", ind.name, ind.target_per_week);
                }
            }
        }
    }
}

/// The add-value screen.
pub fn add_screen(ctx: &Context, rl: &mut DefaultEditor, session: &Session) -> Result<()> {
    let Some(scope) = scope_for(ctx, rl, session)? else {
        return Ok(());
    };
    let indicator = pick_indicator(ctx, rl, scope.department())?;
    let value = prompt(rl, "Value")?;

    let form = ValueForm {
        indicator,
        value,
        date: None,
    };
    let outcome = Submission::new().run(ctx.api.as_ref(), &scope, &form);
    report(ctx, &scope, &form, &outcome);
    Ok(())
}

/// The update-value screen; adds the date prompt (default today) and shows
/// the backend's stated retention window.
pub fn update_screen(ctx: &Context, rl: &mut DefaultEditor, session: &Session) -> Result<()> {
    println!("Note: the server keeps only the last 5 weeks of values.");
    let Some(scope) = scope_for(ctx, rl, session)? else {
        return Ok(());
    };
    let indicator = pick_indicator(ctx, rl, scope.department())?;
    let value = prompt(rl, "Value")?;
    let today = Local::now().date_naive();
    let date_input = prompt_or(rl, "Date (YYYY-MM-DD)", &today.format("%Y-%m-%d").to_string())?;
    let date = match NaiveDate::parse_from_str(&date_input, "%Y-%m-%d") {
        Ok(d) => d,
        Err(_) => {
            println!("Error: Invalid date '{}', expected YYYY-MM-DD", date_input);
            return Ok(());
        }
    };

    let form = ValueForm {
        indicator,
        value,
        date: Some(date),
    };
    let outcome = Submission::new().run(ctx.api.as_ref(), &scope, &form);
    report(ctx, &scope, &form, &outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockBackend;

    fn admin_scope() -> Scope {
        Scope::Admin {
            user_id: "1".to_string(),
            department: "Packaging".to_string(),
        }
    }

    fn seeded_backend() -> MockBackend {
        let backend = MockBackend::new();
        let dept = backend.seed_department("Packaging");
        backend.seed_indicator(dept, "Defect Rate", 5.0);
        backend
    }

    #[test]
    fn test_missing_indicator_issues_no_network_call() {
        let backend = seeded_backend();
        let form = ValueForm {
            indicator: None,
            value: "3".to_string(),
            date: None,
        };
        let mut submission = Submission::new();
        let outcome = submission.run(&backend, &admin_scope(), &form);
        assert!(matches!(outcome, Outcome::Invalid(_)));
        assert_eq!(submission.state, SubmitState::Idle);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_empty_value_issues_no_network_call() {
        let backend = seeded_backend();
        let form = ValueForm {
            indicator: Some("Defect Rate".to_string()),
            value: "   ".to_string(),
            date: None,
        };
        let outcome = Submission::new().run(&backend, &admin_scope(), &form);
        assert!(matches!(outcome, Outcome::Invalid(_)));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_admin_add_posts_and_refetches() {
        let backend = seeded_backend();
        let form = ValueForm {
            indicator: Some("Defect Rate".to_string()),
            value: "3".to_string(),
            date: None,
        };
        let mut submission = Submission::new();
        let outcome = submission.run(&backend, &admin_scope(), &form);
        match outcome {
            Outcome::Submitted { indicators, .. } => {
                assert_eq!(indicators.len(), 1);
                assert_eq!(indicators[0].name, "Defect Rate");
            }
            other => panic!("expected Submitted, got {:?}", other),
        }
        assert_eq!(submission.state, SubmitState::Success);
        assert_eq!(backend.call_count("set_value"), 1);
        assert_eq!(backend.call_count("indicators_by_department_name"), 1);
    }

    #[test]
    fn test_team_member_add_uses_scoped_endpoint() {
        let backend = seeded_backend();
        let scope = Scope::TeamMember {
            user_id: "42".to_string(),
            department: "Packaging".to_string(),
        };
        let form = ValueForm {
            indicator: Some("Defect Rate".to_string()),
            value: "2".to_string(),
            date: None,
        };
        let outcome = Submission::new().run(&backend, &scope, &form);
        assert!(matches!(outcome, Outcome::Submitted { .. }));
        assert_eq!(backend.call_count("set_team_member_value"), 1);
        assert_eq!(backend.call_count("set_value"), 0);
    }

    #[test]
    fn test_update_variant_carries_date() {
        let backend = seeded_backend();
        let scope = Scope::TeamMember {
            user_id: "42".to_string(),
            department: "Packaging".to_string(),
        };
        let form = ValueForm {
            indicator: Some("Defect Rate".to_string()),
            value: "4".to_string(),
            date: Some(NaiveDate::from_ymd_opt(2026, 8, 17).unwrap()),
        };
        let outcome = Submission::new().run(&backend, &scope, &form);
        assert!(matches!(outcome, Outcome::Submitted { .. }));
        assert_eq!(backend.call_count("update_value"), 1);
        let values = backend.values.borrow();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].2, NaiveDate::from_ymd_opt(2026, 8, 17).unwrap());
    }

    #[test]
    fn test_failure_returns_to_idle_without_retry() {
        let backend = seeded_backend();
        *backend.fail_next.borrow_mut() = Some(crate::api::ApiError::Status {
            code: 500,
            message: "boom".to_string(),
        });
        let form = ValueForm {
            indicator: Some("Defect Rate".to_string()),
            value: "3".to_string(),
            date: None,
        };
        let mut submission = Submission::new();
        let outcome = submission.run(&backend, &admin_scope(), &form);
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(submission.state, SubmitState::Idle);
        // Exactly one attempt, no automatic retry, no refetch after failure.
        assert_eq!(backend.call_count("set_value"), 1);
        assert_eq!(backend.call_count("indicators_by_department_name"), 0);
    }
}
