//! Login, logout, and the password flows.

use crate::api::{ApiResult, Backend};
use crate::cli::Context;
use crate::model::{PasswordChange, PasswordReset, Role};
use crate::screens::{prompt, MutationOutcome};
use crate::session::{Session, SessionStore};
use anyhow::Result;
use rustyline::DefaultEditor;

/// Attempt a login and persist the session on success. Nothing is written
/// on failure, so a rejected login leaves the device signed out.
pub fn login(
    backend: &dyn Backend,
    store: &SessionStore,
    email: &str,
    password: &str,
) -> Result<ApiResult<Session>> {
    let response = match backend.login(email, password) {
        Ok(r) => r,
        Err(err) => return Ok(Err(err)),
    };

    let role = Role::parse(&response.role).ok_or_else(|| {
        anyhow::anyhow!("server sent unknown role '{}'", response.role)
    })?;
    let session = Session {
        token: response.token,
        user_id: response.id.to_string(),
        role,
        department: response.department,
    };
    store.save(&session)?;
    backend.set_token(Some(session.token.clone()));
    Ok(Ok(session))
}

/// Clear the persisted session. A failed delete still signs the user out
/// from the client's point of view.
pub fn logout(backend: &dyn Backend, store: &SessionStore) -> Result<()> {
    backend.set_token(None);
    store.clear()
}

/// Change password, checking the confirmation client-side before any
/// network call goes out.
pub fn change_password(
    backend: &dyn Backend,
    user_id: &str,
    old: &str,
    new: &str,
    confirm: &str,
) -> MutationOutcome {
    if new.is_empty() || old.is_empty() {
        return MutationOutcome::Rejected("All fields are required".to_string());
    }
    if new != confirm {
        return MutationOutcome::Rejected("Passwords do not match".to_string());
    }
    MutationOutcome::from_api(
        backend.update_password(
            user_id,
            &PasswordChange {
                old_password: old.to_string(),
                new_password: new.to_string(),
                confirm_password: confirm.to_string(),
            },
        ),
        "Password changed",
    )
}

/// Step two of the forgot-password flow; step one is
/// [`Backend::request_password_reset`]. Same client-side equality check as
/// [`change_password`].
pub fn reset_password(
    backend: &dyn Backend,
    email: &str,
    code: &str,
    new: &str,
    confirm: &str,
) -> MutationOutcome {
    if code.is_empty() || new.is_empty() {
        return MutationOutcome::Rejected("All fields are required".to_string());
    }
    if new != confirm {
        return MutationOutcome::Rejected("Passwords do not match".to_string());
    }
    MutationOutcome::from_api(
        backend.reset_password(&PasswordReset {
            email: email.to_string(),
            code: code.to_string(),
            new_password: new.to_string(),
            confirm_password: confirm.to_string(),
        }),
        "Password reset",
    )
}

pub fn login_screen(ctx: &Context, rl: &mut DefaultEditor) -> Result<()> {
    let email = prompt(rl, "Email")?;
    let password = prompt(rl, "Password")?;
    if email.is_empty() || password.is_empty() {
        println!("Error: Email and password are required");
        return Ok(());
    }
    match login(ctx.api.as_ref(), &ctx.store, &email, &password)? {
        Ok(session) => {
            let _ = ctx
                .transcript
                .borrow_mut()
                .login_ok(&email, session.role.as_str());
            println!("Signed in as {} ({})", email, session.role);
            println!("Type /help to see what you can do.");
        }
        Err(err) => {
            let _ = ctx
                .transcript
                .borrow_mut()
                .login_err(&email, err.message());
            println!("Error: {}", err);
        }
    }
    Ok(())
}

pub fn change_password_screen(
    ctx: &Context,
    rl: &mut DefaultEditor,
    session: &Session,
) -> Result<()> {
    let old = prompt(rl, "Current password")?;
    let new = prompt(rl, "New password")?;
    let confirm = prompt(rl, "Confirm new password")?;
    let outcome = change_password(ctx.api.as_ref(), &session.user_id, &old, &new, &confirm);
    let _ = ctx
        .transcript
        .borrow_mut()
        .mutation("password", "change", outcome.is_applied());
    outcome.report();
    if outcome.is_applied() {
        // Mirrors the original's navigate-back-to-profile on success.
        println!("Back to profile: /profile");
    }
    Ok(())
}

/// Two-step forgot-password flow, available while signed out.
pub fn forgot_password_screen(ctx: &Context, rl: &mut DefaultEditor) -> Result<()> {
    let email = prompt(rl, "Account email")?;
    if email.is_empty() {
        println!("Error: Email is required");
        return Ok(());
    }
    match ctx.api.request_password_reset(&email) {
        Ok(message) => println!(
            "{}",
            message.unwrap_or_else(|| "Check your email for a reset code".to_string())
        ),
        Err(err) => {
            println!("Error: {}", err);
            return Ok(());
        }
    }

    let code = prompt(rl, "Reset code")?;
    let new = prompt(rl, "New password")?;
    let confirm = prompt(rl, "Confirm new password")?;
    let outcome = reset_password(ctx.api.as_ref(), &email, &code, &new, &confirm);
    let _ = ctx
        .transcript
        .borrow_mut()
        .mutation("password", "reset", outcome.is_applied());
    outcome.report();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockBackend;
    use crate::model::LoginResponse;

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.toml"));
        (dir, store)
    }

    fn backend_with_account() -> MockBackend {
        MockBackend::with_account(
            "admin@example.com",
            "hunter2",
            LoginResponse {
                token: "tok-1".to_string(),
                id: 7,
                role: "ADMIN".to_string(),
                department: None,
            },
        )
    }

    #[test]
    fn test_login_success_persists_session() {
        let (_dir, store) = store();
        let backend = backend_with_account();
        let session = login(&backend, &store, "admin@example.com", "hunter2")
            .unwrap()
            .unwrap();
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.user_id, "7");
        let persisted = store.load().unwrap().unwrap();
        assert_eq!(persisted, session);
        assert_eq!(backend.token.borrow().as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_login_failure_writes_nothing() {
        let (_dir, store) = store();
        let backend = backend_with_account();
        let result = login(&backend, &store, "admin@example.com", "wrong").unwrap();
        assert!(result.is_err());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_login_normalizes_role_case() {
        let (_dir, store) = store();
        let backend = MockBackend::with_account(
            "tm@example.com",
            "pw",
            LoginResponse {
                token: "t".to_string(),
                id: 2,
                role: "team_member".to_string(),
                department: Some("Packaging".to_string()),
            },
        );
        let session = login(&backend, &store, "tm@example.com", "pw")
            .unwrap()
            .unwrap();
        assert_eq!(session.role, Role::TeamMember);
        assert_eq!(session.department.as_deref(), Some("Packaging"));
    }

    #[test]
    fn test_logout_clears_session_and_token() {
        let (_dir, store) = store();
        let backend = backend_with_account();
        login(&backend, &store, "admin@example.com", "hunter2")
            .unwrap()
            .unwrap();
        logout(&backend, &store).unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(backend.token.borrow().is_none());
    }

    #[test]
    fn test_change_password_mismatch_skips_network() {
        let backend = MockBackend::new();
        let outcome = change_password(&backend, "7", "old", "new1", "new2");
        assert!(matches!(outcome, MutationOutcome::Rejected(_)));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_change_password_match_sends_put() {
        let backend = MockBackend::new();
        let outcome = change_password(&backend, "7", "old", "new", "new");
        assert!(outcome.is_applied());
        assert_eq!(backend.call_count("update_password"), 1);
    }

    #[test]
    fn test_reset_password_mismatch_skips_network() {
        let backend = MockBackend::new();
        let outcome = reset_password(&backend, "a@b.c", "1234", "new1", "new2");
        assert!(matches!(outcome, MutationOutcome::Rejected(_)));
        assert!(backend.calls().is_empty());
    }
}
