//! User administration and the profile screen.

use crate::api::Backend;
use crate::cli::Context;
use crate::model::{NewUser, ProfileUpdate, Role};
use crate::screens::{prompt, prompt_or, MutationOutcome};
use crate::session::Session;
use anyhow::Result;
use rustyline::DefaultEditor;

pub fn create(backend: &dyn Backend, user: NewUser) -> MutationOutcome {
    if user.first_name.trim().is_empty()
        || user.last_name.trim().is_empty()
        || user.email.trim().is_empty()
        || user.password.is_empty()
    {
        return MutationOutcome::Rejected("All fields are required".to_string());
    }
    MutationOutcome::from_api(backend.create_user(&user), "User created")
}

pub fn update_profile(
    backend: &dyn Backend,
    id: u64,
    update: ProfileUpdate,
) -> MutationOutcome {
    if update.first_name.trim().is_empty()
        || update.last_name.trim().is_empty()
        || update.email.trim().is_empty()
    {
        return MutationOutcome::Rejected("All fields are required".to_string());
    }
    MutationOutcome::from_api(backend.update_user_profile(id, &update), "Profile updated")
}

/// The users list screen.
pub fn list_screen(ctx: &Context) -> Result<()> {
    match ctx.api.all_users() {
        Ok(users) if users.is_empty() => println!("No users."),
        Ok(users) => {
            println!(
                "{:>5}  {:<25}  {:<30}  {:<12}  {}",
                "id", "name", "email", "role", "department"
            );
            for user in users {
                println!(
                    "{:>5}  {:<25}  {:<30}  {:<12}  {}",
                    user.id,
                    user.full_name(),
                    user.email,
                    user.role,
                    user.department.as_deref().unwrap_or("-")
                );
            }
        }
        Err(err) => println!("Error: {}", err),
    }
    Ok(())
}

/// The create-account form.
pub fn create_screen(ctx: &Context, rl: &mut DefaultEditor) -> Result<()> {
    let first_name = prompt(rl, "First name")?;
    let last_name = prompt(rl, "Last name")?;
    let email = prompt(rl, "Email")?;
    let password = prompt(rl, "Password")?;
    let registration_number = prompt(rl, "Registration number")?;
    let role_input = prompt_or(rl, "Role (ADMIN/TEAM_MEMBER/VIEWER)", "TEAM_MEMBER")?;
    let Some(role) = Role::parse(&role_input) else {
        println!("Error: Unknown role '{}'", role_input);
        return Ok(());
    };
    let department = prompt(rl, "Department (blank for none)")?;

    let outcome = create(
        ctx.api.as_ref(),
        NewUser {
            first_name,
            last_name,
            email,
            password,
            role,
            registration_number,
            department: if department.is_empty() {
                None
            } else {
                Some(department)
            },
        },
    );
    let _ = ctx
        .transcript
        .borrow_mut()
        .mutation("user", "create", outcome.is_applied());
    outcome.report();
    if outcome.is_applied() {
        list_screen(ctx)?;
    }
    Ok(())
}

/// The profile screen: show the signed-in user's record and offer an edit.
pub fn profile_screen(ctx: &Context, rl: &mut DefaultEditor, session: &Session) -> Result<()> {
    let users = match ctx.api.all_users() {
        Ok(users) => users,
        Err(err) => {
            println!("Error: {}", err);
            return Ok(());
        }
    };
    let me = users
        .iter()
        .find(|u| u.id.to_string() == session.user_id);
    let Some(me) = me else {
        println!("Could not find your account on the server.");
        return Ok(());
    };

    println!("Name:       {}", me.full_name());
    println!("Email:      {}", me.email);
    println!("Role:       {}", me.role);
    if let Some(reg) = &me.registration_number {
        println!("Reg. no:    {}", reg);
    }
    println!(
        "Department: {}",
        me.department.as_deref().unwrap_or("(none)")
    );

    let answer = rl.readline("Edit profile? [y/N]: ")?;
    if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
        return Ok(());
    }

    let first_name = prompt_or(rl, "First name", &me.first_name)?;
    let last_name = prompt_or(rl, "Last name", &me.last_name)?;
    let email = prompt_or(rl, "Email", &me.email)?;
    let outcome = update_profile(
        ctx.api.as_ref(),
        me.id,
        ProfileUpdate {
            first_name,
            last_name,
            email,
        },
    );
    let _ = ctx
        .transcript
        .borrow_mut()
        .mutation("user", "update_profile", outcome.is_applied());
    outcome.report();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockBackend;

    fn new_user() -> NewUser {
        NewUser {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "pw".to_string(),
            role: Role::TeamMember,
            registration_number: "R-100".to_string(),
            department: Some("Packaging".to_string()),
        }
    }

    #[test]
    fn test_create_requires_all_fields() {
        let backend = MockBackend::new();
        let mut user = new_user();
        user.email = String::new();
        let outcome = create(&backend, user);
        assert!(matches!(outcome, MutationOutcome::Rejected(_)));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_create_then_list_reflects_change() {
        let backend = MockBackend::new();
        assert!(create(&backend, new_user()).is_applied());
        let users = backend.all_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "ada@example.com");
        assert_eq!(users[0].role, Role::TeamMember);
    }

    #[test]
    fn test_update_profile_round_trip() {
        let backend = MockBackend::new();
        create(&backend, new_user());
        let id = backend.all_users().unwrap()[0].id;
        let outcome = update_profile(
            &backend,
            id,
            ProfileUpdate {
                first_name: "Augusta".to_string(),
                last_name: "King".to_string(),
                email: "ada@example.com".to_string(),
            },
        );
        assert!(outcome.is_applied());
        assert_eq!(backend.all_users().unwrap()[0].full_name(), "Augusta King");
    }

    #[test]
    fn test_update_profile_unknown_user_rejected() {
        let backend = MockBackend::new();
        let outcome = update_profile(
            &backend,
            404,
            ProfileUpdate {
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                email: "c@d.e".to_string(),
            },
        );
        assert!(matches!(outcome, MutationOutcome::Rejected(_)));
    }
}
