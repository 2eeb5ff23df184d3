//! Indicator management, plus the action-item and waste-reason lists that
//! live on the same management screen.
//!
//! Same contract as the other list screens: mutate, then refetch from the
//! server. Deletes confirm first.

use crate::api::Backend;
use crate::cli::Context;
use crate::model::{IndicatorUpdate, NewIndicator};
use crate::screens::{confirm, prompt, MutationOutcome};
use anyhow::Result;
use rustyline::DefaultEditor;

pub fn create(
    backend: &dyn Backend,
    name: &str,
    department_name: &str,
    target: &str,
) -> MutationOutcome {
    if name.trim().is_empty() || department_name.trim().is_empty() {
        return MutationOutcome::Rejected("Name and department are required".to_string());
    }
    let Ok(target_per_week) = target.trim().parse::<f64>() else {
        return MutationOutcome::Rejected(format!("Target must be numeric, got '{}'", target));
    };
    MutationOutcome::from_api(
        backend.create_indicator(&NewIndicator {
            name: name.trim().to_string(),
            target_per_week,
            department_name: department_name.trim().to_string(),
        }),
        "Indicator created",
    )
}

pub fn update(backend: &dyn Backend, id: u64, name: &str, target: &str) -> MutationOutcome {
    if name.trim().is_empty() {
        return MutationOutcome::Rejected("Indicator name is required".to_string());
    }
    let Ok(target_per_week) = target.trim().parse::<f64>() else {
        return MutationOutcome::Rejected(format!("Target must be numeric, got '{}'", target));
    };
    MutationOutcome::from_api(
        backend.update_indicator(
            id,
            &IndicatorUpdate {
                name: name.trim().to_string(),
                target_per_week,
            },
        ),
        "Indicator updated",
    )
}

pub fn delete(backend: &dyn Backend, id: u64) -> MutationOutcome {
    MutationOutcome::from_api(backend.delete_indicator(id), "Indicator deleted")
}

/// The create-indicator screen: a standalone form in the original app.
pub fn create_screen(ctx: &Context, rl: &mut DefaultEditor) -> Result<()> {
    let departments = match ctx.api.all_department_names() {
        Ok(names) => names,
        Err(err) => {
            println!("Error: {}", err);
            return Ok(());
        }
    };
    if departments.is_empty() {
        println!("No departments yet. Create one with /departments add <name>.");
        return Ok(());
    }
    println!("Departments: {}", departments.join(", "));
    let department = prompt(rl, "Department")?;
    let name = prompt(rl, "Indicator name")?;
    let target = prompt(rl, "Target per week")?;

    let outcome = create(ctx.api.as_ref(), &name, &department, &target);
    let _ = ctx
        .transcript
        .borrow_mut()
        .mutation("indicator", "create", outcome.is_applied());
    outcome.report();
    Ok(())
}

fn list_for_department(ctx: &Context, rl: &mut DefaultEditor) -> Result<()> {
    let departments = match ctx.api.all_departments() {
        Ok(d) => d,
        Err(err) => {
            println!("Error: {}", err);
            return Ok(());
        }
    };
    if departments.is_empty() {
        println!("No departments.");
        return Ok(());
    }
    println!("Departments:");
    for (i, dept) in departments.iter().enumerate() {
        println!("  [{}] {}", i + 1, dept.name);
    }
    let choice = prompt(rl, "Department #")?;
    let Some(dept) = choice
        .parse::<usize>()
        .ok()
        .filter(|n| *n >= 1 && *n <= departments.len())
        .map(|n| &departments[n - 1])
    else {
        println!("Error: Please pick a department from the list");
        return Ok(());
    };
    match ctx.api.indicators_by_department(dept.id) {
        Ok(indicators) => {
            if indicators.is_empty() {
                println!("No indicators in {}.", dept.name);
            } else {
                println!("{:>5}  {:<30}  {}", "id", "name", "target/week");
                for ind in indicators {
                    println!("{:>5}  {:<30}  {}", ind.id, ind.name, ind.target_per_week);
                }
            }
        }
        Err(err) => println!("Error: {}", err),
    }
    Ok(())
}

fn actions_screen(ctx: &Context, rl: &mut DefaultEditor, args: &str) -> Result<()> {
    let parts: Vec<&str> = args.splitn(2, ' ').collect();
    match parts.first().copied().unwrap_or("") {
        "" | "list" => {
            match ctx.api.action_items() {
                Ok(items) if items.is_empty() => println!("No action items."),
                Ok(items) => {
                    for item in items {
                        println!("{:>5}  {}", item.id, item.description);
                    }
                }
                Err(err) => println!("Error: {}", err),
            }
            Ok(())
        }
        "edit" => {
            let rest = parts.get(1).copied().unwrap_or("");
            let (id_str, text) = rest.split_once(' ').unwrap_or((rest, ""));
            let id = match id_str.parse::<u64>() {
                Ok(id) if !text.trim().is_empty() => id,
                _ => {
                    println!("Usage: /indicators actions edit <id> <description>");
                    return Ok(());
                }
            };
            let outcome = MutationOutcome::from_api(
                ctx.api.update_action_item(id, text.trim()),
                "Action item updated",
            );
            let _ = ctx
                .transcript
                .borrow_mut()
                .mutation("action_item", "update", outcome.is_applied());
            outcome.report();
            Ok(())
        }
        "delete" => {
            let Ok(id) = parts.get(1).copied().unwrap_or("").trim().parse::<u64>() else {
                println!("Usage: /indicators actions delete <id>");
                return Ok(());
            };
            if !confirm(rl, &format!("Delete action item {}?", id))? {
                println!("Cancelled.");
                return Ok(());
            }
            let outcome = MutationOutcome::from_api(
                ctx.api.delete_action_item(id),
                "Action item deleted",
            );
            let _ = ctx
                .transcript
                .borrow_mut()
                .mutation("action_item", "delete", outcome.is_applied());
            outcome.report();
            Ok(())
        }
        _ => {
            println!("Usage: /indicators actions [list | edit <id> <text> | delete <id>]");
            Ok(())
        }
    }
}

fn waste_screen(ctx: &Context, rl: &mut DefaultEditor, args: &str) -> Result<()> {
    let parts: Vec<&str> = args.splitn(2, ' ').collect();
    match parts.first().copied().unwrap_or("") {
        "" | "list" => {
            match ctx.api.waste_reasons() {
                Ok(reasons) if reasons.is_empty() => println!("No waste reasons."),
                Ok(reasons) => {
                    for item in reasons {
                        println!("{:>5}  {}", item.id, item.reason);
                    }
                }
                Err(err) => println!("Error: {}", err),
            }
            Ok(())
        }
        "edit" => {
            let rest = parts.get(1).copied().unwrap_or("");
            let (id_str, text) = rest.split_once(' ').unwrap_or((rest, ""));
            let id = match id_str.parse::<u64>() {
                Ok(id) if !text.trim().is_empty() => id,
                _ => {
                    println!("Usage: /indicators waste edit <id> <reason>");
                    return Ok(());
                }
            };
            let outcome = MutationOutcome::from_api(
                ctx.api.update_waste_reason(id, text.trim()),
                "Waste reason updated",
            );
            let _ = ctx
                .transcript
                .borrow_mut()
                .mutation("waste_reason", "update", outcome.is_applied());
            outcome.report();
            Ok(())
        }
        "delete" => {
            let Ok(id) = parts.get(1).copied().unwrap_or("").trim().parse::<u64>() else {
                println!("Usage: /indicators waste delete <id>");
                return Ok(());
            };
            if !confirm(rl, &format!("Delete waste reason {}?", id))? {
                println!("Cancelled.");
                return Ok(());
            }
            let outcome = MutationOutcome::from_api(
                ctx.api.delete_waste_reason(id),
                "Waste reason deleted",
            );
            let _ = ctx
                .transcript
                .borrow_mut()
                .mutation("waste_reason", "delete", outcome.is_applied());
            outcome.report();
            Ok(())
        }
        _ => {
            println!("Usage: /indicators waste [list | edit <id> <text> | delete <id>]");
            Ok(())
        }
    }
}

/// The indicator-management screen. `args` is everything after
/// `/indicators`.
pub fn screen(ctx: &Context, rl: &mut DefaultEditor, args: &str) -> Result<()> {
    let parts: Vec<&str> = args.splitn(2, ' ').collect();
    match parts.first().copied().unwrap_or("") {
        "" | "list" => list_for_department(ctx, rl),
        "edit" => {
            let rest = parts.get(1).copied().unwrap_or("");
            let mut fields = rest.splitn(3, ' ');
            let id_str = fields.next().unwrap_or("");
            let name = fields.next().unwrap_or("");
            let target = fields.next().unwrap_or("");
            let Ok(id) = id_str.parse::<u64>() else {
                println!("Usage: /indicators edit <id> <name> <target>");
                return Ok(());
            };
            let outcome = update(ctx.api.as_ref(), id, name, target);
            let _ = ctx
                .transcript
                .borrow_mut()
                .mutation("indicator", "update", outcome.is_applied());
            outcome.report();
            Ok(())
        }
        "delete" => {
            let Ok(id) = parts.get(1).copied().unwrap_or("").trim().parse::<u64>() else {
                println!("Usage: /indicators delete <id>");
                return Ok(());
            };
            if !confirm(rl, &format!("Delete indicator {}?", id))? {
                println!("Cancelled.");
                return Ok(());
            }
            let outcome = delete(ctx.api.as_ref(), id);
            let _ = ctx
                .transcript
                .borrow_mut()
                .mutation("indicator", "delete", outcome.is_applied());
            outcome.report();
            Ok(())
        }
        "actions" => actions_screen(ctx, rl, parts.get(1).copied().unwrap_or("")),
        "waste" => waste_screen(ctx, rl, parts.get(1).copied().unwrap_or("")),
        _ => {
            println!("Usage:");
            println!("  /indicators                        - list per department");
            println!("  /indicators edit <id> <name> <target>");
            println!("  /indicators delete <id>");
            println!("  /indicators actions [list|edit|delete]");
            println!("  /indicators waste [list|edit|delete]");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockBackend;

    #[test]
    fn test_create_rejects_non_numeric_target() {
        let backend = MockBackend::new();
        backend.seed_department("Packaging");
        let outcome = create(&backend, "Defect Rate", "Packaging", "five");
        assert!(matches!(outcome, MutationOutcome::Rejected(_)));
        assert_eq!(backend.call_count("create_indicator"), 0);
    }

    #[test]
    fn test_create_and_update() {
        let backend = MockBackend::new();
        backend.seed_department("Packaging");
        assert!(create(&backend, "Defect Rate", "Packaging", "5").is_applied());
        let id = backend.indicators.borrow()[0].id;
        assert!(update(&backend, id, "Defect Rate", "7.5").is_applied());
        assert_eq!(backend.indicators.borrow()[0].target_per_week, 7.5);
    }

    #[test]
    fn test_create_for_unknown_department_rejected() {
        let backend = MockBackend::new();
        let outcome = create(&backend, "Defect Rate", "Nowhere", "5");
        assert!(matches!(outcome, MutationOutcome::Rejected(_)));
    }

    #[test]
    fn test_delete_removes_from_list() {
        let backend = MockBackend::new();
        let dept = backend.seed_department("Packaging");
        let id = backend.seed_indicator(dept, "Defect Rate", 5.0);
        assert!(delete(&backend, id).is_applied());
        assert!(backend.indicators_by_department(dept).unwrap().is_empty());
    }
}
