//! Department management: list, filter, create, rename, delete.
//!
//! Filtering is a client-side substring match over the already-fetched
//! list; it never refetches or paginates. Every successful mutation is
//! followed by a server refetch of the list.

use crate::api::Backend;
use crate::cli::Context;
use crate::model::Department;
use crate::screens::{confirm, MutationOutcome};
use anyhow::Result;
use rustyline::DefaultEditor;

/// Case-insensitive substring filter over the in-memory list.
pub fn filter<'a>(departments: &'a [Department], needle: &str) -> Vec<&'a Department> {
    let needle = needle.to_lowercase();
    departments
        .iter()
        .filter(|d| d.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn create(backend: &dyn Backend, name: &str) -> MutationOutcome {
    if name.trim().is_empty() {
        return MutationOutcome::Rejected("Department name is required".to_string());
    }
    MutationOutcome::from_api(backend.create_department(name.trim()), "Department created")
}

pub fn rename(backend: &dyn Backend, id: u64, name: &str) -> MutationOutcome {
    if name.trim().is_empty() {
        return MutationOutcome::Rejected("Department name is required".to_string());
    }
    MutationOutcome::from_api(
        backend.rename_department(id, name.trim()),
        "Department renamed",
    )
}

pub fn delete(backend: &dyn Backend, id: u64) -> MutationOutcome {
    MutationOutcome::from_api(backend.delete_department(id), "Department deleted")
}

fn render(departments: &[&Department]) {
    if departments.is_empty() {
        println!("No departments.");
        return;
    }
    println!("{:>5}  {}", "id", "name");
    for dept in departments {
        println!("{:>5}  {}", dept.id, dept.name);
    }
}

fn fetch_and_render(ctx: &Context, needle: Option<&str>) -> Result<()> {
    match ctx.api.all_departments() {
        Ok(departments) => {
            let shown: Vec<&Department> = match needle {
                Some(needle) => filter(&departments, needle),
                None => departments.iter().collect(),
            };
            render(&shown);
        }
        Err(err) => println!("Error: {}", err),
    }
    Ok(())
}

/// The departments screen. `args` is everything after `/departments`.
pub fn screen(ctx: &Context, rl: &mut DefaultEditor, args: &str) -> Result<()> {
    let parts: Vec<&str> = args.splitn(2, ' ').collect();
    match parts.first().copied().unwrap_or("") {
        "" | "list" => fetch_and_render(ctx, None),
        "find" => fetch_and_render(ctx, Some(parts.get(1).copied().unwrap_or(""))),
        "add" => {
            let name = parts.get(1).copied().unwrap_or("");
            let outcome = create(ctx.api.as_ref(), name);
            let _ = ctx
                .transcript
                .borrow_mut()
                .mutation("department", "create", outcome.is_applied());
            outcome.report();
            if outcome.is_applied() {
                fetch_and_render(ctx, None)?;
            }
            Ok(())
        }
        "rename" => {
            let rest = parts.get(1).copied().unwrap_or("");
            let (id_str, name) = rest.split_once(' ').unwrap_or((rest, ""));
            let Ok(id) = id_str.parse::<u64>() else {
                println!("Usage: /departments rename <id> <new name>");
                return Ok(());
            };
            let outcome = rename(ctx.api.as_ref(), id, name);
            let _ = ctx
                .transcript
                .borrow_mut()
                .mutation("department", "rename", outcome.is_applied());
            outcome.report();
            if outcome.is_applied() {
                fetch_and_render(ctx, None)?;
            }
            Ok(())
        }
        "delete" => {
            let Ok(id) = parts.get(1).copied().unwrap_or("").trim().parse::<u64>() else {
                println!("Usage: /departments delete <id>");
                return Ok(());
            };
            if !confirm(rl, &format!("Delete department {}?", id))? {
                println!("Cancelled.");
                return Ok(());
            }
            let outcome = delete(ctx.api.as_ref(), id);
            let _ = ctx
                .transcript
                .borrow_mut()
                .mutation("department", "delete", outcome.is_applied());
            outcome.report();
            if outcome.is_applied() {
                fetch_and_render(ctx, None)?;
            }
            Ok(())
        }
        _ => {
            println!("Usage:");
            println!("  /departments                    - list departments");
            println!("  /departments find <text>        - filter the list");
            println!("  /departments add <name>         - create a department");
            println!("  /departments rename <id> <name> - rename a department");
            println!("  /departments delete <id>        - delete a department");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockBackend;

    fn departments() -> Vec<Department> {
        vec![
            Department {
                id: 1,
                name: "Packaging".to_string(),
            },
            Department {
                id: 2,
                name: "Assembly".to_string(),
            },
            Department {
                id: 3,
                name: "Quality Assurance".to_string(),
            },
        ]
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let all = departments();
        let hits = filter(&all, "ASS");
        let names: Vec<&str> = hits.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Assembly", "Quality Assurance"]);
    }

    #[test]
    fn test_filter_empty_needle_keeps_all() {
        let all = departments();
        assert_eq!(filter(&all, "").len(), 3);
    }

    #[test]
    fn test_create_requires_name() {
        let backend = MockBackend::new();
        let outcome = create(&backend, "   ");
        assert!(matches!(outcome, MutationOutcome::Rejected(_)));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_create_then_list_reflects_change() {
        let backend = MockBackend::new();
        assert!(create(&backend, "Packaging").is_applied());
        let listed = backend.all_departments().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Packaging");
    }

    #[test]
    fn test_rename_and_delete() {
        let backend = MockBackend::new();
        let id = backend.seed_department("Packging");
        assert!(rename(&backend, id, "Packaging").is_applied());
        assert_eq!(backend.all_departments().unwrap()[0].name, "Packaging");
        assert!(delete(&backend, id).is_applied());
        assert!(backend.all_departments().unwrap().is_empty());
    }

    #[test]
    fn test_rename_unknown_id_rejected() {
        let backend = MockBackend::new();
        let outcome = rename(&backend, 99, "Anything");
        assert!(matches!(outcome, MutationOutcome::Rejected(_)));
    }
}
