//! Weekly history dashboard.
//!
//! The backend does all the aggregation; this screen only renders what it
//! returns, per department, indicator, week, and day. An optional filter
//! argument narrows the rendering client-side.

use crate::api::Backend;
use crate::cli::Context;
use crate::model::DepartmentHistory;
use anyhow::Result;

/// Narrow the fetched history to departments matching `needle`
/// (case-insensitive substring). No refetch.
pub fn filter(history: Vec<DepartmentHistory>, needle: &str) -> Vec<DepartmentHistory> {
    let needle = needle.to_lowercase();
    history
        .into_iter()
        .filter(|d| d.department.to_lowercase().contains(&needle))
        .collect()
}

pub fn render(history: &[DepartmentHistory]) {
    if history.is_empty() {
        println!("No history to show.");
        return;
    }
    for dept in history {
        println!("{}", dept.department);
        if dept.indicators.is_empty() {
            println!("  (no recorded values)");
            continue;
        }
        for ind in &dept.indicators {
            println!("  {} (target {}/week)", ind.indicator, ind.target_per_week);
            for week in &ind.weeks {
                println!(
                    "    {} ({} .. {})",
                    week.label,
                    week.start.format("%Y-%m-%d"),
                    week.end.format("%Y-%m-%d")
                );
                for day in &week.daily {
                    println!("      {:<9} {}", day.day, day.value);
                }
            }
        }
    }
}

/// The weekly-history screen. `args` is an optional department filter.
pub fn screen(ctx: &Context, args: &str) -> Result<()> {
    match ctx.api.weekly_history() {
        Ok(history) => {
            let history = if args.trim().is_empty() {
                history
            } else {
                filter(history, args.trim())
            };
            render(&history);
        }
        Err(err) => println!("Error: {}", err),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DayValue, IndicatorHistory, WeekRecord};
    use chrono::NaiveDate;

    fn sample() -> Vec<DepartmentHistory> {
        vec![
            DepartmentHistory {
                department: "Packaging".to_string(),
                indicators: vec![IndicatorHistory {
                    indicator: "Defect Rate".to_string(),
                    target_per_week: 5.0,
                    weeks: vec![WeekRecord {
                        label: "Week 34".to_string(),
                        start: NaiveDate::from_ymd_opt(2026, 8, 17).unwrap(),
                        end: NaiveDate::from_ymd_opt(2026, 8, 23).unwrap(),
                        daily: vec![DayValue {
                            day: "Mon".to_string(),
                            value: 3.0,
                        }],
                    }],
                }],
            },
            DepartmentHistory {
                department: "Assembly".to_string(),
                indicators: vec![],
            },
        ]
    }

    #[test]
    fn test_filter_by_department() {
        let filtered = filter(sample(), "pack");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].department, "Packaging");
    }

    #[test]
    fn test_filter_no_match() {
        assert!(filter(sample(), "shipping").is_empty());
    }
}
