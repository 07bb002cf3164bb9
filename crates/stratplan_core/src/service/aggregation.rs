//! Project-to-strategy KPI aggregation.
//!
//! # Responsibility
//! - Roll leaf project metrics up into strategy-wide KPIs.
//!
//! # Invariants
//! - Null progress, budget and cost values count as zero.
//! - Results do not depend on project order.
//! - Schedule variance is average lateness of overdue unfinished projects,
//!   so it is never negative.

use crate::model::node::Project;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

const PROGRESS_DECIMAL_PLACES: u32 = 2;

/// Strategy-wide KPIs derived from the project bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicKpis {
    /// Mean project progress (0-100), rounded half-up to 2 decimals.
    pub overall_progress: Decimal,
    /// Planned budget minus actual cost. Positive means under budget.
    pub budget_variance: Decimal,
    /// Mean days late across overdue unfinished projects; `0.0` when none.
    pub schedule_variance_days: f64,
}

/// Aggregates `projects` as of `today`.
///
/// Returns `None` when there are no projects to aggregate.
pub fn aggregate(projects: &[Project], today: NaiveDate) -> Option<StrategicKpis> {
    if projects.is_empty() {
        return None;
    }
    Some(StrategicKpis {
        overall_progress: overall_progress(projects),
        budget_variance: budget_variance(projects),
        schedule_variance_days: schedule_variance_days(projects, today),
    })
}

/// Mean of `calculated_progress_percent`, rounded half-up to 2 decimals.
pub fn overall_progress(projects: &[Project]) -> Decimal {
    if projects.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = projects.iter().map(Project::progress_or_zero).sum();
    let mean = total / Decimal::from(projects.len());
    mean.round_dp_with_strategy(PROGRESS_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum of planned budgets minus sum of actual costs.
pub fn budget_variance(projects: &[Project]) -> Decimal {
    let planned: Decimal = projects
        .iter()
        .map(|project| project.details.budget.planned_or_zero())
        .sum();
    let actual: Decimal = projects.iter().map(Project::actual_cost_or_zero).sum();
    planned - actual
}

/// Mean lateness in days over projects that are overdue and not completed.
pub fn schedule_variance_days(projects: &[Project], today: NaiveDate) -> f64 {
    let days_late: Vec<i64> = projects
        .iter()
        .filter(|project| project.is_overdue(today))
        .filter_map(|project| project.end_date)
        .map(|end_date| (today - end_date).num_days())
        .collect();

    if days_late.is_empty() {
        return 0.0;
    }
    days_late.iter().sum::<i64>() as f64 / days_late.len() as f64
}

#[cfg(test)]
mod tests {
    use super::{aggregate, budget_variance, overall_progress, schedule_variance_days};
    use crate::model::node::{InitiativeId, NodeDetails, Project, ProjectId};
    use crate::model::status::StatusCode;
    use chrono::{Days, NaiveDate};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 20).unwrap()
    }

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn project(id: i64, progress: Option<&str>, budget: Option<&str>, cost: Option<&str>) -> Project {
        let mut details = NodeDetails::ok();
        details.budget.planned_total_budget = budget.map(dec);
        Project {
            id: ProjectId(id),
            initiative_id: InitiativeId(1),
            progress_status: StatusCode::new("IN_PROGRESS"),
            details,
            actual_cost: cost.map(dec),
            calculated_progress_percent: progress.map(dec),
            end_date: None,
        }
    }

    fn late(mut project: Project, days: u64, status: &str) -> Project {
        project.end_date = today().checked_sub_days(Days::new(days));
        project.progress_status = StatusCode::new(status);
        project
    }

    #[test]
    fn empty_project_list_has_no_kpis() {
        assert_eq!(aggregate(&[], today()), None);
    }

    #[test]
    fn reference_portfolio_matches_expected_kpis() {
        let projects = vec![
            late(project(1, Some("80"), Some("100"), Some("90")), 1, "COMPLETED"),
            project(2, Some("60"), Some("50"), Some("50")),
        ];

        let kpis = aggregate(&projects, today()).unwrap();

        assert_eq!(kpis.overall_progress, dec("70.00"));
        assert_eq!(kpis.budget_variance, dec("10"));
        assert_eq!(kpis.schedule_variance_days, 0.0);
    }

    #[test]
    fn progress_rounds_half_up() {
        let projects = vec![
            project(1, Some("33.335"), None, None),
            project(2, Some("33.335"), None, None),
        ];
        assert_eq!(overall_progress(&projects), dec("33.34"));

        let thirds = vec![
            project(1, Some("100"), None, None),
            project(2, None, None, None),
            project(3, None, None, None),
        ];
        assert_eq!(overall_progress(&thirds), dec("33.33"));
    }

    #[test]
    fn null_budget_and_cost_equal_zero() {
        let with_nulls = vec![project(1, None, None, Some("5"))];
        let with_zero = vec![project(1, None, Some("0"), Some("5"))];
        assert_eq!(budget_variance(&with_nulls), budget_variance(&with_zero));
        assert_eq!(budget_variance(&with_nulls), dec("-5"));

        let no_cost = vec![project(1, None, Some("12.50"), None)];
        assert_eq!(budget_variance(&no_cost), dec("12.50"));
    }

    #[test]
    fn schedule_variance_averages_overdue_incomplete_projects_only() {
        let projects = vec![
            late(project(1, None, None, None), 10, "IN_PROGRESS"),
            late(project(2, None, None, None), 20, "delayed"),
            late(project(3, None, None, None), 90, "completed"),
            project(4, None, None, None),
        ];
        assert_eq!(schedule_variance_days(&projects, today()), 15.0);
    }

    #[test]
    fn padded_completed_status_still_counts_as_overdue() {
        let projects = vec![late(project(1, None, None, None), 6, "COMPLETED ")];
        assert_eq!(schedule_variance_days(&projects, today()), 6.0);
    }

    #[test]
    fn project_ending_today_is_not_overdue() {
        let projects = vec![late(project(1, None, None, None), 0, "IN_PROGRESS")];
        assert_eq!(schedule_variance_days(&projects, today()), 0.0);
    }

    #[test]
    fn aggregate_ignores_project_order() {
        let mut projects = vec![
            late(project(1, Some("12.5"), Some("100"), Some("130")), 3, "IN_PROGRESS"),
            project(2, Some("99"), Some("40"), None),
            late(project(3, None, None, Some("7.25")), 8, "ON_HOLD"),
            project(4, Some("41.7"), Some("18.75"), Some("18.75")),
        ];
        let forward = aggregate(&projects, today()).unwrap();
        projects.reverse();
        projects.swap(0, 2);
        let shuffled = aggregate(&projects, today()).unwrap();

        assert_eq!(forward, shuffled);
        assert_eq!(aggregate(&projects, today()).unwrap(), shuffled);
    }
}
