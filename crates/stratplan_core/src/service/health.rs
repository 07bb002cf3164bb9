//! Rule-based strategy health classification.
//!
//! # Responsibility
//! - Map a loaded subtree plus its KPIs to one health label.
//!
//! # Invariants
//! - Rules are evaluated in a fixed order and the first match wins:
//!   no projects, critical status, on-track thresholds, at-risk thresholds,
//!   then the on-track default.
//! - The root strategy's own status is not inspected.

use crate::model::hierarchy::{HierarchyBuckets, LevelBucket};
use crate::model::node::{
    GoalId, InitiativeId, NodeLevel, PerspectiveId, PlanningNode, ProgramId, ProjectId,
};
use crate::service::aggregation::StrategicKpis;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::{Display, Formatter};

const ON_TRACK_MIN_PROGRESS: Decimal = Decimal::from_parts(75, 0, 0, false, 0);
const AT_RISK_BELOW_PROGRESS: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
const AT_RISK_SCHEDULE_DAYS: f64 = 15.0;

/// Categorical strategy health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HealthLabel {
    #[serde(rename = "No Data")]
    NoData,
    #[serde(rename = "Off Track")]
    OffTrack,
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl HealthLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoData => "No Data",
            Self::OffTrack => "Off Track",
            Self::OnTrack => "On Track",
            Self::AtRisk => "At Risk",
        }
    }
}

impl Display for HealthLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node whose status forced an `OffTrack` classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriticalNode {
    pub level: NodeLevel,
    pub id: i64,
}

/// Classifies subtree health.
///
/// `kpis` must come from aggregating `buckets.projects`; `None` is only
/// expected when the project bucket is empty.
pub fn classify(buckets: &HierarchyBuckets, kpis: Option<&StrategicKpis>) -> HealthLabel {
    let Some(kpis) = kpis.filter(|_| !buckets.projects.is_empty()) else {
        return HealthLabel::NoData;
    };

    if first_critical_node(buckets).is_some() {
        return HealthLabel::OffTrack;
    }

    if kpis.overall_progress >= ON_TRACK_MIN_PROGRESS
        && kpis.budget_variance >= Decimal::ZERO
        && kpis.schedule_variance_days <= 0.0
    {
        return HealthLabel::OnTrack;
    }

    if kpis.overall_progress < AT_RISK_BELOW_PROGRESS
        || kpis.budget_variance < Decimal::ZERO
        || kpis.schedule_variance_days > AT_RISK_SCHEDULE_DAYS
    {
        return HealthLabel::AtRisk;
    }

    HealthLabel::OnTrack
}

/// Finds the first node below the root with a non-`OK` planning or progress
/// status, scanning levels top-down in bucket order.
pub fn first_critical_node(buckets: &HierarchyBuckets) -> Option<CriticalNode> {
    critical_in(&buckets.perspectives, PerspectiveId::get)
        .or_else(|| critical_in(&buckets.goals, GoalId::get))
        .or_else(|| critical_in(&buckets.programs, ProgramId::get))
        .or_else(|| critical_in(&buckets.initiatives, InitiativeId::get))
        .or_else(|| critical_in(&buckets.projects, ProjectId::get))
}

fn critical_in<T: PlanningNode>(
    bucket: &LevelBucket<T>,
    raw_id: fn(T::Id) -> i64,
) -> Option<CriticalNode> {
    bucket
        .iter()
        .find(|node| {
            !node.details().planning_status.is_ok()
                || node.progress_status().is_some_and(|status| !status.is_ok())
        })
        .map(|node| CriticalNode {
            level: T::LEVEL,
            id: raw_id(node.id()),
        })
}

#[cfg(test)]
mod tests {
    use super::{classify, first_critical_node, HealthLabel};
    use crate::model::hierarchy::HierarchyBuckets;
    use crate::model::node::{
        Goal, GoalId, Initiative, InitiativeId, NodeDetails, NodeLevel, Perspective,
        PerspectiveId, Program, ProgramId, Project, ProjectId, Strategy, StrategyId,
    };
    use crate::model::status::StatusCode;
    use crate::service::aggregation::StrategicKpis;
    use rust_decimal::Decimal;

    fn chain() -> HierarchyBuckets {
        let mut buckets = HierarchyBuckets::new(Strategy {
            id: StrategyId(1),
            details: NodeDetails::ok(),
        });
        buckets.perspectives.push(
            Perspective {
                id: PerspectiveId(10),
                strategy_id: StrategyId(1),
                details: NodeDetails::ok(),
            },
            0,
        );
        buckets.goals.push(
            Goal {
                id: GoalId(20),
                perspective_id: PerspectiveId(10),
                progress_status: StatusCode::ok(),
                details: NodeDetails::ok(),
            },
            0,
        );
        buckets.programs.push(
            Program {
                id: ProgramId(30),
                goal_id: GoalId(20),
                progress_status: StatusCode::ok(),
                details: NodeDetails::ok(),
            },
            0,
        );
        buckets.initiatives.push(
            Initiative {
                id: InitiativeId(40),
                program_id: ProgramId(30),
                progress_status: StatusCode::ok(),
                details: NodeDetails::ok(),
            },
            0,
        );
        buckets.projects.push(
            Project {
                id: ProjectId(50),
                initiative_id: InitiativeId(40),
                progress_status: StatusCode::ok(),
                details: NodeDetails::ok(),
                actual_cost: None,
                calculated_progress_percent: None,
                end_date: None,
            },
            0,
        );
        buckets
    }

    fn kpis(progress: i64, budget_variance: i64, schedule: f64) -> StrategicKpis {
        StrategicKpis {
            overall_progress: Decimal::from(progress),
            budget_variance: Decimal::from(budget_variance),
            schedule_variance_days: schedule,
        }
    }

    #[test]
    fn no_projects_means_no_data() {
        let buckets = HierarchyBuckets::new(Strategy {
            id: StrategyId(1),
            details: NodeDetails::ok(),
        });
        assert_eq!(classify(&buckets, None), HealthLabel::NoData);
        assert_eq!(classify(&buckets, Some(&kpis(90, 1, 0.0))), HealthLabel::NoData);
    }

    #[test]
    fn critical_status_overrides_good_kpis() {
        let mut buckets = chain();
        buckets.strategy.details.planning_status = StatusCode::new("ERROR");
        assert_eq!(classify(&buckets, Some(&kpis(95, 10, 0.0))), HealthLabel::OnTrack);

        let mut buckets = chain();
        let mut program = buckets.programs.nodes()[0].clone();
        program.details.planning_status = StatusCode::new("ERROR");
        buckets.programs = Default::default();
        buckets.programs.push(program, 0);
        assert_eq!(classify(&buckets, Some(&kpis(95, 10, 0.0))), HealthLabel::OffTrack);
        assert_eq!(
            first_critical_node(&buckets).map(|node| (node.level, node.id)),
            Some((NodeLevel::Program, 30))
        );
    }

    #[test]
    fn progress_status_is_checked_below_perspectives() {
        let mut buckets = chain();
        let mut project = buckets.projects.nodes()[0].clone();
        project.progress_status = StatusCode::new("DELAYED");
        buckets.projects = Default::default();
        buckets.projects.push(project, 0);

        assert_eq!(classify(&buckets, Some(&kpis(95, 10, 0.0))), HealthLabel::OffTrack);
    }

    #[test]
    fn lowercase_ok_is_not_critical() {
        let mut buckets = chain();
        let mut goal = buckets.goals.nodes()[0].clone();
        goal.progress_status = StatusCode::new("ok");
        buckets.goals = Default::default();
        buckets.goals.push(goal, 0);

        assert_eq!(first_critical_node(&buckets), None);
    }

    #[test]
    fn padded_ok_is_critical() {
        let mut buckets = chain();
        let mut perspective = buckets.perspectives.nodes()[0].clone();
        perspective.details.planning_status = StatusCode::new(" OK ");
        buckets.perspectives = Default::default();
        buckets.perspectives.push(perspective, 0);

        assert_eq!(classify(&buckets, Some(&kpis(95, 10, 0.0))), HealthLabel::OffTrack);
    }

    #[test]
    fn threshold_rules_apply_in_order() {
        let buckets = chain();
        assert_eq!(classify(&buckets, Some(&kpis(75, 0, 0.0))), HealthLabel::OnTrack);
        assert_eq!(classify(&buckets, Some(&kpis(90, 0, 0.5))), HealthLabel::OnTrack);
        assert_eq!(classify(&buckets, Some(&kpis(49, 0, 0.0))), HealthLabel::AtRisk);
        assert_eq!(classify(&buckets, Some(&kpis(90, -1, 0.0))), HealthLabel::AtRisk);
        assert_eq!(classify(&buckets, Some(&kpis(90, 0, 15.5))), HealthLabel::AtRisk);
        assert_eq!(classify(&buckets, Some(&kpis(60, 0, 15.0))), HealthLabel::OnTrack);
    }

    #[test]
    fn middle_band_progress_falls_through_to_on_track() {
        let buckets = chain();
        assert_eq!(classify(&buckets, Some(&kpis(70, 10, 0.0))), HealthLabel::OnTrack);
        assert_eq!(classify(&buckets, Some(&kpis(50, 0, 3.0))), HealthLabel::OnTrack);
    }

    #[test]
    fn labels_render_display_text() {
        assert_eq!(HealthLabel::NoData.to_string(), "No Data");
        assert_eq!(HealthLabel::AtRisk.as_str(), "At Risk");
    }
}
