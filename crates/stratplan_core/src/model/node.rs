//! Planning hierarchy node types.
//!
//! # Responsibility
//! - Define one concrete type per hierarchy level.
//! - Expose shared node attributes through the `PlanningNode` trait.
//!
//! # Invariants
//! - Every non-root node stores the typed id of its direct parent.
//! - Null budget figures are kept as `None`; arithmetic helpers read them as
//!   zero.

use crate::model::locale::LocalizedText;
use crate::model::status::StatusCode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

macro_rules! level_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Raw database id.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

level_id!(
    /// Strategy (root level) id.
    StrategyId
);
level_id!(
    /// Perspective id.
    PerspectiveId
);
level_id!(
    /// Goal id.
    GoalId
);
level_id!(
    /// Program id.
    ProgramId
);
level_id!(
    /// Initiative id.
    InitiativeId
);
level_id!(
    /// Project (leaf level) id.
    ProjectId
);

/// The six fixed hierarchy levels, root first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeLevel {
    Strategy,
    Perspective,
    Goal,
    Program,
    Initiative,
    Project,
}

impl NodeLevel {
    pub const ALL: [NodeLevel; 6] = [
        NodeLevel::Strategy,
        NodeLevel::Perspective,
        NodeLevel::Goal,
        NodeLevel::Program,
        NodeLevel::Initiative,
        NodeLevel::Project,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strategy => "strategy",
            Self::Perspective => "perspective",
            Self::Goal => "goal",
            Self::Program => "program",
            Self::Initiative => "initiative",
            Self::Project => "project",
        }
    }

    /// Level directly below this one; `None` for projects.
    pub fn child(self) -> Option<NodeLevel> {
        match self {
            Self::Strategy => Some(Self::Perspective),
            Self::Perspective => Some(Self::Goal),
            Self::Goal => Some(Self::Program),
            Self::Program => Some(Self::Initiative),
            Self::Initiative => Some(Self::Project),
            Self::Project => None,
        }
    }
}

impl Display for NodeLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Budget figures carried by every level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetFigures {
    pub planned_total_budget: Option<Decimal>,
    pub calculated_total_budget: Option<Decimal>,
    pub calculated_total_payments: Option<Decimal>,
}

impl BudgetFigures {
    /// Planned budget with null read as zero.
    pub fn planned_or_zero(&self) -> Decimal {
        self.planned_total_budget.unwrap_or(Decimal::ZERO)
    }
}

/// Attributes shared by all six levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDetails {
    pub names: LocalizedText,
    pub descriptions: LocalizedText,
    pub planning_status: StatusCode,
    pub budget: BudgetFigures,
}

impl NodeDetails {
    /// Details with `OK` planning status and no text or budget.
    pub fn ok() -> Self {
        Self {
            names: LocalizedText::new(),
            descriptions: LocalizedText::new(),
            planning_status: StatusCode::ok(),
            budget: BudgetFigures::default(),
        }
    }
}

/// Common read access over the six level types.
pub trait PlanningNode {
    type Id: Copy + Eq + std::hash::Hash + Ord;

    const LEVEL: NodeLevel;

    fn id(&self) -> Self::Id;
    fn details(&self) -> &NodeDetails;

    /// Progress status; perspectives and strategies carry none.
    fn progress_status(&self) -> Option<&StatusCode> {
        None
    }
}

/// A node that sits below another level.
pub trait ChildNode: PlanningNode {
    type ParentId: Copy + Eq + std::hash::Hash + Ord;

    fn parent_id(&self) -> Self::ParentId;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: StrategyId,
    pub details: NodeDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perspective {
    pub id: PerspectiveId,
    pub strategy_id: StrategyId,
    pub details: NodeDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub perspective_id: PerspectiveId,
    pub progress_status: StatusCode,
    pub details: NodeDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub goal_id: GoalId,
    pub progress_status: StatusCode,
    pub details: NodeDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    pub id: InitiativeId,
    pub program_id: ProgramId,
    pub progress_status: StatusCode,
    pub details: NodeDetails,
}

/// Leaf node for KPI purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub initiative_id: InitiativeId,
    pub progress_status: StatusCode,
    pub details: NodeDetails,
    pub actual_cost: Option<Decimal>,
    /// 0-100 when set.
    pub calculated_progress_percent: Option<Decimal>,
    pub end_date: Option<NaiveDate>,
}

impl Project {
    pub fn actual_cost_or_zero(&self) -> Decimal {
        self.actual_cost.unwrap_or(Decimal::ZERO)
    }

    pub fn progress_or_zero(&self) -> Decimal {
        self.calculated_progress_percent.unwrap_or(Decimal::ZERO)
    }

    /// True for unfinished projects whose end date lies before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.progress_status.is_completed() && self.end_date.is_some_and(|end| end < today)
    }
}

impl PlanningNode for Strategy {
    type Id = StrategyId;
    const LEVEL: NodeLevel = NodeLevel::Strategy;

    fn id(&self) -> StrategyId {
        self.id
    }

    fn details(&self) -> &NodeDetails {
        &self.details
    }
}

impl PlanningNode for Perspective {
    type Id = PerspectiveId;
    const LEVEL: NodeLevel = NodeLevel::Perspective;

    fn id(&self) -> PerspectiveId {
        self.id
    }

    fn details(&self) -> &NodeDetails {
        &self.details
    }
}

impl ChildNode for Perspective {
    type ParentId = StrategyId;

    fn parent_id(&self) -> StrategyId {
        self.strategy_id
    }
}

macro_rules! tracked_child_node {
    ($node:ty, $id:ty, $level:expr, $parent:ty, $parent_field:ident) => {
        impl PlanningNode for $node {
            type Id = $id;
            const LEVEL: NodeLevel = $level;

            fn id(&self) -> $id {
                self.id
            }

            fn details(&self) -> &NodeDetails {
                &self.details
            }

            fn progress_status(&self) -> Option<&StatusCode> {
                Some(&self.progress_status)
            }
        }

        impl ChildNode for $node {
            type ParentId = $parent;

            fn parent_id(&self) -> $parent {
                self.$parent_field
            }
        }
    };
}

tracked_child_node!(Goal, GoalId, NodeLevel::Goal, PerspectiveId, perspective_id);
tracked_child_node!(Program, ProgramId, NodeLevel::Program, GoalId, goal_id);
tracked_child_node!(
    Initiative,
    InitiativeId,
    NodeLevel::Initiative,
    ProgramId,
    program_id
);
tracked_child_node!(
    Project,
    ProjectId,
    NodeLevel::Project,
    InitiativeId,
    initiative_id
);
