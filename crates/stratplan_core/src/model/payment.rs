//! Payment ledger records.
//!
//! # Responsibility
//! - Model polymorphic payment ownership as a typed enum.
//! - Keep the storage tag mapping (`entity_type`) in one place.
//!
//! # Invariants
//! - Payments are immutable from the analytics core's point of view.
//! - `(entity_type, entity_id)` always round-trips through `PaymentOwner`.

use crate::model::locale::LocalizedText;
use crate::model::node::{
    GoalId, InitiativeId, NodeLevel, PerspectiveId, ProgramId, ProjectId, StrategyId,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable payment transaction identifier.
pub type PaymentId = Uuid;

/// Entity that owns a payment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entityType", content = "entityId", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOwner {
    Strategy(StrategyId),
    Perspective(PerspectiveId),
    Goal(GoalId),
    Program(ProgramId),
    Initiative(InitiativeId),
    Project(ProjectId),
}

impl PaymentOwner {
    /// Storage tag stored in `payment_transactions.entity_type`.
    pub fn entity_type(self) -> &'static str {
        entity_type_for(self.level())
    }

    /// Raw id stored in `payment_transactions.entity_id`.
    pub fn entity_id(self) -> i64 {
        match self {
            Self::Strategy(id) => id.get(),
            Self::Perspective(id) => id.get(),
            Self::Goal(id) => id.get(),
            Self::Program(id) => id.get(),
            Self::Initiative(id) => id.get(),
            Self::Project(id) => id.get(),
        }
    }

    pub fn level(self) -> NodeLevel {
        match self {
            Self::Strategy(_) => NodeLevel::Strategy,
            Self::Perspective(_) => NodeLevel::Perspective,
            Self::Goal(_) => NodeLevel::Goal,
            Self::Program(_) => NodeLevel::Program,
            Self::Initiative(_) => NodeLevel::Initiative,
            Self::Project(_) => NodeLevel::Project,
        }
    }

    /// Rebuilds an owner from its storage tag and raw id.
    ///
    /// Returns `None` for unknown tags.
    pub fn from_parts(entity_type: &str, entity_id: i64) -> Option<Self> {
        let owner = match entity_type {
            "STRATEGY" => Self::Strategy(StrategyId(entity_id)),
            "PERSPECTIVE" => Self::Perspective(PerspectiveId(entity_id)),
            "GOAL" => Self::Goal(GoalId(entity_id)),
            "PROGRAM" => Self::Program(ProgramId(entity_id)),
            "INITIATIVE" => Self::Initiative(InitiativeId(entity_id)),
            "PROJECT" => Self::Project(ProjectId(entity_id)),
            _ => return None,
        };
        Some(owner)
    }
}

/// Storage tag used for payments owned by nodes of `level`.
pub fn entity_type_for(level: NodeLevel) -> &'static str {
    match level {
        NodeLevel::Strategy => "STRATEGY",
        NodeLevel::Perspective => "PERSPECTIVE",
        NodeLevel::Goal => "GOAL",
        NodeLevel::Program => "PROGRAM",
        NodeLevel::Initiative => "INITIATIVE",
        NodeLevel::Project => "PROJECT",
    }
}

/// One payment ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: PaymentId,
    pub owner: PaymentOwner,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub notes: LocalizedText,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}
