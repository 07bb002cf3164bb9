//! Read-only analytics over a six-level strategic planning hierarchy.
//! This crate is the single source of truth for KPI and health invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AnalyticsConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::hierarchy::{HierarchyBuckets, LevelBucket, LevelCounts};
pub use model::locale::{resolve_text, LocalizedText};
pub use model::node::{
    Goal, GoalId, Initiative, InitiativeId, NodeLevel, Perspective, PerspectiveId, Program,
    ProgramId, Project, ProjectId, Strategy, StrategyId,
};
pub use model::payment::{PaymentOwner, PaymentTransaction};
pub use repo::hierarchy_repo::{HierarchyRepository, SqliteHierarchyRepository};
pub use repo::payment_repo::{PaymentRepository, SqlitePaymentRepository};
pub use repo::{RepoError, RepoResult};
pub use service::aggregation::StrategicKpis;
pub use service::analytics_service::{AnalyticsService, StrategicHealthResult};
pub use service::error::{AnalyticsError, AnalyticsResult};
pub use service::health::HealthLabel;
pub use service::spending::{PaymentEntry, ProjectSpendingDetails, SpendingPoint, SpendingSummary};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
