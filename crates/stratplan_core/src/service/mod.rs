//! Analytics use-case services.
//!
//! # Responsibility
//! - Turn repository reads into health and spending reports.
//! - Keep CLI and other transports decoupled from storage details.

pub mod aggregation;
pub mod analytics_service;
pub mod error;
pub mod health;
pub mod hierarchy_loader;
pub mod spending;
