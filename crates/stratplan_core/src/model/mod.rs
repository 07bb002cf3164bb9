//! Read models for the strategic-planning hierarchy and payment ledger.
//!
//! # Responsibility
//! - Define one distinct type per hierarchy level with typed parent links.
//! - Define the payment ledger record and its polymorphic owner.
//! - Centralize status-code and locale-fallback semantics.
//!
//! # Invariants
//! - Ids of different levels are distinct types and never interchangeable.
//! - A child always references the level directly above it.

pub mod hierarchy;
pub mod locale;
pub mod node;
pub mod payment;
pub mod status;
