//! Project budget versus payment ledger reconciliation.
//!
//! # Responsibility
//! - Join one project's planned budget to the payments it owns.
//! - Produce the ordered payment list with running totals, and derive the
//!   per-date cumulative series from that same list.
//!
//! # Invariants
//! - Only payments owned by `PaymentOwner::Project(project.id)` are counted.
//! - Entries are ordered by `(payment_date, created_at, id)`.
//! - The last entry's `cumulative_amount` equals `summary.payment_budget`.

use crate::model::locale::resolve_text;
use crate::model::node::{Project, ProjectId};
use crate::model::payment::{PaymentId, PaymentOwner, PaymentTransaction};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Name reported when a project has no usable translation.
pub const UNKNOWN_PROJECT_NAME: &str = "Unknown Project";

/// Planned budget next to the sum of recorded payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    /// Null planned budget reads as zero.
    pub planned_total_budget: Decimal,
    pub payment_budget: Decimal,
}

/// One payment with its running total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEntry {
    pub id: PaymentId,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    /// Notes in the requested locale, falling back to the default locale.
    pub notes: Option<String>,
    /// Notes in the default locale only.
    pub default_notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub cumulative_amount: Decimal,
}

/// Cumulative spend at the end of one payment date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingPoint {
    pub date: NaiveDate,
    pub cumulative_actual: Decimal,
    pub planned_total: Decimal,
}

/// Spending view of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpendingDetails {
    pub project_id: ProjectId,
    pub project_name: String,
    pub summary: SpendingSummary,
    pub payments: Vec<PaymentEntry>,
}

impl ProjectSpendingDetails {
    /// Collapses same-day payments into one point per date.
    pub fn spending_series(&self) -> Vec<SpendingPoint> {
        let mut series: Vec<SpendingPoint> = Vec::new();
        for entry in &self.payments {
            match series.last_mut() {
                Some(point) if point.date == entry.payment_date => {
                    point.cumulative_actual = entry.cumulative_amount;
                }
                _ => series.push(SpendingPoint {
                    date: entry.payment_date,
                    cumulative_actual: entry.cumulative_amount,
                    planned_total: self.summary.planned_total_budget,
                }),
            }
        }
        series
    }
}

/// Reconciles `project` against `payments`.
///
/// `payments` may contain rows for other owners; they are ignored.
pub fn reconcile(
    project: &Project,
    payments: Vec<PaymentTransaction>,
    requested_locale: &str,
    default_locale: &str,
) -> ProjectSpendingDetails {
    let owner = PaymentOwner::Project(project.id);
    let mut owned: Vec<PaymentTransaction> = payments
        .into_iter()
        .filter(|payment| payment.owner == owner)
        .collect();
    owned.sort_by(|left, right| {
        left.payment_date
            .cmp(&right.payment_date)
            .then_with(|| left.created_at.cmp(&right.created_at))
            .then_with(|| left.id.cmp(&right.id))
    });

    let mut running = Decimal::ZERO;
    let entries: Vec<PaymentEntry> = owned
        .into_iter()
        .map(|payment| {
            running += payment.amount;
            PaymentEntry {
                id: payment.id,
                payment_date: payment.payment_date,
                amount: payment.amount,
                notes: resolve_text(&payment.notes, requested_locale, default_locale)
                    .map(str::to_string),
                default_notes: payment.notes.get(default_locale).map(str::to_string),
                created_by: payment.created_by,
                created_at: payment.created_at,
                cumulative_amount: running,
            }
        })
        .collect();

    let project_name = resolve_text(&project.details.names, requested_locale, default_locale)
        .unwrap_or(UNKNOWN_PROJECT_NAME)
        .to_string();

    ProjectSpendingDetails {
        project_id: project.id,
        project_name,
        summary: SpendingSummary {
            planned_total_budget: project.details.budget.planned_or_zero(),
            payment_budget: running,
        },
        payments: entries,
    }
}
