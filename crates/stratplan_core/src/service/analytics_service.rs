//! Analytics facade.
//!
//! # Responsibility
//! - Compose loader, aggregation, classification and reconciliation into
//!   the use-cases callers invoke.
//! - Emit one metadata-only log event per use-case.
//!
//! # Invariants
//! - Read-only; results reflect the database at the time of the call.
//! - `today` is fixed per service when injected, otherwise the local date at
//!   call time.
//! - Bulk health is ordered by strategy id; bulk spending follows the
//!   requested id order.

use crate::model::hierarchy::{HierarchyBuckets, LevelCounts};
use crate::model::locale::resolve_text;
use crate::model::node::{Project, ProjectId, Strategy, StrategyId};
use crate::model::payment::{PaymentOwner, PaymentTransaction};
use crate::repo::hierarchy_repo::HierarchyRepository;
use crate::repo::payment_repo::PaymentRepository;
use crate::service::aggregation::aggregate;
use crate::service::error::{AnalyticsError, AnalyticsResult};
use crate::service::health::{classify, first_critical_node, HealthLabel};
use crate::service::hierarchy_loader::HierarchyLoader;
use crate::service::spending::{reconcile, ProjectSpendingDetails};
use chrono::{Local, NaiveDate};
use log::{debug, error, info, log_enabled, Level};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

/// Name reported when a strategy has no usable translation.
pub const UNKNOWN_STRATEGY_NAME: &str = "Unknown Strategy";

/// Health report for one strategy.
///
/// A strategy without projects reports only its id, name and `NoData`; the
/// KPI, risk and count fields are `None` and omitted from JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicHealthResult {
    pub strategy_id: StrategyId,
    pub strategy_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_progress: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_variance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_variance_days: Option<f64>,
    /// Risk tracking is not modelled; `Some(0)` whenever KPIs exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_risks: Option<u32>,
    pub health_status: HealthLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_counts: Option<LevelCounts>,
}

/// Read-only analytics use-cases over hierarchy and payment repositories.
pub struct AnalyticsService<H: HierarchyRepository, P: PaymentRepository> {
    loader: HierarchyLoader<H>,
    payments: P,
    default_locale: String,
    today: Option<NaiveDate>,
}

impl<H: HierarchyRepository, P: PaymentRepository> AnalyticsService<H, P> {
    pub fn new(hierarchy: H, payments: P, default_locale: impl Into<String>) -> Self {
        Self {
            loader: HierarchyLoader::new(hierarchy),
            payments,
            default_locale: default_locale.into(),
            today: None,
        }
    }

    /// Pins the reference date used for schedule variance.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Computes KPIs and health for one strategy.
    ///
    /// # Errors
    /// - `AnalyticsError::StrategyNotFound` when the strategy does not exist.
    /// - `AnalyticsError::Repo` on storage failures.
    pub fn strategic_health(
        &self,
        strategy_id: StrategyId,
        locale: &str,
    ) -> AnalyticsResult<StrategicHealthResult> {
        let started_at = Instant::now();
        let result = self
            .loader
            .load_subtree(strategy_id)
            .map(|buckets| self.evaluate(&buckets, locale));
        log_outcome("strategic_health", started_at, &result, |report| {
            format!(
                "strategy_id={} health={:?}",
                report.strategy_id, report.health_status
            )
        });
        result
    }

    /// Computes health for every strategy, ordered by strategy id.
    pub fn all_strategic_health(&self, locale: &str) -> AnalyticsResult<Vec<StrategicHealthResult>> {
        let started_at = Instant::now();
        let result = self.evaluate_all(locale);
        log_outcome("all_strategic_health", started_at, &result, |reports| {
            format!("strategies={}", reports.len())
        });
        result
    }

    /// Reconciles one project's budget against its payments.
    ///
    /// # Errors
    /// - `AnalyticsError::ProjectNotFound` when the project does not exist.
    /// - `AnalyticsError::Repo` on storage failures.
    pub fn project_spending(
        &self,
        project_id: ProjectId,
        locale: &str,
    ) -> AnalyticsResult<ProjectSpendingDetails> {
        let started_at = Instant::now();
        let result = self.spending_for(project_id, locale);
        log_outcome("project_spending", started_at, &result, |details| {
            format!(
                "project_id={} payments={}",
                details.project_id,
                details.payments.len()
            )
        });
        result
    }

    /// Reconciles several projects with a single payment lookup.
    ///
    /// Output follows `project_ids` order; duplicates are reported once.
    pub fn projects_spending(
        &self,
        project_ids: &[ProjectId],
        locale: &str,
    ) -> AnalyticsResult<Vec<ProjectSpendingDetails>> {
        let started_at = Instant::now();
        let result = self.spending_for_many(project_ids, locale);
        log_outcome("projects_spending", started_at, &result, |items| {
            format!("projects={}", items.len())
        });
        result
    }

    fn evaluate_all(&self, locale: &str) -> AnalyticsResult<Vec<StrategicHealthResult>> {
        let strategies = self.loader.repo().list_strategies()?;
        let mut reports = Vec::with_capacity(strategies.len());
        for strategy in strategies {
            let buckets = self.loader.load_from_root(strategy)?;
            reports.push(self.evaluate(&buckets, locale));
        }
        Ok(reports)
    }

    fn evaluate(&self, buckets: &HierarchyBuckets, locale: &str) -> StrategicHealthResult {
        let today = self.today();
        let kpis = aggregate(buckets.projects.nodes(), today);
        let health_status = classify(buckets, kpis.as_ref());
        if log_enabled!(Level::Debug) {
            log_perspectives(buckets, today);
        }
        if health_status == HealthLabel::OffTrack {
            if let Some(node) = first_critical_node(buckets) {
                debug!(
                    "event=health_classify module=service status=ok strategy_id={} critical_level={} critical_id={}",
                    buckets.strategy.id, node.level, node.id
                );
            }
        }

        StrategicHealthResult {
            strategy_id: buckets.strategy.id,
            strategy_name: self.strategy_name(&buckets.strategy, locale),
            overall_progress: kpis.as_ref().map(|k| k.overall_progress),
            budget_variance: kpis.as_ref().map(|k| k.budget_variance),
            schedule_variance_days: kpis.as_ref().map(|k| k.schedule_variance_days),
            active_risks: kpis.as_ref().map(|_| 0),
            health_status,
            level_counts: kpis.as_ref().map(|_| buckets.level_counts()),
        }
    }

    fn strategy_name(&self, strategy: &Strategy, locale: &str) -> String {
        resolve_text(&strategy.details.names, locale, &self.default_locale)
            .unwrap_or(UNKNOWN_STRATEGY_NAME)
            .to_string()
    }

    fn spending_for(
        &self,
        project_id: ProjectId,
        locale: &str,
    ) -> AnalyticsResult<ProjectSpendingDetails> {
        let project = self
            .loader
            .repo()
            .find_project(project_id)?
            .ok_or(AnalyticsError::ProjectNotFound(project_id))?;
        let payments = self
            .payments
            .list_payments(PaymentOwner::Project(project_id))?;
        Ok(reconcile(&project, payments, locale, &self.default_locale))
    }

    fn spending_for_many(
        &self,
        project_ids: &[ProjectId],
        locale: &str,
    ) -> AnalyticsResult<Vec<ProjectSpendingDetails>> {
        let mut requested: Vec<ProjectId> = Vec::with_capacity(project_ids.len());
        for id in project_ids {
            if !requested.contains(id) {
                requested.push(*id);
            }
        }
        if requested.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_id: HashMap<ProjectId, Project> = self
            .loader
            .repo()
            .find_projects(&requested)?
            .into_iter()
            .map(|project| (project.id, project))
            .collect();
        if let Some(missing) = requested.iter().find(|id| !by_id.contains_key(id)) {
            return Err(AnalyticsError::ProjectNotFound(*missing));
        }

        let payments = self.payments.list_project_payments(&requested)?;
        let mut payments_by_project: HashMap<ProjectId, Vec<PaymentTransaction>> = HashMap::new();
        for payment in payments {
            if let PaymentOwner::Project(owner) = payment.owner {
                payments_by_project.entry(owner).or_default().push(payment);
            }
        }

        let mut items = Vec::with_capacity(requested.len());
        for id in requested {
            if let Some(project) = by_id.remove(&id) {
                let owned = payments_by_project.remove(&id).unwrap_or_default();
                items.push(reconcile(&project, owned, locale, &self.default_locale));
            }
        }
        Ok(items)
    }
}

fn log_perspectives(buckets: &HierarchyBuckets, today: NaiveDate) {
    for (slot, perspective) in buckets.perspectives.nodes().iter().enumerate() {
        let projects = buckets.projects_under_perspective(slot);
        let overdue = projects
            .iter()
            .filter(|project| project.is_overdue(today))
            .count();
        debug!(
            "event=health_perspective module=service status=ok strategy_id={} perspective_id={} projects={} overdue={}",
            buckets.strategy.id,
            perspective.id,
            projects.len(),
            overdue
        );
    }
}

fn log_outcome<T>(
    event: &str,
    started_at: Instant,
    result: &AnalyticsResult<T>,
    describe: impl FnOnce(&T) -> String,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(value) => info!(
            "event={event} module=service status=ok {} duration_ms={duration_ms}",
            describe(value)
        ),
        Err(err) if err.is_not_found() => info!(
            "event={event} module=service status=not_found duration_ms={duration_ms} error={err}"
        ),
        Err(err) => error!(
            "event={event} module=service status=error duration_ms={duration_ms} error={err}"
        ),
    }
}
