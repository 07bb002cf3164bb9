//! Strategy subtree loader.
//!
//! # Responsibility
//! - Resolve a strategy and collect every descendant, bucketed by level.
//!
//! # Invariants
//! - Exactly one repository call per non-empty level; an empty level stops
//!   the walk.
//! - Bucket order is breadth-first: children grouped by parent in parent
//!   order, ascending id within a parent.

use crate::model::hierarchy::{HierarchyBuckets, LevelBucket};
use crate::model::node::{
    ChildNode, Goal, Initiative, Perspective, Program, Project, Strategy, StrategyId,
};
use crate::repo::hierarchy_repo::HierarchyRepository;
use crate::repo::RepoResult;
use crate::service::error::{AnalyticsError, AnalyticsResult};
use log::{debug, error, info};
use std::time::Instant;

/// Loads strategy subtrees through level-wide repository lookups.
pub struct HierarchyLoader<R: HierarchyRepository> {
    repo: R,
}

impl<R: HierarchyRepository> HierarchyLoader<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Loads the subtree rooted at `strategy_id`.
    ///
    /// # Errors
    /// - `AnalyticsError::StrategyNotFound` when the strategy does not exist.
    /// - `AnalyticsError::Repo` when any level lookup fails.
    pub fn load_subtree(&self, strategy_id: StrategyId) -> AnalyticsResult<HierarchyBuckets> {
        let strategy = self
            .repo
            .find_strategy(strategy_id)?
            .ok_or(AnalyticsError::StrategyNotFound(strategy_id))?;
        self.load_from_root(strategy)
    }

    /// Loads every descendant of an already resolved strategy.
    pub fn load_from_root(&self, strategy: Strategy) -> AnalyticsResult<HierarchyBuckets> {
        let started_at = Instant::now();
        let strategy_id = strategy.id;

        match self.walk(strategy) {
            Ok(buckets) => {
                let counts = buckets.level_counts();
                info!(
                    "event=hierarchy_load module=service status=ok strategy_id={} perspectives={} goals={} programs={} initiatives={} projects={} duration_ms={}",
                    strategy_id,
                    counts.perspectives,
                    counts.goals,
                    counts.programs,
                    counts.initiatives,
                    counts.projects,
                    started_at.elapsed().as_millis()
                );
                Ok(buckets)
            }
            Err(err) => {
                error!(
                    "event=hierarchy_load module=service status=error strategy_id={} duration_ms={} error={}",
                    strategy_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    fn walk(&self, strategy: Strategy) -> RepoResult<HierarchyBuckets> {
        let root_ids = [strategy.id];
        let mut buckets = HierarchyBuckets::new(strategy);

        buckets.perspectives =
            fetch_level::<Perspective, _>(&root_ids, |ids| self.repo.list_perspectives(ids))?;
        let perspective_ids = buckets.perspectives.ids();
        buckets.goals = fetch_level::<Goal, _>(&perspective_ids, |ids| self.repo.list_goals(ids))?;
        let goal_ids = buckets.goals.ids();
        buckets.programs =
            fetch_level::<Program, _>(&goal_ids, |ids| self.repo.list_programs(ids))?;
        let program_ids = buckets.programs.ids();
        buckets.initiatives =
            fetch_level::<Initiative, _>(&program_ids, |ids| self.repo.list_initiatives(ids))?;
        let initiative_ids = buckets.initiatives.ids();
        buckets.projects =
            fetch_level::<Project, _>(&initiative_ids, |ids| self.repo.list_projects(ids))?;

        Ok(buckets)
    }
}

fn fetch_level<C, F>(parent_ids: &[C::ParentId], fetch: F) -> RepoResult<LevelBucket<C>>
where
    C: ChildNode,
    F: FnOnce(&[C::ParentId]) -> RepoResult<Vec<C>>,
{
    if parent_ids.is_empty() {
        return Ok(LevelBucket::new());
    }
    let children = fetch(parent_ids)?;
    debug!(
        "event=hierarchy_level module=service status=ok level={} parents={} rows={}",
        C::LEVEL,
        parent_ids.len(),
        children.len()
    );
    Ok(LevelBucket::from_children(parent_ids, children))
}
