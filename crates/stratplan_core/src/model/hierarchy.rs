//! In-memory snapshot of one strategy subtree.
//!
//! # Responsibility
//! - Hold every loaded node bucketed by level, in traversal order.
//! - Record parent/child adjacency as slot indexes between buckets.
//!
//! # Invariants
//! - `parent_slots[i]` is the index of node `i`'s parent in the bucket one
//!   level up (always `0` for perspectives, whose parent is the root).
//! - Within a bucket, nodes are grouped by parent in parent order.

use crate::model::node::{
    ChildNode, Goal, Initiative, Perspective, PlanningNode, Program, Project, Strategy,
};
use serde::Serialize;

/// Arena of nodes for one level plus the slot of each node's parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelBucket<T> {
    nodes: Vec<T>,
    parent_slots: Vec<usize>,
}

impl<T> Default for LevelBucket<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            parent_slots: Vec::new(),
        }
    }
}

impl<T> LevelBucket<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one node under the parent at `parent_slot`.
    pub fn push(&mut self, node: T, parent_slot: usize) {
        self.nodes.push(node);
        self.parent_slots.push(parent_slot);
    }

    pub fn nodes(&self) -> &[T] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.nodes.get(slot)
    }

    pub fn parent_slot(&self, slot: usize) -> Option<usize> {
        self.parent_slots.get(slot).copied()
    }

    /// Iterates the nodes whose parent sits at `parent_slot` one level up.
    pub fn children_of(&self, parent_slot: usize) -> impl Iterator<Item = &T> + '_ {
        self.nodes
            .iter()
            .zip(self.parent_slots.iter())
            .filter(move |(_, parent)| **parent == parent_slot)
            .map(|(node, _)| node)
    }
}

impl<T: PlanningNode> LevelBucket<T> {
    /// Ids in bucket order.
    pub fn ids(&self) -> Vec<T::Id> {
        self.nodes.iter().map(PlanningNode::id).collect()
    }
}

impl<T: ChildNode> LevelBucket<T> {
    /// Builds a bucket from nodes fetched for `parent_ids`, grouping children
    /// by parent in `parent_ids` order and keeping fetch order within a parent.
    ///
    /// Nodes whose parent is not in `parent_ids` are dropped.
    pub fn from_children(parent_ids: &[T::ParentId], children: Vec<T>) -> Self {
        let mut grouped: Vec<Vec<T>> = parent_ids.iter().map(|_| Vec::new()).collect();
        let slot_of: std::collections::HashMap<T::ParentId, usize> = parent_ids
            .iter()
            .enumerate()
            .map(|(slot, id)| (*id, slot))
            .collect();

        for child in children {
            if let Some(slot) = slot_of.get(&child.parent_id()) {
                grouped[*slot].push(child);
            }
        }

        let mut bucket = Self::new();
        for (slot, group) in grouped.into_iter().enumerate() {
            for child in group {
                bucket.push(child, slot);
            }
        }
        bucket
    }
}

/// Number of nodes per level in one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCounts {
    pub perspectives: usize,
    pub goals: usize,
    pub programs: usize,
    pub initiatives: usize,
    pub projects: usize,
}

/// Every node under one strategy, bucketed by level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyBuckets {
    pub strategy: Strategy,
    pub perspectives: LevelBucket<Perspective>,
    pub goals: LevelBucket<Goal>,
    pub programs: LevelBucket<Program>,
    pub initiatives: LevelBucket<Initiative>,
    pub projects: LevelBucket<Project>,
}

impl HierarchyBuckets {
    /// Snapshot holding only the root strategy.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            perspectives: LevelBucket::new(),
            goals: LevelBucket::new(),
            programs: LevelBucket::new(),
            initiatives: LevelBucket::new(),
            projects: LevelBucket::new(),
        }
    }

    pub fn level_counts(&self) -> LevelCounts {
        LevelCounts {
            perspectives: self.perspectives.len(),
            goals: self.goals.len(),
            programs: self.programs.len(),
            initiatives: self.initiatives.len(),
            projects: self.projects.len(),
        }
    }

    /// Projects reachable from the perspective at `perspective_slot`.
    pub fn projects_under_perspective(&self, perspective_slot: usize) -> Vec<&Project> {
        let goal_slots = slots_under(&self.goals, &[perspective_slot]);
        let program_slots = slots_under(&self.programs, &goal_slots);
        let initiative_slots = slots_under(&self.initiatives, &program_slots);
        let project_slots = slots_under(&self.projects, &initiative_slots);
        project_slots
            .into_iter()
            .filter_map(|slot| self.projects.get(slot))
            .collect()
    }
}

fn slots_under<T>(bucket: &LevelBucket<T>, parent_slots: &[usize]) -> Vec<usize> {
    (0..bucket.len())
        .filter(|slot| {
            bucket
                .parent_slot(*slot)
                .is_some_and(|parent| parent_slots.contains(&parent))
        })
        .collect()
}
