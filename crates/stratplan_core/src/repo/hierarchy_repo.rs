//! Planning hierarchy repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Look up strategies and projects by id.
//! - List the children of a whole set of parents in one call per level.
//!
//! # Invariants
//! - Child listing is deterministic: `parent_id ASC, id ASC`.
//! - An empty parent-id set returns an empty list without touching SQLite.
//! - Parent-id sets are chunked below SQLite's bind-parameter limit.

use super::row::{parse_node_details, parse_optional_date, parse_optional_decimal};
use super::schema::{ensure_connection_ready, RequiredTable};
use super::RepoResult;
use crate::model::node::{
    Goal, GoalId, Initiative, InitiativeId, Perspective, PerspectiveId, Program, ProgramId,
    Project, ProjectId, Strategy, StrategyId,
};
use crate::model::status::StatusCode;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

/// Upper bound of ids bound into one `IN (...)` clause.
const MAX_IDS_PER_QUERY: usize = 500;

const STRATEGY_SELECT_SQL: &str = "SELECT
    id,
    name_i18n,
    description_i18n,
    planning_status_code,
    planned_total_budget,
    calculated_total_budget,
    calculated_total_payments
FROM strategies";

const PERSPECTIVE_SELECT_SQL: &str = "SELECT
    id,
    strategy_id,
    name_i18n,
    description_i18n,
    planning_status_code,
    planned_total_budget,
    calculated_total_budget,
    calculated_total_payments
FROM perspectives";

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    perspective_id,
    name_i18n,
    description_i18n,
    planning_status_code,
    progress_status_code,
    planned_total_budget,
    calculated_total_budget,
    calculated_total_payments
FROM goals";

const PROGRAM_SELECT_SQL: &str = "SELECT
    id,
    goal_id,
    name_i18n,
    description_i18n,
    planning_status_code,
    progress_status_code,
    planned_total_budget,
    calculated_total_budget,
    calculated_total_payments
FROM programs";

const INITIATIVE_SELECT_SQL: &str = "SELECT
    id,
    program_id,
    name_i18n,
    description_i18n,
    planning_status_code,
    progress_status_code,
    planned_total_budget,
    calculated_total_budget,
    calculated_total_payments
FROM initiatives";

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    initiative_id,
    name_i18n,
    description_i18n,
    planning_status_code,
    progress_status_code,
    planned_total_budget,
    calculated_total_budget,
    calculated_total_payments,
    actual_cost,
    calculated_progress_percent,
    end_date
FROM projects";

/// Read access to the six-level planning hierarchy.
pub trait HierarchyRepository {
    /// Loads one strategy by id.
    fn find_strategy(&self, id: StrategyId) -> RepoResult<Option<Strategy>>;
    /// Lists every strategy ordered by id.
    fn list_strategies(&self) -> RepoResult<Vec<Strategy>>;
    /// Lists perspectives under any of `strategy_ids`.
    fn list_perspectives(&self, strategy_ids: &[StrategyId]) -> RepoResult<Vec<Perspective>>;
    /// Lists goals under any of `perspective_ids`.
    fn list_goals(&self, perspective_ids: &[PerspectiveId]) -> RepoResult<Vec<Goal>>;
    /// Lists programs under any of `goal_ids`.
    fn list_programs(&self, goal_ids: &[GoalId]) -> RepoResult<Vec<Program>>;
    /// Lists initiatives under any of `program_ids`.
    fn list_initiatives(&self, program_ids: &[ProgramId]) -> RepoResult<Vec<Initiative>>;
    /// Lists projects under any of `initiative_ids`.
    fn list_projects(&self, initiative_ids: &[InitiativeId]) -> RepoResult<Vec<Project>>;
    /// Loads the projects whose id is in `ids`, ordered by id.
    fn find_projects(&self, ids: &[ProjectId]) -> RepoResult<Vec<Project>>;

    /// Loads one project by id.
    fn find_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        Ok(self.find_projects(&[id])?.into_iter().next())
    }
}

/// SQLite-backed hierarchy repository.
pub struct SqliteHierarchyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHierarchyRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &hierarchy_tables())?;
        Ok(Self { conn })
    }
}

impl HierarchyRepository for SqliteHierarchyRepository<'_> {
    fn find_strategy(&self, id: StrategyId) -> RepoResult<Option<Strategy>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STRATEGY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_strategy_row(row)?));
        }
        Ok(None)
    }

    fn list_strategies(&self) -> RepoResult<Vec<Strategy>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STRATEGY_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_strategy_row(row)?);
        }
        Ok(items)
    }

    fn list_perspectives(&self, strategy_ids: &[StrategyId]) -> RepoResult<Vec<Perspective>> {
        let ids: Vec<i64> = strategy_ids.iter().map(|id| id.get()).collect();
        query_by_ids(
            self.conn,
            PERSPECTIVE_SELECT_SQL,
            "strategy_id",
            &ids,
            parse_perspective_row,
        )
    }

    fn list_goals(&self, perspective_ids: &[PerspectiveId]) -> RepoResult<Vec<Goal>> {
        let ids: Vec<i64> = perspective_ids.iter().map(|id| id.get()).collect();
        query_by_ids(
            self.conn,
            GOAL_SELECT_SQL,
            "perspective_id",
            &ids,
            parse_goal_row,
        )
    }

    fn list_programs(&self, goal_ids: &[GoalId]) -> RepoResult<Vec<Program>> {
        let ids: Vec<i64> = goal_ids.iter().map(|id| id.get()).collect();
        query_by_ids(
            self.conn,
            PROGRAM_SELECT_SQL,
            "goal_id",
            &ids,
            parse_program_row,
        )
    }

    fn list_initiatives(&self, program_ids: &[ProgramId]) -> RepoResult<Vec<Initiative>> {
        let ids: Vec<i64> = program_ids.iter().map(|id| id.get()).collect();
        query_by_ids(
            self.conn,
            INITIATIVE_SELECT_SQL,
            "program_id",
            &ids,
            parse_initiative_row,
        )
    }

    fn list_projects(&self, initiative_ids: &[InitiativeId]) -> RepoResult<Vec<Project>> {
        let ids: Vec<i64> = initiative_ids.iter().map(|id| id.get()).collect();
        query_by_ids(
            self.conn,
            PROJECT_SELECT_SQL,
            "initiative_id",
            &ids,
            parse_project_row,
        )
    }

    fn find_projects(&self, ids: &[ProjectId]) -> RepoResult<Vec<Project>> {
        let ids: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        query_by_ids(self.conn, PROJECT_SELECT_SQL, "id", &ids, parse_project_row)
    }
}

/// Runs `select_sql WHERE key_column IN (...)` over `ids` in chunks.
///
/// Rows are returned ordered by `key_column, id` across all chunks.
fn query_by_ids<T>(
    conn: &Connection,
    select_sql: &str,
    key_column: &str,
    ids: &[i64],
    parse: fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut unique: Vec<i64> = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();

    let mut items = Vec::new();
    for chunk in unique.chunks(MAX_IDS_PER_QUERY) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!(
            "{select_sql}
             WHERE {key_column} IN ({placeholders})
             ORDER BY {key_column} ASC, id ASC;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(chunk.iter().map(|id| Value::Integer(*id))))?;
        while let Some(row) = rows.next()? {
            items.push(parse(row)?);
        }
    }
    Ok(items)
}

fn parse_strategy_row(row: &Row<'_>) -> RepoResult<Strategy> {
    Ok(Strategy {
        id: StrategyId(row.get("id")?),
        details: parse_node_details(row, "strategies")?,
    })
}

fn parse_perspective_row(row: &Row<'_>) -> RepoResult<Perspective> {
    Ok(Perspective {
        id: PerspectiveId(row.get("id")?),
        strategy_id: StrategyId(row.get("strategy_id")?),
        details: parse_node_details(row, "perspectives")?,
    })
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    Ok(Goal {
        id: GoalId(row.get("id")?),
        perspective_id: PerspectiveId(row.get("perspective_id")?),
        progress_status: StatusCode::new(row.get::<_, String>("progress_status_code")?),
        details: parse_node_details(row, "goals")?,
    })
}

fn parse_program_row(row: &Row<'_>) -> RepoResult<Program> {
    Ok(Program {
        id: ProgramId(row.get("id")?),
        goal_id: GoalId(row.get("goal_id")?),
        progress_status: StatusCode::new(row.get::<_, String>("progress_status_code")?),
        details: parse_node_details(row, "programs")?,
    })
}

fn parse_initiative_row(row: &Row<'_>) -> RepoResult<Initiative> {
    Ok(Initiative {
        id: InitiativeId(row.get("id")?),
        program_id: ProgramId(row.get("program_id")?),
        progress_status: StatusCode::new(row.get::<_, String>("progress_status_code")?),
        details: parse_node_details(row, "initiatives")?,
    })
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    Ok(Project {
        id: ProjectId(row.get("id")?),
        initiative_id: InitiativeId(row.get("initiative_id")?),
        progress_status: StatusCode::new(row.get::<_, String>("progress_status_code")?),
        details: parse_node_details(row, "projects")?,
        actual_cost: parse_optional_decimal(row, "actual_cost", "projects")?,
        calculated_progress_percent: parse_optional_decimal(
            row,
            "calculated_progress_percent",
            "projects",
        )?,
        end_date: parse_optional_date(row, "end_date", "projects")?,
    })
}

fn level_table(name: &'static str, columns: &'static [&'static str]) -> RequiredTable {
    RequiredTable {
        name,
        columns,
        node_level: true,
    }
}

fn hierarchy_tables() -> [RequiredTable; 6] {
    [
        level_table("strategies", &[]),
        level_table("perspectives", &["strategy_id"]),
        level_table("goals", &["perspective_id", "progress_status_code"]),
        level_table("programs", &["goal_id", "progress_status_code"]),
        level_table("initiatives", &["program_id", "progress_status_code"]),
        level_table(
            "projects",
            &[
                "initiative_id",
                "progress_status_code",
                "actual_cost",
                "calculated_progress_percent",
                "end_date",
            ],
        ),
    ]
}

impl<T: HierarchyRepository + ?Sized> HierarchyRepository for &T {
    fn find_strategy(&self, id: StrategyId) -> RepoResult<Option<Strategy>> {
        (**self).find_strategy(id)
    }

    fn list_strategies(&self) -> RepoResult<Vec<Strategy>> {
        (**self).list_strategies()
    }

    fn list_perspectives(&self, strategy_ids: &[StrategyId]) -> RepoResult<Vec<Perspective>> {
        (**self).list_perspectives(strategy_ids)
    }

    fn list_goals(&self, perspective_ids: &[PerspectiveId]) -> RepoResult<Vec<Goal>> {
        (**self).list_goals(perspective_ids)
    }

    fn list_programs(&self, goal_ids: &[GoalId]) -> RepoResult<Vec<Program>> {
        (**self).list_programs(goal_ids)
    }

    fn list_initiatives(&self, program_ids: &[ProgramId]) -> RepoResult<Vec<Initiative>> {
        (**self).list_initiatives(program_ids)
    }

    fn list_projects(&self, initiative_ids: &[InitiativeId]) -> RepoResult<Vec<Project>> {
        (**self).list_projects(initiative_ids)
    }

    fn find_projects(&self, ids: &[ProjectId]) -> RepoResult<Vec<Project>> {
        (**self).find_projects(ids)
    }
}
