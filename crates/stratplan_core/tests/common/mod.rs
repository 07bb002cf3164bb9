#![allow(dead_code)]

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::path::Path;
use stratplan_core::db::migrations::apply_migrations;
use stratplan_core::open_db_in_memory;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 20).unwrap()
}

pub fn memory_db() -> Connection {
    open_db_in_memory().unwrap()
}

/// Writes the full planning schema into a database file the way the owning
/// application provisions it. Returns the writable fixture connection.
pub fn provision_file_db(path: &Path) -> Connection {
    let mut conn = Connection::open(path).unwrap();
    apply_migrations(&mut conn).unwrap();
    conn
}

pub fn insert_strategy(conn: &Connection, id: i64, names: &str) {
    conn.execute(
        "INSERT INTO strategies (id, name_i18n, planning_status_code) VALUES (?1, ?2, 'OK');",
        params![id, names],
    )
    .unwrap();
}

pub fn insert_perspective(conn: &Connection, id: i64, strategy_id: i64, planning: &str) {
    conn.execute(
        "INSERT INTO perspectives (id, strategy_id, planning_status_code) VALUES (?1, ?2, ?3);",
        params![id, strategy_id, planning],
    )
    .unwrap();
}

pub fn insert_goal(conn: &Connection, id: i64, perspective_id: i64, progress: &str) {
    conn.execute(
        "INSERT INTO goals (id, perspective_id, planning_status_code, progress_status_code)
         VALUES (?1, ?2, 'OK', ?3);",
        params![id, perspective_id, progress],
    )
    .unwrap();
}

pub fn insert_program(conn: &Connection, id: i64, goal_id: i64) {
    conn.execute(
        "INSERT INTO programs (id, goal_id, planning_status_code, progress_status_code)
         VALUES (?1, ?2, 'OK', 'OK');",
        params![id, goal_id],
    )
    .unwrap();
}

pub fn insert_initiative(conn: &Connection, id: i64, program_id: i64, planning: &str) {
    conn.execute(
        "INSERT INTO initiatives (id, program_id, planning_status_code, progress_status_code)
         VALUES (?1, ?2, ?3, 'OK');",
        params![id, program_id, planning],
    )
    .unwrap();
}

/// Project row fixture; decimals are given as text the way they are stored.
pub struct ProjectRow<'a> {
    pub id: i64,
    pub initiative_id: i64,
    pub names: &'a str,
    pub progress_status: &'a str,
    pub progress_percent: Option<&'a str>,
    pub planned_budget: Option<&'a str>,
    pub actual_cost: Option<&'a str>,
    pub end_date: Option<&'a str>,
}

impl<'a> ProjectRow<'a> {
    pub fn new(id: i64, initiative_id: i64) -> Self {
        Self {
            id,
            initiative_id,
            names: "{}",
            progress_status: "OK",
            progress_percent: None,
            planned_budget: None,
            actual_cost: None,
            end_date: None,
        }
    }
}

pub fn insert_project(conn: &Connection, row: ProjectRow<'_>) {
    conn.execute(
        "INSERT INTO projects (
            id, initiative_id, name_i18n, planning_status_code, progress_status_code,
            calculated_progress_percent, planned_total_budget, actual_cost, end_date
         ) VALUES (?1, ?2, ?3, 'OK', ?4, ?5, ?6, ?7, ?8);",
        params![
            row.id,
            row.initiative_id,
            row.names,
            row.progress_status,
            row.progress_percent,
            row.planned_budget,
            row.actual_cost,
            row.end_date
        ],
    )
    .unwrap();
}

pub fn insert_payment(
    conn: &Connection,
    id: &str,
    entity_type: &str,
    entity_id: i64,
    payment_date: &str,
    amount: &str,
    created_at: &str,
    notes: &str,
) {
    conn.execute(
        "INSERT INTO payment_transactions (
            id, entity_id, entity_type, payment_date, amount, notes_i18n, created_by, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'finance', ?7);",
        params![id, entity_id, entity_type, payment_date, amount, notes, created_at],
    )
    .unwrap();
}

/// Strategy 1 ("Growth") with one chain down to initiative 40 and two
/// projects, every ancestor status `OK`:
/// - project 50: 80% done, budget 100, cost 90, ended yesterday
/// - project 51: 60% done, budget 50, cost 50, no end date
pub fn seed_reference_strategy(conn: &Connection, first_status: &str, second_status: &str) {
    insert_strategy(conn, 1, r#"{"en":"Growth","ar":"نمو"}"#);
    insert_perspective(conn, 10, 1, "OK");
    insert_goal(conn, 20, 10, "OK");
    insert_program(conn, 30, 20);
    insert_initiative(conn, 40, 30, "OK");
    insert_project(
        conn,
        ProjectRow {
            names: r#"{"en":"Port Expansion"}"#,
            progress_status: first_status,
            progress_percent: Some("80"),
            planned_budget: Some("100"),
            actual_cost: Some("90"),
            end_date: Some("2026-05-19"),
            ..ProjectRow::new(50, 40)
        },
    );
    insert_project(
        conn,
        ProjectRow {
            progress_status: second_status,
            progress_percent: Some("60"),
            planned_budget: Some("50"),
            actual_cost: Some("50"),
            ..ProjectRow::new(51, 40)
        },
    );
}
