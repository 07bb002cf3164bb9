mod common;

use common::{insert_payment, memory_db, seed_reference_strategy, today};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;
use stratplan_core::{
    AnalyticsError, AnalyticsService, GoalId, PaymentOwner, PaymentRepository, ProjectId,
    RepoError, SqliteHierarchyRepository, SqlitePaymentRepository,
};

const P1: &str = "00000000-0000-4000-8000-000000000001";
const P2: &str = "00000000-0000-4000-8000-000000000002";
const P3: &str = "00000000-0000-4000-8000-000000000003";
const P4: &str = "00000000-0000-4000-8000-000000000004";

fn service(
    conn: &Connection,
) -> AnalyticsService<SqliteHierarchyRepository<'_>, SqlitePaymentRepository<'_>> {
    AnalyticsService::new(
        SqliteHierarchyRepository::try_new(conn).unwrap(),
        SqlitePaymentRepository::try_new(conn).unwrap(),
        "en",
    )
    .with_today(today())
}

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

fn seed_payments(conn: &Connection) {
    insert_payment(
        conn,
        P3,
        "PROJECT",
        50,
        "2026-03-10",
        "12.5",
        "2026-03-10T12:00:00Z",
        r#"{"en":"Second March"}"#,
    );
    insert_payment(
        conn,
        P1,
        "PROJECT",
        50,
        "2026-02-01",
        "40",
        "2026-02-01T09:00:00Z",
        r#"{"en":"Deposit","ar":"دفعة"}"#,
    );
    insert_payment(
        conn,
        P2,
        "PROJECT",
        50,
        "2026-03-10",
        "7.5",
        "2026-03-10T08:00:00Z",
        "{}",
    );
    insert_payment(
        conn,
        P4,
        "PROJECT",
        51,
        "2026-01-15",
        "5",
        "2026-01-15T10:00:00+03:00",
        "{}",
    );
}

#[test]
fn project_without_payments_has_zero_budget() {
    let conn = memory_db();
    seed_reference_strategy(&conn, "OK", "OK");

    let details = service(&conn).project_spending(ProjectId(51), "en").unwrap();

    assert_eq!(details.summary.payment_budget, Decimal::ZERO);
    assert_eq!(details.summary.planned_total_budget, dec("50"));
    assert!(details.payments.is_empty());
    assert_eq!(details.project_name, "Unknown Project");
}

#[test]
fn payments_are_ordered_with_running_totals() {
    let conn = memory_db();
    seed_reference_strategy(&conn, "OK", "OK");
    seed_payments(&conn);

    let details = service(&conn).project_spending(ProjectId(50), "ar").unwrap();

    assert_eq!(details.project_name, "Port Expansion");
    let ids: Vec<String> = details.payments.iter().map(|p| p.id.to_string()).collect();
    assert_eq!(ids, vec![P1, P2, P3]);
    let running: Vec<Decimal> = details.payments.iter().map(|p| p.cumulative_amount).collect();
    assert_eq!(running, vec![dec("40"), dec("47.5"), dec("60")]);
    assert_eq!(details.summary.payment_budget, dec("60"));
    assert_eq!(details.summary.planned_total_budget, dec("100"));

    assert_eq!(details.payments[0].notes.as_deref(), Some("دفعة"));
    assert_eq!(details.payments[0].default_notes.as_deref(), Some("Deposit"));
    assert_eq!(details.payments[1].notes, None);
    assert_eq!(details.payments[2].notes.as_deref(), Some("Second March"));
    assert_eq!(details.payments[0].created_by.as_deref(), Some("finance"));
}

#[test]
fn spending_series_has_one_point_per_date() {
    let conn = memory_db();
    seed_reference_strategy(&conn, "OK", "OK");
    seed_payments(&conn);

    let series = service(&conn)
        .project_spending(ProjectId(50), "en")
        .unwrap()
        .spending_series();

    let points: Vec<(String, Decimal)> = series
        .iter()
        .map(|point| (point.date.to_string(), point.cumulative_actual))
        .collect();
    assert_eq!(
        points,
        vec![
            ("2026-02-01".to_string(), dec("40")),
            ("2026-03-10".to_string(), dec("60")),
        ]
    );
    assert!(series.iter().all(|point| point.planned_total == dec("100")));
}

#[test]
fn bulk_spending_follows_requested_order() {
    let conn = memory_db();
    seed_reference_strategy(&conn, "OK", "OK");
    seed_payments(&conn);

    let items = service(&conn)
        .projects_spending(&[ProjectId(51), ProjectId(50), ProjectId(51)], "en")
        .unwrap();

    let summary: Vec<(ProjectId, Decimal)> = items
        .iter()
        .map(|item| (item.project_id, item.summary.payment_budget))
        .collect();
    assert_eq!(
        summary,
        vec![(ProjectId(51), dec("5")), (ProjectId(50), dec("60"))]
    );
}

#[test]
fn unknown_project_is_not_found() {
    let conn = memory_db();
    seed_reference_strategy(&conn, "OK", "OK");
    let svc = service(&conn);

    let single = svc.project_spending(ProjectId(404), "en").unwrap_err();
    let bulk = svc
        .projects_spending(&[ProjectId(50), ProjectId(404)], "en")
        .unwrap_err();

    assert!(matches!(single, AnalyticsError::ProjectNotFound(ProjectId(404))));
    assert!(matches!(bulk, AnalyticsError::ProjectNotFound(ProjectId(404))));
}

#[test]
fn payments_owned_by_other_levels_do_not_count() {
    let conn = memory_db();
    seed_reference_strategy(&conn, "OK", "OK");
    insert_payment(
        &conn,
        P1,
        "GOAL",
        50,
        "2026-02-01",
        "99",
        "2026-02-01T09:00:00Z",
        "{}",
    );

    let details = service(&conn).project_spending(ProjectId(50), "en").unwrap();
    assert!(details.payments.is_empty());

    let repo = SqlitePaymentRepository::try_new(&conn).unwrap();
    let goal_payments = repo.list_payments(PaymentOwner::Goal(GoalId(50))).unwrap();
    assert_eq!(goal_payments.len(), 1);
    assert_eq!(goal_payments[0].amount, dec("99"));
}

#[test]
fn malformed_amount_is_invalid_data() {
    let conn = memory_db();
    seed_reference_strategy(&conn, "OK", "OK");
    insert_payment(
        &conn,
        P1,
        "PROJECT",
        50,
        "2026-02-01",
        "forty",
        "2026-02-01T09:00:00Z",
        "{}",
    );

    let err = service(&conn).project_spending(ProjectId(50), "en").unwrap_err();

    assert!(matches!(err, AnalyticsError::Repo(RepoError::InvalidData(_))));
}
