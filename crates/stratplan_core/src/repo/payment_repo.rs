//! Payment ledger repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read payment transactions for one owner or a set of projects.
//! - Translate `(entity_type, entity_id)` storage pairs into `PaymentOwner`.
//!
//! # Invariants
//! - Listing order is deterministic: `payment_date ASC, created_at ASC, id ASC`.
//! - Rows with an unknown owner tag are rejected as invalid data.

use super::row::{parse_date, parse_decimal, parse_locale_map, parse_timestamp, parse_uuid};
use super::schema::{ensure_connection_ready, RequiredTable};
use super::{RepoError, RepoResult};
use crate::model::node::{NodeLevel, ProjectId};
use crate::model::payment::{entity_type_for, PaymentOwner, PaymentTransaction};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const MAX_IDS_PER_QUERY: usize = 500;

const PAYMENT_SELECT_SQL: &str = "SELECT
    id,
    entity_id,
    entity_type,
    payment_date,
    amount,
    notes_i18n,
    created_by,
    created_at
FROM payment_transactions";

const PAYMENT_COLUMNS: &[&str] = &[
    "id",
    "entity_id",
    "entity_type",
    "payment_date",
    "amount",
    "notes_i18n",
    "created_by",
    "created_at",
];

/// Read access to the payment ledger.
pub trait PaymentRepository {
    /// Lists payments owned by `owner`.
    fn list_payments(&self, owner: PaymentOwner) -> RepoResult<Vec<PaymentTransaction>>;
    /// Lists payments owned by any project in `project_ids`.
    fn list_project_payments(
        &self,
        project_ids: &[ProjectId],
    ) -> RepoResult<Vec<PaymentTransaction>>;
}

/// SQLite-backed payment repository.
pub struct SqlitePaymentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePaymentRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[RequiredTable {
                name: "payment_transactions",
                columns: PAYMENT_COLUMNS,
                node_level: false,
            }],
        )?;
        Ok(Self { conn })
    }
}

impl PaymentRepository for SqlitePaymentRepository<'_> {
    fn list_payments(&self, owner: PaymentOwner) -> RepoResult<Vec<PaymentTransaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PAYMENT_SELECT_SQL}
             WHERE entity_type = ?1
               AND entity_id = ?2
             ORDER BY payment_date ASC, created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![owner.entity_type(), owner.entity_id()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_payment_row(row)?);
        }
        Ok(items)
    }

    fn list_project_payments(
        &self,
        project_ids: &[ProjectId],
    ) -> RepoResult<Vec<PaymentTransaction>> {
        let mut ids: Vec<i64> = project_ids.iter().map(|id| id.get()).collect();
        ids.sort_unstable();
        ids.dedup();

        let mut items = Vec::new();
        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "{PAYMENT_SELECT_SQL}
                 WHERE entity_type = ?
                   AND entity_id IN ({placeholders})
                 ORDER BY payment_date ASC, created_at ASC, id ASC;"
            );
            let mut bind_values = Vec::with_capacity(chunk.len() + 1);
            bind_values.push(Value::Text(
                entity_type_for(NodeLevel::Project).to_string(),
            ));
            bind_values.extend(chunk.iter().map(|id| Value::Integer(*id)));

            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            while let Some(row) = rows.next()? {
                items.push(parse_payment_row(row)?);
            }
        }
        Ok(items)
    }
}

fn parse_payment_row(row: &Row<'_>) -> RepoResult<PaymentTransaction> {
    const TABLE: &str = "payment_transactions";

    let id_text: String = row.get("id")?;
    let entity_type: String = row.get("entity_type")?;
    let entity_id: i64 = row.get("entity_id")?;
    let owner = PaymentOwner::from_parts(&entity_type, entity_id).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid entity type `{entity_type}` in {TABLE}.entity_type"
        ))
    })?;
    let date_text: String = row.get("payment_date")?;
    let amount_text: String = row.get("amount")?;
    let created_at_text: String = row.get("created_at")?;

    Ok(PaymentTransaction {
        id: parse_uuid(&id_text, "id", TABLE)?,
        owner,
        payment_date: parse_date(&date_text, "payment_date", TABLE)?,
        amount: parse_decimal(&amount_text, "amount", TABLE)?,
        notes: parse_locale_map(row, "notes_i18n", TABLE)?,
        created_by: row.get("created_by")?,
        created_at: parse_timestamp(&created_at_text, "created_at", TABLE)?,
    })
}

impl<T: PaymentRepository + ?Sized> PaymentRepository for &T {
    fn list_payments(&self, owner: PaymentOwner) -> RepoResult<Vec<PaymentTransaction>> {
        (**self).list_payments(owner)
    }

    fn list_project_payments(
        &self,
        project_ids: &[ProjectId],
    ) -> RepoResult<Vec<PaymentTransaction>> {
        (**self).list_project_payments(project_ids)
    }
}
