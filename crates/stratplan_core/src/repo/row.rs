//! Column decoding helpers shared by the SQLite repositories.
//!
//! # Invariants
//! - Decimals are TEXT and must parse exactly; blank text reads as null.
//! - Dates are ISO `YYYY-MM-DD` TEXT.
//! - Locale maps are JSON objects of string to string.

use super::{RepoError, RepoResult};
use crate::model::locale::LocalizedText;
use crate::model::node::{BudgetFigures, NodeDetails};
use crate::model::status::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rusqlite::Row;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

/// Columns every level table shares, in select order.
pub(crate) const NODE_COLUMNS: &[&str] = &[
    "id",
    "name_i18n",
    "description_i18n",
    "planning_status_code",
    "planned_total_budget",
    "calculated_total_budget",
    "calculated_total_payments",
];

pub(crate) fn parse_node_details(row: &Row<'_>, table: &str) -> RepoResult<NodeDetails> {
    Ok(NodeDetails {
        names: parse_locale_map(row, "name_i18n", table)?,
        descriptions: parse_locale_map(row, "description_i18n", table)?,
        planning_status: StatusCode::new(row.get::<_, String>("planning_status_code")?),
        budget: BudgetFigures {
            planned_total_budget: parse_optional_decimal(row, "planned_total_budget", table)?,
            calculated_total_budget: parse_optional_decimal(
                row,
                "calculated_total_budget",
                table,
            )?,
            calculated_total_payments: parse_optional_decimal(
                row,
                "calculated_total_payments",
                table,
            )?,
        },
    })
}

pub(crate) fn parse_optional_decimal(
    row: &Row<'_>,
    column: &str,
    table: &str,
) -> RepoResult<Option<Decimal>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) if !text.trim().is_empty() => parse_decimal(&text, column, table).map(Some),
        _ => Ok(None),
    }
}

pub(crate) fn parse_decimal(text: &str, column: &str, table: &str) -> RepoResult<Decimal> {
    Decimal::from_str(text.trim()).map_err(|_| {
        RepoError::InvalidData(format!("invalid decimal `{text}` in {table}.{column}"))
    })
}

pub(crate) fn parse_optional_date(
    row: &Row<'_>,
    column: &str,
    table: &str,
) -> RepoResult<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) if !text.trim().is_empty() => parse_date(&text, column, table).map(Some),
        _ => Ok(None),
    }
}

pub(crate) fn parse_date(text: &str, column: &str, table: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{text}` in {table}.{column}")))
}

pub(crate) fn parse_timestamp(text: &str, column: &str, table: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| {
            RepoError::InvalidData(format!("invalid timestamp `{text}` in {table}.{column}"))
        })
}

pub(crate) fn parse_uuid(text: &str, column: &str, table: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{text}` in {table}.{column}")))
}

pub(crate) fn parse_locale_map(
    row: &Row<'_>,
    column: &str,
    table: &str,
) -> RepoResult<LocalizedText> {
    let raw: String = row.get(column)?;
    if raw.trim().is_empty() {
        return Ok(LocalizedText::new());
    }
    serde_json::from_str::<BTreeMap<String, String>>(&raw)
        .map(LocalizedText::from)
        .map_err(|err| {
            RepoError::InvalidData(format!("invalid locale map in {table}.{column}: {err}"))
        })
}
