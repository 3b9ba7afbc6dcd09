mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::{params, Connection, Row};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

const TRANSACTION_COLUMNS: &str =
    "id, date, category, description, amount, import_hash, created_at";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        debug!("Opening database: {}", path.display());
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            debug!("Fresh database, applying schema v{}", schema::CURRENT_VERSION);
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                debug!("Applying migration from v{from_version}");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(&self, txn: &Transaction) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO transactions (date, category, description, amount, import_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                txn.date.map(|d| d.format(DATE_FORMAT).to_string()),
                txn.category,
                txn.description,
                txn.amount.map(|a| a.to_string()),
                txn.import_hash,
                txn.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert a batch in one transaction, skipping rows whose import hash
    /// is already present. Returns the number of rows inserted.
    pub(crate) fn insert_transactions_batch(&mut self, txns: &[Transaction]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut count = 0;
        for txn in txns {
            if !txn.import_hash.is_empty() {
                let exists: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM transactions WHERE import_hash = ?1)",
                    params![txn.import_hash],
                    |row| row.get(0),
                )?;
                if exists {
                    continue;
                }
            }
            tx.execute(
                "INSERT INTO transactions (date, category, description, amount, import_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    txn.date.map(|d| d.format(DATE_FORMAT).to_string()),
                    txn.category,
                    txn.description,
                    txn.amount.map(|a| a.to_string()),
                    txn.import_hash,
                    txn.created_at,
                ],
            )?;
            count += 1;
        }
        tx.commit()?;
        info!("Inserted {count} of {} transactions", txns.len());
        Ok(count)
    }

    /// Transactions dated inside `range` (all transactions when `None`),
    /// newest first. Rows without a date only appear when no range is given.
    pub(crate) fn get_transactions(&self, range: Option<&DateRange>) -> Result<Vec<Transaction>> {
        let mut stmt;
        let rows = if let Some(r) = range {
            stmt = self.conn.prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transactions
                 WHERE date >= ?1 AND date <= ?2
                 ORDER BY date DESC, id DESC"
            ))?;
            stmt.query_map(
                params![
                    r.start.format(DATE_FORMAT).to_string(),
                    r.end.format(DATE_FORMAT).to_string()
                ],
                row_to_transaction,
            )?
        } else {
            stmt = self.conn.prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY date DESC, id DESC"
            ))?;
            stmt.query_map([], row_to_transaction)?
        };
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Rows whose date could not be read on import, newest first.
    pub(crate) fn get_undated_transactions(&self) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE date IS NULL ORDER BY id DESC"
        ))?;
        let rows = stmt.query_map([], row_to_transaction)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_transaction_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }

    pub(crate) fn delete_transaction(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Earliest and latest transaction dates, ignoring rows without a date.
    pub(crate) fn get_date_span(&self) -> Result<Option<DateRange>> {
        let (first, last): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(date), MAX(date) FROM transactions WHERE date IS NOT NULL",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let parse = |s: Option<String>| {
            s.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok())
        };
        Ok(match (parse(first), parse(last)) {
            (Some(a), Some(b)) => Some(DateRange::new(a, b)),
            _ => None,
        })
    }

    /// Every category name seen in the ledger or the goal table.
    pub(crate) fn get_used_categories(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT category FROM transactions
             UNION
             SELECT category FROM goals
             ORDER BY 1",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Goals ─────────────────────────────────────────────────

    /// Insert a goal, or replace the limit of an existing one.
    pub(crate) fn upsert_goal(&self, category: &str, monthly_limit: Decimal) -> Result<()> {
        if monthly_limit < Decimal::ZERO {
            anyhow::bail!("Goal limit must not be negative: {monthly_limit}");
        }
        let limit = monthly_limit
            .to_f64()
            .ok_or_else(|| anyhow::anyhow!("Goal limit out of range: {monthly_limit}"))?;
        self.conn.execute(
            "INSERT INTO goals (category, monthly_limit)
             VALUES (?1, ?2)
             ON CONFLICT(category) DO UPDATE SET monthly_limit = excluded.monthly_limit",
            params![category, limit],
        )?;
        info!("Goal set: {category} = {monthly_limit}");
        Ok(())
    }

    pub(crate) fn get_goals(&self) -> Result<Vec<Goal>> {
        let mut stmt = self
            .conn
            .prepare("SELECT category, monthly_limit FROM goals ORDER BY category")?;
        let rows = stmt.query_map([], |row| {
            let limit: f64 = row.get(1)?;
            Ok(Goal::new(
                row.get(0)?,
                Decimal::from_f64(limit)
                    .map(|d| d.normalize())
                    .unwrap_or_default(),
            ))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Every stored goal keyed by category; empty when none are set.
    pub(crate) fn load_goals(&self) -> Result<BTreeMap<String, Decimal>> {
        Ok(self
            .get_goals()?
            .into_iter()
            .map(|g| (g.category, g.monthly_limit))
            .collect())
    }

    pub(crate) fn delete_goal(&self, category: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM goals WHERE category = ?1", params![category])?;
        Ok(changed > 0)
    }
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let date: Option<String> = row.get(1)?;
    let amount: Option<String> = row.get(4)?;
    Ok(Transaction {
        id: Some(row.get(0)?),
        date: date.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
        category: row.get(2)?,
        description: row.get(3)?,
        amount: amount.and_then(|s| Decimal::from_str(&s).ok()),
        import_hash: row.get(5)?,
        created_at: row.get(6)?,
    })
}
