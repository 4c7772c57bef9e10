// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, LedgerResult, StoreError};
use crate::filter::{Condition, Predicate};
use crate::models::{Category, LedgerRow, Transaction, TransactionType};
use crate::store::{GroupKey, LedgerStore, Measure, Order};
use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Fintrack", "fintrack"));

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn default_db_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("fintrack.sqlite"))
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        color TEXT NOT NULL DEFAULT 'bg-blue-100',
        icon_color TEXT NOT NULL DEFAULT 'text-blue-500',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        deleted_at TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_categories_user ON categories(user_id);

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        category_id INTEGER NOT NULL,
        amount TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense')),
        description TEXT NOT NULL DEFAULT '',
        date TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        deleted_at TEXT,
        FOREIGN KEY(category_id) REFERENCES categories(id)
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);
    "#,
    )
}

/// SQLite-backed ledger.
///
/// Keeps a small stack of idle connections so concurrent aggregate queries
/// each run on their own handle instead of queueing on one.
pub struct SqliteStore {
    path: PathBuf,
    idle: Mutex<Vec<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = connect(&path)?;
        init_schema(&conn)?;
        debug!(path = %path.display(), "opened ledger store");
        Ok(Self {
            path,
            idle: Mutex::new(vec![conn]),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn checkout(&self) -> Result<Connection, StoreError> {
        let pooled = self
            .idle
            .lock()
            .map_err(|_| StoreError::Unavailable("connection pool poisoned".into()))?
            .pop();
        match pooled {
            Some(conn) => Ok(conn),
            None => connect(&self.path),
        }
    }

    fn checkin(&self, conn: Connection) {
        if let Ok(mut idle) = self.idle.lock() {
            idle.push(conn);
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.checkout()?;
        let out = f(&conn);
        self.checkin(conn);
        out
    }

    /// Names are stored lower-cased and are unique among a user's live
    /// categories.
    pub fn add_category(&self, user_id: i64, name: &str) -> LedgerResult<Category> {
        let name = self.available_name(user_id, name, None)?;
        let id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO categories(user_id, name) VALUES (?1, ?2)",
                params![user_id, name],
            )?;
            Ok(conn.last_insert_rowid())
        })?;
        self.category(user_id, id)?
            .ok_or(LedgerError::NotFound { entity: "Category", id })
    }

    /// Renames a live category. The new name is normalized like on creation.
    pub fn rename_category(&self, user_id: i64, id: i64, name: &str) -> LedgerResult<Category> {
        let name = self.available_name(user_id, name, Some(id))?;
        let n = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE categories SET name=?1, updated_at=datetime('now')
                 WHERE id=?2 AND user_id=?3 AND deleted_at IS NULL",
                params![name, id, user_id],
            )?)
        })?;
        if n == 0 {
            return Err(LedgerError::NotFound { entity: "Category", id });
        }
        self.category(user_id, id)?
            .ok_or(LedgerError::NotFound { entity: "Category", id })
    }

    fn available_name(&self, user_id: i64, name: &str, except: Option<i64>) -> LedgerResult<String> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(LedgerError::Validation(
                "category name cannot be empty".into(),
            ));
        }
        let taken = self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT 1 FROM categories
                     WHERE user_id=?1 AND name=?2 AND id != ?3 AND deleted_at IS NULL",
                    params![user_id, name, except.unwrap_or(0)],
                    |_| Ok(()),
                )
                .optional()?
                .is_some())
        })?;
        if taken {
            return Err(LedgerError::Validation(format!(
                "category name already exists: {}",
                name
            )));
        }
        Ok(name)
    }

    pub fn category(&self, user_id: i64, id: i64) -> LedgerResult<Option<Category>> {
        let cat = self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, user_id, name, color, icon_color FROM categories
                     WHERE id=?1 AND user_id=?2 AND deleted_at IS NULL",
                    params![id, user_id],
                    category_from_row,
                )
                .optional()?;
            Ok(row)
        })?;
        Ok(cat)
    }

    pub fn list_categories(&self, user_id: i64) -> LedgerResult<Vec<Category>> {
        let cats = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, name, color, icon_color FROM categories
                 WHERE user_id=?1 AND deleted_at IS NULL ORDER BY name",
            )?;
            let rows = stmt.query_map(params![user_id], category_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })?;
        Ok(cats)
    }

    /// Soft-deletes a category. Its transactions keep pointing at it and
    /// list with an empty category name afterwards.
    pub fn delete_category(&self, user_id: i64, id: i64) -> LedgerResult<bool> {
        let n = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE categories SET deleted_at=datetime('now')
                 WHERE id=?1 AND user_id=?2 AND deleted_at IS NULL",
                params![id, user_id],
            )?)
        })?;
        Ok(n > 0)
    }

    pub fn add_transaction(&self, user_id: i64, new: &NewTransaction) -> LedgerResult<Transaction> {
        self.validate_entry(user_id, new)?;
        let id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO transactions(user_id, category_id, amount, type, description, date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user_id,
                    new.category_id,
                    new.amount.to_string(),
                    new.kind.as_str(),
                    new.description,
                    new.date.to_string(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;
        self.transaction(id)
    }

    /// Replaces every editable field of a live transaction and bumps
    /// `updated_at`. Validated the same way as [`Self::add_transaction`].
    pub fn update_transaction(
        &self,
        user_id: i64,
        id: i64,
        entry: &NewTransaction,
    ) -> LedgerResult<Transaction> {
        self.validate_entry(user_id, entry)?;
        let n = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE transactions
                 SET category_id=?1, amount=?2, type=?3, description=?4, date=?5,
                     updated_at=datetime('now')
                 WHERE id=?6 AND user_id=?7 AND deleted_at IS NULL",
                params![
                    entry.category_id,
                    entry.amount.to_string(),
                    entry.kind.as_str(),
                    entry.description,
                    entry.date.to_string(),
                    id,
                    user_id,
                ],
            )?)
        })?;
        if n == 0 {
            return Err(LedgerError::NotFound {
                entity: "Transaction",
                id,
            });
        }
        debug!(id, user_id, "updated transaction");
        self.transaction(id)
    }

    fn validate_entry(&self, user_id: i64, entry: &NewTransaction) -> LedgerResult<()> {
        if entry.amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(
                "amount must be greater than 0".into(),
            ));
        }
        if self.category(user_id, entry.category_id)?.is_none() {
            return Err(LedgerError::NotFound {
                entity: "Category",
                id: entry.category_id,
            });
        }
        Ok(())
    }

    fn transaction(&self, id: i64) -> LedgerResult<Transaction> {
        let raw = self.with_conn(|conn| {
            Ok(conn.query_row(
                &format!("SELECT {TX_COLUMNS}, '' FROM transactions t WHERE t.id=?1"),
                params![id],
                RawRow::read,
            )?)
        })?;
        Ok(raw.into_row()?.transaction)
    }

    /// Soft delete. Returns false when nothing live matched.
    pub fn delete_transaction(&self, user_id: i64, id: i64) -> LedgerResult<bool> {
        let n = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE transactions SET deleted_at=datetime('now'), updated_at=datetime('now')
                 WHERE id=?1 AND user_id=?2 AND deleted_at IS NULL",
                params![id, user_id],
            )?)
        })?;
        Ok(n > 0)
    }

    /// Live transactions whose category join misses: the category is gone,
    /// soft-deleted, or owned by someone else.
    pub fn orphaned_transactions(&self, user_id: i64) -> LedgerResult<Vec<Orphan>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.date, t.category_id,
                    CASE
                        WHEN c.id IS NULL THEN 'missing_category'
                        WHEN c.deleted_at IS NOT NULL THEN 'deleted_category'
                        ELSE 'foreign_category'
                    END
                 FROM transactions t LEFT JOIN categories c ON c.id = t.category_id
                 WHERE t.user_id=?1 AND t.deleted_at IS NULL
                   AND (c.id IS NULL OR c.deleted_at IS NOT NULL OR c.user_id != t.user_id)
                 ORDER BY t.date, t.id",
            )?;
            let rows = stmt.query_map(params![user_id], |r| {
                Ok(Orphan {
                    transaction_id: r.get(0)?,
                    date: r.get(1)?,
                    category_id: r.get(2)?,
                    issue: r.get(3)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })?;
        Ok(rows)
    }
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub category_id: i64,
    pub amount: Decimal,
    pub kind: TransactionType,
    pub description: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Orphan {
    pub transaction_id: i64,
    pub date: NaiveDate,
    pub category_id: i64,
    pub issue: String,
}

fn connect(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

fn category_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        color: r.get(3)?,
        icon_color: r.get(4)?,
    })
}

const TX_COLUMNS: &str = "t.id, t.user_id, t.category_id, t.amount, t.type, t.description, \
     t.date, t.created_at, t.updated_at, t.deleted_at";

const JOIN_CATEGORY: &str =
    "LEFT JOIN categories c ON c.id = t.category_id AND c.deleted_at IS NULL";

/// Column values as SQLite hands them back, before amount/type decoding.
struct RawRow {
    id: i64,
    user_id: i64,
    category_id: i64,
    amount: String,
    kind: String,
    description: String,
    date: NaiveDate,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    deleted_at: Option<NaiveDateTime>,
    category: String,
}

impl RawRow {
    fn read(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            user_id: r.get(1)?,
            category_id: r.get(2)?,
            amount: r.get(3)?,
            kind: r.get(4)?,
            description: r.get(5)?,
            date: r.get(6)?,
            created_at: r.get(7)?,
            updated_at: r.get(8)?,
            deleted_at: r.get(9)?,
            category: r.get(10)?,
        })
    }

    fn into_row(self) -> Result<LedgerRow, StoreError> {
        let amount = parse_amount(&self.amount)?;
        let kind = self
            .kind
            .parse::<TransactionType>()
            .map_err(|_| StoreError::Decode {
                column: "type",
                value: self.kind.clone(),
            })?;
        Ok(LedgerRow {
            transaction: Transaction {
                id: self.id,
                user_id: self.user_id,
                category_id: self.category_id,
                amount,
                kind,
                description: self.description,
                date: self.date,
                created_at: self.created_at,
                updated_at: self.updated_at,
                deleted_at: self.deleted_at,
            },
            category: self.category,
        })
    }
}

/// `WHERE` clause plus bound values for a predicate. Soft-deleted rows are
/// always excluded.
fn where_clause(predicate: &Predicate) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE t.deleted_at IS NULL");
    let mut values = Vec::new();
    for cond in predicate.conditions() {
        match cond {
            Condition::User(id) => {
                sql.push_str(" AND t.user_id = ?");
                values.push(Value::Integer(*id));
            }
            Condition::DateFrom(d) => {
                sql.push_str(" AND t.date >= ?");
                values.push(Value::Text(d.to_string()));
            }
            Condition::DateTo(d) => {
                sql.push_str(" AND t.date <= ?");
                values.push(Value::Text(d.to_string()));
            }
            Condition::Category(id) => {
                sql.push_str(" AND t.category_id = ?");
                values.push(Value::Integer(*id));
            }
            Condition::Kind(k) => {
                sql.push_str(" AND t.type = ?");
                values.push(Value::Text(k.clone()));
            }
        }
    }
    (sql, values)
}

fn parse_amount(raw: &str) -> Result<Decimal, StoreError> {
    raw.parse::<Decimal>().map_err(|_| StoreError::Decode {
        column: "amount",
        value: raw.to_string(),
    })
}

/// Adds a stored amount to a running total without leaving `Decimal`.
fn accumulate(total: Decimal, raw: &str, negate: bool) -> Result<Decimal, StoreError> {
    let amount = parse_amount(raw)?;
    let amount = if negate { -amount } else { amount };
    total
        .checked_add(amount)
        .ok_or(StoreError::Overflow("amount"))
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl LedgerStore for SqliteStore {
    fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let (clause, values) = where_clause(predicate);
        let sql = format!("SELECT COUNT(*) FROM transactions t{clause}");
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(&sql, params_from_iter(values), |r| r.get(0))?;
            Ok(u64::try_from(n).unwrap_or_default())
        })
    }

    fn sum(&self, predicate: &Predicate, measure: Measure) -> Result<Decimal, StoreError> {
        let (clause, values) = where_clause(predicate);
        let sql = format!("SELECT t.type, t.amount FROM transactions t{clause}");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(values))?;
            let mut total = Decimal::ZERO;
            while let Some(row) = rows.next()? {
                let kind: String = row.get(0)?;
                let amount: String = row.get(1)?;
                let negate = measure == Measure::Signed && kind != TransactionType::Income.as_str();
                total = accumulate(total, &amount, negate)?;
            }
            Ok(total)
        })
    }

    fn find(
        &self,
        predicate: &Predicate,
        order: Order,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<LedgerRow>, StoreError> {
        let order_by = match order {
            Order::DateDesc | Order::SumDesc => "t.date DESC, t.id DESC",
            Order::KeyAsc => "t.date ASC, t.id ASC",
        };
        let (clause, mut values) = where_clause(predicate);
        values.push(Value::Integer(to_i64(limit)));
        values.push(Value::Integer(to_i64(offset)));
        let sql = format!(
            "SELECT {TX_COLUMNS}, COALESCE(c.name, '') FROM transactions t {JOIN_CATEGORY}{clause}
             ORDER BY {order_by} LIMIT ? OFFSET ?"
        );
        let raws = self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), RawRow::read)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })?;
        raws.into_iter().map(RawRow::into_row).collect()
    }

    fn group_sum(
        &self,
        predicate: &Predicate,
        key: GroupKey,
        order: Order,
        limit: Option<usize>,
    ) -> Result<Vec<(String, Decimal)>, StoreError> {
        let key_expr = match key {
            GroupKey::CategoryName => "COALESCE(c.name, '')",
            GroupKey::Month => "substr(t.date, 1, 7)",
        };
        let (clause, values) = where_clause(predicate);
        let sql = format!(
            "SELECT {key_expr}, t.amount FROM transactions t {JOIN_CATEGORY}{clause}"
        );
        let totals = self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(values))?;
            let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
            while let Some(row) = rows.next()? {
                let k: String = row.get(0)?;
                let amount: String = row.get(1)?;
                let entry = totals.entry(k).or_default();
                *entry = accumulate(*entry, &amount, false)?;
            }
            Ok(totals)
        })?;

        let mut groups: Vec<(String, Decimal)> = totals.into_iter().collect();
        if order == Order::SumDesc {
            groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        }
        if let Some(n) = limit {
            groups.truncate(n);
        }
        Ok(groups)
    }
}
