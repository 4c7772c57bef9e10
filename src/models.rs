// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_TOP_EXPENSES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("invalid transaction type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub color: String,
    pub icon_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub amount: Decimal, // always > 0, sign comes from `kind`
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

/// A stored transaction with its category name resolved.
#[derive(Debug, Clone)]
pub struct LedgerRow {
    pub transaction: Transaction,
    pub category: String,
}

/// Listing filter as received from a caller.
///
/// Dates stay raw strings: a value that does not parse as `YYYY-MM-DD` is
/// dropped when the predicate is built rather than rejected here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// 0 means unset.
    #[serde(default)]
    pub category_id: i64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            category_id: 0,
            kind: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Filter {
    /// Page and limit below 1 fall back to their defaults.
    pub fn normalized(mut self) -> Self {
        if self.page < 1 {
            self.page = DEFAULT_PAGE;
        }
        if self.limit < 1 {
            self.limit = DEFAULT_PAGE_SIZE;
        }
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
}

impl Summary {
    pub fn new(total_income: Decimal, total_expense: Decimal) -> Self {
        Self {
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_page: u64,
    pub total_items: u64,
    pub item_per_page: u32,
}

impl Pagination {
    pub fn new(current_page: u32, total_items: u64, item_per_page: u32) -> Self {
        Self {
            current_page,
            total_page: total_items.div_ceil(u64::from(item_per_page.max(1))),
            total_items,
            item_per_page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: i64,
    pub category_id: i64,
    pub category: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<LedgerRow> for TransactionView {
    fn from(row: LedgerRow) -> Self {
        let t = row.transaction;
        Self {
            id: t.id,
            category_id: t.category_id,
            category: row.category,
            amount: t.amount,
            kind: t.kind,
            description: t.description,
            date: t.date,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionView>,
    pub summary: Summary,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialOverview {
    pub current_balance: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expense: Decimal,
    pub total_savings: Decimal,
}

/// Income and expense per month, aligned by index with `labels`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub labels: Vec<String>,
    pub income: Vec<Decimal>,
    pub expense: Vec<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySeries {
    pub labels: Vec<String>,
    pub data: Vec<Decimal>,
}

impl CategorySeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FromIterator<(String, Decimal)> for CategorySeries {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        let (labels, data) = iter.into_iter().unzip();
        Self { labels, data }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardCharts {
    pub income_vs_expense: TrendSeries,
    pub category_distribution: CategorySeries,
    pub top_expenses: CategorySeries,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults_from_empty_json() {
        let f: Filter = serde_json::from_str("{}").unwrap();
        assert_eq!(f, Filter::default());
    }

    #[test]
    fn filter_reads_wire_names() {
        let f: Filter = serde_json::from_str(
            r#"{"start_date":"2025-01-01","type":"expense","category_id":3,"page":2,"limit":5}"#,
        )
        .unwrap();
        assert_eq!(f.kind.as_deref(), Some("expense"));
        assert_eq!(f.category_id, 3);
        assert_eq!(f.offset(), 5);
    }

    #[test]
    fn zero_page_and_limit_are_normalized() {
        let f = Filter {
            page: 0,
            limit: 0,
            ..Filter::default()
        }
        .normalized();
        assert_eq!((f.page, f.limit), (1, 10));
    }

    #[test]
    fn pagination_rounds_up() {
        assert_eq!(Pagination::new(1, 23, 10).total_page, 3);
        assert_eq!(Pagination::new(1, 20, 10).total_page, 2);
        assert_eq!(Pagination::new(1, 0, 10).total_page, 0);
    }
}
