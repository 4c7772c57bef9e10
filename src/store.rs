// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Query contract the reporting engine needs from ledger storage.
//!
//! Implementations must be shareable across threads: the dashboard fans out
//! one worker per aggregate and every worker queries the store on its own.

use crate::error::StoreError;
use crate::filter::Predicate;
use crate::models::LedgerRow;
use rust_decimal::Decimal;

/// What `sum` adds up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Plain `amount`.
    Amount,
    /// `+amount` for income, `-amount` for expense.
    Signed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// Joined category name, empty when the join misses.
    CategoryName,
    /// `YYYY-MM` of the transaction date.
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Newest first, ties broken by id descending.
    DateDesc,
    /// Largest group total first.
    SumDesc,
    /// Group key ascending.
    KeyAsc,
}

pub trait LedgerStore: Send + Sync {
    fn count(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    /// Zero when nothing matches.
    fn sum(&self, predicate: &Predicate, measure: Measure) -> Result<Decimal, StoreError>;

    fn find(
        &self,
        predicate: &Predicate,
        order: Order,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<LedgerRow>, StoreError>;

    /// Sum of `amount` per group key.
    fn group_sum(
        &self,
        predicate: &Predicate,
        key: GroupKey,
        order: Order,
        limit: Option<usize>,
    ) -> Result<Vec<(String, Decimal)>, StoreError>;
}
