// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use chrono::NaiveDate;
use fintrack::db::{NewTransaction, SqliteStore};
use fintrack::error::StoreError;
use fintrack::filter::Predicate;
use fintrack::models::{LedgerRow, TransactionType};
use fintrack::store::{GroupKey, LedgerStore, Measure, Order};
use rust_decimal::Decimal;
use tempfile::TempDir;

pub struct Ledger {
    pub store: SqliteStore,
    _dir: TempDir,
}

pub fn ledger() -> Ledger {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("ledger.sqlite")).unwrap();
    Ledger { store, _dir: dir }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

impl Ledger {
    pub fn category(&self, user_id: i64, name: &str) -> i64 {
        self.store.add_category(user_id, name).unwrap().id
    }

    pub fn record(
        &self,
        user_id: i64,
        category_id: i64,
        kind: TransactionType,
        amount: &str,
        on: &str,
    ) -> i64 {
        self.store
            .add_transaction(
                user_id,
                &NewTransaction {
                    category_id,
                    amount: dec(amount),
                    kind,
                    description: format!("{} {}", kind, amount),
                    date: date(on),
                },
            )
            .unwrap()
            .id
    }
}

/// Which store calls should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Count,
    Sum(Measure),
    Find,
    Group(GroupKey),
}

/// Wraps a real store and fails the calls `fails` selects.
pub struct FailingStore<'a, S> {
    pub inner: &'a S,
    pub fails: fn(Call, &Predicate) -> bool,
}

impl<S: LedgerStore> FailingStore<'_, S> {
    fn check(&self, call: Call, predicate: &Predicate) -> Result<(), StoreError> {
        if (self.fails)(call, predicate) {
            return Err(StoreError::Unavailable(format!("injected failure on {:?}", call)));
        }
        Ok(())
    }
}

impl<S: LedgerStore> LedgerStore for FailingStore<'_, S> {
    fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        self.check(Call::Count, predicate)?;
        self.inner.count(predicate)
    }

    fn sum(&self, predicate: &Predicate, measure: Measure) -> Result<Decimal, StoreError> {
        self.check(Call::Sum(measure), predicate)?;
        self.inner.sum(predicate, measure)
    }

    fn find(
        &self,
        predicate: &Predicate,
        order: Order,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<LedgerRow>, StoreError> {
        self.check(Call::Find, predicate)?;
        self.inner.find(predicate, order, offset, limit)
    }

    fn group_sum(
        &self,
        predicate: &Predicate,
        key: GroupKey,
        order: Order,
        limit: Option<usize>,
    ) -> Result<Vec<(String, Decimal)>, StoreError> {
        self.check(Call::Group(key), predicate)?;
        self.inner.group_sum(predicate, key, order, limit)
    }
}
