// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, LedgerResult};
use crate::filter::Predicate;
use crate::models::{Summary, TransactionType};
use crate::store::{LedgerStore, Measure};

/// Income, expense and balance over everything `predicate` matches.
///
/// Runs on the unpaginated predicate; callers pass the same one they use to
/// count and fetch a page.
pub fn summarize<S: LedgerStore + ?Sized>(store: &S, predicate: &Predicate) -> LedgerResult<Summary> {
    let income = store
        .sum(&predicate.clone().of_kind(TransactionType::Income), Measure::Amount)
        .map_err(|source| LedgerError::Aggregation {
            aggregate: "total income",
            source,
        })?;
    let expense = store
        .sum(&predicate.clone().of_kind(TransactionType::Expense), Measure::Amount)
        .map_err(|source| LedgerError::Aggregation {
            aggregate: "total expense",
            source,
        })?;
    Ok(Summary::new(income, expense))
}
