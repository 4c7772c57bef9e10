// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, LedgerResult, ListingStage};
use crate::filter::{Predicate, build_predicate};
use crate::models::{Filter, Pagination, TransactionPage, TransactionView};
use crate::store::{LedgerStore, Order};
use crate::summary::summarize;
use tracing::{debug, error, info_span};

/// Filtered, paginated transaction listings (and exports built on them).
pub struct TransactionService<'a, S: LedgerStore + ?Sized> {
    pub(crate) store: &'a S,
}

impl<'a, S: LedgerStore + ?Sized> TransactionService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn list(&self, user_id: i64, filter: &Filter) -> LedgerResult<TransactionPage> {
        let span = info_span!("list_transactions", user_id);
        let _enter = span.enter();

        let filter = filter.clone().normalized();
        debug!(?filter, "applying filter");
        let predicate = build_predicate(Predicate::for_user(user_id), &filter);

        let total = self.store.count(&predicate).map_err(|e| {
            error!("Failed to count transactions: {}", e);
            LedgerError::listing(ListingStage::Count, e)
        })?;

        let summary = summarize(self.store, &predicate).map_err(|e| {
            error!("Failed to calculate transaction summary: {}", e);
            LedgerError::listing(ListingStage::Summary, e)
        })?;

        let rows = self
            .store
            .find(
                &predicate,
                Order::DateDesc,
                filter.offset(),
                u64::from(filter.limit),
            )
            .map_err(|e| {
                error!("Failed to get transactions: {}", e);
                LedgerError::listing(ListingStage::Fetch, e)
            })?;

        let transactions: Vec<TransactionView> = rows.into_iter().map(Into::into).collect();
        debug!(total, page_len = transactions.len(), "listed transactions");
        Ok(TransactionPage {
            transactions,
            summary,
            pagination: Pagination::new(filter.page, total, filter.limit),
        })
    }
}
