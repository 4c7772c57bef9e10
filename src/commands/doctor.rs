// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::user_id;
use crate::db::SqliteStore;
use crate::utils::pretty_table;
use anyhow::Result;

/// Listings and charts show these with an empty category name.
pub fn handle(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let orphans = store.orphaned_transactions(user_id(sub)?)?;
    if orphans.is_empty() {
        println!("✅ doctor: no issues found");
        return Ok(());
    }
    let rows = orphans
        .into_iter()
        .map(|o| {
            vec![
                o.issue,
                format!("tx {} on {} -> category {}", o.transaction_id, o.date, o.category_id),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Issue", "Detail"], rows));
    Ok(())
}
