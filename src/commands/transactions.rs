// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::user_id;
use crate::db::{NewTransaction, SqliteStore};
use crate::error::LedgerError;
use crate::listing::TransactionService;
use crate::models::{Filter, TransactionPage, TransactionType};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, anyhow, bail};

pub fn handle(store: &SqliteStore, page_size: u32, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("list", sub)) => list(store, page_size, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        _ => {}
    }
    Ok(())
}

/// Reads the `entry_args` fields shared by `add` and `edit`.
fn entry_from_matches(sub: &clap::ArgMatches) -> Result<NewTransaction> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let kind: TransactionType = sub
        .get_one::<String>("type")
        .unwrap()
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    Ok(NewTransaction {
        category_id: *sub.get_one::<i64>("category").unwrap(),
        amount,
        kind,
        description: sub
            .get_one::<String>("description")
            .cloned()
            .unwrap_or_default(),
        date,
    })
}

/// Points at `category list` when the category id does not resolve.
fn with_category_hint(err: LedgerError, category_id: i64) -> anyhow::Error {
    if err.is_not_found() {
        anyhow!(
            "{} (run `fintrack category list` to see ids for this user; got {})",
            err,
            category_id
        )
    } else {
        err.into()
    }
}

fn add(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let entry = entry_from_matches(sub)?;
    let tx = store
        .add_transaction(user_id(sub)?, &entry)
        .map_err(|e| with_category_hint(e, entry.category_id))?;
    println!(
        "Recorded {} {} on {} (id {})",
        tx.kind,
        fmt_money(&tx.amount),
        tx.date,
        tx.id
    );
    Ok(())
}

fn edit(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let entry = entry_from_matches(sub)?;
    let tx = store
        .update_transaction(user_id(sub)?, id, &entry)
        .map_err(|e| {
            if matches!(e, LedgerError::NotFound { entity: "Category", .. }) {
                with_category_hint(e, entry.category_id)
            } else {
                e.into()
            }
        })?;
    println!(
        "Updated transaction {}: {} {} on {}",
        tx.id,
        tx.kind,
        fmt_money(&tx.amount),
        tx.date
    );
    Ok(())
}

fn rm(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    if !store.delete_transaction(user_id(sub)?, id)? {
        bail!("Transaction {} not found", id);
    }
    println!("Removed transaction {}", id);
    Ok(())
}

/// Filter from the shared listing flags. Values are passed through
/// unvalidated; the predicate builder drops what it cannot use.
pub fn filter_from_matches(sub: &clap::ArgMatches, page_size: u32) -> Filter {
    Filter {
        start_date: sub.get_one::<String>("start").cloned(),
        end_date: sub.get_one::<String>("end").cloned(),
        category_id: sub.get_one::<i64>("category").copied().unwrap_or(0),
        kind: sub.get_one::<String>("type").cloned(),
        page: sub.get_one::<u32>("page").copied().unwrap_or(1),
        limit: sub.get_one::<u32>("limit").copied().unwrap_or(page_size),
    }
}

fn list(store: &SqliteStore, page_size: u32, sub: &clap::ArgMatches) -> Result<()> {
    let filter = filter_from_matches(sub, page_size);
    let page = TransactionService::new(store).list(user_id(sub)?, &filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &page)? {
        print_page(&page);
    }
    Ok(())
}

fn print_page(page: &TransactionPage) {
    let rows: Vec<Vec<String>> = page
        .transactions
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.date.to_string(),
                t.kind.to_string(),
                t.category.clone(),
                fmt_money(&t.amount),
                t.description.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Type", "Category", "Amount", "Description"],
            rows,
        )
    );
    let s = &page.summary;
    println!(
        "{}",
        pretty_table(
            &["Total Income", "Total Expense", "Balance"],
            vec![vec![
                fmt_money(&s.total_income),
                fmt_money(&s.total_expense),
                fmt_money(&s.balance),
            ]],
        )
    );
    let p = &page.pagination;
    println!(
        "Page {} of {} ({} transactions, {} per page)",
        p.current_page, p.total_page, p.total_items, p.item_per_page
    );
}
