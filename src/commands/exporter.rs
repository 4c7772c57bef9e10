// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::transactions::filter_from_matches;
use super::user_id;
use crate::db::SqliteStore;
use crate::export::{ExportFormat, write_file};
use crate::listing::TransactionService;
use anyhow::{Context, Result};
use std::path::Path;

pub fn handle(store: &SqliteStore, page_size: u32, sub: &clap::ArgMatches) -> Result<()> {
    let format: ExportFormat = sub.get_one::<String>("format").unwrap().parse()?;
    let out = Path::new(sub.get_one::<String>("out").unwrap());
    let filter = filter_from_matches(sub, page_size);

    let bytes = TransactionService::new(store).export(user_id(sub)?, &filter, format)?;
    write_file(out, &bytes).with_context(|| format!("Write export to {}", out.display()))?;
    println!("Exported transactions to {}", out.display());
    Ok(())
}
