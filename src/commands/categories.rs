// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::user_id;
use crate::db::SqliteStore;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, bail};

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let cat = store.add_category(user_id(sub)?, name)?;
            println!("Added category '{}' (id {})", cat.name, cat.id);
        }
        Some(("list", sub)) => {
            let cats = store.list_categories(user_id(sub)?)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cats)? {
                let data = cats
                    .into_iter()
                    .map(|c| vec![c.id.to_string(), c.name, c.color])
                    .collect();
                println!("{}", pretty_table(&["ID", "Category", "Color"], data));
            }
        }
        Some(("rename", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let name = sub.get_one::<String>("name").unwrap();
            let cat = store.rename_category(user_id(sub)?, id, name)?;
            println!("Renamed category {} to '{}'", cat.id, cat.name);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            if !store.delete_category(user_id(sub)?, id)? {
                bail!("Category {} not found", id);
            }
            println!("Removed category {}", id);
        }
        _ => {}
    }
    Ok(())
}
