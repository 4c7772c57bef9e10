// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use fintrack::config::{ENV_DB, ENV_LOG, Settings};
use fintrack::db::SqliteStore;
use fintrack::{cli, commands};

fn init_tracing() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let db_flag = matches.get_one::<PathBuf>("db").cloned();
    let settings = Settings::from_lookup(|key| match (&db_flag, key) {
        (Some(path), ENV_DB) => Some(path.to_string_lossy().into_owned()),
        _ => std::env::var(key).ok(),
    })?;
    let store = SqliteStore::open(&settings.db_path)
        .with_context(|| format!("Open DB at {}", settings.db_path.display()))?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", store.path().display());
        }
        Some(("category", sub)) => commands::categories::handle(&store, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&store, settings.page_size, sub)?,
        Some(("overview", sub)) => commands::reports::overview(&store, sub)?,
        Some(("charts", sub)) => commands::reports::charts(&store, settings.top_expenses, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&store, settings.page_size, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
