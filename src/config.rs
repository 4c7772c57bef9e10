// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime settings, read from the environment.

use crate::models::{DEFAULT_PAGE_SIZE, DEFAULT_TOP_EXPENSES};
use anyhow::{Context, Result, bail};
use std::path::PathBuf;

pub const ENV_DB: &str = "FINTRACK_DB";
pub const ENV_TOP_EXPENSES: &str = "FINTRACK_TOP_EXPENSES";
pub const ENV_PAGE_SIZE: &str = "FINTRACK_PAGE_SIZE";
pub const ENV_LOG: &str = "FINTRACK_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub top_expenses: usize,
    pub page_size: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup`, falling back to defaults for
    /// anything unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = match lookup(ENV_DB).filter(|s| !s.is_empty()) {
            Some(p) => PathBuf::from(p),
            None => crate::db::default_db_path()?,
        };
        let top_expenses = parse_positive(&lookup, ENV_TOP_EXPENSES, DEFAULT_TOP_EXPENSES)?;
        let page_size = parse_positive(&lookup, ENV_PAGE_SIZE, DEFAULT_PAGE_SIZE as usize)?;
        Ok(Self {
            db_path,
            top_expenses,
            page_size: u32::try_from(page_size)
                .with_context(|| format!("{} is too large", ENV_PAGE_SIZE))?,
        })
    }
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> Result<usize> {
    let Some(raw) = lookup(key).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    let n: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} '{}', expected a positive integer", key, raw))?;
    if n == 0 {
        bail!("Invalid {} '{}', expected a positive integer", key, raw);
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn explicit_values_win() {
        let s = Settings::from_lookup(lookup(&[
            (ENV_DB, "/tmp/ledger.sqlite"),
            (ENV_TOP_EXPENSES, "3"),
            (ENV_PAGE_SIZE, "25"),
        ]))
        .unwrap();
        assert_eq!(s.db_path, PathBuf::from("/tmp/ledger.sqlite"));
        assert_eq!(s.top_expenses, 3);
        assert_eq!(s.page_size, 25);
    }

    #[test]
    fn numeric_defaults() {
        let s = Settings::from_lookup(lookup(&[(ENV_DB, "/tmp/x.sqlite")])).unwrap();
        assert_eq!(s.top_expenses, 5);
        assert_eq!(s.page_size, 10);
    }

    #[test]
    fn zero_and_garbage_are_rejected() {
        assert!(
            Settings::from_lookup(lookup(&[(ENV_DB, "/tmp/x"), (ENV_TOP_EXPENSES, "0")])).is_err()
        );
        assert!(
            Settings::from_lookup(lookup(&[(ENV_DB, "/tmp/x"), (ENV_PAGE_SIZE, "ten")])).is_err()
        );
    }
}
