// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod transactions;
pub mod reports;
pub mod exporter;
pub mod doctor;

use anyhow::Result;

pub(crate) fn user_id(m: &clap::ArgMatches) -> Result<i64> {
    m.get_one::<i64>("user")
        .copied()
        .ok_or_else(|| anyhow::anyhow!("--user is required"))
}
