// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod export;
pub mod filter;
pub mod listing;
pub mod models;
pub mod store;
pub mod summary;
pub mod utils;

pub use dashboard::DashboardService;
pub use error::{LedgerError, LedgerResult, StoreError};
pub use listing::TransactionService;
pub use store::LedgerStore;
