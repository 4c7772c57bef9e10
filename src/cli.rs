// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::builder::RangedU64ValueParser;
use clap::{Arg, ArgAction, Command, crate_version, value_parser};
use std::path::PathBuf;

fn json_flags() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON document per line"),
    ]
}

fn filter_args() -> [Arg; 6] {
    [
        Arg::new("start")
            .long("start")
            .value_name("YYYY-MM-DD")
            .help("Only entries on or after this date"),
        Arg::new("end")
            .long("end")
            .value_name("YYYY-MM-DD")
            .help("Only entries on or before this date"),
        Arg::new("category")
            .long("category")
            .value_parser(value_parser!(i64))
            .help("Only entries in this category id"),
        Arg::new("type")
            .long("type")
            .value_name("income|expense"),
        Arg::new("page")
            .long("page")
            .value_parser(value_parser!(u32)),
        Arg::new("limit")
            .long("limit")
            .value_parser(value_parser!(u32))
            .help("Page size"),
    ]
}

/// Fields shared by `tx add` and `tx edit`.
fn entry_args() -> [Arg; 5] {
    [
        Arg::new("date").long("date").required(true),
        Arg::new("amount").long("amount").required(true),
        Arg::new("type")
            .long("type")
            .required(true)
            .value_parser(["income", "expense"]),
        Arg::new("category")
            .long("category")
            .required(true)
            .value_parser(value_parser!(i64)),
        Arg::new("description").long("description"),
    ]
}

fn as_of() -> Arg {
    Arg::new("as-of")
        .long("as-of")
        .value_name("YYYY-MM-DD")
        .help("Evaluate \"this month\" relative to this date instead of today")
}

pub fn build_cli() -> Command {
    Command::new("fintrack")
        .version(crate_version!())
        .about("Personal-finance ledger: dashboard, listings, export")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Ledger database path (overrides FINTRACK_DB)"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .value_parser(value_parser!(i64))
                .default_value("1")
                .help("User id the command acts for"),
        )
        .subcommand(Command::new("init").about("Create the ledger database"))
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add").arg(Arg::new("name").required(true)),
                )
                .subcommand(Command::new("list").args(json_flags()))
                .subcommand(
                    Command::new("rename")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and list transactions")
                .subcommand(Command::new("add").args(entry_args()))
                .subcommand(
                    Command::new("edit")
                        .about("Replace every field of a transaction")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .args(entry_args()),
                )
                .subcommand(
                    Command::new("list")
                        .args(filter_args())
                        .args(json_flags()),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("overview")
                .about("Balance, this month's income and expense, savings")
                .arg(as_of())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("charts")
                .about("Six-month trend, category distribution, top expenses")
                .arg(
                    Arg::new("top")
                        .long("top")
                        .value_parser(RangedU64ValueParser::<usize>::new().range(1..))
                        .help("Categories kept in the top-expenses series"),
                )
                .arg(as_of())
                .args(json_flags()),
        )
        .subcommand(
            Command::new("export")
                .about("Write a transaction listing as a spreadsheet")
                .args(filter_args())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("xlsx")
                        .help("xlsx|csv|json"),
                )
                .arg(Arg::new("out").long("out").required(true)),
        )
        .subcommand(Command::new("doctor").about("Find transactions whose category cannot be resolved"))
}
