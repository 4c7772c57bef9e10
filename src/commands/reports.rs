// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::user_id;
use crate::dashboard::DashboardService;
use crate::db::SqliteStore;
use crate::models::CategorySeries;
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::Result;
use chrono::{NaiveDate, Utc};

fn as_of(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("as-of") {
        Some(s) => parse_date(s),
        None => Ok(Utc::now().date_naive()),
    }
}

pub fn overview(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let today = as_of(sub)?;
    let o = DashboardService::new(store).financial_overview_on(user_id(sub)?, today)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &o)? {
        let data = vec![
            vec!["Current balance".into(), fmt_money(&o.current_balance)],
            vec!["Monthly income".into(), fmt_money(&o.monthly_income)],
            vec!["Monthly expense".into(), fmt_money(&o.monthly_expense)],
            vec!["Total savings".into(), fmt_money(&o.total_savings)],
        ];
        println!("{}", pretty_table(&["Metric", "Amount"], data));
    }
    Ok(())
}

pub fn charts(store: &SqliteStore, top_default: usize, sub: &clap::ArgMatches) -> Result<()> {
    let today = as_of(sub)?;
    let top = sub.get_one::<usize>("top").copied().unwrap_or(top_default);
    let charts = DashboardService::new(store)
        .with_top_expenses(top)
        .dashboard_charts_on(user_id(sub)?, today)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &charts)? {
        return Ok(());
    }

    let trend = &charts.income_vs_expense;
    let data = trend
        .labels
        .iter()
        .zip(trend.income.iter().zip(&trend.expense))
        .map(|(m, (inc, exp))| vec![m.clone(), fmt_money(inc), fmt_money(exp)])
        .collect();
    println!("{}", pretty_table(&["Month", "Income", "Expense"], data));
    println!("{}", category_table(&charts.category_distribution, "Spent"));
    println!(
        "{}",
        category_table(&charts.top_expenses, &format!("Top {}", top))
    );
    Ok(())
}

fn category_table(series: &CategorySeries, header: &str) -> comfy_table::Table {
    let data = series
        .labels
        .iter()
        .zip(&series.data)
        .map(|(cat, amt)| {
            let name = if cat.is_empty() {
                "(uncategorized)".to_string()
            } else {
                cat.clone()
            };
            vec![name, fmt_money(amt)]
        })
        .collect();
    pretty_table(&["Category", header], data)
}
