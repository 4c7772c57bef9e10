// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::{Decimal, RoundingStrategy};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Two decimals with thousands separators, e.g. `-1,234.50`.
pub fn fmt_money(d: &Decimal) -> String {
    let rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Inverse of [`fmt_money`].
pub fn parse_money(s: &str) -> Result<Decimal> {
    parse_decimal(&s.replace(',', ""))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn first_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

pub fn month_end(d: NaiveDate) -> NaiveDate {
    first_of_month(d)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(d)
}

/// First days of the `n` calendar months ending with the one holding
/// `today`, oldest first.
pub fn trailing_months(today: NaiveDate, n: u32) -> Vec<NaiveDate> {
    let current = first_of_month(today);
    (0..n)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .collect()
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn money_grouping() {
        assert_eq!(fmt_money(&Decimal::new(123456789, 2)), "1,234,567.89");
        assert_eq!(fmt_money(&Decimal::new(-150, 1)), "-15.00");
        assert_eq!(fmt_money(&Decimal::ZERO), "0.00");
        assert_eq!(fmt_money(&Decimal::new(100000, 0)), "100,000.00");
        assert_eq!(fmt_money(&Decimal::new(-1, 3)), "0.00");
    }

    #[test]
    fn money_parses_back() {
        let v = Decimal::new(-98765432, 2);
        assert_eq!(parse_money(&fmt_money(&v)).unwrap(), v);
    }

    #[test]
    fn month_bounds() {
        assert_eq!(first_of_month(d("2025-02-17")), d("2025-02-01"));
        assert_eq!(month_end(d("2024-02-10")), d("2024-02-29"));
        assert_eq!(month_end(d("2025-12-31")), d("2025-12-31"));
    }

    #[test]
    fn trailing_months_cross_year() {
        let months = trailing_months(d("2025-02-14"), 6);
        assert_eq!(
            months,
            vec![
                d("2024-09-01"),
                d("2024-10-01"),
                d("2024-11-01"),
                d("2024-12-01"),
                d("2025-01-01"),
                d("2025-02-01"),
            ]
        );
    }
}
