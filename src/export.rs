// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Spreadsheet rendering of a transaction listing.

use crate::error::{LedgerError, LedgerResult};
use crate::listing::TransactionService;
use crate::models::{Filter, TransactionPage};
use crate::store::LedgerStore;
use crate::utils::fmt_money;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use std::str::FromStr;
use tracing::{error, info, info_span};

pub const HEADERS: [&str; 5] = ["Date", "Type", "Category", "Amount", "Description"];
pub const SUMMARY_LABEL: &str = "Summary";
pub const TOTAL_INCOME_LABEL: &str = "Total Income";
pub const TOTAL_EXPENSE_LABEL: &str = "Total Expense";
pub const BALANCE_LABEL: &str = "Balance";
pub const SHEET_NAME: &str = "Transactions";

/// Built-in accounting format: thousands separators, two decimals.
const CURRENCY_FORMAT_INDEX: u8 = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(LedgerError::Export(format!(
                "Unknown format: {} (use xlsx|csv|json)",
                other
            ))),
        }
    }
}

/// Header, one row per transaction, a blank row, then the summary block.
/// Amounts use the money format from [`fmt_money`].
pub fn render_csv(page: &TransactionPage) -> LedgerResult<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(HEADERS)?;
    for tx in &page.transactions {
        wtr.write_record([
            tx.date.format("%Y-%m-%d").to_string(),
            tx.kind.to_string(),
            tx.category.clone(),
            fmt_money(&tx.amount),
            tx.description.clone(),
        ])?;
    }
    wtr.write_record(["", "", "", "", ""])?;
    let s = &page.summary;
    wtr.write_record([
        SUMMARY_LABEL,
        TOTAL_INCOME_LABEL,
        fmt_money(&s.total_income).as_str(),
        "",
        "",
    ])?;
    wtr.write_record(["", TOTAL_EXPENSE_LABEL, fmt_money(&s.total_expense).as_str(), "", ""])?;
    wtr.write_record(["", BALANCE_LABEL, fmt_money(&s.balance).as_str(), "", ""])?;
    wtr.into_inner()
        .map_err(|e| LedgerError::Export(e.to_string()))
}

fn cell_number(amount: &Decimal) -> LedgerResult<f64> {
    amount
        .to_f64()
        .ok_or_else(|| LedgerError::Export(format!("amount {} is not representable", amount)))
}

/// Workbook with a single sheet laid out like [`render_csv`], except that
/// amounts are numeric cells carrying a currency format.
pub fn render_xlsx(page: &TransactionPage) -> LedgerResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let money = Format::new().set_num_format_index(CURRENCY_FORMAT_INDEX);
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in (0u16..).zip(HEADERS) {
        sheet.write_string(0, col, header)?;
    }
    let mut row: u32 = 1;
    for tx in &page.transactions {
        sheet.write_string(row, 0, tx.date.format("%Y-%m-%d").to_string())?;
        sheet.write_string(row, 1, tx.kind.as_str())?;
        sheet.write_string(row, 2, &tx.category)?;
        sheet.write_number_with_format(row, 3, cell_number(&tx.amount)?, &money)?;
        sheet.write_string(row, 4, &tx.description)?;
        row += 1;
    }

    // one blank row before the summary block
    row += 1;
    let s = &page.summary;
    sheet.write_string(row, 0, SUMMARY_LABEL)?;
    for (label, value) in [
        (TOTAL_INCOME_LABEL, &s.total_income),
        (TOTAL_EXPENSE_LABEL, &s.total_expense),
        (BALANCE_LABEL, &s.balance),
    ] {
        sheet.write_string(row, 1, label)?;
        sheet.write_number_with_format(row, 2, cell_number(value)?, &money)?;
        row += 1;
    }
    Ok(workbook.save_to_buffer()?)
}

pub fn render(page: &TransactionPage, format: ExportFormat) -> LedgerResult<Vec<u8>> {
    match format {
        ExportFormat::Xlsx => render_xlsx(page),
        ExportFormat::Csv => render_csv(page),
        ExportFormat::Json => Ok(serde_json::to_vec_pretty(page)?),
    }
}

/// Writes rendered bytes to `path`, replacing any existing file.
pub fn write_file(path: &Path, bytes: &[u8]) -> LedgerResult<()> {
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote export");
    Ok(())
}

impl<S: LedgerStore + ?Sized> TransactionService<'_, S> {
    /// Lists with `filter` (pagination included) and renders the page.
    pub fn export(
        &self,
        user_id: i64,
        filter: &Filter,
        format: ExportFormat,
    ) -> LedgerResult<Vec<u8>> {
        let page = self.list(user_id, filter).inspect_err(|e| {
            error!("Error getting transactions: {}", e);
        })?;
        let span = info_span!("export_transactions", user_id, format = format.extension());
        let _enter = span.enter();
        let bytes = render(&page, format).inspect_err(|e| {
            error!("Error writing export: {}", e);
        })?;
        info!(
            rows = page.transactions.len(),
            bytes = bytes.len(),
            "exported transactions"
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::default(), ExportFormat::Xlsx);
        assert!("ods".parse::<ExportFormat>().is_err());
    }
}
