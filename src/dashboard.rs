// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dashboard reports built by fanning out one worker thread per aggregate.
//!
//! Every worker runs its own store query and writes a single field of the
//! shared report under a mutex held only for that assignment. Workers report
//! failures on a channel sized to the task count; the caller joins all
//! workers, drains the channel, and either returns the whole report or an
//! error. Partial reports are never returned.
//!
//! The aggregates are not read from one snapshot. Under concurrent writes the
//! fields may reflect slightly different points in time.

use crate::error::{LedgerError, LedgerResult, StoreError};
use crate::filter::Predicate;
use crate::models::{
    CategorySeries, DEFAULT_TOP_EXPENSES, DashboardCharts, FinancialOverview, TransactionType,
    TrendSeries,
};
use crate::store::{GroupKey, LedgerStore, Measure, Order};
use crate::utils::{first_of_month, month_end, trailing_months};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::mpsc::{self, SyncSender};
use std::sync::{Mutex, PoisonError};
use std::thread;
use tracing::{Span, error, info, info_span, warn};

const TREND_MONTHS: u32 = 6;

/// A failed aggregate: task name and cause.
type Failure = (&'static str, LedgerError);

type Task<'t, R> = (&'static str, Box<dyn FnOnce(&Shared<R>) + Send + 't>);

struct Shared<R> {
    record: Mutex<R>,
    errors: SyncSender<Failure>,
}

impl<R> Shared<R> {
    fn store_field<T>(
        &self,
        name: &'static str,
        result: LedgerResult<T>,
        write: impl FnOnce(&mut R, T),
    ) {
        match result {
            Ok(value) => match self.record.lock() {
                Ok(mut record) => write(&mut *record, value),
                Err(_) => self.fail(name, LedgerError::TaskPanicked(name)),
            },
            Err(e) => {
                error!(task = name, "Failed to calculate {}: {}", name, e);
                self.fail(name, e);
            }
        }
    }

    fn fail(&self, name: &'static str, err: LedgerError) {
        // capacity equals the task count and each task reports at most once
        let _ = self.errors.try_send((name, err));
    }
}

fn task<'t, R, T>(
    name: &'static str,
    compute: impl FnOnce() -> LedgerResult<T> + Send + 't,
    write: impl FnOnce(&mut R, T) + Send + 't,
) -> Task<'t, R>
where
    R: 't,
{
    (
        name,
        Box::new(move |shared: &Shared<R>| shared.store_field(name, compute(), write)),
    )
}

/// Runs every task on its own thread, waits for all of them, then drains
/// the error channel completely.
fn fan_out<R: Default + Send>(span: &Span, tasks: Vec<Task<'_, R>>) -> (R, Vec<Failure>) {
    let (errors, failures) = mpsc::sync_channel(tasks.len());
    let shared = Shared {
        record: Mutex::new(R::default()),
        errors,
    };

    thread::scope(|s| {
        let handles: Vec<_> = tasks
            .into_iter()
            .map(|(name, work)| {
                let shared = &shared;
                let span = span.clone();
                (name, s.spawn(move || span.in_scope(|| work(shared))))
            })
            .collect();
        for (name, handle) in handles {
            if handle.join().is_err() {
                error!(task = name, "aggregation task panicked");
                shared.fail(name, LedgerError::TaskPanicked(name));
            }
        }
    });

    let Shared { record, errors } = shared;
    drop(errors);
    let record = record.into_inner().unwrap_or_else(PoisonError::into_inner);
    (record, failures.try_iter().collect())
}

fn scalar(aggregate: &'static str, result: Result<Decimal, StoreError>) -> LedgerResult<Decimal> {
    result.map_err(|source| LedgerError::Aggregation { aggregate, source })
}

pub struct DashboardService<'a, S: LedgerStore + ?Sized> {
    store: &'a S,
    top_expenses: usize,
}

impl<'a, S: LedgerStore + ?Sized> DashboardService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            top_expenses: DEFAULT_TOP_EXPENSES,
        }
    }

    /// How many categories the top-expenses series keeps.
    pub fn with_top_expenses(mut self, n: usize) -> Self {
        self.top_expenses = n;
        self
    }

    pub fn financial_overview(&self, user_id: i64) -> LedgerResult<FinancialOverview> {
        self.financial_overview_on(user_id, Utc::now().date_naive())
    }

    /// Overview with "this month" taken from `today`.
    pub fn financial_overview_on(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> LedgerResult<FinancialOverview> {
        let span = info_span!("financial_overview", user_id);
        let _enter = span.enter();
        info!("Getting financial overview");

        let store = self.store;
        let all = Predicate::for_user(user_id);
        let this_month = |kind| all.clone().of_kind(kind).since(first_of_month(today));
        let (income_p, expense_p) = (
            this_month(TransactionType::Income),
            this_month(TransactionType::Expense),
        );
        let (balance_p, savings_p) = (all.clone(), all);

        let tasks: Vec<Task<'_, FinancialOverview>> = vec![
            task(
                "current balance",
                move || scalar("current balance", store.sum(&balance_p, Measure::Signed)),
                |o: &mut FinancialOverview, v: Decimal| o.current_balance = v,
            ),
            task(
                "monthly income",
                move || scalar("monthly income", store.sum(&income_p, Measure::Amount)),
                |o: &mut FinancialOverview, v: Decimal| o.monthly_income = v,
            ),
            task(
                "monthly expense",
                move || scalar("monthly expense", store.sum(&expense_p, Measure::Amount)),
                |o: &mut FinancialOverview, v: Decimal| o.monthly_expense = v,
            ),
            // same formula as the balance; kept as an alias
            task(
                "total savings",
                move || scalar("total savings", store.sum(&savings_p, Measure::Signed)),
                |o: &mut FinancialOverview, v: Decimal| o.total_savings = v,
            ),
        ];

        let (overview, failures) = fan_out(&span, tasks);
        if !failures.is_empty() {
            warn!(failed = failures.len(), "financial overview discarded");
            return Err(LedgerError::Overview);
        }
        info!("Successfully retrieved financial overview");
        Ok(overview)
    }

    pub fn dashboard_charts(&self, user_id: i64) -> LedgerResult<DashboardCharts> {
        self.dashboard_charts_on(user_id, Utc::now().date_naive())
    }

    /// Charts with the trend window ending in the month of `today`.
    pub fn dashboard_charts_on(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> LedgerResult<DashboardCharts> {
        let span = info_span!("dashboard_charts", user_id);
        let _enter = span.enter();
        info!("Getting dashboard charts");

        let store = self.store;
        let top = self.top_expenses;
        let tasks: Vec<Task<'_, DashboardCharts>> = vec![
            task(
                "income vs expense",
                move || six_month_trend(store, user_id, today),
                |c: &mut DashboardCharts, v: TrendSeries| c.income_vs_expense = v,
            ),
            task(
                "category distribution",
                move || expense_by_category(store, user_id, None),
                |c: &mut DashboardCharts, v: CategorySeries| c.category_distribution = v,
            ),
            task(
                "top expenses",
                move || expense_by_category(store, user_id, Some(top)),
                |c: &mut DashboardCharts, v: CategorySeries| c.top_expenses = v,
            ),
        ];

        let (charts, failures) = fan_out(&span, tasks);
        let mut failures = failures.into_iter();
        if let Some((name, first)) = failures.next() {
            for (other, e) in failures {
                warn!(task = other, "additional chart failure: {}", e);
            }
            error!(task = name, "dashboard charts failed");
            return Err(LedgerError::Charts {
                source: Box::new(first),
            });
        }
        info!("Successfully retrieved dashboard charts");
        Ok(charts)
    }
}

/// Income and expense for the trailing months, oldest first, labelled with
/// short month names. Months without entries are zero.
fn six_month_trend<S: LedgerStore + ?Sized>(
    store: &S,
    user_id: i64,
    today: NaiveDate,
) -> LedgerResult<TrendSeries> {
    let months = trailing_months(today, TREND_MONTHS);
    let Some(&from) = months.first() else {
        return Ok(TrendSeries::default());
    };
    let window = Predicate::for_user(user_id)
        .since(from)
        .until(month_end(today));

    let monthly = |kind: TransactionType, aggregate: &'static str| {
        store
            .group_sum(&window.clone().of_kind(kind), GroupKey::Month, Order::KeyAsc, None)
            .map(|rows| rows.into_iter().collect::<HashMap<_, _>>())
            .map_err(|source| LedgerError::Aggregation { aggregate, source })
    };
    let income = monthly(TransactionType::Income, "monthly income trend")?;
    let expense = monthly(TransactionType::Expense, "monthly expense trend")?;

    let mut series = TrendSeries::default();
    for month in months {
        let key = month.format("%Y-%m").to_string();
        series.labels.push(month.format("%b").to_string());
        series
            .income
            .push(income.get(&key).copied().unwrap_or(Decimal::ZERO));
        series
            .expense
            .push(expense.get(&key).copied().unwrap_or(Decimal::ZERO));
    }
    Ok(series)
}

/// All-time expense totals per category name, largest first.
fn expense_by_category<S: LedgerStore + ?Sized>(
    store: &S,
    user_id: i64,
    limit: Option<usize>,
) -> LedgerResult<CategorySeries> {
    let aggregate = if limit.is_some() {
        "top expenses"
    } else {
        "category distribution"
    };
    let rows = store
        .group_sum(
            &Predicate::for_user(user_id).of_kind(TransactionType::Expense),
            GroupKey::CategoryName,
            Order::SumDesc,
            limit,
        )
        .map_err(|source| LedgerError::Aggregation { aggregate, source })?;
    Ok(rows.into_iter().collect())
}
