// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{Call, FailingStore, Ledger, dec, ledger};
use fintrack::error::{LedgerError, ListingStage};
use fintrack::filter::Predicate;
use fintrack::models::{Filter, Summary, TransactionType};
use fintrack::store::Measure;
use fintrack::TransactionService;
use rust_decimal::Decimal;

use TransactionType::{Expense, Income};

/// 23 entries in January 2025: odd days 100 income, even days 40 expense.
fn january(l: &Ledger) -> (i64, i64) {
    let salary = l.category(1, "Salary");
    let food = l.category(1, "Food");
    for day in 1..=23 {
        let on = format!("2025-01-{:02}", day);
        if day % 2 == 1 {
            l.record(1, salary, Income, "100", &on);
        } else {
            l.record(1, food, Expense, "40", &on);
        }
    }
    (salary, food)
}

fn page(n: u32, limit: u32) -> Filter {
    Filter {
        page: n,
        limit,
        ..Filter::default()
    }
}

#[test]
fn pagination_rounds_total_pages_up() {
    let l = ledger();
    january(&l);
    let svc = TransactionService::new(&l.store);

    let first = svc.list(1, &page(1, 10)).unwrap();
    assert_eq!(first.transactions.len(), 10);
    assert_eq!(first.pagination.total_items, 23);
    assert_eq!(first.pagination.total_page, 3);
    assert_eq!(first.pagination.current_page, 1);
    assert_eq!(first.pagination.item_per_page, 10);
    assert_eq!(first.transactions[0].date, common::date("2025-01-23"));

    let last = svc.list(1, &page(3, 10)).unwrap();
    assert_eq!(last.transactions.len(), 3);
    assert_eq!(last.transactions[2].date, common::date("2025-01-01"));
}

#[test]
fn page_past_the_end_is_empty_with_same_totals() {
    let l = ledger();
    january(&l);
    let svc = TransactionService::new(&l.store);

    let first = svc.list(1, &page(1, 10)).unwrap();
    let beyond = svc.list(1, &page(4, 10)).unwrap();
    assert!(beyond.transactions.is_empty());
    assert_eq!(beyond.summary, first.summary);
    assert_eq!(beyond.pagination.total_items, 23);
    assert_eq!(beyond.pagination.total_page, 3);
    assert_eq!(beyond.pagination.current_page, 4);
}

#[test]
fn summary_ignores_pagination() {
    let l = ledger();
    january(&l);
    let svc = TransactionService::new(&l.store);

    let expected = Summary::new(dec("1200"), dec("440"));
    for (n, limit) in [(1, 10), (2, 10), (1, 3), (7, 3), (1, 100)] {
        let p = svc.list(1, &page(n, limit)).unwrap();
        assert_eq!(p.summary, expected, "page {} limit {}", n, limit);
    }
    assert_eq!(expected.balance, dec("760"));
}

#[test]
fn filters_combine_with_and() {
    let l = ledger();
    let (_, food) = january(&l);
    let svc = TransactionService::new(&l.store);

    let filter = Filter {
        start_date: Some("2025-01-05".into()),
        end_date: Some("2025-01-10".into()),
        ..Filter::default()
    };
    let p = svc.list(1, &filter).unwrap();
    // days 5..=10: three income, three expense
    assert_eq!(p.pagination.total_items, 6);
    assert_eq!(p.summary, Summary::new(dec("300"), dec("120")));

    let filter = Filter {
        category_id: food,
        kind: Some("expense".into()),
        ..Filter::default()
    };
    let p = svc.list(1, &filter).unwrap();
    assert_eq!(p.pagination.total_items, 11);
    assert!(p.transactions.iter().all(|t| t.category == "food"));
    assert_eq!(p.summary, Summary::new(dec("0"), dec("440")));
}

#[test]
fn unparseable_dates_are_ignored() {
    let l = ledger();
    january(&l);
    let svc = TransactionService::new(&l.store);

    let filter = Filter {
        start_date: Some("last tuesday".into()),
        end_date: Some("2025-13-01".into()),
        ..Filter::default()
    };
    let p = svc.list(1, &filter).unwrap();
    assert_eq!(p.pagination.total_items, 23);
}

#[test]
fn unknown_type_matches_nothing() {
    let l = ledger();
    january(&l);
    let filter = Filter {
        kind: Some("transfer".into()),
        ..Filter::default()
    };
    let p = TransactionService::new(&l.store).list(1, &filter).unwrap();
    assert!(p.transactions.is_empty());
    assert_eq!(p.summary, Summary::default());
    assert_eq!(p.pagination.total_page, 0);
}

#[test]
fn other_users_and_deleted_rows_stay_out() {
    let l = ledger();
    january(&l);
    let theirs = l.category(2, "Food");
    l.record(2, theirs, Expense, "999", "2025-01-02");
    let doomed = l.record(1, l.category(1, "Misc"), Expense, "5", "2025-01-30");
    assert!(l.store.delete_transaction(1, doomed).unwrap());
    assert!(!l.store.delete_transaction(1, doomed).unwrap());

    let p = TransactionService::new(&l.store).list(1, &page(1, 50)).unwrap();
    assert_eq!(p.pagination.total_items, 23);
    assert_eq!(p.summary.total_expense, dec("440"));
}

#[test]
fn empty_ledger_is_not_an_error() {
    let l = ledger();
    let p = TransactionService::new(&l.store)
        .list(42, &Filter::default())
        .unwrap();
    assert!(p.transactions.is_empty());
    assert_eq!(p.summary, Summary::default());
    assert_eq!(p.pagination.total_items, 0);
}

#[test]
fn rows_carry_joined_category_name() {
    let l = ledger();
    let rent = l.category(1, "  Rent ");
    let id = l.record(1, rent, Expense, "1250.50", "2025-03-01");

    let p = TransactionService::new(&l.store)
        .list(1, &Filter::default())
        .unwrap();
    let row = &p.transactions[0];
    assert_eq!(row.id, id);
    assert_eq!(row.category_id, rent);
    assert_eq!(row.category, "rent");
    assert_eq!(row.amount, dec("1250.50"));
    assert_eq!(row.kind, Expense);
    assert_eq!(row.description, "expense 1250.50");

    // a deleted category no longer joins
    assert!(l.store.delete_category(1, rent).unwrap());
    let p = TransactionService::new(&l.store)
        .list(1, &Filter::default())
        .unwrap();
    assert_eq!(p.transactions[0].category, "");
}

#[test]
fn store_failures_name_the_stage() {
    let l = ledger();
    january(&l);

    let cases: [(fn(Call, &Predicate) -> bool, ListingStage); 3] = [
        (|c, _| c == Call::Count, ListingStage::Count),
        (|c, _| c == Call::Sum(Measure::Amount), ListingStage::Summary),
        (|c, _| c == Call::Find, ListingStage::Fetch),
    ];
    for (fails, stage) in cases {
        let store = FailingStore {
            inner: &l.store,
            fails,
        };
        let err = TransactionService::new(&store)
            .list(1, &Filter::default())
            .unwrap_err();
        match err {
            LedgerError::Listing { stage: got, .. } => assert_eq!(got, stage),
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn summary_matches_row_amounts_exactly() {
    let l = ledger();
    let salary = l.category(1, "Salary");
    let misc = l.category(1, "Misc");
    l.record(1, salary, Income, "90071992547409.93", "2025-01-01");
    l.record(1, salary, Income, "0.01", "2025-01-02");
    l.record(1, misc, Expense, "1.005", "2025-01-03");

    let p = TransactionService::new(&l.store)
        .list(1, &Filter::default())
        .unwrap();
    let total = |kind: TransactionType| -> Decimal {
        p.transactions
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .sum()
    };
    assert_eq!(p.summary.total_income, total(Income));
    assert_eq!(p.summary.total_expense, total(Expense));
    assert_eq!(p.summary.total_income, dec("90071992547409.94"));
    assert_eq!(p.summary.total_expense, dec("1.005"));
    assert_eq!(p.summary.balance, dec("90071992547408.935"));
}
