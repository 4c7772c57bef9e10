// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Composable query predicates and the listing filter that feeds them.

use crate::models::{Filter, TransactionType};
use chrono::NaiveDate;

/// A single conjunct of a [`Predicate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    User(i64),
    DateFrom(NaiveDate),
    DateTo(NaiveDate),
    Category(i64),
    /// Raw type text from the caller. Unknown values match nothing.
    Kind(String),
}

/// AND-ed list of conditions. Always scoped to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            conditions: vec![Condition::User(user_id)],
        }
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn of_kind(self, kind: TransactionType) -> Self {
        self.and(Condition::Kind(kind.as_str().to_string()))
    }

    pub fn since(self, date: NaiveDate) -> Self {
        self.and(Condition::DateFrom(date))
    }

    pub fn until(self, date: NaiveDate) -> Self {
        self.and(Condition::DateTo(date))
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn user_id(&self) -> Option<i64> {
        self.conditions.iter().find_map(|c| match c {
            Condition::User(id) => Some(*id),
            _ => None,
        })
    }
}

fn parse_bound(raw: Option<&str>) -> Option<NaiveDate> {
    raw.filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// Narrow `base` by whatever the filter sets. Dates that fail to parse are
/// skipped, not reported.
pub fn build_predicate(base: Predicate, filter: &Filter) -> Predicate {
    let mut p = base;
    if let Some(start) = parse_bound(filter.start_date.as_deref()) {
        p = p.since(start);
    }
    if let Some(end) = parse_bound(filter.end_date.as_deref()) {
        p = p.until(end);
    }
    if filter.category_id != 0 {
        p = p.and(Condition::Category(filter.category_id));
    }
    if let Some(kind) = filter.kind.as_deref().filter(|k| !k.is_empty()) {
        p = p.and(Condition::Kind(kind.to_string()));
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_filter_keeps_user_scope_only() {
        let p = build_predicate(Predicate::for_user(4), &Filter::default());
        assert_eq!(p.conditions(), &[Condition::User(4)]);
    }

    #[test]
    fn every_field_adds_a_conjunct() {
        let filter = Filter {
            start_date: Some("2025-01-01".into()),
            end_date: Some("2025-01-31".into()),
            category_id: 9,
            kind: Some("expense".into()),
            ..Filter::default()
        };
        let p = build_predicate(Predicate::for_user(1), &filter);
        assert_eq!(
            p.conditions(),
            &[
                Condition::User(1),
                Condition::DateFrom(d("2025-01-01")),
                Condition::DateTo(d("2025-01-31")),
                Condition::Category(9),
                Condition::Kind("expense".into()),
            ]
        );
    }

    #[test]
    fn bad_dates_are_dropped() {
        let filter = Filter {
            start_date: Some("01/02/2025".into()),
            end_date: Some("2025-02-30".into()),
            kind: Some(String::new()),
            ..Filter::default()
        };
        let p = build_predicate(Predicate::for_user(1), &filter);
        assert_eq!(p.conditions(), &[Condition::User(1)]);
    }

    #[test]
    fn user_id_is_recoverable() {
        let p = Predicate::for_user(12).of_kind(TransactionType::Income);
        assert_eq!(p.user_id(), Some(12));
    }
}
