//! Period aggregation of monetary records
//!
//! Sums expenses and income over calendar periods, grouped by category (or
//! income source), and builds month-over-month comparisons. Everything here
//! is a pure function of its inputs.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::MonetaryRecord;
use crate::money::Money;

/// A contiguous date range; both bounds are inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidData(format!(
                "Period start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The calendar month `year-month`
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let out_of_range = || Error::InvalidData(format!("Invalid month: {}-{:02}", year, month));
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
        let end = (28..=31)
            .rev()
            .find_map(|day| NaiveDate::from_ymd_opt(year, month, day))
            .ok_or_else(out_of_range)?;
        Ok(Self { start, end })
    }

    /// The calendar month that `date` falls in
    pub fn containing(date: NaiveDate) -> Result<Self> {
        Self::month(date.year(), date.month())
    }

    /// The calendar month before this period's start (January rolls back to December).
    /// Fails only at the lower edge of the supported date range.
    pub fn previous_month(&self) -> Result<Self> {
        let last_day = self.start.pred_opt().ok_or_else(|| {
            Error::InvalidData(format!("No month before {}", self.label()))
        })?;
        Self::containing(last_day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `YYYY-MM` of the period start
    pub fn label(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month_number(&self) -> u32 {
        self.start.month()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

/// Totals over one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub total: Money,
    pub by_category: BTreeMap<String, Money>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

impl PeriodSummary {
    /// Category with the largest total (ties go to the alphabetically first)
    pub fn top_category(&self) -> Option<(&str, Money)> {
        self.by_category
            .iter()
            .fold(None, |best: Option<(&str, Money)>, (name, amount)| match best {
                Some((_, top)) if top >= *amount => best,
                _ => Some((name.as_str(), *amount)),
            })
    }
}

/// Sum `records` dated within `[start, end]`, grouped by category.
pub fn aggregate_period(
    records: &[MonetaryRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> PeriodSummary {
    let mut total = Money::ZERO;
    let mut by_category: BTreeMap<String, Money> = BTreeMap::new();

    for record in records {
        if record.date < start || record.date > end {
            continue;
        }
        total += record.amount;
        *by_category.entry(record.category.clone()).or_default() += record.amount;
    }

    PeriodSummary {
        total,
        by_category,
        period_start: start,
        period_end: end,
    }
}

pub fn aggregate(records: &[MonetaryRecord], period: &Period) -> PeriodSummary {
    aggregate_period(records, period.start, period.end)
}

/// Per-day sums within the period; days with no records are absent
pub fn daily_totals(records: &[MonetaryRecord], period: &Period) -> BTreeMap<NaiveDate, Money> {
    let mut totals: BTreeMap<NaiveDate, Money> = BTreeMap::new();
    for record in records.iter().filter(|r| period.contains(r.date)) {
        *totals.entry(record.date).or_default() += record.amount;
    }
    totals
}

/// Income and spending for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub period: Period,
    pub month: String,
    pub total_income: Money,
    pub total_expenses: Money,
    pub net_balance: Money,
    pub category_spending: BTreeMap<String, Money>,
    pub income_by_source: BTreeMap<String, Money>,
}

impl MonthlyStats {
    pub fn from_records(
        period: Period,
        expenses: &[MonetaryRecord],
        income: &[MonetaryRecord],
    ) -> Self {
        let spent = aggregate(expenses, &period);
        let earned = aggregate(income, &period);
        Self {
            month: period.label(),
            period,
            total_income: earned.total,
            total_expenses: spent.total,
            net_balance: earned.total - spent.total,
            category_spending: spent.by_category,
            income_by_source: earned.by_category,
        }
    }
}

/// A month next to the month before it. Deltas are current minus previous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthComparison {
    pub current: MonthlyStats,
    pub previous: MonthlyStats,
    pub expense_delta: Money,
    pub income_delta: Money,
    pub net_delta: Money,
}

/// Compare `year-month` with the preceding calendar month.
///
/// The record lists may span any dates; each month filters for itself.
pub fn compare_months(
    year: i32,
    month: u32,
    expenses: &[MonetaryRecord],
    income: &[MonetaryRecord],
) -> Result<MonthComparison> {
    let current_period = Period::month(year, month)?;
    let current = MonthlyStats::from_records(current_period, expenses, income);
    let previous = MonthlyStats::from_records(current_period.previous_month()?, expenses, income);

    Ok(MonthComparison {
        expense_delta: current.total_expenses - previous.total_expenses,
        income_delta: current.total_income - previous.total_income,
        net_delta: current.net_balance - previous.net_balance,
        current,
        previous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn rec(amount: i64, category: &str, date: &str) -> MonetaryRecord {
        MonetaryRecord::new(Money::from_major(amount), category, day(date))
    }

    fn sample() -> Vec<MonetaryRecord> {
        vec![
            rec(50, "food", "2024-03-01"),
            rec(30, "food", "2024-03-02"),
            rec(20, "transport", "2024-03-01"),
        ]
    }

    #[test]
    fn test_groups_by_category() {
        let summary = aggregate_period(&sample(), day("2024-03-01"), day("2024-03-31"));
        assert_eq!(summary.total, Money::from_major(100));
        assert_eq!(summary.by_category.len(), 2);
        assert_eq!(summary.by_category["food"], Money::from_major(80));
        assert_eq!(summary.by_category["transport"], Money::from_major(20));
    }

    #[test]
    fn test_empty_input_is_zero() {
        let summary = aggregate_period(&[], day("2024-03-01"), day("2024-03-31"));
        assert_eq!(summary.total, Money::ZERO);
        assert!(summary.by_category.is_empty());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let records = vec![
            rec(1, "a", "2024-02-29"),
            rec(2, "a", "2024-03-01"),
            rec(4, "a", "2024-03-31"),
            rec(8, "a", "2024-04-01"),
        ];
        let summary = aggregate(&records, &Period::month(2024, 3).unwrap());
        assert_eq!(summary.total, Money::from_major(6));
    }

    #[test]
    fn test_permutation_invariant() {
        let mut records = sample();
        records.push(rec(12, "books", "2024-03-10"));
        let forward = aggregate_period(&records, day("2024-03-01"), day("2024-03-31"));
        records.reverse();
        let backward = aggregate_period(&records, day("2024-03-01"), day("2024-03-31"));
        records.swap(0, 2);
        let shuffled = aggregate_period(&records, day("2024-03-01"), day("2024-03-31"));
        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_category_sums_equal_total() {
        let records: Vec<MonetaryRecord> = (0..50)
            .map(|i| {
                MonetaryRecord::new(
                    Money::from_minor(i * 37 + 1),
                    ["food", "rent", "fun"][(i % 3) as usize],
                    day("2024-05-01") + Duration::days(i % 28),
                )
            })
            .collect();
        let summary = aggregate(&records, &Period::month(2024, 5).unwrap());
        let sum: Money = summary.by_category.values().sum();
        assert_eq!(sum, summary.total);
    }

    #[test]
    fn test_cents_do_not_drift() {
        let records: Vec<MonetaryRecord> = (0..1000)
            .map(|_| MonetaryRecord::new(Money::from_minor(10), "coffee", day("2024-01-15")))
            .collect();
        let summary = aggregate(&records, &Period::month(2024, 1).unwrap());
        assert_eq!(summary.total, Money::from_major(100));
        assert_eq!(summary.total.to_string(), "100.00");
    }

    #[test]
    fn test_period_month_lengths() {
        assert_eq!(Period::month(2024, 2).unwrap().end, day("2024-02-29"));
        assert_eq!(Period::month(2023, 2).unwrap().end, day("2023-02-28"));
        assert_eq!(Period::month(2024, 12).unwrap().end, day("2024-12-31"));
        assert_eq!(Period::month(2024, 4).unwrap().days().count(), 30);
        assert!(Period::month(2024, 13).is_err());
        assert!(Period::month(2024, 0).is_err());
    }

    #[test]
    fn test_previous_month_wraps_year() {
        let jan = Period::month(2024, 1).unwrap();
        let prev = jan.previous_month().unwrap();
        assert_eq!(prev, Period::month(2023, 12).unwrap());
        assert_eq!(prev.label(), "2023-12");
    }

    #[test]
    fn test_containing() {
        let period = Period::containing(day("2024-02-14")).unwrap();
        assert_eq!(period, Period::month(2024, 2).unwrap());
    }

    #[test]
    fn test_months_at_edge_of_date_range() {
        // The last representable month still has a well-formed end
        let last = Period::month(NaiveDate::MAX.year(), 12).unwrap();
        assert_eq!(last.end, NaiveDate::MAX);
        assert!(Period::containing(NaiveDate::MAX).is_ok());

        // Nothing precedes the first representable month
        let first = Period::containing(NaiveDate::MIN).unwrap();
        assert_eq!(first.start, NaiveDate::MIN);
        assert!(first.previous_month().is_err());
        assert!(compare_months(NaiveDate::MIN.year(), 1, &[], &[]).is_err());

        assert!(compare_months(NaiveDate::MAX.year(), 12, &[], &[]).is_ok());
        assert!(Period::month(NaiveDate::MAX.year() + 1, 1).is_err());
    }

    #[test]
    fn test_huge_totals_do_not_overflow() {
        let huge = Money::from_minor(i64::MAX - 1);
        let records = vec![
            MonetaryRecord::new(huge, "rent", day("2024-03-01")),
            MonetaryRecord::new(huge, "rent", day("2024-03-02")),
        ];
        let summary = aggregate_period(&records, day("2024-03-01"), day("2024-03-31"));
        assert_eq!(summary.total, Money::from_minor(i64::MAX));
        assert_eq!(summary.by_category["rent"], Money::from_minor(i64::MAX));

        let comparison = compare_months(2024, 3, &records, &records).unwrap();
        assert_eq!(comparison.current.net_balance, Money::ZERO);
    }

    #[test]
    fn test_period_new_rejects_reversed_bounds() {
        assert!(Period::new(day("2024-03-02"), day("2024-03-01")).is_err());
        assert!(Period::new(day("2024-03-01"), day("2024-03-01")).is_ok());
    }

    #[test]
    fn test_daily_totals() {
        let totals = daily_totals(&sample(), &Period::month(2024, 3).unwrap());
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&day("2024-03-01")], Money::from_major(70));
        assert_eq!(totals[&day("2024-03-02")], Money::from_major(30));
    }

    #[test]
    fn test_compare_months() {
        let expenses = vec![
            rec(100, "food", "2024-01-10"),
            rec(40, "fun", "2023-12-24"),
            rec(60, "food", "2023-12-02"),
        ];
        let income = vec![
            rec(500, "Allowance", "2024-01-01"),
            rec(500, "Allowance", "2023-12-01"),
            rec(150, "Tutoring", "2023-12-16"),
        ];
        let cmp = compare_months(2024, 1, &expenses, &income).unwrap();

        assert_eq!(cmp.current.month, "2024-01");
        assert_eq!(cmp.previous.month, "2023-12");
        assert_eq!(cmp.current.total_expenses, Money::from_major(100));
        assert_eq!(cmp.previous.total_expenses, Money::from_major(100));
        assert_eq!(cmp.current.net_balance, Money::from_major(400));
        assert_eq!(cmp.previous.net_balance, Money::from_major(550));
        assert_eq!(cmp.expense_delta, Money::ZERO);
        assert_eq!(cmp.income_delta, Money::from_major(-150));
        assert_eq!(cmp.net_delta, Money::from_major(-150));
        assert_eq!(cmp.previous.income_by_source["Tutoring"], Money::from_major(150));
    }

    #[test]
    fn test_compare_months_with_no_data() {
        let cmp = compare_months(2024, 6, &[], &[]).unwrap();
        assert_eq!(cmp.current.total_expenses, Money::ZERO);
        assert_eq!(cmp.previous.net_balance, Money::ZERO);
        assert_eq!(cmp.net_delta, Money::ZERO);
    }

    #[test]
    fn test_top_category() {
        let summary = aggregate(&sample(), &Period::month(2024, 3).unwrap());
        assert_eq!(summary.top_category(), Some(("food", Money::from_major(80))));
        let empty = aggregate(&[], &Period::month(2024, 3).unwrap());
        assert_eq!(empty.top_category(), None);
    }
}
