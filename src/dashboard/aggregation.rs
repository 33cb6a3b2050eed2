//! Transaction data aggregation and transformation for charts and tables.
//!
//! Provides functions to summarise a period, total income and expenses by
//! month, calculate running balances and group spending by category.

use std::collections::HashMap;

use time::{Date, Month};

use crate::{
    balance::reverse_amount,
    dashboard::queries::DashboardTransaction,
    range::{month_abbrev, month_bounds},
};

pub(super) const UNCATEGORISED_LABEL: &str = "Uncategorised";

/// Whether `transaction` counts towards income rather than spending.
///
/// Transactions in an income category are always income. Other transactions
/// count as income when money comes in.
fn is_income(transaction: &DashboardTransaction) -> bool {
    transaction.is_income || transaction.amount >= 0.0
}

/// Income, expenses and savings for a period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct PeriodSummary {
    pub income: f64,
    /// Money spent, as a positive number.
    pub expenses: f64,
    pub net: f64,
    /// Net as a percentage of income, `None` when there was no income.
    pub savings_rate: Option<f64>,
}

pub(super) fn summarise_period(transactions: &[DashboardTransaction]) -> PeriodSummary {
    let (income, expenses) = income_and_expenses(transactions.iter());
    let net = income - expenses;
    let savings_rate = (income > 0.0).then(|| net * 100.0 / income);

    PeriodSummary {
        income,
        expenses,
        net,
        savings_rate,
    }
}

fn income_and_expenses<'a>(
    transactions: impl Iterator<Item = &'a DashboardTransaction>,
) -> (f64, f64) {
    transactions.fold((0.0, 0.0), |(income, expenses), transaction| {
        if is_income(transaction) {
            (income + transaction.amount, expenses)
        } else {
            (income, expenses - transaction.amount)
        }
    })
}

/// The first day of the twelve months ending with the month of `today`, oldest first.
pub(super) fn last_twelve_months(today: Date) -> Vec<Date> {
    let mut year = today.year();
    let mut month = today.month();
    let mut months = Vec::with_capacity(12);

    for _ in 0..12 {
        months.push(month_bounds(year, month).start);

        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }

    months.reverse();
    months
}

/// Formats month dates as three-letter abbreviations, e.g. "Jan".
pub(super) fn format_month_labels(months: &[Date]) -> Vec<String> {
    months
        .iter()
        .map(|month| month_abbrev(month.month()).to_owned())
        .collect()
}

/// Income and expenses for one month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct MonthlyTotals {
    pub month: Date,
    pub income: f64,
    pub expenses: f64,
}

impl MonthlyTotals {
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }
}

/// Totals income and expenses for each month in `months`.
///
/// Months without transactions are included with zero totals.
pub(super) fn monthly_totals(
    transactions: &[DashboardTransaction],
    months: &[Date],
) -> Vec<MonthlyTotals> {
    let mut by_month: HashMap<Date, Vec<&DashboardTransaction>> = HashMap::new();

    for transaction in transactions {
        let month = month_bounds(transaction.date.year(), transaction.date.month()).start;
        by_month.entry(month).or_default().push(transaction);
    }

    months
        .iter()
        .map(|&month| {
            let (income, expenses) = by_month
                .get(&month)
                .map(|transactions| income_and_expenses(transactions.iter().copied()))
                .unwrap_or_default();

            MonthlyTotals {
                month,
                income,
                expenses,
            }
        })
        .collect()
}

/// Calculates the balance at the end of each month by working backwards from the current total.
///
/// The last month ends with `total_balance`, and each earlier month ends
/// with the following month's net taken back off.
pub(super) fn calculate_running_balances(total_balance: f64, monthly: &[MonthlyTotals]) -> Vec<f64> {
    let mut balances = Vec::with_capacity(monthly.len());
    let mut balance = total_balance;

    for totals in monthly.iter().rev() {
        balances.push(balance);
        balance = reverse_amount(balance, totals.net());
    }

    balances.reverse();
    balances
}

/// How much was spent in a category over a period.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CategorySpending {
    pub name: String,
    /// Money spent, as a positive number.
    pub amount: f64,
    /// Percentage of all spending in the period.
    pub share: f64,
}

/// Groups spending by category, largest first with uncategorised spending last.
///
/// Income categories and money coming in are excluded.
pub(super) fn spending_by_category(transactions: &[DashboardTransaction]) -> Vec<CategorySpending> {
    let mut totals: HashMap<Option<&str>, f64> = HashMap::new();

    for transaction in transactions.iter().filter(|t| !is_income(t)) {
        *totals.entry(transaction.category.as_deref()).or_default() -= transaction.amount;
    }

    let total_spending: f64 = totals.values().sum();
    let uncategorised = totals.remove(&None);

    let mut categories: Vec<(&str, f64)> = totals
        .into_iter()
        .filter_map(|(name, amount)| name.map(|name| (name, amount)))
        .collect();
    categories.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let share = |amount: f64| {
        if total_spending > 0.0 {
            amount * 100.0 / total_spending
        } else {
            0.0
        }
    };

    categories
        .into_iter()
        .chain(uncategorised.map(|amount| (UNCATEGORISED_LABEL, amount)))
        .map(|(name, amount)| CategorySpending {
            name: name.to_owned(),
            amount,
            share: share(amount),
        })
        .collect()
}
