//! Summary cards shown at the top of the dashboard.

use maud::{Markup, html};

use crate::{dashboard::aggregation::PeriodSummary, html::format_currency};

const CARD_STYLE: &str = "rounded-lg border border-gray-200 bg-white p-4 shadow-sm \
    dark:border-gray-700 dark:bg-gray-800";
const CARD_LABEL_STYLE: &str = "text-sm text-gray-500 dark:text-gray-400";
const CARD_VALUE_STYLE: &str = "mt-1 text-2xl font-semibold tabular-nums";
const POSITIVE_STYLE: &str = "text-green-600 dark:text-green-400";
const NEGATIVE_STYLE: &str = "text-red-600 dark:text-red-400";
const NEUTRAL_STYLE: &str = "text-gray-900 dark:text-white";

fn signed_style(amount: f64) -> &'static str {
    if amount < 0.0 {
        NEGATIVE_STYLE
    } else {
        POSITIVE_STYLE
    }
}

/// Formats a percentage rounded to one decimal place, avoiding "-0.0%".
fn format_percentage(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;

    if rounded == 0.0 {
        "0.0%".to_owned()
    } else {
        format!("{rounded:.1}%")
    }
}

fn card(id: &str, label: &str, value: &str, value_style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) data-summary-card=(id)
        {
            p class=(CARD_LABEL_STYLE) { (label) }
            p id=(id) class={ (CARD_VALUE_STYLE) " " (value_style) } { (value) }
        }
    }
}

/// Renders the total balance and the income, expenses, net and savings rate for a period.
pub(super) fn summary_cards_view(total_balance: f64, summary: &PeriodSummary) -> Markup {
    let savings_rate = summary
        .savings_rate
        .map(format_percentage)
        .unwrap_or_else(|| "-".to_owned());
    let savings_rate_style = match summary.savings_rate {
        Some(rate) => signed_style(rate),
        None => NEUTRAL_STYLE,
    };
    let total_balance_style = if total_balance < 0.0 {
        NEGATIVE_STYLE
    } else {
        NEUTRAL_STYLE
    };

    html! {
        section
            id="summary-cards"
            class="w-full grid grid-cols-2 lg:grid-cols-5 gap-4 mb-6"
        {
            (card("total-balance", "Total balance", &format_currency(total_balance), total_balance_style))
            (card("period-income", "Income", &format_currency(summary.income), POSITIVE_STYLE))
            (card("period-expenses", "Expenses", &format_currency(summary.expenses), NEGATIVE_STYLE))
            (card("period-net", "Net", &format_currency(summary.net), signed_style(summary.net)))
            (card("savings-rate", "Savings rate", &savings_rate, savings_rate_style))
        }
    }
}
