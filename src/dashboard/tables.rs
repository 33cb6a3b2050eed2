//! Table views for dashboard data display.
//!
//! Provides HTML tables for the most recent transactions and the spending
//! per category in the selected period.

use maud::{Markup, html};

use crate::{
    dashboard::{aggregation::CategorySpending, queries::RecentTransaction},
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency,
    },
};

const TABLE_STYLE: &str = "w-full text-sm text-left text-gray-500 dark:text-gray-400";
const TABLE_CELL_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const TABLE_CELL_RED_STYLE: &str = "text-red-600 dark:text-red-400";

/// Gets the CSS class for coloring amounts (green for positive, red for negative).
fn amount_color_class(amount: f64) -> &'static str {
    if amount >= 0.0 {
        TABLE_CELL_GREEN_STYLE
    } else {
        TABLE_CELL_RED_STYLE
    }
}

/// Renders the latest transactions with a link to the full list.
pub(super) fn recent_transactions_table(transactions: &[RecentTransaction]) -> Markup {
    html! {
        div id="recent-transactions"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { "Recent Transactions" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class=(TABLE_STYLE)
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        }
                    }

                    tbody
                    {
                        @for transaction in transactions {
                            tr class=(TABLE_ROW_STYLE) data-recent-transaction="true"
                            {
                                td class="px-6 py-4 whitespace-nowrap" { (transaction.date) }
                                th
                                    scope="row"
                                    class="px-6 py-4 font-medium text-gray-900 dark:text-white"
                                {
                                    (transaction.description)
                                    div class="text-xs font-normal text-gray-500 dark:text-gray-400"
                                    {
                                        (transaction.account_name)
                                    }
                                }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    @if let Some(category) = &transaction.category_name {
                                        span class=(CATEGORY_BADGE_STYLE) { (category) }
                                    }
                                }
                                td class={ "px-6 py-4 text-right tabular-nums " (amount_color_class(transaction.amount)) }
                                {
                                    (format_currency(transaction.amount))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders spending per category for the period with each category's share of the total.
pub(super) fn spending_by_category_table(spending: &[CategorySpending]) -> Markup {
    let total: f64 = spending.iter().map(|category| category.amount).sum();

    html! {
        div id="spending-by-category"
        {
            h3 class="text-xl font-semibold mb-4" { "Spending by Category" }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class=(TABLE_STYLE)
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class="px-6 py-3 text-right" { "Amount" }
                            th scope="col" class="px-6 py-3 text-right" { "Share" }
                        }
                    }

                    tbody
                    {
                        @for category in spending {
                            tr class=(TABLE_ROW_STYLE) data-category-spending="true"
                            {
                                th
                                    scope="row"
                                    class="px-6 py-4 font-medium text-gray-900 dark:text-white"
                                {
                                    (category.name)
                                }
                                td class="px-6 py-4 text-right tabular-nums"
                                {
                                    (format_currency(category.amount))
                                }
                                td class="px-6 py-4 text-right tabular-nums"
                                {
                                    (format!("{:.1}%", category.share))
                                }
                            }
                        }

                        @if spending.is_empty() {
                            tr
                            {
                                td
                                    colspan="3"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "No spending in this period."
                                }
                            }
                        }
                    }

                    @if !spending.is_empty() {
                        tfoot
                        {
                            tr class="font-semibold text-gray-900 dark:text-white"
                            {
                                th scope="row" class=(TABLE_CELL_STYLE) { "Total" }
                                td id="spending-total" class="px-6 py-4 text-right tabular-nums"
                                {
                                    (format_currency(total))
                                }
                                td class="px-6 py-4 text-right tabular-nums" { "100.0%" }
                            }
                        }
                    }
                }
            }
        }
    }
}
