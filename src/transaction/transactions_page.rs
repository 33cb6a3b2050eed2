//! Defines the route handler for the page that displays transactions as a table.
use std::{
    fmt,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Deserializer, de};
use time::Date;

use crate::{
    AppState, Error,
    account::{Account, AccountId, get_all_accounts},
    auth::UserID,
    endpoints::{self, format_endpoint},
    html::{
        CATEGORY_BADGE_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links,
        format_currency,
    },
    navigation::NavBar,
    pagination::{
        Page, PageQuery, PaginationConfig, create_pagination_indicators, page_count, pagination_nav,
    },
    range::{DateRange, DateRangePreset, range_label, range_selector},
    transaction::{TransactionId, form::local_today},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
    /// Config that controls how transactions are paged.
    pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters for the transactions page, e.g.
/// `?range=last-month&account_id=2&page=3&per_page=50`.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    /// The range preset to display, defaults to this month.
    pub range: Option<DateRangePreset>,
    /// Only show transactions from this account.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub account_id: Option<AccountId>,
    /// The page number to display. Starts from 1.
    pub page: Option<u64>,
    /// The maximum number of rows to display per page.
    pub per_page: Option<u64>,
}

/// The account filter submits an empty string for "All accounts".
fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = Option::<String>::deserialize(deserializer)?;

    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// The filters that decide which transactions are shown.
#[derive(Debug, Clone, Copy)]
struct TransactionFilter {
    preset: DateRangePreset,
    range: DateRange,
    account_id: Option<AccountId>,
}

impl TransactionFilter {
    /// The transactions page URL for these filters on `page`.
    fn url(&self, page: Page) -> String {
        Self::url_with(self.preset, self.account_id, Some(page))
    }

    fn url_with(
        preset: DateRangePreset,
        account_id: Option<AccountId>,
        page: Option<Page>,
    ) -> String {
        let mut url = format!(
            "{}?range={}",
            endpoints::TRANSACTIONS_VIEW,
            preset.as_query_value()
        );

        if let Some(account_id) = account_id {
            url.push_str(&format!("&account_id={account_id}"));
        }

        if let Some(page) = page {
            url.push_str(&format!("&page={}&per_page={}", page.number, page.size));
        }

        url
    }
}

/// A transaction joined with the names of its account and category.
#[derive(Debug, Clone, PartialEq)]
struct TransactionTableRow {
    id: TransactionId,
    date: Date,
    description: String,
    amount: f64,
    account_name: String,
    category_name: Option<String>,
}

impl TransactionTableRow {
    fn edit_url(&self) -> String {
        format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, self.id)
    }

    fn delete_url(&self) -> String {
        format_endpoint(endpoints::TRANSACTION, self.id)
    }

    fn confirm_message(&self) -> String {
        format!(
            "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
            if self.description.is_empty() {
                "(no description)"
            } else {
                &self.description
            }
        )
    }
}

/// Count the user's transactions that match `filter`.
fn count_filtered_transactions(
    filter: &TransactionFilter,
    user_id: UserID,
    connection: &Connection,
) -> Result<u64, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM \"transaction\"
         WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
         AND (?4 IS NULL OR account_id = ?4)",
        (
            user_id.as_i64(),
            filter.range.start,
            filter.range.end,
            filter.account_id,
        ),
        |row| row.get(0),
    )?;

    Ok(count as u64)
}

/// Get one page of the user's transactions that match `filter`, newest first.
fn get_transaction_table_rows(
    filter: &TransactionFilter,
    page: Page,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<TransactionTableRow>, Error> {
    let query = format!(
        "SELECT t.id, t.date, t.description, t.amount, a.name, c.name
         FROM \"transaction\" t
         INNER JOIN account a ON a.id = t.account_id
         LEFT JOIN category c ON c.id = t.category_id
         WHERE t.user_id = ?1 AND t.date BETWEEN ?2 AND ?3
         AND (?4 IS NULL OR t.account_id = ?4)
         ORDER BY t.date DESC, t.id DESC
         LIMIT {} OFFSET {}",
        page.limit(),
        page.offset()
    );

    connection
        .prepare(&query)?
        .query_map(
            (
                user_id.as_i64(),
                filter.range.start,
                filter.range.end,
                filter.account_id,
            ),
            |row| {
                Ok(TransactionTableRow {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    description: row.get(2)?,
                    amount: row.get(3)?,
                    account_name: row.get(4)?,
                    category_name: row.get(5)?,
                })
            },
        )?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

fn amount_style(amount: f64) -> &'static str {
    if amount < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    }
}

fn category_badge(category_name: Option<&str>) -> Markup {
    html! {
        @match category_name {
            Some(name) => span class=(CATEGORY_BADGE_STYLE) { (name) },
            None => span class="text-gray-400 dark:text-gray-500" { "Uncategorised" },
        }
    }
}

fn account_filter_form(filter: &TransactionFilter, accounts: &[Account]) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="flex items-center gap-2 text-sm"
        {
            input type="hidden" name="range" value=(filter.preset.as_query_value());

            label for="account-filter" class="text-gray-700 dark:text-gray-300" { "Account" }

            select
                name="account_id"
                id="account-filter"
                onchange="this.form.submit()"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[filter.account_id.is_none()] { "All accounts" }

                @for account in accounts {
                    option
                        value=(account.id)
                        selected[filter.account_id == Some(account.id)]
                    {
                        (account.name)
                    }
                }
            }

            noscript
            {
                button type="submit" class=(LINK_STYLE) { "Filter" }
            }
        }
    }
}

struct TransactionsViewModel<'a> {
    filter: TransactionFilter,
    accounts: &'a [Account],
    rows: &'a [TransactionTableRow],
    pagination: Option<Markup>,
    new_transaction_url: String,
}

fn transactions_view(model: TransactionsViewModel<'_>) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let filter = model.filter;

    let table_row = |row: &TransactionTableRow| {
        html!(
            tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
            {
                td class="px-6 py-4 whitespace-nowrap" { (row.date) }

                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 dark:text-white"
                {
                    (row.description)
                }

                td class=(TABLE_CELL_STYLE) { (row.account_name) }

                td class=(TABLE_CELL_STYLE) { (category_badge(row.category_name.as_deref())) }

                td class={ "px-6 py-4 text-right tabular-nums " (amount_style(row.amount)) }
                {
                    (format_currency(row.amount))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &row.edit_url(),
                            &row.delete_url(),
                            &row.confirm_message(),
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { "Transactions" }
                        p id="range-label" class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            (range_label(filter.range))
                        }
                    }

                    a href=(model.new_transaction_url) class=(LINK_STYLE)
                    {
                        "Add Transaction"
                    }
                }

                div class="flex justify-between flex-wrap items-center gap-4"
                {
                    (range_selector(filter.preset, |preset| {
                        TransactionFilter::url_with(preset, filter.account_id, None)
                    }))

                    (account_filter_form(&filter, model.accounts))
                }

                section class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in model.rows {
                                (table_row(row))
                            }

                            @if model.rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions in this period."
                                    }
                                }
                            }
                        }
                    }
                }

                @if let Some(pagination) = model.pagination {
                    (pagination)
                }
            }
        }
    );

    base("Transactions", &[], &content)
}

/// Render a page of the user's transactions for the selected range and account.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let preset = query.range.unwrap_or_default();
    let filter = TransactionFilter {
        preset,
        range: preset.date_range(today),
        account_id: query.account_id,
    };
    let page = Page::resolve(
        &PageQuery {
            page: query.page,
            per_page: query.per_page,
        },
        &state.pagination_config,
    );

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_all_accounts(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;
    let row_count = count_filtered_transactions(&filter, user_id, &connection)
        .inspect_err(|error| tracing::error!("could not count transactions: {error}"))?;
    let page_count = page_count(row_count, page.size);
    let page = page.clamp_to(page_count);
    let rows = get_transaction_table_rows(&filter, page, user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let pagination = (page_count > 1).then(|| {
        let indicators = create_pagination_indicators(
            page.number,
            page_count,
            state.pagination_config.max_pages,
        );
        pagination_nav(&indicators, |number| filter.url(Page { number, ..page }))
    });

    let new_transaction_url = match filter.account_id {
        Some(account_id) => format!(
            "{}?account_id={account_id}",
            endpoints::NEW_TRANSACTION_VIEW
        ),
        None => endpoints::NEW_TRANSACTION_VIEW.to_owned(),
    };

    Ok(transactions_view(TransactionsViewModel {
        filter,
        accounts: &accounts,
        rows: &rows,
        pagination,
        new_transaction_url,
    })
    .into_response())
}
