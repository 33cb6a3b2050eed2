//! Displays accounts and their balances.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, get_all_accounts},
    auth::UserID,
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, currency_rounded_with_tooltip, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the [get_accounts_page](crate::account::get_accounts_page) route handler.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The account data to display in the view
#[derive(Debug, PartialEq)]
struct AccountTableRow {
    name: String,
    kind: &'static str,
    balance: f64,
    edit_url: String,
    delete_url: String,
}

impl AccountTableRow {
    fn confirm_message(&self) -> String {
        format!(
            "Are you sure you want to delete the account '{}'? \
            All of its transactions will be deleted too. This cannot be undone.",
            self.name
        )
    }
}

impl From<Account> for AccountTableRow {
    fn from(account: Account) -> Self {
        Self {
            name: account.name.to_string(),
            kind: account.kind.label(),
            balance: account.balance,
            edit_url: format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, account.id),
            delete_url: format_endpoint(endpoints::ACCOUNT, account.id),
        }
    }
}

fn balance_style(balance: f64) -> &'static str {
    if balance < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-gray-900 dark:text-white"
    }
}

fn accounts_view(accounts: &[AccountTableRow]) -> Markup {
    let create_account_page_url = endpoints::NEW_ACCOUNT_VIEW;
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();
    let total_balance: f64 = accounts.iter().map(|account| account.balance).sum();

    let table_row = |account: &AccountTableRow| {
        html!(
            tr class=(TABLE_ROW_STYLE) data-account-row="true"
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    (account.name)
                }

                td class=(TABLE_CELL_STYLE) { (account.kind) }

                td class={ "px-6 py-4 text-right tabular-nums " (balance_style(account.balance)) }
                {
                    (format_currency(account.balance))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &account.edit_url,
                            &account.delete_url,
                            &account.confirm_message(),
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
                header class="flex justify-between flex-wrap items-end"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { "Accounts" }
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            "Total balance: "
                            span id="total-balance" class=(balance_style(total_balance))
                            { (format_currency(total_balance)) }
                        }
                    }

                    a href=(create_account_page_url) class=(LINK_STYLE)
                    {
                        "Add Account"
                    }
                }

                (accounts_cards_view(accounts, create_account_page_url))

                section class="hidden lg:block w-full overflow-x-auto lg:overflow-visible dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class="px-6 py-3 text-right" { "Balance" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for account in accounts {
                                (table_row(account))
                            }

                            @if accounts.is_empty() {
                                tr
                                {
                                    td
                                        colspan="4"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No accounts found. Create an account "
                                        a href=(create_account_page_url) class=(LINK_STYLE)
                                        {
                                            "here"
                                        }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Accounts", &[], &content)
}

fn accounts_cards_view(accounts: &[AccountTableRow], create_account_page_url: &str) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for account in accounts {
                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-account-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        div class="text-sm font-semibold text-gray-900 dark:text-white"
                        { (account.name) }
                        div class={ "text-sm tabular-nums text-right " (balance_style(account.balance)) }
                        { (currency_rounded_with_tooltip(account.balance)) }
                    }

                    div class="mt-1 text-xs text-gray-500 dark:text-gray-400" { (account.kind) }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (edit_delete_action_links(
                            &account.edit_url,
                            &account.delete_url,
                            &account.confirm_message(),
                            "closest [data-account-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if accounts.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No accounts found. Create an account "
                    a href=(create_account_page_url) class=(LINK_STYLE)
                    {
                        "here"
                    }
                    "."
                }
            }
        }
    )
}

/// Renders the accounts page showing all of the user's accounts.
pub async fn get_accounts_page(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts: Vec<AccountTableRow> = get_all_accounts(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get all accounts: {error}"))?
        .into_iter()
        .map(AccountTableRow::from)
        .collect();

    Ok(accounts_view(&accounts).into_response())
}
