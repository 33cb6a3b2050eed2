//! Defines the route handler for the page for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{Account, AccountId, get_all_accounts},
    auth::UserID,
    category::{Category, get_all_categories},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles, loading_spinner},
    navigation::NavBar,
    transaction::form::{TransactionFormDefaults, local_today, transaction_form_fields},
};

fn create_transaction_view(
    defaults: &TransactionFormDefaults,
    accounts: &[Account],
    categories: &[Category],
) -> Markup {
    let create_transaction_route = endpoints::TRANSACTIONS_API;
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(create_transaction_route)
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                (transaction_form_fields(defaults, accounts, categories))

                button
                    type="submit"
                    id="submit-button"
                    tabindex="0"
                    disabled[accounts.is_empty()]
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Create Transaction"
                }
            }
        }
    };

    base("Create Transaction", &[dollar_input_styles()], &content)
}

/// The state needed for create new transaction page.
#[derive(Debug, Clone)]
pub struct CreateTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for accessing accounts and categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters for the new transaction page.
#[derive(Debug, Default, Deserialize)]
pub struct NewTransactionQuery {
    /// The account to select by default, e.g. when coming from a filtered transactions page.
    pub account_id: Option<AccountId>,
}

/// Renders the page for creating a transaction.
pub async fn get_create_transaction_page(
    State(state): State<CreateTransactionPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<NewTransactionQuery>,
) -> Result<Response, Error> {
    let (accounts, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let accounts = get_all_accounts(user_id, &connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve accounts for new transaction page: {error}")
        })?;
        let categories = get_all_categories(user_id, &connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve categories for new transaction page: {error}")
        })?;

        (accounts, categories)
    };

    let today = local_today(&state.local_timezone)?;
    let defaults = TransactionFormDefaults::new_transaction(today, query.account_id);

    Ok(create_transaction_view(&defaults, &accounts, &categories).into_response())
}

#[cfg(test)]
mod view_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use scraper::Selector;

    use crate::{
        Error,
        account::{AccountKind, AccountName, create_account},
        auth::UserID,
        category::{CategoryName, create_category},
        endpoints,
        test_utils::{
            assert_content_type, assert_form_input, assert_form_select,
            assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            get_test_connection, insert_test_user, must_get_form, parse_html_document,
            select_texts,
        },
    };

    use super::{CreateTransactionPageState, NewTransactionQuery, get_create_transaction_page};

    fn get_state(local_timezone: &str) -> (CreateTransactionPageState, UserID) {
        let connection = get_test_connection();
        let user_id = insert_test_user("test@example.com", &connection);

        (
            CreateTransactionPageState {
                local_timezone: local_timezone.to_owned(),
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
        )
    }

    #[tokio::test]
    async fn render_page() {
        let (state, user_id) = get_state("Etc/UTC");
        let everyday_id = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                CategoryName::new_unchecked("Groceries"),
                false,
                user_id,
                &connection,
            )
            .unwrap();
            create_account(
                AccountName::new_unchecked("Visa"),
                AccountKind::Credit,
                0.0,
                user_id,
                &connection,
            )
            .unwrap();
            create_account(
                AccountName::new_unchecked("Everyday"),
                AccountKind::Checking,
                0.0,
                user_id,
                &connection,
            )
            .unwrap()
            .id
        };

        let response = get_create_transaction_page(
            State(state),
            Extension(user_id),
            Query(NewTransactionQuery {
                account_id: Some(everyday_id),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "date", "date");
        assert_form_input(&form, "type_", "radio");
        assert_form_select(&form, "account_id", &["2", "1"]);
        assert_form_select(&form, "category_id", &["", "1"]);
        assert_form_submit_button(&form);
        assert_eq!(
            select_texts(&html, "select[name=account_id] option[selected]"),
            ["Everyday"]
        );
    }

    #[tokio::test]
    async fn submit_disabled_without_accounts() {
        let (state, user_id) = get_state("Etc/UTC");

        let response =
            get_create_transaction_page(State(state), Extension(user_id), Query(Default::default()))
                .await
                .unwrap();

        let html = parse_html_document(response).await;
        let button = html
            .select(&Selector::parse("button[type=submit]").unwrap())
            .next()
            .unwrap();
        assert!(button.value().attr("disabled").is_some());
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let (state, user_id) = get_state("Invalid/Timezone");

        let result =
            get_create_transaction_page(State(state), Extension(user_id), Query(Default::default()))
                .await;

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidTimezoneError("Invalid/Timezone".to_owned())
        );
    }
}
