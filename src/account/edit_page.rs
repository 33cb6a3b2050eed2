//! Defines the route handler for the page for editing an account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{
        Account, AccountId,
        form::{AccountFormDefaults, account_form_fields},
        get_account,
    },
    auth::UserID,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// The state needed for the edit account page.
#[derive(Debug, Clone)]
pub struct EditAccountPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn edit_account_view(account: &Account) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, account.id);
    let update_url = endpoints::format_endpoint(endpoints::ACCOUNT, account.id);
    let nav_bar = NavBar::new(&edit_url).into_html();
    let defaults = AccountFormDefaults {
        name: account.name.as_str(),
        kind: account.kind,
        balance: Some(account.balance),
    };

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Account" }

                (account_form_fields(&defaults))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Account" }
            }
        }
    };

    base("Edit Account", &[dollar_input_styles()], &content)
}

/// Renders the page for editing an account.
///
/// Responds with a 404 page if the user has no account with `account_id`.
pub async fn get_edit_account_page(
    Path(account_id): Path<AccountId>,
    State(state): State<EditAccountPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let account = get_account(account_id, user_id, &connection)?;

    Ok(edit_account_view(&account).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        Error,
        account::{AccountKind, AccountName, create_account},
        endpoints,
        test_utils::{
            assert_form_input_with_value, assert_form_submit_button, assert_hx_endpoint,
            assert_valid_html, get_test_connection, insert_test_user, must_get_form,
            parse_html_document, select_texts,
        },
    };

    use super::{EditAccountPageState, get_edit_account_page};

    #[tokio::test]
    async fn render_page_with_account_values() {
        let connection = get_test_connection();
        let user_id = insert_test_user("test@example.com", &connection);
        let account = create_account(
            AccountName::new_unchecked("Visa"),
            AccountKind::Credit,
            -250.5,
            user_id,
            &connection,
        )
        .unwrap();
        let state = EditAccountPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_edit_account_page(Path(account.id), State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::ACCOUNT, account.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Visa");
        assert_form_input_with_value(&form, "balance", "number", "-250.50");
        assert_form_submit_button(&form);
        assert_eq!(select_texts(&html, "option[selected]"), ["Credit Card"]);
    }

    #[tokio::test]
    async fn missing_account_is_not_found() {
        let connection = get_test_connection();
        let user_id = insert_test_user("test@example.com", &connection);
        let state = EditAccountPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let result = get_edit_account_page(Path(7), State(state), Extension(user_id)).await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }
}
