//! Defines the endpoint for updating a transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    transaction::{
        TransactionId,
        core::update_transaction,
        form::{TransactionForm, check_not_future, local_today},
    },
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for updating a transaction, redirects to transactions view on success.
///
/// The balances of the old and new accounts are adjusted to match.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = check_not_future(form.date, today) {
        return error.into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_transaction(transaction_id, form.into_builder(), user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Transaction, create_transaction,
        account::{Account, AccountKind, AccountName, create_account, get_account},
        auth::UserID,
        endpoints,
        test_utils::{assert_hx_redirect, get_test_connection, insert_test_user},
        transaction::{
            form::{TransactionForm, TransactionType},
            get_transaction,
        },
    };

    use super::{EditTransactionState, edit_transaction_endpoint};

    fn get_state() -> (EditTransactionState, UserID, Account, Transaction) {
        let connection = get_test_connection();
        let user_id = insert_test_user("test@example.com", &connection);
        let account = create_account(
            AccountName::new_unchecked("Everyday"),
            AccountKind::Checking,
            100.0,
            user_id,
            &connection,
        )
        .unwrap();
        let transaction = create_transaction(
            Transaction::build(account.id, -20.0, OffsetDateTime::now_utc().date(), "Lunch"),
            user_id,
            &connection,
        )
        .unwrap();

        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (state, user_id, account, transaction)
    }

    fn form(account: &Account, type_: TransactionType, amount: f64) -> Form<TransactionForm> {
        Form(TransactionForm {
            type_,
            amount,
            date: OffsetDateTime::now_utc().date(),
            description: "Dinner".to_owned(),
            account_id: account.id,
            category_id: None,
        })
    }

    #[tokio::test]
    async fn rejects_non_finite_and_oversized_amounts() {
        let (state, user_id, account, transaction) = get_state();

        for amount in [f64::INFINITY, f64::NAN, 1e15] {
            let response = edit_transaction_endpoint(
                State(state.clone()),
                Extension(user_id),
                Path(transaction.id),
                form(&account, TransactionType::Expense, amount),
            )
            .await;

            assert_eq!(
                response.status(),
                StatusCode::BAD_REQUEST,
                "amount {amount}"
            );
        }
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_transaction(transaction.id, user_id, &connection), Ok(transaction));
        assert_eq!(
            get_account(account.id, user_id, &connection).unwrap().balance,
            80.0
        );
    }

    #[tokio::test]
    async fn updates_transaction_and_balance() {
        let (state, user_id, account, transaction) = get_state();

        let response = edit_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(transaction.id),
            form(&account, TransactionType::Expense, 50.0),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let updated = get_transaction(transaction.id, user_id, &connection).unwrap();
        assert_eq!(updated.amount, -50.0);
        assert_eq!(updated.description, "Dinner");
        assert_eq!(
            get_account(account.id, user_id, &connection).unwrap().balance,
            50.0
        );
    }

    #[tokio::test]
    async fn switching_to_income_flips_sign() {
        let (state, user_id, account, transaction) = get_state();

        edit_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(transaction.id),
            form(&account, TransactionType::Income, 20.0),
        )
        .await;

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_account(account.id, user_id, &connection).unwrap().balance,
            120.0
        );
    }

    #[tokio::test]
    async fn rejects_future_date() {
        let (state, user_id, account, transaction) = get_state();
        let Form(mut future) = form(&account, TransactionType::Expense, 50.0);
        future.date = OffsetDateTime::now_utc().date() + Duration::days(3);

        let response = edit_transaction_endpoint(
            State(state),
            Extension(user_id),
            Path(transaction.id),
            Form(future),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_transaction_returns_not_found() {
        let (state, user_id, account, _) = get_state();

        let response = edit_transaction_endpoint(
            State(state),
            Extension(user_id),
            Path(404),
            form(&account, TransactionType::Expense, 5.0),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
