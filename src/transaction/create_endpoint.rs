//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    transaction::{
        core::create_transaction,
        form::{TransactionForm, check_not_future, local_today},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for creating a new transaction, redirects to transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
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

    if let Err(error) = create_transaction(form.into_builder(), user_id, &connection) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        account::{Account, AccountKind, AccountName, create_account, get_account},
        auth::UserID,
        category::{CategoryName, create_category},
        endpoints,
        test_utils::{assert_hx_redirect, get_test_connection, insert_test_user},
        transaction::{
            create_endpoint::CreateTransactionState,
            create_transaction_endpoint,
            form::{TransactionForm, TransactionType},
            get_transaction,
        },
    };

    fn get_state() -> (CreateTransactionState, UserID, Account) {
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

        let state = CreateTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (state, user_id, account)
    }

    fn expense_form(account: &Account, amount: f64) -> TransactionForm {
        TransactionForm {
            type_: TransactionType::Expense,
            amount,
            date: OffsetDateTime::now_utc().date(),
            description: "test transaction".to_owned(),
            account_id: account.id,
            category_id: None,
        }
    }

    #[tokio::test]
    async fn can_create_expense() {
        let (state, user_id, account) = get_state();

        let response = create_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(expense_form(&account, 12.5)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(1, user_id, &connection).unwrap();
        assert_eq!(transaction.amount, -12.5);
        assert_eq!(transaction.description, "test transaction");
        assert_eq!(
            get_account(account.id, user_id, &connection).unwrap().balance,
            87.5
        );
    }

    #[tokio::test]
    async fn can_create_income_with_category() {
        let (state, user_id, account) = get_state();
        let category = create_category(
            CategoryName::new_unchecked("Salary"),
            true,
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let form = TransactionForm {
            type_: TransactionType::Income,
            category_id: Some(category.id),
            ..expense_form(&account, 50.0)
        };

        let response =
            create_transaction_endpoint(State(state.clone()), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(1, user_id, &connection).unwrap();
        assert_eq!(transaction.amount, 50.0);
        assert_eq!(transaction.category_id, Some(category.id));
        assert_eq!(
            get_account(account.id, user_id, &connection).unwrap().balance,
            150.0
        );
    }

    #[tokio::test]
    async fn rejects_future_date() {
        let (state, user_id, account) = get_state();
        let form = TransactionForm {
            date: OffsetDateTime::now_utc().date() + Duration::days(2),
            ..expense_form(&account, 10.0)
        };

        let response =
            create_transaction_endpoint(State(state.clone()), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_account(account.id, user_id, &state.db_connection.lock().unwrap())
                .unwrap()
                .balance,
            100.0
        );
    }

    #[tokio::test]
    async fn rejects_zero_amount() {
        let (state, user_id, account) = get_state();

        let response = create_transaction_endpoint(
            State(state),
            Extension(user_id),
            Form(expense_form(&account, 0.0)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_non_finite_and_oversized_amounts() {
        let (state, user_id, account) = get_state();
        let today = OffsetDateTime::now_utc().date();

        for amount in ["inf", "-inf", "NaN", "1e15"] {
            let form: TransactionForm = serde_html_form::from_str(&format!(
                "type_=expense&amount={amount}&date={today}&description=Lunch&account_id={}",
                account.id
            ))
            .unwrap();

            let response =
                create_transaction_endpoint(State(state.clone()), Extension(user_id), Form(form))
                    .await;

            assert_eq!(
                response.status(),
                StatusCode::BAD_REQUEST,
                "amount {amount}"
            );
        }
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_transaction(1, user_id, &connection), Err(Error::NotFound));
        assert_eq!(
            get_account(account.id, user_id, &connection).unwrap().balance,
            100.0
        );
    }

    #[tokio::test]
    async fn rejects_other_users_account() {
        let (state, _, account) = get_state();
        let other_user = insert_test_user("other@example.com", &state.db_connection.lock().unwrap());

        let response = create_transaction_endpoint(
            State(state),
            Extension(other_user),
            Form(expense_form(&account, 10.0)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
