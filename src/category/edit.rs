//! Category editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{
        CategoryId, CategoryName, create::category_form_fields, domain::CategoryFormData,
        get_category, update_category,
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// The state needed for the edit category page and endpoint.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category editing page.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, user_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve category {category_id}: {error}");
        }
    })?;

    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::CATEGORY, category_id);
    let form = edit_category_form_view(
        &update_endpoint,
        category.name.as_ref(),
        category.is_income,
        "",
    );

    let content = html! {
        (NavBar::new(&edit_endpoint).into_html())
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    Ok(base("Edit Category", &[], &content).into_response())
}

/// Handle category update form submission.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let update_endpoint = endpoints::format_endpoint(endpoints::CATEGORY, category_id);
    let is_income = form_data.is_income.is_some();

    let name = match CategoryName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            return edit_category_form_view(
                &update_endpoint,
                &form_data.name,
                is_income,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(category_id, name, is_income, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::UpdateMissingCategory | Error::DuplicateCategoryName(_)),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_category_form_view(
    update_endpoint: &str,
    name: &str,
    is_income: bool,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "Edit Category" }

            (category_form_fields(name, is_income))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Category" }
        }
    }
}

#[cfg(test)]
mod edit_category_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use scraper::Selector;

    use crate::{
        Error,
        auth::UserID,
        category::{
            CategoryName, create_category, domain::CategoryFormData, edit::EditCategoryState,
            get_category, get_edit_category_page, update_category_endpoint,
        },
        endpoints,
        test_utils::{
            assert_content_type, assert_form_error_message, assert_form_input_with_value,
            assert_form_submit_button, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, get_test_connection, insert_test_user, must_get_form,
            parse_html_document, parse_html_fragment,
        },
    };

    fn get_state() -> (EditCategoryState, UserID) {
        let connection = get_test_connection();
        let user_id = insert_test_user("test@example.com", &connection);

        (
            EditCategoryState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
        )
    }

    #[tokio::test]
    async fn edit_page_shows_category() {
        let (state, user_id) = get_state();
        let category = create_category(
            CategoryName::new_unchecked("Salary"),
            true,
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_edit_category_page(Path(category.id), State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::CATEGORY, category.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Salary");
        assert_form_submit_button(&form);
        let income_box = form
            .select(&Selector::parse("input[name=is_income]").unwrap())
            .next()
            .expect("No income checkbox found");
        assert!(income_box.value().attr("checked").is_some());
    }

    #[tokio::test]
    async fn edit_page_for_missing_category_is_not_found() {
        let (state, user_id) = get_state();

        let result = get_edit_category_page(Path(99), State(state), Extension(user_id)).await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }

    #[tokio::test]
    async fn edit_page_hides_other_users_category() {
        let (state, owner) = get_state();
        let other_user = insert_test_user("other@example.com", &state.db_connection.lock().unwrap());
        let category = create_category(
            CategoryName::new_unchecked("Salary"),
            true,
            owner,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let result =
            get_edit_category_page(Path(category.id), State(state), Extension(other_user)).await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }

    #[tokio::test]
    async fn update_category_succeeds() {
        let (state, user_id) = get_state();
        let category = create_category(
            CategoryName::new_unchecked("Pay"),
            false,
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let form = CategoryFormData {
            name: "Salary".to_owned(),
            is_income: Some("true".to_owned()),
        };

        let response = update_category_endpoint(
            Path(category.id),
            State(state.clone()),
            Extension(user_id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);
        let updated =
            get_category(category.id, user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.name, CategoryName::new_unchecked("Salary"));
        assert!(updated.is_income);
    }

    #[tokio::test]
    async fn update_category_with_empty_name_shows_error() {
        let (state, user_id) = get_state();
        let form = CategoryFormData {
            name: "  ".to_owned(),
            is_income: None,
        };

        let response =
            update_category_endpoint(Path(1), State(state), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Category name cannot be empty");
    }

    #[tokio::test]
    async fn update_missing_category_returns_not_found_alert() {
        let (state, user_id) = get_state();
        let form = CategoryFormData {
            name: "Salary".to_owned(),
            is_income: None,
        };

        let response =
            update_category_endpoint(Path(99), State(state), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
