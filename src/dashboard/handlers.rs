//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - HTML view functions for rendering the dashboard UI
//! - State types used by the handler

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use time::Date;

use crate::{
    AppState, Error,
    account::get_total_account_balance,
    auth::UserID,
    dashboard::{
        aggregation::{
            PeriodSummary, last_twelve_months, monthly_totals, spending_by_category,
            summarise_period,
        },
        cards::summary_cards_view,
        charts::{
            DashboardChart, charts_script, charts_view, income_expenses_chart, net_balance_chart,
            spending_by_category_chart,
        },
        queries::{get_recent_transactions, get_transactions_in_range, has_any_transactions},
        tables::{recent_transactions_table, spending_by_category_table},
    },
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    range::{DateRange, DateRangePreset, RangeQuery, range_label, range_selector},
    transaction::local_today,
};

/// The number of transactions shown in the recent transactions table.
const RECENT_TRANSACTION_COUNT: u64 = 10;

/// The state needed for displaying the dashboard page.
///
/// Contains the database connection and timezone information required
/// by dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and accounts.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    preset: DateRangePreset,
    range: DateRange,
    total_balance: f64,
    summary: PeriodSummary,
    charts: [DashboardChart; 3],
    tables: [Markup; 2],
}

/// Display a page with an overview of the user's finances for the selected period.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<RangeQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let preset = query.range.unwrap_or_default();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    match build_dashboard_data(preset, today, user_id, &connection)? {
        Some(data) => Ok(dashboard_view(nav_bar, &data).into_response()),
        None => Ok(dashboard_no_data_view(nav_bar).into_response()),
    }
}

/// Fetches and builds all data needed for the dashboard display.
///
/// # Returns
/// All dashboard data ready for rendering, or `None` if the user has no transactions.
///
/// # Errors
/// Returns error if database queries fail.
fn build_dashboard_data(
    preset: DateRangePreset,
    today: Date,
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<DashboardData>, Error> {
    if !has_any_transactions(user_id, connection)
        .inspect_err(|error| tracing::error!("could not check for transactions: {error}"))?
    {
        return Ok(None);
    }

    let range = preset.date_range(today);
    let months = last_twelve_months(today);
    let chart_range = DateRange {
        start: months[0].min(range.start),
        end: range.end.max(today),
    };
    let chart_transactions = get_transactions_in_range(chart_range, user_id, connection)
        .inspect_err(|error| {
            tracing::error!("could not get transactions for {chart_range:?}: {error}")
        })?;
    let period_transactions: Vec<_> = chart_transactions
        .iter()
        .filter(|transaction| range.contains(transaction.date))
        .cloned()
        .collect();

    let total_balance = get_total_account_balance(user_id, connection).inspect_err(|error| {
        tracing::error!("could not calculate total account balance: {error}")
    })?;

    let recent_transactions = get_recent_transactions(RECENT_TRANSACTION_COUNT, user_id, connection)
        .inspect_err(|error| tracing::error!("could not get recent transactions: {error}"))?;

    let monthly = monthly_totals(&chart_transactions, &months);
    let spending = spending_by_category(&period_transactions);

    let charts = [
        DashboardChart {
            id: "income-expenses-chart",
            options: income_expenses_chart(&monthly).to_string(),
        },
        DashboardChart {
            id: "net-balance-chart",
            options: net_balance_chart(total_balance, &monthly).to_string(),
        },
        DashboardChart {
            id: "spending-by-category-chart",
            options: spending_by_category_chart(&spending).to_string(),
        },
    ];

    let tables = [
        recent_transactions_table(&recent_transactions),
        spending_by_category_table(&spending),
    ];

    Ok(Some(DashboardData {
        preset,
        range,
        total_balance,
        summary: summarise_period(&period_transactions),
        charts,
        tables,
    }))
}

/// Renders the dashboard page when the user has no transactions.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "add a transaction");
    let accounts_link = link(endpoints::ACCOUNTS_VIEW, "accounts");

    let content = html!(
        (nav_bar)

        div
            id="dashboard-empty"
            class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts and summaries will show up here once you "
                (new_transaction_link)
                ". Transactions are recorded against your "
                (accounts_link)
                "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with summary cards, charts and tables.
fn dashboard_view(nav_bar: NavBar<'_>, data: &DashboardData) -> Markup {
    let nav_bar = nav_bar.into_html();
    let range_url = |preset: DateRangePreset| {
        format!(
            "{}?range={}",
            endpoints::DASHBOARD_VIEW,
            preset.as_query_value()
        )
    };

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            header class="w-full flex justify-between flex-wrap items-end gap-4 mb-4"
            {
                div
                {
                    h1 class="text-xl font-bold" { "Dashboard" }
                    p id="range-label" class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        (range_label(data.range))
                    }
                }

                (range_selector(data.preset, range_url))
            }

            (summary_cards_view(data.total_balance, &data.summary))

            (charts_view(&data.charts))

            section
                id="tables"
                class="w-full grid grid-cols-1 xl:grid-cols-2 gap-4 mb-8"
            {
                @for table in &data.tables {
                    (table)
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&data.charts),
    ];

    base("Dashboard", &scripts, &content)
}
