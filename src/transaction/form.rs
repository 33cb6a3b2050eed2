//! The transaction form shared by the create and edit pages and endpoints.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    account::{Account, AccountId},
    category::{Category, CategoryId},
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, link,
    },
    timezone::get_local_offset,
    transaction::{Transaction, TransactionBuilder},
};

/// Whether money was spent or earned.
///
/// The form takes a positive amount and the type decides its sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Expense,
    Income,
}

impl TransactionType {
    /// The type of a stored, signed amount.
    pub fn from_amount(amount: f64) -> Self {
        if amount < 0.0 {
            Self::Expense
        } else {
            Self::Income
        }
    }

    /// `amount` with the sign for this type: negative for expenses, positive for income.
    pub fn signed_amount(self, amount: f64) -> f64 {
        match self {
            Self::Expense => -amount.abs(),
            Self::Income => amount.abs(),
        }
    }
}

/// The form data for creating or updating a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionForm {
    /// Whether the transaction is an expense or income.
    pub type_: TransactionType,
    /// The unsigned value of the transaction in dollars.
    pub amount: f64,
    /// The date when the transaction ocurred.
    pub date: Date,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: String,
    /// The account the transaction belongs to.
    pub account_id: AccountId,
    /// The category of the transaction, if any.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl TransactionForm {
    /// Convert the form into a builder with the amount signed by the transaction type.
    pub fn into_builder(self) -> TransactionBuilder {
        Transaction::build(
            self.account_id,
            self.type_.signed_amount(self.amount),
            self.date,
            self.description.trim(),
        )
        .category_id(self.category_id)
    }
}

/// Today's date in `canonical_timezone`.
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if the timezone is not a valid, canonical timezone name.
pub fn local_today(canonical_timezone: &str) -> Result<Date, Error> {
    let local_offset = get_local_offset(canonical_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {canonical_timezone}");
        Error::InvalidTimezoneError(canonical_timezone.to_owned())
    })?;

    Ok(OffsetDateTime::now_utc().to_offset(local_offset).date())
}

/// Reject dates after `today`, since transactions record events that have already happened.
pub fn check_not_future(date: Date, today: Date) -> Result<(), Error> {
    if date > today {
        tracing::warn!("Rejected transaction with future date {date}");
        return Err(Error::FutureDate(date));
    }

    Ok(())
}

pub struct TransactionFormDefaults<'a> {
    pub transaction_type: TransactionType,
    pub amount: Option<f64>,
    pub date: Date,
    pub description: Option<&'a str>,
    pub account_id: Option<AccountId>,
    pub category_id: Option<CategoryId>,
    pub max_date: Date,
}

impl TransactionFormDefaults<'_> {
    /// The defaults for a new transaction dated `today`.
    pub fn new_transaction(today: Date, account_id: Option<AccountId>) -> Self {
        Self {
            transaction_type: TransactionType::Expense,
            amount: None,
            date: today,
            description: None,
            account_id,
            category_id: None,
            max_date: today,
        }
    }
}

impl<'a> TransactionFormDefaults<'a> {
    /// The defaults for editing `transaction`.
    pub fn from_transaction(transaction: &'a Transaction, today: Date) -> Self {
        Self {
            transaction_type: TransactionType::from_amount(transaction.amount),
            amount: Some(transaction.amount),
            date: transaction.date,
            description: Some(&transaction.description),
            account_id: Some(transaction.account_id),
            category_id: transaction.category_id,
            max_date: today,
        }
    }
}

pub fn transaction_form_fields(
    defaults: &TransactionFormDefaults<'_>,
    accounts: &[Account],
    categories: &[Category],
) -> Markup {
    let is_expense = matches!(defaults.transaction_type, TransactionType::Expense);
    let amount_str = defaults
        .amount
        .map(|amount| format!("{:.2}", amount.abs()));

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="type_"
                        id="transaction-type-expense"
                        type="radio"
                        value="expense"
                        checked[is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="type_"
                        id="transaction-type-income"
                        type="radio"
                        value="income"
                        checked[!is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-income"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Income"
                    }
                }
            }
        }

        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            // w-full needed to ensure input takes the full width when prefilled with a value
            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder="0.00"
                    min="0.01"
                    required
                    value=[amount_str.as_deref()]
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="date"
                max=(defaults.max_date)
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="account_id"
                class=(FORM_LABEL_STYLE)
            {
                "Account"
            }

            @if accounts.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "You need an account before you can add transactions. "
                    (link(endpoints::NEW_ACCOUNT_VIEW, "Create an account"))
                }
            } @else {
                select
                    name="account_id"
                    id="account_id"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for account in accounts {
                        option value=(account.id) selected[Some(account.id) == defaults.account_id]
                        {
                            (account.name)
                        }
                    }
                }
            }
        }

        div
        {
            label
                for="category_id"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            select
                name="category_id"
                id="category_id"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Uncategorised" }

                @for category in categories {
                    option value=(category.id) selected[Some(category.id) == defaults.category_id]
                    {
                        (category.name)
                    }
                }
            }
        }
    }
}
