//! The form fields shared by the create and edit account pages.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    account::{AccountKind, AccountName},
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The form data for creating or editing an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountForm {
    /// The name of the account, e.g. "Everyday".
    pub name: String,
    /// One of the values of [AccountKind::as_str].
    pub kind: String,
    /// The balance in dollars.
    pub balance: f64,
}

impl AccountForm {
    /// Validate the name and kind of the account.
    ///
    /// # Errors
    /// Returns [Error::EmptyAccountName] or [Error::InvalidAccountKind].
    pub fn parse(&self) -> Result<(AccountName, AccountKind), Error> {
        let name = AccountName::new(&self.name)?;
        let kind = self.kind.parse()?;

        Ok((name, kind))
    }
}

/// The values to fill the form with.
pub struct AccountFormDefaults<'a> {
    pub name: &'a str,
    pub kind: AccountKind,
    pub balance: Option<f64>,
}

impl Default for AccountFormDefaults<'_> {
    fn default() -> Self {
        Self {
            name: "",
            kind: AccountKind::Checking,
            balance: None,
        }
    }
}

pub fn account_form_fields(defaults: &AccountFormDefaults) -> Markup {
    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Account Name" }

            input
                id="name"
                type="text"
                name="name"
                placeholder="Everyday"
                value=(defaults.name)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="kind" class=(FORM_LABEL_STYLE) { "Account Type" }

            select
                id="kind"
                name="kind"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for kind in AccountKind::ALL {
                    option value=(kind.as_str()) selected[kind == defaults.kind]
                    {
                        (kind.label())
                    }
                }
            }
        }

        div
        {
            label for="balance" class=(FORM_LABEL_STYLE) { "Balance" }

            div class="input-wrapper"
            {
                input
                    id="balance"
                    type="number"
                    name="balance"
                    step="0.01"
                    placeholder="0.00"
                    value=[defaults.balance.map(|balance| format!("{balance:.2}"))]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
            {
                "Use a negative balance for money owed, e.g. on a credit card."
            }
        }
    }
}
