//! Account descriptors read from the bank list.

use serde::{Deserialize, Serialize};

/// One bank account to pull statements for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Bank code as written in the input ("7", "007", "285")
    pub bank_number: String,
    pub account_number: String,
    /// Display name used for file names and the no-activity log
    pub entity_name: String,
}

impl Account {
    /// Build an account; a missing or blank entity name falls back to the bank number.
    pub fn new(
        bank_number: impl Into<String>,
        account_number: impl Into<String>,
        entity_name: Option<String>,
    ) -> Self {
        let bank_number = bank_number.into();
        let entity_name = entity_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| bank_number.clone());

        Self {
            bank_number,
            account_number: account_number.into(),
            entity_name,
        }
    }

    /// Bank number as the provider expects it: three digits, zero-padded.
    pub fn padded_bank_number(&self) -> String {
        zero_pad(&self.bank_number, 3)
    }
}

/// Left-pad with `0` up to `width`; longer input is returned unchanged.
pub fn zero_pad(s: &str, width: usize) -> String {
    let s = s.trim();
    format!("{s:0>width$}")
}
