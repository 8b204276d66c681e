use anyhow::{bail, Result};
use extractos_core::Account;

const BANK_HEADERS: &[&str] = &["N°", "Nº", "N"];
const ACCOUNT_HEADER: &str = "Cuenta";
const ENTITY_HEADER: &str = "Entidad";

/// Positions of the bank-list columns, resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountColumns {
    pub bank: usize,
    pub account: usize,
    pub entity: Option<usize>,
}

impl AccountColumns {
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Result<Self> {
        let find = |names: &[&str]| {
            header
                .iter()
                .position(|h| names.iter().any(|n| *n == h.as_ref().trim()))
        };

        let Some(bank) = find(BANK_HEADERS) else {
            bail!("account list has no \"N°\" column");
        };
        let Some(account) = find(&[ACCOUNT_HEADER]) else {
            bail!("account list has no \"Cuenta\" column");
        };

        Ok(Self {
            bank,
            account,
            entity: find(&[ENTITY_HEADER]),
        })
    }

    /// Build the account on a data row. Fully blank rows give `None`.
    ///
    /// `line` is the 1-based row number, used in error messages.
    pub fn account_from_row<S: AsRef<str>>(&self, row: &[S], line: usize) -> Result<Option<Account>> {
        let get = |i: usize| row.get(i).map(|s| s.as_ref().trim()).unwrap_or("");
        let bank = get(self.bank);
        let account = get(self.account);

        match (bank.is_empty(), account.is_empty()) {
            (true, true) => Ok(None),
            (true, false) => bail!("row {line}: missing bank number (N°)"),
            (false, true) => bail!("row {line}: missing account number (Cuenta)"),
            (false, false) => Ok(Some(Account::new(
                bank,
                account,
                self.entity.map(|i| get(i).to_string()),
            ))),
        }
    }
}
