use std::collections::HashMap;

use deunicode::deunicode;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{
    error::{Error, Result},
    transaction::MonarchTransaction,
};

const SLUG_MAX_LEN: usize = 50;

/// One line of an account mapping file: a Mint account name and the name
/// it should carry in Monarch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMapping {
    #[serde(rename = "Mint")]
    pub mint: String,
    #[serde(rename = "Monarch")]
    pub monarch: String,
}

impl AccountMapping {
    pub const HEADERS: [&'static str; 2] = ["Mint", "Monarch"];

    fn identity(name: &str) -> Self {
        Self {
            mint: name.to_owned(),
            monarch: name.to_owned(),
        }
    }
}

/// Lookup from Mint account names to Monarch account names.
///
/// Names absent from the lookup pass through unchanged unless the
/// translation was made [`strict`](AccountTranslation::strict).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountTranslation {
    names: HashMap<String, String>,
    strict: bool,
}

impl AccountTranslation {
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn translate(&self, account: &str) -> Result<String> {
        match self.names.get(account) {
            Some(monarch) => Ok(monarch.clone()),
            None if self.strict => Err(Error::UnmappedAccount {
                account: account.to_owned(),
            }),
            None => Ok(account.to_owned()),
        }
    }
}

impl From<HashMap<String, String>> for AccountTranslation {
    fn from(names: HashMap<String, String>) -> Self {
        Self {
            names,
            strict: false,
        }
    }
}

/// Later mappings for the same Mint name replace earlier ones.
impl FromIterator<AccountMapping> for AccountTranslation {
    fn from_iter<I: IntoIterator<Item = AccountMapping>>(iter: I) -> Self {
        iter.into_iter()
            .map(|mapping| (mapping.mint, mapping.monarch))
            .collect::<HashMap<_, _>>()
            .into()
    }
}

/// Identity mappings for every distinct account, sorted by name.
///
/// Meant as a starting point the user edits into a translation file.
pub fn mapping_helper(transactions: &[MonarchTransaction]) -> Vec<AccountMapping> {
    transactions
        .iter()
        .map(|tx| tx.account.as_str())
        .unique()
        .sorted()
        .map(AccountMapping::identity)
        .collect()
}

/// Filesystem-safe form of an account name.
///
/// Transliterates the name to ASCII and lowercases it, turns every run of
/// characters other than letters and digits into a single `-`, and caps the
/// result at 50 characters without leading or trailing separators.
pub fn slugify(name: &str) -> String {
    let slug = deunicode(name)
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .join("-");

    slug.chars()
        .take(SLUG_MAX_LEN)
        .collect::<String>()
        .trim_end_matches('-')
        .to_owned()
}
