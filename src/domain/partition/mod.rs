use std::{collections::HashSet, num::NonZeroUsize};

use itertools::Itertools;

use super::{account::slugify, transaction::MonarchTransaction};

/// Filenames handed out so far during one run.
///
/// Two accounts whose names slugify identically would otherwise target the
/// same file, so every name goes through [`FilenameRegistry::allocate`].
#[derive(Debug, Default)]
pub struct FilenameRegistry {
    taken: HashSet<String>,
}

impl FilenameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filename(slug: &str, index: usize) -> String {
        format!("monarch-{slug}-{index}.csv")
    }

    /// Reserves the first free filename for `slug`, starting at `index`.
    ///
    /// Returns the filename together with the index it was built from.
    pub fn allocate(&mut self, slug: &str, mut index: usize) -> (String, usize) {
        let mut filename = Self::filename(slug, index);
        while self.taken.contains(&filename) {
            index += 1;
            filename = Self::filename(slug, index);
        }
        self.taken.insert(filename.clone());
        (filename, index)
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

/// A contiguous run of one account's transactions bound for one file.
#[derive(Debug, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub account: &'a str,
    pub filename: String,
    pub transactions: Vec<&'a MonarchTransaction>,
}

/// Splits transactions into per-account chunks of at most `max_rows`.
///
/// Accounts are visited in name order. Within an account, chunks follow the
/// original row order. Every chunk gets a filename no other chunk of the
/// run uses.
pub fn partition(transactions: &[MonarchTransaction], max_rows: NonZeroUsize) -> Vec<Chunk<'_>> {
    let mut registry = FilenameRegistry::new();

    transactions
        .iter()
        .into_group_map_by(|tx| tx.account.as_str())
        .into_iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .flat_map(|(account, rows)| {
            let slug = slugify(account);
            let mut index = 1;
            rows.chunks(max_rows.get())
                .map(|slice| {
                    let (filename, used) = registry.allocate(&slug, index);
                    index = used + 1;
                    Chunk {
                        account,
                        filename,
                        transactions: slice.to_vec(),
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
