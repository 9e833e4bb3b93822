//! Converts Mint transaction exports into files Monarch can import.
//!
//! A run loads the whole export, reshapes it into Monarch's columns and then
//! optionally writes an account mapping stub and per-account output files.

pub mod config;
pub mod csv;
pub mod domain;
pub mod error;

use tracing::info;

use crate::{
    config::Config,
    domain::{
        account::mapping_helper,
        transaction::{preview, transform},
    },
    error::Result,
};

const PREVIEW_ROWS: usize = 10;

/// Run the whole conversion described by `config`.
pub fn run(config: &Config) -> Result<()> {
    let table = crate::csv::read_table(&config.input_file)?;
    info!(rows = table.len(), "loaded transactions");

    let translation = match &config.account_mapping_translate {
        Some(path) => {
            let translation = crate::csv::read_translation(path)?;
            Some(if config.strict_accounts {
                translation.strict()
            } else {
                translation
            })
        }
        None => None,
    };

    let transactions = transform(&table, translation.as_ref())?;
    info!(
        "Monarch data preview:\n{}",
        preview(&transactions, PREVIEW_ROWS)
    );

    if let Some(path) = &config.account_mapping_helper {
        crate::csv::write_mapping_helper(path, &mapping_helper(&transactions))?;
    }

    if let Some(dir) = &config.output_dir {
        let written = crate::csv::write_partitions(dir, &transactions, config.max_rows)?;
        info!(files = written.len(), dir = %dir.display(), "finished writing Monarch files");
    }

    Ok(())
}
