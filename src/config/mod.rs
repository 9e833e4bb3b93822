use std::{num::NonZeroUsize, path::PathBuf};

use clap::Parser;

use crate::error::{Error, Result};

pub const MAX_ROWS_DEFAULT: i64 = 5000;

/// Convert a Mint transaction export into Monarch CSV files.
#[derive(Debug, Parser)]
#[command(name = "monarch-converter", version, about)]
pub struct Args {
    /// Path to the Mint CSV export
    pub input_file: PathBuf,

    /// Directory to write the Monarch files into (default: no output)
    #[arg(short = 'o', long)]
    pub output_dir: Option<String>,

    /// Write a stub account mapping file listing every account
    #[arg(long = "account-mapping-helper")]
    pub account_mapping_helper: Option<String>,

    /// Mint,Monarch CSV used to rename accounts
    #[arg(long = "account-mapping-translate")]
    pub account_mapping_translate: Option<String>,

    /// Fail when an account is missing from the translation file
    #[arg(long, requires = "account_mapping_translate")]
    pub strict_accounts: bool,

    /// Maximum number of rows per output file
    #[arg(short = 'r', long, default_value_t = MAX_ROWS_DEFAULT, allow_negative_numbers = true)]
    pub max_rows: i64,

    /// Enable debug output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated settings for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input_file: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub account_mapping_helper: Option<PathBuf>,
    pub account_mapping_translate: Option<PathBuf>,
    pub strict_accounts: bool,
    pub max_rows: NonZeroUsize,
}

impl Config {
    pub fn new(input_file: impl Into<PathBuf>) -> Self {
        Self {
            input_file: input_file.into(),
            output_dir: None,
            account_mapping_helper: None,
            account_mapping_translate: None,
            strict_accounts: false,
            max_rows: NonZeroUsize::new(MAX_ROWS_DEFAULT as usize).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// An empty path on the command line switches the feature off.
fn enabled(path: Option<String>) -> Option<PathBuf> {
    path.filter(|path| !path.is_empty()).map(PathBuf::from)
}

fn max_rows(value: i64) -> Result<NonZeroUsize> {
    usize::try_from(value)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| Error::Config(format!("max rows must be greater than 0, got {value}")))
}

impl TryFrom<Args> for Config {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self> {
        let account_mapping_translate = enabled(args.account_mapping_translate);
        if args.strict_accounts && account_mapping_translate.is_none() {
            return Err(Error::Config(
                "--strict-accounts needs an account mapping translation file".into(),
            ));
        }

        Ok(Self {
            input_file: args.input_file,
            output_dir: enabled(args.output_dir),
            account_mapping_helper: enabled(args.account_mapping_helper),
            account_mapping_translate,
            strict_accounts: args.strict_accounts,
            max_rows: max_rows(args.max_rows)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config> {
        let args = Args::try_parse_from(std::iter::once("monarch-converter").chain(args.iter().copied()))
            .unwrap();
        Config::try_from(args)
    }

    #[test]
    fn defaults_disable_optional_outputs() {
        let config = parse(&["mint.csv"]).unwrap();

        assert_eq!(config, Config::new("mint.csv"));
        assert_eq!(config.max_rows.get(), 5000);
    }

    #[test]
    fn empty_paths_count_as_absent() {
        let config = parse(&["mint.csv", "--output-dir", "", "--account-mapping-helper", ""]).unwrap();

        assert_eq!(config.output_dir, None);
        assert_eq!(config.account_mapping_helper, None);
    }

    #[test]
    fn all_options_are_carried_over() {
        let config = parse(&[
            "mint.csv",
            "-o",
            "out",
            "--account-mapping-helper",
            "helper.csv",
            "--account-mapping-translate",
            "translate.csv",
            "--strict-accounts",
            "-r",
            "20",
        ])
        .unwrap();

        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert_eq!(config.account_mapping_helper, Some(PathBuf::from("helper.csv")));
        assert_eq!(config.account_mapping_translate, Some(PathBuf::from("translate.csv")));
        assert!(config.strict_accounts);
        assert_eq!(config.max_rows.get(), 20);
    }

    #[test]
    fn non_positive_max_rows_is_config_error() {
        for value in ["0", "-3"] {
            let err = parse(&["mint.csv", "--max-rows", value]).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{value}: {err}");
        }
    }

    #[test]
    fn strict_accounts_needs_a_translation_file() {
        let err = parse(&["mint.csv", "--account-mapping-translate", "", "--strict-accounts"])
            .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }
}
