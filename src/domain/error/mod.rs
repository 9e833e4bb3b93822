use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("required column {column:?} is missing from the transactions file")]
    MissingColumn { column: &'static str },
    #[error("invalid amount {value:?} on line {line}")]
    InvalidAmount { line: usize, value: String },
    #[error("account {account:?} has no entry in the translation file")]
    UnmappedAccount { account: String },
}

pub type Result<T> = std::result::Result<T, Error>;
