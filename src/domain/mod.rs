pub mod account;
pub mod error;
pub mod partition;
pub mod table;
pub mod transaction;
