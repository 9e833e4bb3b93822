use super::error::{Error, Result};

/// An untyped, fully loaded CSV table.
///
/// Nothing about the expected columns is checked when a [`Table`] is built;
/// consumers look columns up by name and fail only when they need one that
/// is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column named exactly `name`.
    pub fn column(&self, name: &'static str) -> Result<usize> {
        self.headers
            .iter()
            .position(|header| header == name)
            .ok_or(Error::MissingColumn { column: name })
    }
}
