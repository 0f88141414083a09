//! Batch result table: one row per input identifier, one cell per store.

use serde::{Serialize, Serializer};

/// Cell value for a lookup that produced no product page.
pub const NOT_FOUND: &str = "NotFound";

/// Outcome of one (identifier, store) lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    NotFound,
}

impl Resolution {
    /// Text written to output: the URL, or [`NOT_FOUND`].
    #[must_use]
    pub fn as_cell(&self) -> &str {
        match self {
            Resolution::Found(url) => url,
            Resolution::NotFound => NOT_FOUND,
        }
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Resolution::Found(url) => Some(url),
            Resolution::NotFound => None,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

impl From<Option<String>> for Resolution {
    fn from(url: Option<String>) -> Self {
        url.map_or(Resolution::NotFound, Resolution::Found)
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_cell())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    /// Normalized identifier, or the trimmed raw input when it did not
    /// normalize to any digits.
    pub identifier: String,
    /// One cell per store, in the table's store order.
    pub cells: Vec<Resolution>,
}

impl ResultRow {
    pub(crate) fn unresolved(identifier: String, store_count: usize) -> Self {
        Self {
            identifier,
            cells: vec![Resolution::NotFound; store_count],
        }
    }
}

/// Rows in input order; columns in the batch's store order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    pub stores: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    /// Cell of row `row` for the store `slug`.
    #[must_use]
    pub fn cell(&self, row: usize, slug: &str) -> Option<&Resolution> {
        let column = self.stores.iter().position(|s| s == slug)?;
        self.rows.get(row)?.cells.get(column)
    }

    /// Number of cells holding a product URL.
    #[must_use]
    pub fn found_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| &row.cells)
            .filter(|cell| cell.is_found())
            .count()
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows.len() * self.stores.len()
    }
}
