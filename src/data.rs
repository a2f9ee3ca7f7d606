//! Transaction table loading, normalization into (transaction, item) pairs,
//! and one-hot basket encoding

use std::fs::File;
use std::io::Read;
use std::iter::Enumerate;
use std::path::Path;
use std::slice;

use ndarray::{s, Array2, ArrayView2};
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::MiningError;
use crate::literal::parse_item_list;

/// Column holding the purchase event identifier
pub const TRANSACTION_ID_COLUMN: &str = "Transaction_ID";

/// Accepted spellings of the item column, checked in order
pub const ITEM_COLUMN_ALIASES: [&str; 2] = ["Products", "Product"];

/// Item column of the long-format pair frame
const ITEM_COLUMN: &str = "Item";

/// Raw tabular input: a header row plus string cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Read a comma-separated table with a header row
    pub fn from_reader<R: Read>(reader: R) -> crate::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let rows = csv_reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        Ok(Self { headers, rows })
    }

    /// Load a CSV file from disk
    pub fn from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        let file = File::open(path.as_ref())?;
        let table = Self::from_reader(file)?;
        debug!(
            path = %path.as_ref().display(),
            rows = table.len(),
            columns = table.headers.len(),
            "loaded raw table"
        );
        Ok(table)
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

    /// First `n` rows, for previews
    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// One item bought in one transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CanonicalPair {
    pub transaction_id: String,
    pub item: String,
}

/// Remove thousands separators from an identifier such as `"1,024"`
pub fn normalize_transaction_id(raw: &str) -> String {
    raw.replace(',', "")
}

/// Resolves the identifier and item columns of a table and expands its
/// rows into canonical pairs
#[derive(Debug, Clone, Copy)]
pub struct TransactionNormalizer<'a> {
    table: &'a RawTable,
    id_index: usize,
    item_index: usize,
    item_column: &'static str,
}

impl<'a> TransactionNormalizer<'a> {
    pub fn new(table: &'a RawTable) -> crate::Result<Self> {
        let id_index = table
            .column_index(TRANSACTION_ID_COLUMN)
            .ok_or_else(|| MiningError::Schema {
                expected: format!("'{}'", TRANSACTION_ID_COLUMN),
                found: table.headers().to_vec(),
            })?;

        let (item_index, item_column) = ITEM_COLUMN_ALIASES
            .iter()
            .find_map(|&alias| table.column_index(alias).map(|idx| (idx, alias)))
            .ok_or_else(|| MiningError::Schema {
                expected: ITEM_COLUMN_ALIASES
                    .iter()
                    .map(|alias| format!("'{}'", alias))
                    .collect::<Vec<_>>()
                    .join(" or "),
                found: table.headers().to_vec(),
            })?;

        debug!(item_column, "resolved transaction columns");

        Ok(Self {
            table,
            id_index,
            item_index,
            item_column,
        })
    }

    /// Name of the item column that was found
    pub fn item_column(&self) -> &'static str {
        self.item_column
    }

    /// Lazily expand every row into one pair per listed item
    pub fn pairs(&self) -> CanonicalPairs<'a> {
        CanonicalPairs {
            rows: self.table.rows().iter().enumerate(),
            id_index: self.id_index,
            item_index: self.item_index,
            current: None,
        }
    }
}

/// Iterator returned by [`TransactionNormalizer::pairs`]
#[derive(Debug)]
pub struct CanonicalPairs<'a> {
    rows: Enumerate<slice::Iter<'a, Vec<String>>>,
    id_index: usize,
    item_index: usize,
    current: Option<(String, std::vec::IntoIter<String>)>,
}

impl Iterator for CanonicalPairs<'_> {
    type Item = crate::Result<CanonicalPair>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((transaction_id, items)) = self.current.as_mut() {
                match items.next() {
                    Some(item) if item.is_empty() => continue,
                    Some(item) => {
                        return Some(Ok(CanonicalPair {
                            transaction_id: transaction_id.clone(),
                            item,
                        }))
                    }
                    None => self.current = None,
                }
            }

            let (index, row) = self.rows.next()?;
            let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
            let transaction_id = normalize_transaction_id(cell(self.id_index));

            match parse_item_list(cell(self.item_index)) {
                Ok(items) => self.current = Some((transaction_id, items.into_iter())),
                Err(e) => {
                    return Some(Err(MiningError::MalformedItemList {
                        record: index + 1,
                        cell: cell(self.item_index).to_string(),
                        reason: e.to_string(),
                    }))
                }
            }
        }
    }
}

/// Collect every canonical pair of a table, stopping at the first bad row
pub fn normalize(table: &RawTable) -> crate::Result<Vec<CanonicalPair>> {
    TransactionNormalizer::new(table)?.pairs().collect()
}

/// One-hot transaction-by-item matrix
///
/// Rows and columns are sorted by name, so identical input always
/// encodes to the identical matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct BasketMatrix {
    transaction_ids: Vec<String>,
    items: Vec<String>,
    cells: Array2<bool>,
}

impl BasketMatrix {
    /// Encode an infallible pair sequence
    pub fn from_pairs<I>(pairs: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = CanonicalPair>,
    {
        Self::try_from_pairs(pairs.into_iter().map(Ok))
    }

    /// Encode the normalizer's pair stream, propagating its first error
    pub fn try_from_pairs<I>(pairs: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = crate::Result<CanonicalPair>>,
    {
        let mut ids = Vec::new();
        let mut names = Vec::new();
        for pair in pairs {
            let CanonicalPair {
                transaction_id,
                item,
            } = pair?;
            ids.push(transaction_id);
            names.push(item);
        }

        if ids.is_empty() {
            return Err(MiningError::EmptyDataset);
        }

        let frame = df!(
            TRANSACTION_ID_COLUMN => ids,
            ITEM_COLUMN => names
        )?;

        // One row per transaction with its distinct items, ordered by id
        let baskets = frame
            .clone()
            .lazy()
            .group_by([col(TRANSACTION_ID_COLUMN)])
            .agg([col(ITEM_COLUMN).unique()])
            .sort([TRANSACTION_ID_COLUMN], SortMultipleOptions::default())
            .collect()?;

        let distinct = frame
            .lazy()
            .select([col(ITEM_COLUMN).unique().sort(SortOptions::default())])
            .collect()?;

        let items: Vec<String> = distinct
            .column(ITEM_COLUMN)?
            .str()?
            .into_no_null_iter()
            .map(str::to_string)
            .collect();

        let transaction_ids: Vec<String> = baskets
            .column(TRANSACTION_ID_COLUMN)?
            .str()?
            .into_no_null_iter()
            .map(str::to_string)
            .collect();

        let mut cells = Array2::from_elem((transaction_ids.len(), items.len()), false);
        for (row, basket) in baskets.column(ITEM_COLUMN)?.list()?.into_iter().enumerate() {
            let Some(basket) = basket else { continue };
            for item in basket.str()?.into_no_null_iter() {
                if let Ok(column) = items.binary_search_by(|name| name.as_str().cmp(item)) {
                    cells[[row, column]] = true;
                }
            }
        }

        debug!(
            transactions = transaction_ids.len(),
            items = items.len(),
            "encoded basket matrix"
        );

        Ok(Self {
            transaction_ids,
            items,
            cells,
        })
    }

    /// Row labels
    pub fn transaction_ids(&self) -> &[String] {
        &self.transaction_ids
    }

    /// Column labels
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn cells(&self) -> &Array2<bool> {
        &self.cells
    }

    pub fn n_transactions(&self) -> usize {
        self.transaction_ids.len()
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn item_index(&self, item: &str) -> Option<usize> {
        self.items.binary_search_by(|probe| probe.as_str().cmp(item)).ok()
    }

    /// Fraction of rows where every given column is set
    pub fn support(&self, columns: &[usize]) -> f64 {
        let hits = self
            .cells
            .rows()
            .into_iter()
            .filter(|row| columns.iter().all(|&c| row[c]))
            .count();
        hits as f64 / self.n_transactions() as f64
    }

    /// First `n` rows, for previews
    pub fn head(&self, n: usize) -> ArrayView2<'_, bool> {
        self.cells.slice(s![..n.min(self.n_transactions()), ..])
    }
}
