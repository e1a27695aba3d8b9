use std::collections::HashMap;
use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use promptmix_core::{Library, LibraryValue};

use crate::errors::IoError;

/// Suffix marking a master-sheet column as the category column of the
/// library named by the rest of the header.
const CATEGORY_SUFFIX: &str = "分类";

/// Parse a single-column export (column A = values) into one library.
///
/// A first cell equal to the library name is treated as a header row.
/// Blank cells are skipped; duplicate values are kept. The delimiter
/// matters even for one column: a tab-delimited export may hold commas
/// inside its values.
pub fn parse_library_column(
    name: &str,
    reader: impl Read,
    delimiter: u8,
) -> Result<Library, IoError> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut values = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let Some(cell) = record.get(0) else { continue };
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        if index == 0 && cell == name {
            continue;
        }
        values.push(LibraryValue::plain(cell));
    }

    debug!(library = name, values = values.len(), "parsed library column");
    Ok(Library::new(name, values))
}

/// Parse a master sheet into libraries.
///
/// The header row names libraries; each column's cells become values. A
/// column headed `<name>分类` creates no library of its own: its cells
/// attach per-row categories (comma- or `、`-separated) to the value in
/// column `<name>`.
pub fn parse_master_sheet(reader: impl Read, delimiter: u8) -> Result<Vec<Library>, IoError> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = csv_reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Err(IoError::Import("master sheet is empty".to_string())),
    };

    let headers: Vec<String> = header.iter().map(|cell| cell.trim().to_string()).collect();
    let rows: Vec<StringRecord> = records.collect::<Result<_, _>>()?;

    // Resolve which columns are category columns for another column.
    let mut category_columns: HashMap<String, usize> = HashMap::new();
    for (index, name) in headers.iter().enumerate() {
        if let Some(base) = name.strip_suffix(CATEGORY_SUFFIX) {
            if !base.is_empty() && headers.iter().any(|other| other == base) {
                category_columns.insert(base.to_string(), index);
            }
        }
    }

    let mut libraries = Vec::new();
    for (index, name) in headers.iter().enumerate() {
        if name.is_empty() || category_columns.values().any(|&column| column == index) {
            continue;
        }

        let category_column = category_columns.get(name).copied();
        let mut values = Vec::new();
        for row in &rows {
            let Some(cell) = row.get(index) else { continue };
            let text = cell.trim();
            if text.is_empty() {
                continue;
            }

            let categories = category_column
                .and_then(|column| row.get(column))
                .map(split_categories)
                .unwrap_or_default();
            if categories.is_empty() {
                values.push(LibraryValue::plain(text));
            } else {
                values.push(LibraryValue::categorized(text, categories));
            }
        }

        debug!(library = %name, values = values.len(), "parsed master column");
        libraries.push(Library::new(name.clone(), values));
    }

    if libraries.is_empty() {
        return Err(IoError::Import(
            "master sheet has no library columns".to_string(),
        ));
    }
    Ok(libraries)
}

fn split_categories(cell: &str) -> Vec<String> {
    cell.split(|c| c == ',' || c == '、')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
