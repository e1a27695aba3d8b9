use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};

use promptmix_core::{Library, parse_fragments};

use crate::errors::IoError;

/// UTF-8 byte-order mark expected by spreadsheet applications.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Write generated combinations as CSV: UTF-8 BOM, every field quoted,
/// single `combination` column.
pub fn write_combinations_csv(path: &Path, combinations: &[String]) -> Result<(), IoError> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(UTF8_BOM)?;

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(file);
    writer.write_record(["combination"])?;
    for combination in combinations {
        writer.write_record([combination.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Render combinations as a TSV table.
///
/// The header is the union of library names in first-seen order; each row
/// holds the combination's value per library, blank where a combination
/// lacks that dimension. Combinations without parseable fragments (for
/// example template-rendered ones) produce empty rows.
pub fn combinations_to_tsv(combinations: &[String]) -> String {
    if combinations.is_empty() {
        return String::new();
    }
    let parsed: Vec<_> = combinations
        .iter()
        .map(|combination| parse_fragments(combination))
        .collect();

    let mut header: Vec<String> = Vec::new();
    for fragments in &parsed {
        for fragment in fragments {
            if !header.contains(&fragment.library) {
                header.push(fragment.library.clone());
            }
        }
    }

    let mut output = header.join("\t");
    output.push('\n');
    for fragments in &parsed {
        let row: Vec<&str> = header
            .iter()
            .map(|name| {
                fragments
                    .iter()
                    .find(|fragment| &fragment.library == name)
                    .map(|fragment| fragment.value.as_str())
                    .unwrap_or("")
            })
            .collect();
        output.push_str(&row.join("\t"));
        output.push('\n');
    }
    output
}

/// Write library contents as TSV: header row = library names, columns =
/// values, padded with blanks to the longest library.
pub fn write_library_tsv(path: &Path, libraries: &[Library]) -> Result<(), IoError> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Necessary)
        .from_writer(BufWriter::new(File::create(path)?));

    let header: Vec<&str> = libraries.iter().map(|library| library.name.as_str()).collect();
    writer.write_record(&header)?;

    let depth = libraries
        .iter()
        .map(|library| library.values.len())
        .max()
        .unwrap_or(0);
    for row in 0..depth {
        let record: Vec<&str> = libraries
            .iter()
            .map(|library| {
                library
                    .values
                    .get(row)
                    .map(|value| value.text())
                    .unwrap_or("")
            })
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
