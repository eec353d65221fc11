use std::collections::HashSet;

use csv::ReaderBuilder;

use crate::error::{GraphError, Result};
use crate::util::collapse_whitespace;

use super::graph::Row;

pub fn parse_csv(raw: &str) -> Result<Vec<Row>> {
    let mut reader = ReaderBuilder::new().from_reader(raw.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| GraphError::malformed(format!("invalid CSV header row: {error}")))?
        .clone();

    let mut seen = HashSet::new();
    if let Some(repeated) = headers.iter().find(|column| !seen.insert(*column)) {
        return Err(GraphError::malformed(format!(
            "header row repeats the `{repeated}` column"
        )));
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|error| {
            GraphError::malformed(format!("invalid CSV record {}: {error}", index + 1))
        })?;

        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect::<Row>();
        rows.push(row);
    }

    Ok(rows)
}

/// Forward-fills blank cells from the previous row and tidies whitespace.
///
/// A blank cell repeats the value of the same column in the row before it.
/// Rows must be passed in their original order.
pub fn normalize_rows(rows: Vec<Row>) -> Result<Vec<Row>> {
    let mut normalized: Vec<Row> = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let mut next = Row::new();
        for (column, value) in row {
            let value = collapse_whitespace(&value);
            let value = if value.is_empty() {
                normalized
                    .last()
                    .and_then(|previous| previous.get(&column))
                    .cloned()
                    .ok_or_else(|| {
                        GraphError::malformed(format!(
                            "row {} leaves `{column}` blank with no earlier value to repeat",
                            index + 1
                        ))
                    })?
            } else {
                value
            };
            next.insert(column, value);
        }
        normalized.push(next);
    }

    Ok(normalized)
}
