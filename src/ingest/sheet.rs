use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use csv::{ReaderBuilder, Trim};

use super::{is_blank_row, Columns};
use crate::{models::event_row::EventRow, Error, Result};

pub fn parse_csv(bytes: &[u8]) -> Result<Vec<EventRow>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let headers: Vec<&str> = headers.iter().collect();
    let columns = Columns::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let cells: Vec<&str> = record.iter().collect();
        if is_blank_row(&cells) {
            continue;
        }
        rows.push(columns.row(&cells, index + 2)?);
    }
    Ok(rows)
}

pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<EventRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| Error::BadRequest(format!("Unreadable spreadsheet: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::BadRequest("Spreadsheet has no worksheets".to_string()))?
        .map_err(|e| Error::BadRequest(format!("Unreadable spreadsheet: {}", e)))?;

    let mut lines = range.rows();
    let Some(header) = lines.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header.iter().map(cell_text).collect();
    let columns = Columns::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (index, line) in lines.enumerate() {
        let cells: Vec<String> = line.iter().map(cell_text).collect();
        if is_blank_row(&cells) {
            continue;
        }
        rows.push(columns.row(&cells, index + 2)?);
    }
    Ok(rows)
}

/// Renders a cell the way it would read in the sheet. Date cells become
/// `MM/DD/YYYY`, and time-only cells (serial below one day) become `HH:MM:SS`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => {
            let Some(value) = cell.as_datetime() else {
                return dt.as_f64().to_string();
            };
            if dt.as_f64() < 1.0 {
                value.format("%H:%M:%S").to_string()
            } else if dt.as_f64().fract() == 0.0 {
                value.format("%m/%d/%Y").to_string()
            } else {
                value.format("%m/%d/%Y %H:%M:%S").to_string()
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn csv_error(err: csv::Error) -> Error {
    Error::BadRequest(format!("Malformed CSV: {}", err))
}
