use crate::{models::event_row::EventRow, Error, Result};

pub mod pdf;
pub mod sheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Excel,
    Csv,
}

impl FileKind {
    pub fn from_filename(filename: &str) -> Result<(Self, String)> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        let kind = match ext.as_str() {
            "pdf" => Self::Pdf,
            "xlsx" | "xls" => Self::Excel,
            "csv" => Self::Csv,
            _ => {
                return Err(Error::BadRequest(format!(
                    "Unsupported file type: .{} (only PDF, XLSX, XLS, CSV allowed)",
                    ext
                )))
            }
        };
        Ok((kind, ext))
    }
}

pub fn parse_upload(kind: FileKind, bytes: &[u8]) -> Result<Vec<EventRow>> {
    match kind {
        FileKind::Pdf => pdf::parse_pdf(bytes),
        FileKind::Excel => sheet::parse_workbook(bytes),
        FileKind::Csv => sheet::parse_csv(bytes),
    }
}

#[derive(Debug)]
pub(crate) struct Columns {
    slno: usize,
    topic: usize,
    image_generated: usize,
    select_date: usize,
    time: usize,
}

impl Columns {
    pub(crate) fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let find = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = h.as_ref().trim().to_lowercase();
                names.iter().any(|name| h == *name)
            })
        };
        let required = |names: &[&str], label: &str| {
            find(names).ok_or_else(|| Error::BadRequest(format!("Missing column '{}'", label)))
        };

        Ok(Self {
            slno: required(&["slno"], "slno")?,
            topic: required(&["topic"], "topic")?,
            image_generated: required(&["imagegenerated", "imagegenerate"], "imageGenerated")?,
            select_date: required(&["selectdate"], "selectDate")?,
            time: required(&["time"], "time")?,
        })
    }

    /// `line` is the 1-based source row, used in error messages.
    pub(crate) fn row<S: AsRef<str>>(&self, cells: &[S], line: usize) -> Result<EventRow> {
        let cell = |index: usize| cells.get(index).map(|c| c.as_ref().trim()).unwrap_or("");

        let slno = cell(self.slno);
        let slno = slno
            .parse::<i64>()
            .or_else(|_| slno.parse::<f64>().map(|f| f as i64))
            .map_err(|_| Error::BadRequest(format!("Row {}: invalid slno '{}'", line, slno)))?;

        Ok(EventRow {
            slno,
            topic: cell(self.topic).to_string(),
            image_generated: parse_flag(cell(self.image_generated)),
            select_date: cell(self.select_date).to_string(),
            time: cell(self.time).to_string(),
        })
    }
}

pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

fn is_blank_row<S: AsRef<str>>(cells: &[S]) -> bool {
    cells.iter().all(|c| c.as_ref().trim().is_empty())
}
