use super::parse_flag;
use crate::{models::event_row::EventRow, Error, Result};

// slno, topic, flag, date, time
const MIN_ROW_TOKENS: usize = 5;

pub fn parse_pdf(bytes: &[u8]) -> Result<Vec<EventRow>> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| Error::BadRequest(format!("Unreadable PDF: {}", e)))?;
    parse_table_text(&text)
}

/// Rows are read from the right: time with optional AM/PM, date, image flag.
pub(crate) fn parse_table_text(text: &str) -> Result<Vec<EventRow>> {
    let mut lines = text.lines().enumerate().skip_while(|(_, line)| !is_header(line));
    if lines.next().is_none() {
        return Err(Error::BadRequest(
            "PDF does not contain a schedule table".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for (index, line) in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < MIN_ROW_TOKENS {
            continue;
        }
        let Some(slno) = tokens.first().and_then(|t| t.parse::<i64>().ok()) else {
            continue;
        };
        rows.push(parse_row(slno, &tokens[1..], index + 1)?);
    }
    Ok(rows)
}

fn is_header(line: &str) -> bool {
    let line = line.to_lowercase();
    line.contains("slno") && line.contains("topic")
}

fn parse_row(slno: i64, rest: &[&str], line: usize) -> Result<EventRow> {
    let malformed = || Error::BadRequest(format!("Malformed PDF row on line {}", line));

    let (time, rest) = match rest {
        [head @ .., clock, meridiem]
            if meridiem.eq_ignore_ascii_case("am") || meridiem.eq_ignore_ascii_case("pm") =>
        {
            (format!("{} {}", clock, meridiem.to_uppercase()), head)
        }
        [head @ .., clock] => (clock.to_string(), head),
        [] => return Err(malformed()),
    };
    let [topic @ .., flag, date] = rest else {
        return Err(malformed());
    };
    if topic.is_empty() {
        return Err(malformed());
    }

    Ok(EventRow {
        slno,
        topic: topic.join(" "),
        image_generated: parse_flag(flag),
        select_date: date.to_string(),
        time,
    })
}
