use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::json;
use tracing::{error, info, instrument};

use crate::{
    clients::{calendar::EventTime, CalendarEvent, EventCalendar},
    models::event_row::EventRow,
    Error, Result,
};

const TIME_FORMATS: [&str; 4] = ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M:%S %p"];

/// Turns ingested rows into calendar events.
#[derive(Clone)]
pub struct EventsService {
    calendar: Arc<dyn EventCalendar>,
    time_zone: String,
}

impl EventsService {
    pub fn new(calendar: Arc<dyn EventCalendar>, time_zone: String) -> Self {
        Self {
            calendar,
            time_zone,
        }
    }

    /// Every row is validated before the first event is created.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn schedule(&self, rows: &[EventRow]) -> Result<Vec<String>> {
        let events = rows
            .iter()
            .map(|row| self.build_event(row))
            .collect::<Result<Vec<_>>>()?;

        let mut ids = Vec::with_capacity(events.len());
        for event in &events {
            let id = self.calendar.insert_event(event).await.map_err(|e| {
                error!(summary = %event.summary, error = %e, "Calendar insert failed");
                Error::ExternalService {
                    provider: self.calendar.name(),
                    source: e,
                }
            })?;
            ids.push(id);
        }

        info!(created = ids.len(), "Calendar events created");
        Ok(ids)
    }

    fn build_event(&self, row: &EventRow) -> Result<CalendarEvent> {
        let start = to_calendar_datetime(&row.select_date, &row.time)?;
        let time = EventTime {
            date_time: start,
            time_zone: self.time_zone.clone(),
        };

        Ok(CalendarEvent {
            summary: row.topic.clone(),
            description: json!({
                "topic": row.topic,
                "imageGenerated": row.image_generated,
            })
            .to_string(),
            start: time.clone(),
            end: time,
        })
    }
}

/// Converts `MM/DD/YYYY` plus a 24h or AM/PM time into `YYYY-MM-DDTHH:MM:SS`.
pub fn to_calendar_datetime(date: &str, time: &str) -> Result<String> {
    let date = date.trim();
    let time = time.trim();
    let input = format!("{} {}", date, time);

    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&input, &format!("%m/%d/%Y {}", fmt)).ok())
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .ok_or_else(|| Error::BadRequest(format!("Unsupported date/time format: '{}'", input)))
}
