use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{
    check_status,
    google_auth::{service_account_grant, ServiceAccountKey, TokenCache, CALENDAR_SCOPE},
    EventCalendar, ProviderError,
};

const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3/calendars";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
}

#[derive(Deserialize)]
struct InsertedEvent {
    id: String,
}

pub struct GoogleCalendar {
    client: Client,
    key: Option<ServiceAccountKey>,
    calendar_id: Option<String>,
    tokens: TokenCache,
}

impl GoogleCalendar {
    pub fn new(client: Client, key: Option<ServiceAccountKey>, calendar_id: Option<String>) -> Self {
        Self {
            client,
            key,
            calendar_id,
            tokens: TokenCache::default(),
        }
    }
}

fn events_url(calendar_id: &str) -> Result<Url, ProviderError> {
    let mut url =
        Url::parse(CALENDAR_API).map_err(|e| ProviderError::Response(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ProviderError::Response("calendar URL cannot be a base".to_string()))?
        .push(calendar_id)
        .push("events");
    Ok(url)
}

#[async_trait]
impl EventCalendar for GoogleCalendar {
    #[instrument(skip(self, event), fields(provider = "google_calendar", summary = %event.summary))]
    async fn insert_event(&self, event: &CalendarEvent) -> Result<String, ProviderError> {
        let key = self
            .key
            .as_ref()
            .ok_or(ProviderError::NotConfigured("GOOGLE_CREDENTIALS_JSON"))?;
        let calendar_id = self
            .calendar_id
            .as_deref()
            .ok_or(ProviderError::NotConfigured("GOOGLE_CALENDAR_ID"))?;

        let token = self
            .tokens
            .get_or_refresh(|| service_account_grant(&self.client, key, CALENDAR_SCOPE))
            .await?;

        let response = self
            .client
            .post(events_url(calendar_id)?)
            .bearer_auth(&token)
            .json(event)
            .send()
            .await?;
        let inserted: InsertedEvent = check_status(response).await?.json().await?;

        info!(event_id = %inserted.id, "Created calendar event");
        Ok(inserted.id)
    }

    fn name(&self) -> &'static str {
        "Google Calendar"
    }
}
