use serde::{Deserialize, Serialize};

/// One scheduled topic read from an uploaded sheet or PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    pub slno: i64,
    pub topic: String,
    #[serde(rename = "imageGenerated")]
    pub image_generated: bool,
    #[serde(rename = "selectDate")]
    pub select_date: String,
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct UploadSummary {
    pub status: &'static str,
    #[serde(rename = "fileType")]
    pub file_type: String,
    #[serde(rename = "rowsReceived")]
    pub rows_received: usize,
    #[serde(rename = "eventsCreated")]
    pub events_created: Vec<String>,
}
