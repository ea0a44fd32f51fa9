use std::{env, path::PathBuf, str::FromStr};

use crate::{Error, Result};

pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_IMAGE_DIR: &str = "public/generated_images";
pub const DEFAULT_TIME_ZONE: &str = "Asia/Kolkata";

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub groq_api_key: String,
    pub groq_model: String,
    pub openai_api_key: String,
    pub image_model: String,
    pub image_size: String,
    pub image_count: usize,
    pub image_dir: PathBuf,
    pub public_base_url: String,
    pub drive: DriveConfig,
    pub calendar: CalendarConfig,
    pub firebase_api_key: Option<String>,
}

/// OAuth client credentials used to upload generated images to Google Drive.
#[derive(Clone, Default)]
pub struct DriveConfig {
    pub folder_id: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Clone)]
pub struct CalendarConfig {
    /// Service-account key, as the raw JSON downloaded from Google Cloud.
    pub credentials_json: Option<String>,
    pub calendar_id: Option<String>,
    pub time_zone: String,
}

impl Config {
    pub fn init() -> Result<Config> {
        Ok(Config {
            database_url: required("DATABASE_URL")?,
            port: parsed("PORT", 8080)?,
            groq_api_key: required("GROQ_API_KEY")?,
            groq_model: or_default("GROQ_MODEL", DEFAULT_GROQ_MODEL),
            openai_api_key: required("OPENAI_API_KEY")?,
            image_model: or_default("IMAGE_MODEL", "dall-e-3"),
            image_size: or_default("IMAGE_SIZE", "1024x1024"),
            image_count: parsed("IMAGE_COUNT", 1)?,
            image_dir: PathBuf::from(or_default("IMAGE_DIR", DEFAULT_IMAGE_DIR)),
            public_base_url: or_default("BASE_URL", "/public/generated_images"),
            drive: DriveConfig {
                folder_id: optional("GOOGLE_DRIVE_FOLDER_ID"),
                refresh_token: optional("GOOGLE_DRIVE_REFRESH_TOKEN"),
                client_id: optional("GOOGLE_CLIENT_ID"),
                client_secret: optional("GOOGLE_CLIENT_SECRET"),
            },
            calendar: CalendarConfig {
                credentials_json: optional("GOOGLE_CREDENTIALS_JSON"),
                calendar_id: optional("GOOGLE_CALENDAR_ID"),
                time_zone: or_default("CALENDAR_TIME_ZONE", DEFAULT_TIME_ZONE),
            },
            firebase_api_key: optional("FIREBASE_API_KEY"),
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn required(key: &str) -> Result<String> {
    optional(key).ok_or_else(|| Error::Config(format!("{} must be set and non-empty", key)))
}

fn or_default(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}

fn parsed<T: FromStr>(key: &str, default: T) -> Result<T> {
    match optional(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: '{}'", key, raw))),
    }
}
