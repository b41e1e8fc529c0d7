use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::AppError;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub email: EmailConfig,
    pub chat: ChatConfig,
    pub dispatch: DispatchConfig,
    pub schedule: ScheduleConfig,
}

/// Where recipient records are read from and how columns map to fields.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Workbook file (xlsx, xls, ods)
    pub path: PathBuf,

    /// Sheet holding the recipient table
    pub sheet: String,

    pub columns: ColumnMap,
}

/// Column headers for each logical record field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnMap {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub data: String,
    pub channel: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            name: "Name".to_string(),
            email: "Email".to_string(),
            phone: "Phone".to_string(),
            data: "Data".to_string(),
            channel: "Channel".to_string(),
        }
    }
}

/// Outbound SMTP settings.
#[derive(Clone, Deserialize)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,

    /// `true` = implicit TLS, `false` = STARTTLS
    pub secure: bool,

    pub username: String,
    pub password: String,

    /// Mailbox used in the `From` header, e.g. `Name <addr@example.com>`
    pub from: String,

    pub subject: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("subject", &self.subject)
            .finish()
    }
}

/// WhatsApp bridge settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub enabled: bool,

    /// Base URL of the WhatsApp Web bridge sidecar
    pub bridge_url: String,

    /// How often the session monitor polls the bridge status
    pub status_poll_interval: Duration,
}

/// Dispatch loop settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Delay between consecutive sends (default: 300s)
    pub pacing_delay: Duration,

    /// Pause after a record that failed validation (default: true)
    pub pace_after_validation_failure: bool,

    /// Pause after a record with an unsupported channel (default: false)
    pub pace_after_unsupported: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Cron expression, 5-field or 7-field (default: 09:00 on the 1st of each month)
    pub cron: String,

    /// Trigger one run shortly after startup
    pub run_on_start: bool,

    pub startup_delay: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let defaults = ColumnMap::default();

        Ok(Self {
            source: SourceConfig {
                path: PathBuf::from(var("RECORDS_FILE", "notifications.xlsx")),
                sheet: var("RECORDS_SHEET", "notifications"),
                columns: ColumnMap {
                    name: var("COLUMN_NAME", &defaults.name),
                    email: var("COLUMN_EMAIL", &defaults.email),
                    phone: var("COLUMN_PHONE", &defaults.phone),
                    data: var("COLUMN_DATA", &defaults.data),
                    channel: var("COLUMN_CHANNEL", &defaults.channel),
                },
            },
            email: EmailConfig {
                host: var("EMAIL_HOST", "smtp.example.com"),
                port: parse_var(&lookup, "EMAIL_PORT", 587, "u16")?,
                secure: parse_flag(&lookup, "EMAIL_SECURE", false)?,
                username: var("EMAIL_USER", "username@example.com"),
                password: var("EMAIL_PASS", "password"),
                from: var(
                    "EMAIL_FROM",
                    "Notification System <notifications@example.com>",
                ),
                subject: var("EMAIL_SUBJECT", "Monthly notification"),
            },
            chat: ChatConfig {
                enabled: parse_flag(&lookup, "WHATSAPP_ENABLED", true)?,
                bridge_url: var("WHATSAPP_BRIDGE_URL", "http://127.0.0.1:3001"),
                status_poll_interval: Duration::from_secs(parse_var(
                    &lookup,
                    "WHATSAPP_STATUS_POLL_SECS",
                    5,
                    "u64",
                )?),
            },
            dispatch: DispatchConfig {
                pacing_delay: Duration::from_secs(parse_var(
                    &lookup,
                    "PACING_DELAY_SECS",
                    300,
                    "u64",
                )?),
                pace_after_validation_failure: parse_flag(
                    &lookup,
                    "PACE_AFTER_VALIDATION_FAILURE",
                    true,
                )?,
                pace_after_unsupported: parse_flag(&lookup, "PACE_AFTER_UNSUPPORTED", false)?,
            },
            schedule: ScheduleConfig {
                cron: var("SCHEDULE_CRON", "0 9 1 * *"),
                run_on_start: parse_flag(&lookup, "RUN_ON_START", false)?,
                startup_delay: Duration::from_secs(parse_var(
                    &lookup,
                    "STARTUP_RUN_DELAY_SECS",
                    30,
                    "u64",
                )?),
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T, expected: &str) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::invalid_var(key, expected)),
        None => Ok(default),
    }
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(AppError::invalid_var(key, "boolean")),
        },
    }
}
