//! Process settings, read once at startup from the environment.

use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::alerts::AlertPolicy;
use crate::error::ConfigError;
use crate::models::PeriodLimits;

const DEFAULT_COLLECTION: &str = "readings";
const DEFAULT_DOMAIN: &str = "internetofthings.ibmcloud.com";
const DEFAULT_MAIL_HOST: &str = "mail.gmx.net";
const DEFAULT_MAIL_PORT: u16 = 465;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSettings {
    pub path: PathBuf,
    pub collection: String,
}

/// Watson IoT application credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub org: String,
    pub app_id: String,
    pub domain: String,
    pub api_key: String,
    pub auth_token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub recipient: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub ledger: LedgerSettings,
    pub source: SourceSettings,
    pub mail: MailSettings,
    pub limits: PeriodLimits,
    pub alert_policy: AlertPolicy,
    pub store_timeout: Duration,
    pub notify_timeout: Duration,
    pub queue_capacity: usize,
}

/// Loads `.env` into the environment unless running in production and
/// returns the file that was read. Variables already set are never overridden.
pub fn load_dotenv() -> Option<PathBuf> {
    let production = std::env::var("NODE_ENV")
        .map(|value| value.eq_ignore_ascii_case("production"))
        .unwrap_or(false);

    if production {
        return None;
    }
    dotenv::dotenv().ok()
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let ledger = LedgerSettings {
            path: ledger_path(&require("DBURL")?, get("DBNAME").as_deref()),
            collection: collection_name(get("DBCOLLECTION"))?,
        };

        let source = SourceSettings {
            org: require("ORG")?,
            app_id: require("APPLICATIONID")?,
            domain: get("DOMAIN").unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            api_key: require("APIKEY")?,
            auth_token: require("APIAUTHTOKEN")?,
        };

        let mail = MailSettings {
            host: get("MAILHOST").unwrap_or_else(|| DEFAULT_MAIL_HOST.to_string()),
            port: parse_or("MAILPORT", get("MAILPORT"), DEFAULT_MAIL_PORT)?,
            user: require("EMAILUSER")?,
            password: require("EMAILPASSWORD")?,
            recipient: require("EMAILRECEIVER")?,
        };

        let limits = PeriodLimits::new(
            parse_limit("MONTHLIMIT", require("MONTHLIMIT")?)?,
            parse_limit("YEARLIMIT", require("YEARLIMIT")?)?,
        );

        let alert_policy = match get("ALERTPOLICY") {
            Some(value) => value.parse::<AlertPolicy>().map_err(|reason| ConfigError::Invalid {
                key: "ALERTPOLICY",
                value,
                reason,
            })?,
            None => AlertPolicy::default(),
        };

        let store_timeout = Duration::from_secs(parse_or(
            "STORE_TIMEOUT_SECS",
            get("STORE_TIMEOUT_SECS"),
            DEFAULT_STORE_TIMEOUT_SECS,
        )?);
        let notify_timeout = Duration::from_secs(parse_or(
            "NOTIFY_TIMEOUT_SECS",
            get("NOTIFY_TIMEOUT_SECS"),
            DEFAULT_NOTIFY_TIMEOUT_SECS,
        )?);
        let queue_capacity = parse_or(
            "EVENT_QUEUE_CAPACITY",
            get("EVENT_QUEUE_CAPACITY"),
            DEFAULT_QUEUE_CAPACITY,
        )?
        .max(1);

        Ok(Self {
            ledger,
            source,
            mail,
            limits,
            alert_policy,
            store_timeout,
            notify_timeout,
            queue_capacity,
        })
    }
}

/// `DBURL` names the SQLite file, or its directory when `DBNAME` is set.
fn ledger_path(url: &str, name: Option<&str>) -> PathBuf {
    let location = url.strip_prefix("sqlite://").unwrap_or(url);
    match name {
        Some(name) => PathBuf::from(location).join(format!("{name}.sqlite3")),
        None => PathBuf::from(location),
    }
}

fn collection_name(value: Option<String>) -> Result<String, ConfigError> {
    let Some(value) = value else {
        return Ok(DEFAULT_COLLECTION.to_string());
    };

    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key: "DBCOLLECTION",
            value,
            reason: "only ASCII letters, digits, `_`, `-` and `.` are allowed".into(),
        })
    }
}

fn parse_limit(key: &'static str, value: String) -> Result<f64, ConfigError> {
    match value.parse::<f64>() {
        Ok(limit) if limit.is_finite() && limit >= 0.0 => Ok(limit),
        Ok(_) => Err(ConfigError::Invalid {
            key,
            value,
            reason: "limit must be a finite number >= 0".into(),
        }),
        Err(err) => Err(ConfigError::Invalid {
            key,
            value,
            reason: err.to_string(),
        }),
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value.parse().map_err(|err: T::Err| ConfigError::Invalid {
            key,
            reason: err.to_string(),
            value,
        }),
        None => Ok(default),
    }
}
