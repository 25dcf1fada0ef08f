use crate::config::types::{
    Config, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_WORKERS, MAX_REQUEST_DELAY_MS,
};
use crate::ConfigError;
use toml::{Table, Value};

pub(crate) const TARGET_URL: &str = "TargetURL";
pub(crate) const CRAWL_DEPTH: &str = "CrawlDepth";
pub(crate) const PAGE_NUMBER_LIMIT: &str = "PageNumberLimit";
pub(crate) const USER_AGENT: &str = "UserAgent";
pub(crate) const REQUEST_DELAY: &str = "RequestDelay";
pub(crate) const WORKERS: &str = "Workers";
pub(crate) const REQUEST_TIMEOUT: &str = "RequestTimeout";

/// Required keys, in the order they are checked
pub(crate) const REQUIRED_FIELDS: [&str; 5] = [
    TARGET_URL,
    CRAWL_DEPTH,
    PAGE_NUMBER_LIMIT,
    USER_AGENT,
    REQUEST_DELAY,
];

/// Builds a configuration from a non-empty raw table
///
/// Presence of every required key is checked before any value is coerced,
/// so a table missing a key always reports `MissingField`.
pub(crate) fn validate(raw: &Table) -> Result<Config, ConfigError> {
    for field in REQUIRED_FIELDS {
        if !raw.contains_key(field) {
            return Err(ConfigError::MissingField(field.to_string()));
        }
    }

    let workers = match raw.get(WORKERS) {
        Some(value) => coerce_count(WORKERS, value)?,
        None => DEFAULT_WORKERS,
    };
    if workers < 1 {
        return Err(invalid(WORKERS, "must be at least 1"));
    }

    let request_timeout_ms = match raw.get(REQUEST_TIMEOUT) {
        Some(value) => coerce_count(REQUEST_TIMEOUT, value)? as u64,
        None => DEFAULT_REQUEST_TIMEOUT_MS,
    };
    if request_timeout_ms == 0 {
        return Err(invalid(REQUEST_TIMEOUT, "must be at least 1ms"));
    }

    Ok(Config {
        target_url: coerce_string(TARGET_URL, required(raw, TARGET_URL)?)?,
        crawl_depth: coerce_count(CRAWL_DEPTH, required(raw, CRAWL_DEPTH)?)?,
        page_number_limit: coerce_count(PAGE_NUMBER_LIMIT, required(raw, PAGE_NUMBER_LIMIT)?)?,
        user_agent: coerce_string(USER_AGENT, required(raw, USER_AGENT)?)?,
        request_delay_ms: coerce_delay(REQUEST_DELAY, required(raw, REQUEST_DELAY)?)?,
        workers,
        request_timeout_ms,
    })
}

fn required<'a>(raw: &'a Table, field: &str) -> Result<&'a Value, ConfigError> {
    raw.get(field)
        .ok_or_else(|| ConfigError::MissingField(field.to_string()))
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Accepts TOML strings only
fn coerce_string(field: &str, value: &Value) -> Result<String, ConfigError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(invalid(
            field,
            format!("expected a string, got {}", other.type_str()),
        )),
    }
}

/// Accepts non-negative integers, integral floats and decimal strings
fn coerce_count(field: &str, value: &Value) -> Result<usize, ConfigError> {
    let n: i64 = match value {
        Value::Integer(i) => *i,
        Value::Float(f) if f.is_finite() && f.fract() == 0.0 => *f as i64,
        Value::Float(f) => {
            return Err(invalid(field, format!("expected an integer, got {}", f)));
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(field, format!("'{}' is not an integer", s)))?,
        other => {
            return Err(invalid(
                field,
                format!("expected an integer, got {}", other.type_str()),
            ));
        }
    };

    usize::try_from(n).map_err(|_| invalid(field, format!("must be >= 0, got {}", n)))
}

/// Accepts numbers or numeric strings (milliseconds) in
/// `0..=MAX_REQUEST_DELAY_MS`
fn coerce_delay(field: &str, value: &Value) -> Result<f64, ConfigError> {
    let ms = match value {
        Value::Integer(i) => *i as f64,
        Value::Float(f) => *f,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(field, format!("'{}' is not a number", s)))?,
        other => {
            return Err(invalid(
                field,
                format!("expected a number, got {}", other.type_str()),
            ));
        }
    };

    if !ms.is_finite() {
        return Err(invalid(field, "must be finite"));
    }
    if ms < 0.0 {
        return Err(invalid(field, format!("must be >= 0ms, got {}ms", ms)));
    }
    if ms > MAX_REQUEST_DELAY_MS {
        return Err(invalid(
            field,
            format!("must be <= {}ms, got {}ms", MAX_REQUEST_DELAY_MS, ms),
        ));
    }

    Ok(ms)
}
