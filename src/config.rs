//! # Suite Configuration
//!
//! Per-session signing parameters. Configuration is validated eagerly: an
//! unparsable `date` or a non-string identity fails before any canonicalization,
//! key or loader work happens.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::Context;
use crate::error::{Error, Result};

/// Suite configuration.
///
/// Usually assembled through the suite builder, but can also be deserialized
/// from JSON with [`SuiteConfig::from_value`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SuiteConfig {
    /// Verification method to stamp on created proofs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<String>,

    /// Legacy identity to stamp on created proofs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,

    /// Partial proof used as the starting point for created proofs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Value>,

    /// Creation date to stamp on proofs (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Use the canonicalizer's native engine rather than its reference
    /// implementation.
    #[serde(default)]
    pub use_native_canonize: bool,

    /// Security context version created proofs are scoped to.
    #[serde(default)]
    pub context: Context,
}

impl SuiteConfig {
    /// Deserialize and validate configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a field has the wrong type or the
    /// configuration fails validation.
    pub fn from_value(value: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)
            .map_err(|e| Error::Configuration(format!("invalid suite configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `date` cannot be parsed or the
    /// proof template is not an object.
    pub fn validate(&self) -> Result<()> {
        if let Some(date) = &self.date {
            parse_date(date)?;
        }
        if let Some(template) = &self.proof
            && !template.is_object()
        {
            return Err(Error::Configuration("proof template must be an object".into()));
        }
        Ok(())
    }

    /// The configured creation date, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `date` cannot be parsed.
    pub fn date(&self) -> Result<Option<DateTime<Utc>>> {
        self.date.as_deref().map(parse_date).transpose()
    }
}

/// Parse an RFC 3339 timestamp. A bare date (`YYYY-MM-DD`) is read as
/// midnight UTC.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the value is not a valid timestamp.
pub fn parse_date(date: &str) -> Result<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(date) {
        Ok(date) => Ok(date.with_timezone(&Utc)),
        Err(e) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc())
            .ok_or_else(|| Error::Configuration(format!("invalid date `{date}`: {e}"))),
    }
}

/// Format a timestamp the way proofs record it: ISO-8601, UTC, whole seconds.
#[must_use]
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn from_json() {
        let config = SuiteConfig::from_value(json!({
            "verificationMethod": "did:example:1#key-1",
            "date": "2021-03-04T05:06:07.890+02:00",
            "useNativeCanonize": true,
            "context": "https://w3id.org/security/v1"
        }))
        .expect("should parse");

        assert_eq!(config.context, Context::V1);
        assert!(config.use_native_canonize);
        let date = config.date().expect("should parse date").expect("should have date");
        assert_eq!(format_date(&date), "2021-03-04T03:06:07Z");
    }

    #[test]
    fn bad_date() {
        let err = SuiteConfig::from_value(json!({"date": "yesterday"})).expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn date_only() {
        let date = parse_date("2020-01-01").expect("should parse");
        assert_eq!(format_date(&date), "2020-01-01T00:00:00Z");

        parse_date("2020-13-01").expect_err("should reject month");
        parse_date("2020-01-01T25:00:00Z").expect_err("should reject hour");
    }

    #[test]
    fn non_string_identity() {
        let err = SuiteConfig::from_value(json!({"creator": 42})).expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = SuiteConfig::from_value(json!({"verificationMethod": {"id": "x"}}))
            .expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn bad_template() {
        let err = SuiteConfig::from_value(json!({"proof": "x"})).expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
