//! A single `<url>` entry of a sitemap.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, Result};

/// How often the page at a location is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(ChangeFrequency::Always),
            "hourly" => Ok(ChangeFrequency::Hourly),
            "daily" => Ok(ChangeFrequency::Daily),
            "weekly" => Ok(ChangeFrequency::Weekly),
            "monthly" => Ok(ChangeFrequency::Monthly),
            "yearly" => Ok(ChangeFrequency::Yearly),
            "never" => Ok(ChangeFrequency::Never),
            other => Err(Error::MalformedInput(format!(
                "unknown change frequency: {other}"
            ))),
        }
    }
}

/// One URL entry with optional metadata.
///
/// Immutable once built. The URL and priority are checked at construction,
/// including when deserialized, so a `Location` can always be written as
/// well-formed XML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LocationRecord", into = "LocationRecord")]
pub struct Location {
    url: String,
    change_frequency: Option<ChangeFrequency>,
    last_modified: Option<Date>,
    priority: Option<f64>,
}

impl Location {
    /// Create a location for `url`.
    ///
    /// # Errors
    ///
    /// `Error::MalformedInput` if the URL is empty or only whitespace, or if it
    /// contains a character XML 1.0 does not allow.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(Error::MalformedInput("location url is empty".to_string()));
        }
        if let Some(c) = trimmed.chars().find(|c| !is_xml_char(*c)) {
            return Err(Error::MalformedInput(format!(
                "location url contains character U+{:04X} not allowed in xml",
                c as u32
            )));
        }
        let url = if trimmed.len() == url.len() {
            url
        } else {
            trimmed.to_string()
        };
        Ok(Self {
            url,
            change_frequency: None,
            last_modified: None,
            priority: None,
        })
    }

    pub fn with_change_frequency(mut self, change_frequency: ChangeFrequency) -> Self {
        self.change_frequency = Some(change_frequency);
        self
    }

    pub fn with_last_modified(mut self, last_modified: Date) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Set the priority, which must lie in `0.0..=1.0`.
    ///
    /// # Errors
    ///
    /// `Error::MalformedInput` for NaN, infinite or out-of-range values.
    pub fn with_priority(mut self, priority: f64) -> Result<Self> {
        self.priority = Some(check_priority(priority)?);
        Ok(self)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn change_frequency(&self) -> Option<ChangeFrequency> {
        self.change_frequency
    }

    pub fn last_modified(&self) -> Option<Date> {
        self.last_modified
    }

    pub fn priority(&self) -> Option<f64> {
        self.priority
    }
}

// Rust strings never hold surrogates, so only the control range and the two
// noncharacters at the end of the BMP need excluding.
fn is_xml_char(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => true,
        '\u{FFFE}' | '\u{FFFF}' => false,
        c => c >= '\u{20}',
    }
}

fn check_priority(priority: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&priority) {
        Ok(priority)
    } else {
        Err(Error::MalformedInput(format!(
            "priority must be between 0.0 and 1.0, got {priority}"
        )))
    }
}

/// Wire shape of a location, as read from JSON input.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LocationRecord {
    url: String,
    #[serde(default, rename = "changefreq", skip_serializing_if = "Option::is_none")]
    change_frequency: Option<ChangeFrequency>,
    #[serde(default, rename = "lastmod", skip_serializing_if = "Option::is_none")]
    last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<f64>,
}

impl TryFrom<LocationRecord> for Location {
    type Error = Error;

    fn try_from(record: LocationRecord) -> Result<Self> {
        let mut location = Location::new(record.url)?;
        location.change_frequency = record.change_frequency;
        location.last_modified = match record.last_modified {
            Some(raw) => Some(crate::fs_util::parse_date(&raw)?),
            None => None,
        };
        location.priority = record.priority.map(check_priority).transpose()?;
        Ok(location)
    }
}

impl From<Location> for LocationRecord {
    fn from(location: Location) -> Self {
        Self {
            url: location.url,
            change_frequency: location.change_frequency,
            last_modified: location.last_modified.map(crate::fs_util::format_date),
            priority: location.priority,
        }
    }
}
