// ABOUTME: Dream journal data models: stored records, insert payloads, and theme lists
// ABOUTME: EnrichedDream is the camelCase shape returned by the statistics endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::themes::{ANALYSIS_PENDING, UNSPECIFIED};
use crate::errors::{AppError, AppResult};

/// Ordered, non-empty list of theme labels
///
/// Holds either labels extracted from analysis text or one of the two sentinels:
/// `["Unspecified"]` when the text carried no themes, `["Analysis Pending"]` when
/// no analysis could be obtained yet. Serializes as a plain JSON string array;
/// deserialization goes through [`ThemeList::from_labels`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ThemeList(Vec<String>);

impl ThemeList {
    /// Build a list from labels, trimming each and dropping empty ones
    ///
    /// Falls back to the `Unspecified` sentinel when nothing is left.
    #[must_use]
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: Vec<String> = labels
            .into_iter()
            .map(|label| label.as_ref().trim().to_owned())
            .filter(|label| !label.is_empty())
            .collect();

        if labels.is_empty() {
            Self::unspecified()
        } else {
            Self(labels)
        }
    }

    /// Sentinel for analysis text without any theme labels
    #[must_use]
    pub fn unspecified() -> Self {
        Self(vec![UNSPECIFIED.to_owned()])
    }

    /// Sentinel for a record whose analysis is not available yet
    #[must_use]
    pub fn pending() -> Self {
        Self(vec![ANALYSIS_PENDING.to_owned()])
    }

    /// True for the `Analysis Pending` sentinel
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.0.len() == 1 && self.0[0] == ANALYSIS_PENDING
    }

    /// True for the `Unspecified` sentinel
    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        self.0.len() == 1 && self.0[0] == UNSPECIFIED
    }

    /// True for either sentinel
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.is_pending() || self.is_unspecified()
    }

    /// Borrow the labels
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterate over the labels
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Number of labels (always at least one)
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the inner vector
    #[must_use]
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for ThemeList {
    fn from(labels: Vec<String>) -> Self {
        Self::from_labels(labels)
    }
}

impl From<ThemeList> for Vec<String> {
    fn from(themes: ThemeList) -> Self {
        themes.0
    }
}

impl<'a> IntoIterator for &'a ThemeList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A dream entry as stored in the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreamRecord {
    /// Unique record id
    pub id: Uuid,
    /// Owner identity (token subject)
    pub owner_id: String,
    /// Free-text dream description
    pub description: String,
    /// Mood label chosen by the dreamer
    pub mood: String,
    /// Intensity, expected on a 1-10 scale
    pub intensity: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Raw analysis text, once obtained
    pub analysis: Option<String>,
    /// Theme labels derived from `analysis`
    pub themes: Option<ThemeList>,
}

/// Insert payload for a new dream entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDream {
    /// Free-text dream description
    pub description: String,
    /// Mood label
    pub mood: String,
    /// Intensity, expected on a 1-10 scale
    pub intensity: i64,
}

impl NewDream {
    /// Reject blank descriptions or moods
    pub fn validate(&self) -> AppResult<()> {
        let mut missing = Vec::new();
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.mood.trim().is_empty() {
            missing.push("mood");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::missing_fields(&missing))
        }
    }
}

/// Dream record annotated with its resolved themes, as returned over HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedDream {
    /// Record id
    pub id: Uuid,
    /// Owner identity
    pub user_id: String,
    /// Free-text dream description
    pub dream_description: String,
    /// Mood label
    pub mood: String,
    /// Intensity
    pub intensity: i64,
    /// ISO-8601 creation time with millisecond precision
    pub timestamp: String,
    /// Raw analysis text when known
    pub analysis: Option<String>,
    /// Resolved themes, never empty
    pub theme: ThemeList,
}

impl EnrichedDream {
    /// Attach resolved themes to a record
    ///
    /// `analysis` overrides the stored value when the record was analyzed during
    /// this pass.
    #[must_use]
    pub fn from_record(record: DreamRecord, analysis: Option<String>, theme: ThemeList) -> Self {
        Self {
            id: record.id,
            user_id: record.owner_id,
            dream_description: record.description,
            mood: record.mood,
            intensity: record.intensity,
            timestamp: record
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            analysis: analysis.or(record.analysis),
            theme,
        }
    }
}

/// Outcome of submitting a dream entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DreamSubmission {
    /// Id of the persisted record
    pub dream_id: Uuid,
    /// Analysis text when requested and obtained
    pub dream_analysis: Option<String>,
    /// Themes parsed from `dream_analysis`
    pub theme: Option<ThemeList>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> DreamRecord {
        DreamRecord {
            id: Uuid::new_v4(),
            owner_id: "user-1".into(),
            description: "Flying over the sea".into(),
            mood: "calm".into(),
            intensity: 6,
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 7, 30, 0).unwrap(),
            analysis: None,
            themes: None,
        }
    }

    #[test]
    fn test_theme_list_drops_blank_labels() {
        let themes = ThemeList::from_labels([" water ", "", "  ", "flight"]);
        assert_eq!(themes.as_slice(), ["water", "flight"]);
        assert!(!themes.is_sentinel());
    }

    #[test]
    fn test_theme_list_falls_back_to_unspecified() {
        let themes = ThemeList::from_labels(Vec::<String>::new());
        assert!(themes.is_unspecified());
        assert!(!themes.is_pending());
    }

    #[test]
    fn test_theme_list_serializes_as_array() {
        let json = serde_json::to_string(&ThemeList::pending()).unwrap();
        assert_eq!(json, r#"["Analysis Pending"]"#);
    }

    #[test]
    fn test_theme_list_deserialization_keeps_invariant() {
        let empty: ThemeList = serde_json::from_str("[]").unwrap();
        assert!(empty.is_unspecified());

        let blank: ThemeList = serde_json::from_str(r#"["  ", ""]"#).unwrap();
        assert!(blank.is_unspecified());

        let trimmed: ThemeList = serde_json::from_str(r#"[" water ", "flight"]"#).unwrap();
        assert_eq!(trimmed.as_slice(), ["water", "flight"]);
    }

    #[test]
    fn test_new_dream_validation_lists_missing_fields() {
        let dream = NewDream {
            description: "  ".into(),
            mood: String::new(),
            intensity: 4,
        };
        let error = dream.validate().unwrap_err();
        assert_eq!(error.message, "Missing required fields");
        assert_eq!(
            error.context.details["fields"],
            serde_json::json!(["description", "mood"])
        );
    }

    #[test]
    fn test_enriched_dream_shape() {
        let record = sample_record();
        let enriched = EnrichedDream::from_record(record, None, ThemeList::pending());
        let value = serde_json::to_value(&enriched).unwrap();

        assert_eq!(value["userId"], "user-1");
        assert_eq!(value["dreamDescription"], "Flying over the sea");
        assert_eq!(value["timestamp"], "2024-03-09T07:30:00.000Z");
        assert_eq!(value["theme"], serde_json::json!(["Analysis Pending"]));
        assert!(value["analysis"].is_null());
    }
}
