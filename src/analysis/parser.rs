// ABOUTME: Best-effort extraction of theme labels from free-form analysis text
// ABOUTME: Finds a "Themes:" label anywhere in the text and splits the rest of that line
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::constants::themes::DEFAULT_LABEL;
use crate::models::ThemeList;
use regex::Regex;

/// Strategy for turning analysis text into a theme list
///
/// Implementations never fail: text without recognizable themes yields the
/// `Unspecified` sentinel.
pub trait ThemeParser: Send + Sync {
    /// Extract themes from `analysis`
    fn parse_themes(&self, analysis: &str) -> ThemeList;
}

/// Parser for `"<label>: a, b, c"` lines
///
/// The label match is case-insensitive and may start mid-line
/// (`"Mood: calm. Themes: flying, falling"`). Everything after the label up to the
/// line break is split on commas.
#[derive(Debug, Clone)]
pub struct LabelLineParser {
    label: String,
    pattern: Option<Regex>,
}

impl LabelLineParser {
    /// Create a parser for a custom label (without the trailing colon)
    #[must_use]
    pub fn new(label: &str) -> Self {
        let label = label.trim().to_owned();
        let pattern = Regex::new(&format!(r"(?i){}:([^\r\n]*)", regex::escape(&label))).ok();
        Self { label, pattern }
    }

    /// Label this parser looks for
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    fn capture<'a>(&self, analysis: &'a str) -> Option<&'a str> {
        if let Some(pattern) = &self.pattern {
            return pattern
                .captures(analysis)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str());
        }

        // ASCII lowercasing keeps byte offsets aligned with `analysis`
        let needle = format!("{}:", self.label.to_ascii_lowercase());
        let start = analysis.to_ascii_lowercase().find(&needle)? + needle.len();
        let rest = &analysis[start..];
        let end = rest.find(['\r', '\n']).unwrap_or(rest.len());
        Some(&rest[..end])
    }
}

impl Default for LabelLineParser {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL)
    }
}

impl ThemeParser for LabelLineParser {
    fn parse_themes(&self, analysis: &str) -> ThemeList {
        self.capture(analysis).map_or_else(ThemeList::unspecified, |line| {
            ThemeList::from_labels(line.split(','))
        })
    }
}
