// ABOUTME: Aggregate dream statistics: theme frequency, mood counts, intensity over time
// ABOUTME: Computed from enriched dreams so sentinel themes can be reported separately
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::models::EnrichedDream;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Occurrences of one theme label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeCount {
    /// Theme label
    pub theme: String,
    /// Number of dreams carrying it
    pub count: usize,
}

/// Intensity of one dream, dated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntensityPoint {
    /// Calendar date (`YYYY-MM-DD`, UTC)
    pub date: String,
    /// Reported intensity
    pub intensity: i64,
}

/// Dashboard-level summary of a dreamer's journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamStatsSummary {
    /// Number of dreams
    pub total_dreams: usize,
    /// Theme frequency, most common first; sentinel labels are excluded
    pub theme_counts: Vec<ThemeCount>,
    /// Dreams still awaiting analysis
    pub pending_analysis: usize,
    /// Dreams per mood label
    pub mood_counts: BTreeMap<String, usize>,
    /// Mean intensity, `None` without dreams
    pub average_intensity: Option<f64>,
    /// Intensity per dream, oldest first
    pub intensity_timeline: Vec<IntensityPoint>,
}

impl DreamStatsSummary {
    /// Summarize enriched dreams (any order)
    #[must_use]
    pub fn from_dreams(dreams: &[EnrichedDream]) -> Self {
        let mut themes: BTreeMap<&str, usize> = BTreeMap::new();
        let mut mood_counts = BTreeMap::new();
        let mut pending_analysis = 0;

        for dream in dreams {
            if dream.theme.is_pending() {
                pending_analysis += 1;
            } else if !dream.theme.is_sentinel() {
                for label in &dream.theme {
                    *themes.entry(label.as_str()).or_default() += 1;
                }
            }
            *mood_counts.entry(dream.mood.clone()).or_default() += 1;
        }

        let mut theme_counts: Vec<ThemeCount> = themes
            .into_iter()
            .map(|(theme, count)| ThemeCount {
                theme: theme.to_owned(),
                count,
            })
            .collect();
        theme_counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.theme.cmp(&b.theme)));

        let average_intensity = if dreams.is_empty() {
            None
        } else {
            // Intensity is unbounded, so sum in i128
            let total: i128 = dreams.iter().map(|d| i128::from(d.intensity)).sum();
            Some(total as f64 / dreams.len() as f64)
        };

        // ISO-8601 timestamps sort chronologically as strings
        let mut ordered: Vec<&EnrichedDream> = dreams.iter().collect();
        ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        let intensity_timeline = ordered
            .into_iter()
            .map(|dream| IntensityPoint {
                date: dream.timestamp.chars().take(10).collect(),
                intensity: dream.intensity,
            })
            .collect();

        Self {
            total_dreams: dreams.len(),
            theme_counts,
            pending_analysis,
            mood_counts,
            average_intensity,
            intensity_timeline,
        }
    }
}
