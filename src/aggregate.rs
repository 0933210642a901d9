// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Aggregation of collected repository records into chart-ready series.
//!
//! The transformations here are pure and deterministic: language totals and
//! repository rankings are sorted with explicit tie-breaks so that rendering
//! the same records always yields byte-identical output.

use std::collections::HashMap;

use serde::Serialize;

use crate::collector::RepositoryStats;

/// Languages excluded from the distribution chart. Markup, build scripting,
/// and shell glue would otherwise dominate the byte counts.
const EXCLUDED_LANGUAGES: [&str; 5] = ["html", "css", "dockerfile", "makefile", "shell"];

/// Account-wide byte total for a single language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageTotal {
    /// Language name.
    pub name:       String,
    /// Display color assigned by GitHub.
    pub color:      String,
    /// Total bytes across all repositories.
    pub size_bytes: u64
}

/// Aggregate counters for one collection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Total code size across all included languages.
    pub total_size_bytes:    u64,
    /// Repositories with at least one commit.
    pub active_repositories: usize,
    /// Commits summed across all repositories.
    pub total_commits:       u64,
    /// Stars summed across all repositories.
    pub total_stars:         u64
}

/// Sums language sizes across repositories, excluding noise languages.
///
/// The exclusion list is matched case-insensitively. The most recently seen
/// color for a language wins, mirroring the remote API which reports one
/// color per language anyway. Totals are sorted by size descending with the
/// name as tie-break, making the ordering deterministic.
pub fn aggregate_languages(records: &[RepositoryStats]) -> Vec<LanguageTotal> {
    let mut totals: HashMap<String, LanguageTotal> = HashMap::new();

    for record in records {
        for slice in &record.languages {
            if EXCLUDED_LANGUAGES.contains(&slice.name.to_lowercase().as_str()) {
                continue;
            }

            totals
                .entry(slice.name.clone())
                .and_modify(|total| {
                    total.size_bytes += slice.size_bytes;
                    total.color = slice.color.clone();
                })
                .or_insert_with(|| LanguageTotal {
                    name:       slice.name.clone(),
                    color:      slice.color.clone(),
                    size_bytes: slice.size_bytes
                });
        }
    }

    let mut totals: Vec<LanguageTotal> = totals.into_values().collect();
    totals.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes).then_with(|| a.name.cmp(&b.name)));
    totals
}

/// Returns up to `limit` repositories ranked by commit count.
///
/// Ties are broken by name so that the ranking is stable across runs with
/// identical input.
pub fn top_repositories(records: &[RepositoryStats], limit: usize) -> Vec<&RepositoryStats> {
    let mut ranked: Vec<&RepositoryStats> = records.iter().collect();
    ranked.sort_by(|a, b| b.commit_count.cmp(&a.commit_count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(limit);
    ranked
}

/// Computes aggregate counters for the run.
pub fn summarize(records: &[RepositoryStats], languages: &[LanguageTotal]) -> RunSummary {
    RunSummary {
        total_size_bytes:    languages.iter().map(|total| total.size_bytes).sum(),
        active_repositories: records.iter().filter(|record| record.commit_count > 0).count(),
        total_commits:       records.iter().map(|record| record.commit_count).sum(),
        total_stars:         records.iter().map(|record| record.stars).sum()
    }
}
