// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! SVG dashboard rendering for collected repository statistics.
//!
//! The renderer is a pure function of the record set and the caption
//! timestamp: identical inputs produce a byte-identical artifact, which is
//! what makes re-publishing under the same object key idempotent. Dynamic
//! text is XML-escaped before interpolation.

use std::{borrow::Cow, f64::consts::TAU, fmt::Write as _};

use chrono::{DateTime, Utc};

use crate::{
    aggregate::{LanguageTotal, aggregate_languages, top_repositories},
    collector::RepositoryStats
};

/// Content type of the rendered artifact.
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Overall canvas dimensions.
const WIDTH: u32 = 800;
const HEIGHT: u32 = 450;
/// Pie chart placement within the left card.
const PIE_CENTER_X: f64 = 140.0;
const PIE_CENTER_Y: f64 = 270.0;
const PIE_RADIUS: f64 = 70.0;
/// Legend placement and maximum entries.
const LEGEND_X: u32 = 250;
const LEGEND_Y: u32 = 150;
const LEGEND_LIMIT: usize = 10;
/// Bar chart placement within the right card.
const BAR_X: u32 = 430;
const BAR_Y: u32 = 150;
const BAR_MAX_WIDTH: f64 = 80.0;
const BAR_ROW_HEIGHT: u32 = 24;
const BAR_LIMIT: usize = 10;

const TITLE_FONT: &str = "Inter, 'SF Pro Display', 'Helvetica Neue', Arial, sans-serif";

/// Rendered output of one collection run.
///
/// The previous artifact under the same storage key is replaced wholesale on
/// publish; no history is retained by the pipeline itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    /// Serialized SVG document.
    pub content:      String,
    /// MIME type reported to the storage layer.
    pub content_type: &'static str,
    /// Timestamp baked into the artifact caption.
    pub generated_at: DateTime<Utc>
}

/// Renders the statistics dashboard for the provided records.
///
/// The layout mirrors the published dashboard: a language distribution pie
/// chart with a legend on the left, and the top repositories by commit count
/// as a horizontal bar chart on the right.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use risp::render_dashboard;
///
/// let generated_at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
/// let artifact = render_dashboard(&[], generated_at);
/// assert!(artifact.content.starts_with("<svg"));
/// ```
pub fn render_dashboard(
    records: &[RepositoryStats],
    generated_at: DateTime<Utc>
) -> OutputArtifact {
    let languages = aggregate_languages(records);
    let top = top_repositories(records, BAR_LIMIT);

    let mut svg = String::with_capacity(8192);

    let _ = writeln!(
        svg,
        "<svg width=\"{WIDTH}\" height=\"{HEIGHT}\" xmlns=\"http://www.w3.org/2000/svg\">"
    );
    svg.push_str(document_defs());

    let _ = writeln!(
        svg,
        "  <text x=\"400\" y=\"30\" font-family=\"{TITLE_FONT}\" font-size=\"16\" font-weight=\"700\" fill=\"#1e293b\" text-anchor=\"middle\">Repository Insights</text>"
    );
    let _ = writeln!(
        svg,
        "  <text x=\"400\" y=\"50\" font-family=\"{TITLE_FONT}\" font-size=\"12\" font-weight=\"400\" fill=\"#6b7280\" text-anchor=\"middle\">Language usage and commit activity</text>"
    );

    svg.push_str(
        "  <rect x=\"40\" y=\"80\" width=\"350\" height=\"350\" fill=\"white\" stroke=\"#e2e8f0\" stroke-width=\"1\" filter=\"url(#cardShadow)\"/>\n"
    );
    let _ = writeln!(
        svg,
        "  <text x=\"60\" y=\"110\" font-family=\"{TITLE_FONT}\" font-size=\"16\" font-weight=\"700\" fill=\"#1e293b\">Language Distribution</text>"
    );
    let _ = writeln!(
        svg,
        "  <text x=\"60\" y=\"130\" font-family=\"{TITLE_FONT}\" font-size=\"11\" font-weight=\"400\" fill=\"#6b7280\">Languages used in your projects</text>"
    );
    svg.push_str(&pie_chart(&languages, PIE_CENTER_X, PIE_CENTER_Y, PIE_RADIUS));
    svg.push_str(&legend(&languages, LEGEND_X, LEGEND_Y));

    svg.push_str(
        "  <rect x=\"410\" y=\"80\" width=\"350\" height=\"350\" fill=\"white\" stroke=\"#e2e8f0\" stroke-width=\"1\" filter=\"url(#cardShadow)\"/>\n"
    );
    let _ = writeln!(
        svg,
        "  <text x=\"430\" y=\"110\" font-family=\"{TITLE_FONT}\" font-size=\"16\" font-weight=\"700\" fill=\"#1e293b\">Top Repositories</text>"
    );
    let _ = writeln!(
        svg,
        "  <text x=\"430\" y=\"130\" font-family=\"{TITLE_FONT}\" font-size=\"11\" font-weight=\"400\" fill=\"#6b7280\">Most active repositories by commit count</text>"
    );
    svg.push_str(&bar_chart(&top, BAR_X, BAR_Y, BAR_MAX_WIDTH, BAR_ROW_HEIGHT));

    let _ = writeln!(
        svg,
        "  <text x=\"750\" y=\"20\" font-family=\"{TITLE_FONT}\" font-size=\"9\" font-weight=\"400\" fill=\"#9ca3af\" text-anchor=\"end\">Generated at {} UTC</text>",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    svg.push_str("</svg>\n");

    OutputArtifact {
        content: svg,
        content_type: SVG_CONTENT_TYPE,
        generated_at
    }
}

fn document_defs() -> &'static str {
    "  <defs>\n    <linearGradient id=\"barGradient\" x1=\"0%\" y1=\"0%\" x2=\"100%\" y2=\"0%\">\n      <stop offset=\"0%\" stop-color=\"#60a5fa\"/>\n      <stop offset=\"100%\" stop-color=\"#93c5fd\"/>\n    </linearGradient>\n    <filter id=\"dropshadow\" x=\"-20%\" y=\"-20%\" width=\"140%\" height=\"140%\">\n      <feGaussianBlur in=\"SourceAlpha\" stdDeviation=\"3\"/>\n      <feOffset dx=\"2\" dy=\"2\" result=\"offset\"/>\n      <feComponentTransfer>\n        <feFuncA type=\"linear\" slope=\"0.3\"/>\n      </feComponentTransfer>\n      <feMerge>\n        <feMergeNode/>\n        <feMergeNode in=\"SourceGraphic\"/>\n      </feMerge>\n    </filter>\n    <filter id=\"cardShadow\" x=\"-20%\" y=\"-20%\" width=\"140%\" height=\"140%\">\n      <feGaussianBlur in=\"SourceAlpha\" stdDeviation=\"2\"/>\n      <feOffset dx=\"0\" dy=\"1\" result=\"offset\"/>\n      <feComponentTransfer>\n        <feFuncA type=\"linear\" slope=\"0.05\"/>\n      </feComponentTransfer>\n      <feMerge>\n        <feMergeNode/>\n        <feMergeNode in=\"SourceGraphic\"/>\n      </feMerge>\n    </filter>\n    <filter id=\"barShadow\" x=\"-20%\" y=\"-20%\" width=\"140%\" height=\"140%\">\n      <feGaussianBlur in=\"SourceAlpha\" stdDeviation=\"1\"/>\n      <feOffset dx=\"0\" dy=\"1\" result=\"offset\"/>\n      <feComponentTransfer>\n        <feFuncA type=\"linear\" slope=\"0.2\"/>\n      </feComponentTransfer>\n      <feMerge>\n        <feMergeNode/>\n        <feMergeNode in=\"SourceGraphic\"/>\n      </feMerge>\n    </filter>\n  </defs>\n"
}

/// Renders the language distribution as pie slices.
///
/// A lone language covers the full circle; the arc endpoints would coincide
/// at 2π, so that case is drawn as a `<circle>` element instead.
fn pie_chart(languages: &[LanguageTotal], center_x: f64, center_y: f64, radius: f64) -> String {
    let total: u64 = languages.iter().map(|language| language.size_bytes).sum();
    if total == 0 {
        return String::new();
    }

    if let [single] = languages {
        return format!(
            "  <circle cx=\"{center_x}\" cy=\"{center_y}\" r=\"{radius}\" fill=\"{}\" stroke=\"white\" stroke-width=\"1\" filter=\"url(#dropshadow)\"/>\n",
            escape_xml(&single.color)
        );
    }

    let mut parts = String::new();
    let mut start_angle = 0.0_f64;

    for language in languages {
        let angle = (language.size_bytes as f64 / total as f64) * TAU;
        let end_angle = start_angle + angle;

        let x1 = center_x + radius * start_angle.cos();
        let y1 = center_y + radius * start_angle.sin();
        let x2 = center_x + radius * end_angle.cos();
        let y2 = center_y + radius * end_angle.sin();

        let large_arc = if angle > TAU / 2.0 { "1" } else { "0" };

        let _ = writeln!(
            parts,
            "  <path d=\"M {center_x:.2} {center_y:.2} L {x1:.2} {y1:.2} A {radius:.2} {radius:.2} 0 {large_arc} 1 {x2:.2} {y2:.2} Z\" fill=\"{}\" stroke=\"white\" stroke-width=\"1\" filter=\"url(#dropshadow)\"/>",
            escape_xml(&language.color)
        );

        start_angle = end_angle;
    }

    parts
}

fn legend(languages: &[LanguageTotal], start_x: u32, start_y: u32) -> String {
    let total: u64 = languages.iter().map(|language| language.size_bytes).sum();
    if total == 0 {
        return String::new();
    }

    let mut parts = String::new();

    for (index, language) in languages.iter().take(LEGEND_LIMIT).enumerate() {
        let y = start_y + (index as u32) * 28;
        let percentage = (language.size_bytes as f64 / total as f64) * 100.0;
        let size_kb = language.size_bytes as f64 / 1024.0;
        let name = escape_xml(&language.name);

        let _ = writeln!(
            parts,
            "  <circle cx=\"{}\" cy=\"{}\" r=\"6\" fill=\"{}\"/>",
            start_x + 8,
            y + 8,
            escape_xml(&language.color)
        );
        let _ = writeln!(
            parts,
            "  <text x=\"{}\" y=\"{}\" font-family=\"{TITLE_FONT}\" font-size=\"9\" font-weight=\"500\" fill=\"#1e293b\">{name}</text>",
            start_x + 25,
            y + 6
        );
        let _ = writeln!(
            parts,
            "  <text x=\"{}\" y=\"{}\" font-family=\"{TITLE_FONT}\" font-size=\"9\" font-weight=\"400\" fill=\"#6b7280\">{percentage:.1}% ({size_kb:.1}KB)</text>",
            start_x + 25,
            y + 20
        );
    }

    parts
}

fn bar_chart(
    repositories: &[&RepositoryStats],
    start_x: u32,
    start_y: u32,
    max_width: f64,
    row_height: u32
) -> String {
    let Some(max_commits) = repositories.first().map(|repository| repository.commit_count) else {
        return String::new();
    };
    if max_commits == 0 {
        return String::new();
    }

    let mut parts = String::new();

    for (index, repository) in repositories.iter().enumerate() {
        let y = start_y + (index as u32) * row_height;
        let bar_width = (repository.commit_count as f64 / max_commits as f64) * max_width;
        let bar_x = start_x + 170;
        let label_x = bar_x as f64 + max_width + 10.0;
        let size_kb = repository.size_bytes as f64 / 1024.0;
        let name = escape_xml(&repository.name);

        let _ = writeln!(
            parts,
            "  <text x=\"{start_x}\" y=\"{}\" font-family=\"{TITLE_FONT}\" font-size=\"11\" font-weight=\"500\" fill=\"#6b7280\">{name}</text>",
            y + 15
        );
        let _ = writeln!(
            parts,
            "  <rect x=\"{bar_x}\" y=\"{}\" width=\"{bar_width:.2}\" height=\"6\" rx=\"3\" fill=\"url(#barGradient)\" filter=\"url(#barShadow)\"/>",
            y + 8
        );
        let _ = writeln!(
            parts,
            "  <text x=\"{label_x:.0}\" y=\"{}\" font-family=\"{TITLE_FONT}\" font-size=\"9\" font-weight=\"600\" fill=\"#6b7280\">{} ({size_kb:.0}KB)</text>",
            y + 15,
            repository.commit_count
        );
    }

    parts
}

fn escape_xml(value: &str) -> Cow<'_, str> {
    if value
        .chars()
        .any(|character| matches!(character, '&' | '<' | '>' | '\"' | '\''))
    {
        let mut escaped = String::with_capacity(value.len());
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '\"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                other => escaped.push(other)
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;
    use crate::collector::LanguageSlice;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap()
    }

    fn record(name: &str, commits: u64, languages: &[(&str, &str, u64)]) -> RepositoryStats {
        let languages: Vec<LanguageSlice> = languages
            .iter()
            .map(|(language, color, size)| LanguageSlice {
                name:       (*language).to_string(),
                color:      (*color).to_string(),
                size_bytes: *size
            })
            .collect();
        let size_bytes = languages.iter().map(|slice| slice.size_bytes).sum();

        RepositoryStats {
            name: name.to_string(),
            commit_count: commits,
            stars: 0,
            forks: 0,
            size_bytes,
            languages,
            collected_at: timestamp()
        }
    }

    #[test]
    fn rendering_identical_input_is_byte_identical() {
        let records = vec![
            record("alpha", 42, &[("Rust", "#dea584", 2048), ("Python", "#3572A5", 512)]),
            record("beta", 7, &[("Rust", "#dea584", 1024)]),
        ];

        let first = render_dashboard(&records, timestamp());
        let second = render_dashboard(&records, timestamp());
        assert_eq!(first.content, second.content);
        assert_eq!(first, second);
    }

    #[test]
    fn rendered_artifact_contains_layout_and_caption() {
        let records = vec![record("alpha", 42, &[("Rust", "#dea584", 2048)])];

        let artifact = render_dashboard(&records, timestamp());
        assert_eq!(artifact.content_type, SVG_CONTENT_TYPE);
        assert!(artifact.content.contains("Repository Insights"));
        assert!(artifact.content.contains("Language Distribution"));
        assert!(artifact.content.contains("Languages used in your projects"));
        assert!(artifact.content.contains("Top Repositories"));
        assert!(artifact.content.contains("Most active repositories by commit count"));
        assert!(artifact.content.contains("Generated at 2025-06-01 12:30:00 UTC"));
        assert!(artifact.content.contains("alpha"));
    }

    #[test]
    fn bar_rects_carry_gradient_and_shadow() {
        let records = vec![record("alpha", 42, &[("Rust", "#dea584", 2048)])];

        let artifact = render_dashboard(&records, timestamp());
        assert!(artifact.content.contains("<filter id=\"barShadow\""));
        assert!(
            artifact
                .content
                .contains("fill=\"url(#barGradient)\" filter=\"url(#barShadow)\"")
        );
    }

    #[test]
    fn rendered_artifact_escapes_repository_names() {
        let records = vec![record("tools<&>", 10, &[("Rust", "#dea584", 100)])];

        let artifact = render_dashboard(&records, timestamp());
        assert!(artifact.content.contains("tools&lt;&amp;&gt;"));
        assert!(!artifact.content.contains("tools<&>"));
    }

    #[test]
    fn rendered_artifact_escapes_language_colors() {
        let records = vec![record(
            "alpha",
            10,
            &[("Rust", "bad\"color", 3000), ("Python", "#3572A5", 1000)]
        )];

        let artifact = render_dashboard(&records, timestamp());
        assert!(artifact.content.contains("fill=\"bad&quot;color\""));
        assert!(!artifact.content.contains("fill=\"bad\"color\""));
    }

    #[test]
    fn empty_record_set_renders_without_charts() {
        let artifact = render_dashboard(&[], timestamp());
        assert!(artifact.content.starts_with("<svg"));
        assert!(artifact.content.ends_with("</svg>\n"));
        assert!(!artifact.content.contains("<path"));
        assert!(!artifact.content.contains("url(#barGradient)"));
    }

    #[test]
    fn single_language_renders_full_circle() {
        let records = vec![record("alpha", 5, &[("Rust", "#dea584", 2048)])];

        let artifact = render_dashboard(&records, timestamp());
        assert!(artifact.content.contains("<circle cx=\"140\" cy=\"270\" r=\"70\""));
        assert!(!artifact.content.contains("<path"));
    }

    #[test]
    fn multiple_languages_render_arc_paths() {
        let records = vec![record(
            "alpha",
            5,
            &[("Rust", "#dea584", 3000), ("Python", "#3572A5", 1000)]
        )];

        let artifact = render_dashboard(&records, timestamp());
        let slices = artifact.content.matches("<path d=\"M").count();
        assert_eq!(slices, 2);
        assert!(artifact.content.contains("A 70.00 70.00 0 1 1"), "dominant slice spans more than half");
    }

    #[test]
    fn bar_chart_is_empty_when_no_repository_has_commits() {
        let repositories = vec![record("alpha", 0, &[])];
        let refs: Vec<&RepositoryStats> = repositories.iter().collect();

        assert!(bar_chart(&refs, 430, 150, 80.0, 24).is_empty());
    }

    #[test]
    fn bar_chart_scales_widths_relative_to_maximum() {
        let repositories = vec![record("large", 100, &[]), record("small", 25, &[])];
        let refs: Vec<&RepositoryStats> = repositories.iter().collect();

        let chart = bar_chart(&refs, 430, 150, 80.0, 24);
        assert!(chart.contains("width=\"80.00\""));
        assert!(chart.contains("width=\"20.00\""));
    }

    #[test]
    fn legend_reports_percentages() {
        let records = vec![record(
            "alpha",
            1,
            &[("Rust", "#dea584", 3000), ("Python", "#3572A5", 1000)]
        )];

        let artifact = render_dashboard(&records, timestamp());
        assert!(artifact.content.contains("75.0%"));
        assert!(artifact.content.contains("25.0%"));
    }

    #[test]
    fn escape_xml_handles_all_special_characters() {
        let input = "&<>\"'normal";
        let result = escape_xml(input);
        assert_eq!(result, "&amp;&lt;&gt;&quot;&apos;normal");
    }

    #[test]
    fn escape_xml_returns_borrowed_when_no_escaping_needed() {
        let input = "no special characters";
        let result = escape_xml(input);
        match result {
            Cow::Borrowed(s) => assert_eq!(s, input),
            Cow::Owned(_) => panic!("expected borrowed variant")
        }
    }

    proptest! {
        #[test]
        fn escape_xml_leaves_no_raw_special_characters(input in ".{0,64}") {
            let escaped = escape_xml(&input).into_owned();
            let stripped = escaped
                .replace("&amp;", "")
                .replace("&lt;", "")
                .replace("&gt;", "")
                .replace("&quot;", "")
                .replace("&apos;", "");
            prop_assert!(!stripped.chars().any(|ch| matches!(ch, '&' | '<' | '>' | '\"' | '\'')));
        }
    }
}
