//! Analysis orchestration: the extractor seam, the pipeline, and the
//! review document.
//!
//! Inference lives outside this crate. Anything that can produce
//! [`EntitySpan`]s for a text plugs in through the [`Extractor`] trait; the
//! [`Analyzer`] drives the fixed pipeline (extract, filter, resolve
//! overlaps, reconcile, summarize) and hands back a [`Review`] carrying all
//! three views of the result.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bio::{reconcile, validate, LabeledToken, TagPolicy};
use crate::entity::{Category, EntitySpan};
use crate::error::Result;
use crate::export;
use crate::filter::{filter_spans, resolve_overlaps, OverlapPolicy};
use crate::highlight;
use crate::label::LabelConfig;
use crate::summary::{summarize, Summary};

// =============================================================================
// Extractor Seam
// =============================================================================

/// A source of entity spans for a text.
///
/// Implement this for whatever produces model output in your setup: an HTTP
/// client for a hosted pipeline, a local inference wrapper, a replay of
/// recorded JSON. The trait is object safe; the [`Analyzer`] owns a boxed
/// instance.
pub trait Extractor: Send + Sync {
    /// Produce raw spans for `text`. Offsets are character-based.
    fn extract(&self, text: &str) -> Result<Vec<EntitySpan>>;

    /// Identifier for logs and display.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// An extractor that returns pre-seeded spans.
///
/// The test workhorse, and the way recorded model output (for example a
/// pipeline's JSON dump) is replayed through the full analysis.
///
/// # Example
///
/// ```rust
/// use rozmitka::{Analyzer, EntitySpan, MockExtractor};
///
/// let extractor = MockExtractor::new("recorded")
///     .with_spans(vec![EntitySpan::new("LABEL_5", 10, 15, 0.97, "Києві")]);
/// let review = Analyzer::new(extractor).analyze("Зустріч у Києві").unwrap();
/// assert_eq!(review.spans.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    name: String,
    spans: Vec<EntitySpan>,
}

impl MockExtractor {
    /// Create a named mock with no spans.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spans: Vec::new(),
        }
    }

    /// Set the spans to return on extraction.
    #[must_use]
    pub fn with_spans(mut self, spans: Vec<EntitySpan>) -> Self {
        self.spans = spans;
        self
    }
}

impl Extractor for MockExtractor {
    fn extract(&self, _text: &str) -> Result<Vec<EntitySpan>> {
        Ok(self.spans.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// =============================================================================
// Analyzer
// =============================================================================

/// Drives the analysis pipeline over an injected extractor.
pub struct Analyzer {
    extractor: Box<dyn Extractor>,
    config: LabelConfig,
    tag_policy: TagPolicy,
    overlap_policy: OverlapPolicy,
}

impl Analyzer {
    /// Create an analyzer with default config and policies.
    #[must_use]
    pub fn new(extractor: impl Extractor + 'static) -> Self {
        Self {
            extractor: Box::new(extractor),
            config: LabelConfig::default(),
            tag_policy: TagPolicy::default(),
            overlap_policy: OverlapPolicy::default(),
        }
    }

    /// Replace the label configuration.
    #[must_use]
    pub fn with_config(mut self, config: LabelConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the tag policy.
    #[must_use]
    pub fn with_tag_policy(mut self, policy: TagPolicy) -> Self {
        self.tag_policy = policy;
        self
    }

    /// Replace the overlap policy.
    #[must_use]
    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    /// The label configuration in use.
    #[must_use]
    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Run the full pipeline over `text`.
    ///
    /// Empty text, or text where nothing survives filtering, yields an empty
    /// review, not an error. Errors come from the extractor itself or from a
    /// label lookup the configuration cannot satisfy.
    pub fn analyze(&self, text: &str) -> Result<Review> {
        let raw = self.extractor.extract(text)?;
        debug!(
            "extractor '{}' returned {} raw spans",
            self.extractor.name(),
            raw.len()
        );

        let filtered = filter_spans(text, &raw, &self.config);
        let spans = resolve_overlaps(filtered, self.overlap_policy);
        let tokens = reconcile(text, &spans, &self.config, self.tag_policy)?;
        let summary = summarize(text, &spans, &self.config);

        Ok(Review {
            text: text.to_string(),
            spans,
            tokens,
            summary,
            config: self.config.clone(),
        })
    }
}

// =============================================================================
// Review
// =============================================================================

/// The result of one analysis: input text, accepted spans, labeled tokens,
/// and the category summary, with renderers for each view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// The analyzed text.
    pub text: String,
    /// Accepted spans, non-overlapping, sorted by start offset.
    pub spans: Vec<EntitySpan>,
    /// Per-token BIO labeling.
    pub tokens: Vec<LabeledToken>,
    /// Per-category deduplicated surface forms.
    pub summary: Summary,
    config: LabelConfig,
}

impl Review {
    /// True when no span survived filtering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The inline-highlighted rendition of the text.
    #[must_use]
    pub fn highlighted_html(&self) -> String {
        highlight::highlight(&self.text, &self.spans, &self.config)
    }

    /// BIO diagnostics for the token labeling. Empty under the default tag
    /// policy; the verbatim policy can surface dangling-`I` runs here.
    #[must_use]
    pub fn validation(&self) -> Vec<String> {
        let tags: Vec<_> = self.tokens.iter().map(|t| t.tag).collect();
        validate(&tags)
    }

    /// The labeled tokens as CSV (`word,label`).
    pub fn to_csv(&self) -> Result<String> {
        export::to_csv_string(&self.tokens)
    }

    /// The whole review as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// A self-contained HTML review page: highlighted text, category legend,
    /// summary, and the token table. No external assets.
    ///
    /// The highlighted block is embedded raw, preserving the byte-for-byte
    /// contract; token table cells are escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::new();

        html.push_str(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>rozmitka review</title>
<style>
*{box-sizing:border-box;margin:0;padding:0}
body{font:14px/1.5 monospace;background:#fafafa;color:#222;padding:16px;max-width:960px;margin:0 auto}
h1,h2{font-weight:normal;border-bottom:1px solid #ddd;padding:4px 0;margin:16px 0 8px}
h1{font-size:16px}h2{font-size:13px;color:#555}
table{width:100%;border-collapse:collapse;font-size:12px;margin:4px 0}
th,td{padding:4px 8px;text-align:left;border:1px solid #ddd}
th{background:#f0f0f0;color:#666;font-weight:normal;text-transform:uppercase;font-size:10px}
.stats{display:flex;gap:16px;padding:8px 0;border-bottom:1px solid #ddd;margin-bottom:8px}
.stat{text-align:center}.stat-v{font-size:18px}.stat-l{font-size:9px;color:#888;text-transform:uppercase}
.text-box{background:#fff;border:1px solid #ddd;padding:12px;white-space:pre-wrap;word-break:break-word;line-height:1.9}
.badge{display:inline-block;padding:2px 6px;border-radius:4px;font-size:11px;margin-right:6px}
.label{color:#555}
</style>
</head>
<body>
"#,
        );

        html.push_str(&format!(
            "<h1>ner review: {} chars, {} tokens</h1>\n",
            self.text.chars().count(),
            self.tokens.len()
        ));

        html.push_str(r#"<div class="stats">"#);
        html.push_str(&format!(
            r#"<div class="stat"><div class="stat-v">{}</div><div class="stat-l">entities</div></div>"#,
            self.spans.len()
        ));
        for category in Category::ALL {
            let count = self
                .spans
                .iter()
                .filter(|s| self.config.category_of(&s.label) == Some(category))
                .count();
            html.push_str(&format!(
                r#"<div class="stat"><div class="stat-v">{}</div><div class="stat-l">{}</div></div>"#,
                count,
                category.as_label()
            ));
        }
        html.push_str("</div>\n");

        html.push_str("<div>");
        for category in Category::ALL {
            html.push_str(&format!(
                r#"<span class="badge" style="background-color:{}">{} = {}</span>"#,
                category.color(),
                category.as_label(),
                category.name()
            ));
        }
        html.push_str("</div>\n");

        html.push_str("<h2>highlighted text</h2>\n");
        html.push_str(r#"<div class="text-box">"#);
        html.push_str(&self.highlighted_html());
        html.push_str("</div>\n");

        html.push_str("<h2>structured output</h2>\n<table>");
        for (category, forms) in self.summary.iter() {
            let joined = if forms.is_empty() {
                crate::summary::EMPTY_GROUP.to_string()
            } else {
                forms.join(", ")
            };
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                category.as_label(),
                html_escape(&joined)
            ));
        }
        html.push_str("</table>\n");

        html.push_str("<h2>labeled tokens</h2>\n<table>");
        html.push_str("<tr><th>word</th><th>label</th></tr>");
        for token in &self.tokens {
            html.push_str(&format!(
                r#"<tr><td>{}</td><td class="label">{}</td></tr>"#,
                html_escape(&token.text),
                token.tag.label()
            ));
        }
        html.push_str("</table>\n");

        let issues = self.validation();
        if !issues.is_empty() {
            html.push_str("<h2>bio issues</h2>\n<table>");
            for issue in &issues {
                html.push_str(&format!("<tr><td>{}</td></tr>", html_escape(issue)));
            }
            html.push_str("</table>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
