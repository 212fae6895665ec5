//! Canonical domain types shared by baskets, the aggregator, and the task manager.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use research_types::BasketId;
use serde::{Deserialize, Serialize};

/// A company identifier: an uppercased ticker plus an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Uppercased short identifier, e.g. `"AAPL"` or `"BRK.B"`.
    pub symbol: String,
    /// Human-readable company name, cleaned of corporate suffixes, if known.
    pub company_name: Option<String>,
}

impl Ticker {
    /// Build a ticker, uppercasing the symbol.
    #[must_use]
    pub fn new(symbol: impl Into<String>, company_name: Option<String>) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            company_name,
        }
    }
}

/// Reporting period a [`TemporalMetric`] is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DataType {
    /// Full fiscal year.
    #[serde(rename = "FY")]
    FiscalYear,
    /// Fiscal quarter.
    #[serde(rename = "Q")]
    Quarter,
    /// Trailing twelve months.
    #[serde(rename = "TTM")]
    TrailingTwelveMonths,
    /// A single point-in-time observation.
    #[serde(rename = "Point-in-time")]
    PointInTime,
    /// Daily series cadence.
    Daily,
    /// Monthly series cadence.
    Monthly,
    /// Quarterly series cadence.
    Quarterly,
    /// Trailing one-year window.
    #[serde(rename = "1Y")]
    OneYear,
    /// Trailing thirty-day window.
    #[serde(rename = "30D")]
    ThirtyDay,
    /// A forward-looking estimate.
    Forward,
}

/// A scalar value annotated with provenance: the fiscal period, filing form,
/// and observation/filing dates it was derived from.
///
/// Computed ratios inherit the provenance of the freshest numerator or
/// denominator that fed into them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalMetric {
    /// The scalar value, or `None` if unavailable.
    pub value: Option<f64>,
    /// The reporting period this value was drawn from.
    pub data_type: Option<DataType>,
    /// The period end date.
    pub end_date: Option<NaiveDate>,
    /// The date the underlying filing was submitted.
    pub filed: Option<NaiveDate>,
    /// The fiscal year the value belongs to.
    pub fiscal_year: Option<i32>,
    /// The filing form the value was sourced from (e.g. `"10-K"`).
    pub form: Option<String>,
}

impl TemporalMetric {
    /// A metric with no value and no provenance, used for minimal-fallback entries.
    #[must_use]
    pub fn null() -> Self {
        Self::default()
    }

    /// `true` if `end_date` is present and not in the future relative to `now`.
    #[must_use]
    pub fn end_date_is_valid(&self, now: NaiveDate) -> bool {
        self.end_date.is_none_or(|d| d <= now)
    }
}

/// A single news or sentiment item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Headline or title.
    pub title: String,
    /// Body text or summary.
    pub content: String,
    /// Source URL.
    pub url: String,
    /// Publication date.
    pub datetime: NaiveDate,
    /// Source name (e.g. `"Reuters"`, `"r/wallstreetbets"`).
    pub source: String,
    /// Originating subreddit, for Reddit-sourced items only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,
}

/// A value carried inside a [`SourceEnvelope`]'s `data` map: either a scalar
/// metric or a list of content items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// A scalar with provenance.
    Metric(TemporalMetric),
    /// A list of news/sentiment items.
    Items(Vec<ContentItem>),
}

/// One provider's contribution within a [`BasketResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEnvelope {
    /// Provider or fallback-tier name (e.g. `"SEC EDGAR"`, `"Minimal Fallback"`).
    pub source: String,
    /// Timestamp this entry was produced.
    pub as_of: DateTime<Utc>,
    /// Canonical metric/content data keyed by field name.
    pub data: HashMap<String, MetricValue>,
}

/// The shape of a [`BasketResult`]'s `group` discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BasketGroup {
    /// Multiple providers compared against one another (fundamentals, valuation).
    SourceComparison,
    /// A flat set of metrics from a single authoritative source (macro, volatility).
    RawMetrics,
    /// Content items with no scalar comparison (news, sentiment).
    ContentAnalysis,
}

/// A basket worker's per-category output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketResult {
    /// Shape discriminant for downstream consumers.
    pub group: BasketGroup,
    /// Ticker this result was produced for.
    pub ticker: String,
    /// Per-provider envelopes, keyed by source id. Never empty.
    pub sources: HashMap<String, SourceEnvelope>,
    /// The basket category this result belongs to.
    pub source: BasketId,
    /// Timestamp the basket finished producing this result.
    pub as_of: DateTime<Utc>,
}

impl BasketResult {
    /// `true` if every entry in `sources` is a minimal-fallback or
    /// historical-average entry (i.e. every provider failed).
    #[must_use]
    pub fn is_all_fallback(&self) -> bool {
        !self.sources.is_empty()
            && self.sources.values().all(|e| {
                e.source.starts_with("Minimal Fallback") || e.source.starts_with("Historical Average")
            })
    }
}

/// A streamed progress record emitted by the aggregator as it extracts
/// user-visible metrics from a basket's normalized result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricEvent {
    /// Basket category this metric came from.
    pub source: BasketId,
    /// Metric name, e.g. `"revenue"`.
    pub metric: String,
    /// The metric's value; may be a number, string (e.g. `"No recent news found"`), or null.
    pub value: serde_json::Value,
    /// Time the event was produced.
    pub timestamp: DateTime<Utc>,
    /// Period end date, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Fiscal year, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_year: Option<i32>,
    /// Filing form, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
}

/// A recorded disagreement between a basket's primary and secondary source
/// for the same metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Metric name the conflict was detected on.
    pub metric: String,
    /// Value reported by the basket's declared primary source.
    pub primary_value: f64,
    /// Value reported by the secondary source.
    pub secondary_value: f64,
    /// Which value the aggregator kept; always `"primary"` today.
    pub used: String,
}

/// Strengths/weaknesses/opportunities/threats, concatenated across baskets
/// that contribute a `swot_summary`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwotSummary {
    /// Strength statements.
    pub strengths: Vec<String>,
    /// Weakness statements.
    pub weaknesses: Vec<String>,
    /// Opportunity statements.
    pub opportunities: Vec<String>,
    /// Threat statements.
    pub threats: Vec<String>,
}

impl SwotSummary {
    /// Merge another basket's SWOT contribution into this one.
    pub fn extend(&mut self, other: &Self) {
        self.strengths.extend(other.strengths.iter().cloned());
        self.weaknesses.extend(other.weaknesses.iter().cloned());
        self.opportunities.extend(other.opportunities.iter().cloned());
        self.threats.extend(other.threats.iter().cloned());
    }
}

/// Completeness score over a declared set of required canonical metric paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// `100 * found / total`.
    pub pct: f64,
    /// Number of required fields whose canonical path resolved to a non-null value.
    pub found: u32,
    /// Total number of required fields evaluated.
    pub total: u32,
    /// Required fields whose canonical path resolved to null, keyed by basket.
    pub missing: HashMap<BasketId, Vec<String>>,
}

/// The aggregator's final artifact for a completed task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchArtifact {
    /// The ticker researched.
    pub ticker: String,
    /// Cleaned display name of the company.
    pub company_name: String,
    /// Baskets that produced at least one non-fallback source.
    pub sources_available: Vec<BasketId>,
    /// Baskets that exhausted their retry budget without a usable source.
    pub sources_failed: Vec<BasketId>,
    /// Normalized per-basket results.
    pub metrics: HashMap<BasketId, BasketResult>,
    /// Raw multi-provider comparisons, keyed `<basket_id>_all`.
    pub multi_source: HashMap<String, BasketResult>,
    /// Detected cross-source scalar conflicts.
    pub conflict_resolution: Vec<ConflictRecord>,
    /// SWOT statements concatenated across contributing baskets.
    pub aggregated_swot: SwotSummary,
    /// Completeness score over the declared required-field table.
    pub completeness: CompletenessReport,
    /// Time the artifact was assembled.
    pub generated_at: DateTime<Utc>,
}

/// Lifecycle state of a [`Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum TaskStatus {
    /// Accepted, not yet picked up by the aggregator.
    Submitted,
    /// The aggregator is actively running.
    Working,
    /// Terminal: the artifact was produced successfully.
    Completed,
    /// Terminal: an unhandled exception escaped the aggregator.
    Failed,
    /// Terminal: canceled by client request.
    Canceled,
}

impl TaskStatus {
    /// `true` for `Completed`, `Failed`, and `Canceled`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }
}

/// An artifact wrapper, matching the public `artifacts[0].data` shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// The research artifact payload.
    pub data: ResearchArtifact,
}

/// A research request's lifecycle record, owned exclusively by the task manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Current lifecycle state.
    pub status: TaskStatus,
    /// The original free-form submission text.
    pub message: String,
    /// Present once `status == Completed`.
    pub artifacts: Option<Vec<Artifact>>,
    /// Metric events accumulated so far; frozen once terminal.
    pub partial_metrics: Vec<MetricEvent>,
    /// Present once `status == Failed`.
    pub error: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a freshly submitted task.
    #[must_use]
    pub fn submitted(id: impl Into<String>, message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            status: TaskStatus::Submitted,
            message: message.into(),
            artifacts: None,
            partial_metrics: Vec::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
