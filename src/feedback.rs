//! Feedback collection and quality-metric aggregation.
//!
//! Two submission paths share one append-only log: inline per-word feedback
//! stays local, session feedback is pushed to the backend once and retained
//! locally when that push fails. Every accepted session submission folds
//! into the rolling quality metrics. All state sits behind one async mutex,
//! so the read-fold-write on metrics is single-writer by construction.

use std::collections::VecDeque;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

use crate::api::{ApiClient, FeedbackBody};
use crate::error::HubError;
use crate::ui::{Severity, UiSink};

/// Bound on the quality series; oldest point evicted first.
pub const SERIES_CAPACITY: usize = 10;

/// Rating folded into the average when a session carries comments only.
const UNRATED_METRIC_DEFAULT: u8 = 4;
/// Rating sent on the wire when unset (the backend requires one).
const UNRATED_WIRE_DEFAULT: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningRateTier {
    Low,
    Medium,
    High,
}

impl LearningRateTier {
    /// Fixed three-way mapping; there are no other coefficients.
    pub fn coefficient(self) -> f64 {
        match self {
            Self::Low => 0.0001,
            Self::Medium => 0.001,
            Self::High => 0.01,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for LearningRateTier {
    type Err = HubError;

    /// Unknown tiers are rejected rather than defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(HubError::UnknownTier(other.to_string())),
        }
    }
}

/// Whether a session entry reached the backend or was kept local-only
/// after a failed single-attempt submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Remote,
    LocalOnly,
}

#[derive(Debug, Clone)]
pub enum FeedbackEntry {
    Inline {
        word: String,
        comment: String,
        timestamp: SystemTime,
    },
    Session {
        rating: Option<u8>,
        comments: String,
        learning_rate: f64,
        session_id: String,
        timestamp: SystemTime,
        delivery: Delivery,
    },
}

impl FeedbackEntry {
    pub fn timestamp(&self) -> SystemTime {
        match self {
            Self::Inline { timestamp, .. } | Self::Session { timestamp, .. } => *timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricPoint {
    pub session_index: u64,
    pub quality: f64,
}

/// Rolling quality metrics: running average, session count, a bounded
/// series of recent points, and a rating histogram.
#[derive(Debug, Clone, Default)]
pub struct QualityMetrics {
    average: f64,
    session_count: u64,
    series: VecDeque<MetricPoint>,
    distribution: [u64; 5],
}

impl QualityMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with a demo history; the last value becomes the running average.
    /// Seeded points do not enter the rating histogram.
    pub fn with_seed_history(points: &[f64]) -> Self {
        let mut metrics = Self::default();
        for &quality in points {
            metrics.session_count += 1;
            metrics.average = quality;
            metrics.push_point(quality);
        }
        metrics
    }

    /// Fold one session rating into the running state:
    /// `new_avg = (avg * count + rating_or_default) / (count + 1)`.
    pub fn record(&mut self, rating: Option<u8>) {
        let effective = f64::from(rating.unwrap_or(UNRATED_METRIC_DEFAULT));
        let prior = self.session_count as f64;
        self.average = (self.average * prior + effective) / (prior + 1.0);
        self.session_count += 1;
        self.push_point(self.average);

        let bucket = rating.unwrap_or(UNRATED_WIRE_DEFAULT);
        if (1..=5).contains(&bucket) {
            self.distribution[usize::from(bucket) - 1] += 1;
        }
    }

    fn push_point(&mut self, quality: f64) {
        if self.series.len() == SERIES_CAPACITY {
            self.series.pop_front();
        }
        self.series.push_back(MetricPoint {
            session_index: self.session_count,
            quality,
        });
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn session_count(&self) -> u64 {
        self.session_count
    }

    /// Most recent points, oldest first. Never more than [`SERIES_CAPACITY`].
    pub fn series(&self) -> impl Iterator<Item = &MetricPoint> {
        self.series.iter()
    }

    pub fn series_len(&self) -> usize {
        self.series.len()
    }

    /// Counts per rating bucket, index 0 = rating 1.
    pub fn distribution(&self) -> [u64; 5] {
        self.distribution
    }

    /// First-to-last quality delta across the current series, as a percent.
    /// None with fewer than two points or a zero baseline.
    pub fn improvement_rate(&self) -> Option<f64> {
        let first = self.series.front()?.quality;
        let last = self.series.back()?.quality;
        if self.series.len() < 2 || first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }
}

struct AggregatorState {
    log: Vec<FeedbackEntry>,
    session_id: Option<String>,
    metrics: QualityMetrics,
    last_timestamp: SystemTime,
}

impl AggregatorState {
    /// Clock reads clamped so log order implies non-decreasing timestamps.
    fn next_timestamp(&mut self) -> SystemTime {
        let now = SystemTime::now().max(self.last_timestamp);
        self.last_timestamp = now;
        now
    }

    fn session_id(&mut self) -> String {
        if let Some(id) = &self.session_id {
            return id.clone();
        }
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let id = format!("session_{millis}");
        self.session_id = Some(id.clone());
        id
    }
}

pub struct FeedbackAggregator {
    api: ApiClient,
    state: Mutex<AggregatorState>,
}

impl FeedbackAggregator {
    pub fn new(api: ApiClient) -> Self {
        Self::with_metrics(api, QualityMetrics::new())
    }

    pub fn with_metrics(api: ApiClient, metrics: QualityMetrics) -> Self {
        Self {
            api,
            state: Mutex::new(AggregatorState {
                log: Vec::new(),
                session_id: None,
                metrics,
                last_timestamp: UNIX_EPOCH,
            }),
        }
    }

    /// Append one per-word note to the local log. No remote call.
    pub async fn add_inline_feedback(&self, word: &str, comment: &str) -> Result<(), HubError> {
        let word = word.trim();
        let comment = comment.trim();
        if word.is_empty() || comment.is_empty() {
            return Err(HubError::InvalidFeedback(
                "inline feedback needs a word and a comment".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        let timestamp = state.next_timestamp();
        state.log.push(FeedbackEntry::Inline {
            word: word.to_string(),
            comment: comment.to_string(),
            timestamp,
        });
        tracing::debug!("inline feedback recorded for {word:?}");
        Ok(())
    }

    /// Submit form-level feedback: one remote attempt, degrading to
    /// local-only retention on any failure, then fold into the metrics.
    ///
    /// Rejected (no state change) when rating is unset and comments are
    /// blank. Holding the state lock across the remote call serializes
    /// submissions, which keeps the metric recompute race-free.
    pub async fn submit_session_feedback(
        &self,
        rating: Option<u8>,
        comments: &str,
        tier: LearningRateTier,
        sink: &dyn UiSink,
    ) -> Result<Delivery, HubError> {
        if rating.is_none() && comments.trim().is_empty() {
            sink.notify("Please provide rating or comments", Severity::Warning);
            return Err(HubError::InvalidFeedback(
                "please provide rating or comments".to_string(),
            ));
        }
        if let Some(r) = rating
            && !(1..=5).contains(&r)
        {
            return Err(HubError::InvalidFeedback(format!(
                "rating must be 1-5, got {r}"
            )));
        }

        let mut state = self.state.lock().await;
        let session_id = state.session_id();

        let body = FeedbackBody {
            rating: rating.unwrap_or(UNRATED_WIRE_DEFAULT),
            comments,
            learning_rate: tier.coefficient(),
            session_id: &session_id,
        };

        let delivery = match self.api.submit_feedback(&body).await {
            Ok(payload) => {
                tracing::debug!("feedback accepted by backend: {payload}");
                sink.notify("Feedback submitted successfully!", Severity::Success);
                Delivery::Remote
            }
            Err(e) => {
                // Single attempt, no retry: keep the entry locally and move on.
                tracing::warn!("feedback submission failed, keeping local: {e}");
                sink.notify("Failed to submit feedback. Saving locally...", Severity::Warning);
                Delivery::LocalOnly
            }
        };

        let timestamp = state.next_timestamp();
        state.log.push(FeedbackEntry::Session {
            rating,
            comments: comments.to_string(),
            learning_rate: tier.coefficient(),
            session_id,
            timestamp,
            delivery,
        });
        state.metrics.record(rating);

        Ok(delivery)
    }

    /// Snapshot of the current metrics.
    pub async fn metrics(&self) -> QualityMetrics {
        self.state.lock().await.metrics.clone()
    }

    /// Snapshot of the append-only log, in insertion order.
    pub async fn entries(&self) -> Vec<FeedbackEntry> {
        self.state.lock().await.log.clone()
    }

    pub async fn log_len(&self) -> usize {
        self.state.lock().await.log.len()
    }
}
