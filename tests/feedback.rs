use std::time::Duration;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hfrl_hub::api::ApiClient;
use hfrl_hub::error::HubError;
use hfrl_hub::feedback::{
    Delivery, FeedbackAggregator, FeedbackEntry, LearningRateTier, QualityMetrics,
};
use hfrl_hub::ui::{RecordingSink, Severity};

fn aggregator(base_url: &str) -> FeedbackAggregator {
    FeedbackAggregator::new(ApiClient::new(base_url, Duration::from_secs(5)))
}

async fn feedback_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "fb-1"})))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn rejects_submission_with_no_rating_and_no_comments() {
    let server = feedback_server().await;
    let agg = aggregator(&server.uri());
    let sink = RecordingSink::new();

    let err = agg
        .submit_session_feedback(None, "   ", LearningRateTier::Medium, &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, HubError::InvalidFeedback(_)));
    assert_eq!(agg.log_len().await, 0);
    assert_eq!(agg.metrics().await.session_count(), 0);
    assert!(
        sink.notifications()
            .iter()
            .any(|(_, s)| *s == Severity::Warning),
        "rejection must surface a warning"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn rating_only_and_comments_only_both_succeed() {
    let server = feedback_server().await;
    let agg = aggregator(&server.uri());
    let sink = RecordingSink::new();

    let d1 = agg
        .submit_session_feedback(Some(5), "", LearningRateTier::Medium, &sink)
        .await
        .unwrap();
    let d2 = agg
        .submit_session_feedback(None, "good", LearningRateTier::Medium, &sink)
        .await
        .unwrap();

    assert_eq!(d1, Delivery::Remote);
    assert_eq!(d2, Delivery::Remote);
    assert_eq!(agg.log_len().await, 2);
    assert_eq!(agg.metrics().await.session_count(), 2);
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let server = feedback_server().await;
    let agg = aggregator(&server.uri());
    let sink = RecordingSink::new();

    let err = agg
        .submit_session_feedback(Some(6), "fine", LearningRateTier::Low, &sink)
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::InvalidFeedback(_)));
    assert_eq!(agg.log_len().await, 0);
}

#[tokio::test]
async fn wire_shape_matches_backend_contract() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .and(body_partial_json(serde_json::json!({
            "rating": 5,
            "comments": "sharp answer",
            "learning_rate": 0.01,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let agg = aggregator(&server.uri());
    let sink = RecordingSink::new();
    agg.submit_session_feedback(Some(5), "sharp answer", LearningRateTier::High, &sink)
        .await
        .unwrap();
}

#[tokio::test]
async fn unrated_submission_sends_default_rating_three() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .and(body_partial_json(serde_json::json!({"rating": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let agg = aggregator(&server.uri());
    let sink = RecordingSink::new();
    agg.submit_session_feedback(None, "comments only", LearningRateTier::Low, &sink)
        .await
        .unwrap();

    // Metrics fold uses 4 for unrated, independent of the wire default.
    assert!((agg.metrics().await.average() - 4.0).abs() < 1e-9);
}

#[tokio::test]
async fn session_id_is_generated_once_and_reused() {
    let server = feedback_server().await;
    let agg = aggregator(&server.uri());
    let sink = RecordingSink::new();

    agg.submit_session_feedback(Some(4), "", LearningRateTier::Medium, &sink)
        .await
        .unwrap();
    agg.submit_session_feedback(Some(2), "", LearningRateTier::Medium, &sink)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let ids: Vec<String> = requests
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["session_id"].as_str().unwrap().to_string()
        })
        .collect();
    assert!(ids[0].starts_with("session_"));
    assert_eq!(ids[0], ids[1]);
}

#[tokio::test]
async fn remote_failure_degrades_to_local_only_and_still_updates_metrics() {
    // Discard port: the transport itself fails.
    let agg = aggregator("http://127.0.0.1:9");
    let sink = RecordingSink::new();

    let delivery = agg
        .submit_session_feedback(Some(5), "kept locally", LearningRateTier::Medium, &sink)
        .await
        .unwrap();

    assert_eq!(delivery, Delivery::LocalOnly);
    assert_eq!(agg.metrics().await.session_count(), 1);
    assert!((agg.metrics().await.average() - 5.0).abs() < 1e-9);

    let entries = agg.entries().await;
    assert_eq!(entries.len(), 1);
    match &entries[0] {
        FeedbackEntry::Session { delivery, .. } => assert_eq!(*delivery, Delivery::LocalOnly),
        other => panic!("expected session entry, got {other:?}"),
    }
    assert!(
        sink.notifications()
            .iter()
            .any(|(m, s)| *s == Severity::Warning && m.contains("Saving locally")),
        "local degrade must surface a soft warning"
    );
}

#[tokio::test]
async fn backend_rejection_also_degrades_to_local_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let agg = aggregator(&server.uri());
    let sink = RecordingSink::new();
    let delivery = agg
        .submit_session_feedback(Some(3), "", LearningRateTier::Medium, &sink)
        .await
        .unwrap();
    assert_eq!(delivery, Delivery::LocalOnly);
    assert_eq!(agg.metrics().await.session_count(), 1);
}

#[tokio::test]
async fn inline_feedback_is_local_and_validated() {
    let server = feedback_server().await;
    let agg = aggregator(&server.uri());

    agg.add_inline_feedback("protagonist", "great word choice")
        .await
        .unwrap();
    assert!(agg
        .add_inline_feedback("", "no word given")
        .await
        .is_err());
    assert!(agg.add_inline_feedback("word", "  ").await.is_err());

    assert_eq!(agg.log_len().await, 1);
    // Inline feedback never goes on the wire.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn log_timestamps_are_monotone_non_decreasing() {
    let server = feedback_server().await;
    let agg = aggregator(&server.uri());
    let sink = RecordingSink::new();

    agg.add_inline_feedback("alpha", "first").await.unwrap();
    agg.submit_session_feedback(Some(4), "", LearningRateTier::Medium, &sink)
        .await
        .unwrap();
    agg.add_inline_feedback("omega", "last").await.unwrap();

    let entries = agg.entries().await;
    assert_eq!(entries.len(), 3);
    for pair in entries.windows(2) {
        assert!(pair[1].timestamp() >= pair[0].timestamp());
    }
}

#[tokio::test]
async fn series_holds_latest_ten_after_eleven_submissions() {
    let server = feedback_server().await;
    let agg = aggregator(&server.uri());
    let sink = RecordingSink::new();

    for _ in 0..11 {
        agg.submit_session_feedback(Some(4), "", LearningRateTier::Medium, &sink)
            .await
            .unwrap();
    }

    let metrics = agg.metrics().await;
    assert_eq!(metrics.session_count(), 11);
    assert_eq!(metrics.series_len(), 10);
    let indices: Vec<u64> = metrics.series().map(|p| p.session_index).collect();
    assert_eq!(indices, (2..=11).collect::<Vec<u64>>());
}

#[tokio::test]
async fn seeded_metrics_match_the_weighted_recompute() {
    let server = feedback_server().await;
    let agg = FeedbackAggregator::with_metrics(
        ApiClient::new(&server.uri(), Duration::from_secs(5)),
        QualityMetrics::with_seed_history(&[3.2, 3.4, 3.6, 3.8]),
    );
    let sink = RecordingSink::new();

    agg.submit_session_feedback(Some(5), "", LearningRateTier::Medium, &sink)
        .await
        .unwrap();

    let metrics = agg.metrics().await;
    assert_eq!(metrics.session_count(), 5);
    assert!((metrics.average() - 4.04).abs() < 1e-9);
}

#[tokio::test]
async fn concurrent_submissions_lose_no_updates() {
    let server = feedback_server().await;
    let agg = std::sync::Arc::new(aggregator(&server.uri()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let agg = std::sync::Arc::clone(&agg);
        handles.push(tokio::spawn(async move {
            let sink = RecordingSink::new();
            agg.submit_session_feedback(Some(4), "", LearningRateTier::Medium, &sink)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(agg.metrics().await.session_count(), 8);
    assert_eq!(agg.log_len().await, 8);
}
