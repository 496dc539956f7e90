//! Forecast client and pipeline against a mock HTTP server.

use std::time::Duration;

use forecast_core::{
    Config, ForecastError, ForecastErrorKind, ForecastPipeline, ForecastProvider, Phase,
    Projector, RefreshOutcome, TomorrowIoProvider,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn sample_forecast() -> serde_json::Value {
    serde_json::json!({
        "timelines": {
            "minutely": [
                { "time": "2024-01-15T12:00:00Z", "values": { "temperature": 1.5 } }
            ],
            "hourly": [
                { "time": "2024-01-15T12:00:00Z", "values": { "temperature": 1.5 } }
            ],
            "daily": [
                { "time": "2024-01-15T06:00:00-06:00", "values": { "temperatureAvg": 21.9, "temperatureMax": 25.0, "temperatureMin": 15.0 } },
                { "time": "2024-01-16T06:00:00-06:00", "values": { "temperatureAvg": -2.7 } },
                { "time": "2024-01-17T06:00:00-06:00", "values": {} },
                { "time": "2024-01-18T06:00:00-06:00", "values": { "temperatureAvg": 4.0 } },
                { "time": "not-a-date", "values": { "temperatureAvg": 5.5 } },
                { "time": "2024-01-20T06:00:00-06:00", "values": { "temperatureAvg": 6.0 } }
            ]
        },
        "location": { "lat": 38.52, "lon": -89.13, "name": "Centralia", "type": "administrative" }
    })
}

fn create_test_provider(mock_server: &MockServer, timeout_secs: u64) -> TomorrowIoProvider {
    let config = Config { base_url: mock_server.uri(), timeout_secs, ..Config::default() };
    TomorrowIoProvider::from_config("TEST_KEY".to_string(), &config)
        .expect("Failed to create provider")
}

async fn setup_forecast_mock(mock_server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/v4/weather/forecast"))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

// ============================================================================
// Success scenarios
// ============================================================================

#[tokio::test]
async fn fetch_sends_location_and_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/weather/forecast"))
        .and(query_param("location", "Saint Louis"))
        .and(query_param("apikey", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_forecast()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = create_test_provider(&mock_server, 5);
    let doc = provider.fetch_forecast("Saint Louis").await.expect("fetch should succeed");

    assert_eq!(doc.timelines.daily.len(), 6);
    assert_eq!(doc.timelines.minutely.len(), 1);
    assert_eq!(doc.location.name.as_deref(), Some("Centralia"));
}

#[tokio::test]
async fn pipeline_projects_first_five_days() {
    let mock_server = MockServer::start().await;
    setup_forecast_mock(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(sample_forecast()),
    )
    .await;

    let pipeline = ForecastPipeline::new(
        Box::new(create_test_provider(&mock_server, 5)),
        Projector::default(),
    );

    let outcome = pipeline.refresh("Centralia").await.expect("refresh should succeed");
    let RefreshOutcome::Applied(days) = outcome else {
        panic!("single refresh must be applied");
    };

    let labels: Vec<_> = days.iter().map(|d| d.day.as_str()).collect();
    assert_eq!(labels, ["Mon", "Tue", "Wed", "Thu", ""]);

    let avgs: Vec<_> = days.iter().map(|d| d.avg_temp).collect();
    assert_eq!(avgs, [21, -2, 0, 4, 5]);

    assert!(days.iter().all(|d| d.max_temp == 0 && d.min_temp == 0));
    assert_eq!(pipeline.snapshot().days, days);
}

// ============================================================================
// Error scenarios
// ============================================================================

#[tokio::test]
async fn server_error_is_transport_error() {
    let mock_server = MockServer::start().await;
    setup_forecast_mock(
        &mock_server,
        ResponseTemplate::new(503).set_body_string("upstream unavailable"),
    )
    .await;

    let err = create_test_provider(&mock_server, 5)
        .fetch_forecast("Centralia")
        .await
        .unwrap_err();

    assert!(matches!(err, ForecastError::Transport(_)), "got {err:?}");
    assert!(err.to_string().contains("503"));
    assert!(!err.to_string().contains("TEST_KEY"));
}

#[tokio::test]
async fn non_json_body_is_decode_error() {
    let mock_server = MockServer::start().await;
    setup_forecast_mock(&mock_server, ResponseTemplate::new(200).set_body_string("<html/>")).await;

    let err = create_test_provider(&mock_server, 5)
        .fetch_forecast("Centralia")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ForecastErrorKind::Decode);
}

#[tokio::test]
async fn empty_body_is_decode_error() {
    let mock_server = MockServer::start().await;
    setup_forecast_mock(&mock_server, ResponseTemplate::new(200)).await;

    let err = create_test_provider(&mock_server, 5)
        .fetch_forecast("Centralia")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ForecastErrorKind::Decode);
}

#[tokio::test]
async fn daily_entry_without_values_is_decode_error() {
    let mock_server = MockServer::start().await;
    setup_forecast_mock(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "timelines": { "daily": [ { "time": "2024-01-15T06:00:00-06:00" } ] },
            "location": {}
        })),
    )
    .await;

    let err = create_test_provider(&mock_server, 5)
        .fetch_forecast("Centralia")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ForecastErrorKind::Decode);
}

#[tokio::test]
async fn slow_response_times_out_as_transport_error() {
    let mock_server = MockServer::start().await;
    setup_forecast_mock(
        &mock_server,
        ResponseTemplate::new(200)
            .set_body_json(sample_forecast())
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let err = create_test_provider(&mock_server, 1)
        .fetch_forecast("Centralia")
        .await
        .unwrap_err();

    assert!(matches!(err, ForecastError::Transport(_)), "got {err:?}");
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let mock_server = MockServer::start().await;
    let provider = create_test_provider(&mock_server, 5);
    drop(mock_server);

    let err = provider.fetch_forecast("Centralia").await.unwrap_err();
    assert_eq!(err.kind(), ForecastErrorKind::Transport);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_view_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/weather/forecast"))
        .and(query_param("location", "Centralia"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_forecast()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/weather/forecast"))
        .and(query_param("location", "Nowhere"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ \"timelines\": 42 }"))
        .mount(&mock_server)
        .await;

    let pipeline = ForecastPipeline::new(
        Box::new(create_test_provider(&mock_server, 5)),
        Projector::default(),
    );

    pipeline.refresh("Centralia").await.expect("first refresh should succeed");
    let before = pipeline.snapshot();

    let err = pipeline.refresh("Nowhere").await.unwrap_err();
    assert_eq!(err.kind(), ForecastErrorKind::Decode);

    let after = pipeline.snapshot();
    assert_eq!(after.days, before.days);
    assert_eq!(after.days.len(), 5);
    assert_eq!(after.revision, before.revision);
    assert_eq!(after.phase, Phase::Idle);
    assert_eq!(after.last_error, Some(ForecastErrorKind::Decode));
}
