use std::time::Duration;

use progchart_types::ApiSettings;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::attempt::{Attempt, EventKind};
use crate::cache::{MemoryCache, ResponseCache};

const REPORT_START: i64 = 1_600_000_000_000;

fn settings(server: &MockServer) -> ApiSettings {
    ApiSettings {
        client_id: "id".into(),
        client_secret: "secret".into(),
        token: Some("test-token".into()),
        api_url: format!("{}/api", server.uri()),
        token_url: format!("{}/oauth/token", server.uri()),
        max_retries: 2,
        timeout_secs: 5,
    }
}

fn client(server: &MockServer) -> FflogsClient {
    FflogsClient::new(settings(server)).unwrap().with_retry_policy(RetryPolicy {
        max_retries: 2,
        base_delay: Duration::ZERO,
    })
}

fn fetcher(server: &MockServer, options: FetchOptions) -> ReportFetcher<MemoryCache> {
    ReportFetcher::new(client(server), MemoryCache::new(), options)
}

fn report(code: &str, start: i64, fights: Value) -> Value {
    json!({ "code": code, "startTime": start, "endTime": start + 3_600_000, "fights": fights })
}

fn reports_page(reports: Vec<Value>, has_more_pages: bool) -> Value {
    json!({ "data": { "reportData": { "reports": {
        "data": reports,
        "has_more_pages": has_more_pages
    } } } })
}

fn events_page(events: Value, next_page_timestamp: Option<f64>) -> Value {
    json!({ "data": { "reportData": { "report": { "events": {
        "data": events,
        "nextPageTimestamp": next_page_timestamp
    } } } } })
}

fn cast(timestamp: i64, ability: i64) -> Value {
    json!({ "timestamp": timestamp, "type": "cast", "abilityGameID": ability, "sourceID": 12 })
}

/// Trash pull, a wipe and a kill
fn standard_fights() -> Value {
    json!([
        {
            "id": 1, "encounterID": 0, "fightPercentage": null,
            "startTime": 0, "endTime": 30_000, "kill": null
        },
        {
            "id": 2, "encounterID": 1050, "fightPercentage": 61.2,
            "startTime": 40_000, "endTime": 200_000, "kill": false
        },
        {
            "id": 3, "encounterID": 1050, "fightPercentage": 0.0,
            "startTime": 300_000, "endTime": 900_000, "kill": true
        }
    ])
}

async fn mount_reports(server: &MockServer, reports: Vec<Value>) {
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_string_contains("query Reports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reports_page(reports, false)))
        .mount(server)
        .await;
}

async fn mount_events(server: &MockServer, fight_id: u32, events: Value) {
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_string_contains("query EnemyCasts"))
        .and(body_partial_json(json!({ "variables": { "fightId": fight_id } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_page(events, None)))
        .mount(server)
        .await;
}

async fn mount_standard_report(server: &MockServer) {
    mount_reports(server, vec![report("R1", REPORT_START, standard_fights())]).await;
    mount_events(server, 2, json!([cast(41_000, 18864), cast(90_000, 18480)])).await;
    mount_events(server, 3, json!([cast(301_000, 18864), cast(800_000, 18583)])).await;
}

fn ability_ids(attempt: &Attempt) -> Vec<i64> {
    attempt
        .events
        .iter()
        .filter(|e| e.kind == EventKind::Cast)
        .map(|e| e.ability_id)
        .collect()
}

#[tokio::test]
async fn token_is_requested_with_client_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("authorization", "Basic aWQ6c2VjcmV0"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 31_536_000,
            "access_token": "fresh-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings(&server);
    settings.token = None;
    let mut client = FflogsClient::new(settings).unwrap();

    let issued = client.ensure_token().await.unwrap();
    assert_eq!(issued.as_deref(), Some("fresh-token"));
    assert_eq!(client.token(), Some("fresh-token"));

    // Second call reuses the token
    assert_eq!(client.ensure_token().await.unwrap(), None);
}

#[tokio::test]
async fn token_request_without_credentials_fails() {
    let server = MockServer::start().await;
    let mut settings = settings(&server);
    settings.token = None;
    settings.client_secret.clear();

    let mut client = FflogsClient::new(settings).unwrap();
    let err = client.ensure_token().await.unwrap_err();
    assert!(matches!(err, FetchError::Token { .. }));
}

#[tokio::test]
async fn queries_send_bearer_token_and_variables() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({ "variables": { "zoneId": 887 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "worldData": { "zone": { "name": "The Epic of Alexander (Ultimate)" } } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, FetchOptions::default());
    let name = fetcher.zone_name(887).await.unwrap();
    assert_eq!(name.as_deref(), Some("The Epic of Alexander (Ultimate)"));
}

#[tokio::test]
async fn fetches_boss_pulls_and_skips_trash() {
    let server = MockServer::start().await;
    mount_standard_report(&server).await;

    let mut fetcher = fetcher(&server, FetchOptions::default());
    let attempts = fetcher.fetch_attempts(42, 887).await.unwrap();

    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].fight_id, 2);
    assert_eq!(attempts[1].fight_id, 3);

    let wipe = &attempts[0];
    assert!(!wipe.ended_in_kill);
    assert_eq!(wipe.start_time, REPORT_START + 40_000);
    assert_eq!(wipe.end_time, REPORT_START + 200_000);
    assert_eq!(ability_ids(wipe), vec![18864, 18480]);
    assert_eq!(wipe.events[0].timestamp, REPORT_START + 41_000);
    assert_eq!(wipe.events.last().map(|e| e.kind), Some(EventKind::Wipe));

    let kill = &attempts[1];
    assert!(kill.ended_in_kill);
    assert_eq!(kill.events.last().map(|e| e.kind), Some(EventKind::Kill));
    assert_eq!(kill.events.last().map(|e| e.timestamp), Some(kill.end_time));
}

#[tokio::test]
async fn report_listing_follows_pages_and_sorts_by_start() {
    let server = MockServer::start().await;
    let later = REPORT_START + 86_400_000;

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_string_contains("query Reports"))
        .and(body_partial_json(json!({ "variables": { "page": 1, "limit": 50 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reports_page(
            vec![report("LATE", later, json!([]))],
            true,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_string_contains("query Reports"))
        .and(body_partial_json(json!({ "variables": { "page": 2 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reports_page(
            vec![report("EARLY", REPORT_START, json!([]))],
            false,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, FetchOptions::default());
    let reports = fetcher.list_reports(42, 887).await.unwrap();
    let codes: Vec<&str> = reports.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["EARLY", "LATE"]);
}

#[tokio::test]
async fn event_pages_are_followed_until_exhausted() {
    let server = MockServer::start().await;
    let fights = json!([
        { "id": 5, "encounterID": 1050, "startTime": 1_000, "endTime": 500_000, "kill": false }
    ]);
    mount_reports(&server, vec![report("R1", REPORT_START, fights)]).await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_string_contains("query EnemyCasts"))
        .and(body_partial_json(json!({ "variables": { "startTime": 1000.0 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_page(
            json!([
                cast(2_000, 18864),
                { "timestamp": 2_500, "type": "begincast", "abilityGameID": 18480 }
            ]),
            Some(250_000.0),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_string_contains("query EnemyCasts"))
        .and(body_partial_json(json!({ "variables": { "startTime": 250000.0 } })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(events_page(json!([cast(260_000, 18516)]), None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut fetcher = fetcher(&server, FetchOptions::default());
    let attempts = fetcher.fetch_attempts(42, 887).await.unwrap();

    assert_eq!(attempts.len(), 1);
    // begincast entries are not casts
    assert_eq!(ability_ids(&attempts[0]), vec![18864, 18516]);
}

#[tokio::test]
async fn fetched_reports_are_cached_and_reused() {
    let server = MockServer::start().await;
    mount_standard_report(&server).await;

    let mut first = fetcher(&server, FetchOptions::default());
    let fetched = first.fetch_attempts(42, 887).await.unwrap();
    let cache = first.into_cache();
    assert!(cache.contains(&report_cache_key("R1")));
    assert_eq!(cache.commits(), 1);

    // Event endpoints must not be hit again
    server.reset().await;
    mount_reports(&server, vec![report("R1", REPORT_START, standard_fights())]).await;
    Mock::given(method("POST"))
        .and(body_string_contains("query EnemyCasts"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut second = ReportFetcher::new(client(&server), cache, FetchOptions::default());
    let cached = second.fetch_attempts(42, 887).await.unwrap();
    assert_eq!(cached, fetched);
}

#[tokio::test]
async fn refresh_ignores_cached_reports() {
    let server = MockServer::start().await;
    mount_standard_report(&server).await;

    let mut cache = MemoryCache::new();
    cache.set_as(&report_cache_key("R1"), &Vec::<Attempt>::new()).unwrap();

    let options = FetchOptions {
        refresh: true,
        ..Default::default()
    };
    let mut fetcher = ReportFetcher::new(client(&server), cache, options);
    let attempts = fetcher.fetch_attempts(42, 887).await.unwrap();

    assert_eq!(attempts.len(), 2);
    let cached: Vec<Attempt> = fetcher.cache().get_as(&report_cache_key("R1")).unwrap();
    assert_eq!(cached.len(), 2);
}

#[tokio::test]
async fn encounter_filter_drops_other_bosses() {
    let server = MockServer::start().await;
    let fights = json!([
        { "id": 1, "encounterID": 1050, "startTime": 0, "endTime": 10_000, "kill": false },
        { "id": 2, "encounterID": 1047, "startTime": 20_000, "endTime": 30_000, "kill": true }
    ]);
    mount_reports(&server, vec![report("R1", REPORT_START, fights)]).await;
    mount_events(&server, 1, json!([])).await;
    mount_events(&server, 2, json!([])).await;

    let options = FetchOptions {
        encounter_id: Some(1050),
        ..Default::default()
    };
    let mut fetcher = fetcher(&server, options);
    let attempts = fetcher.fetch_attempts(42, 887).await.unwrap();

    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].encounter_id, 1050);
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "worldData": { "zone": null } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, FetchOptions::default());
    assert_eq!(fetcher.zone_name(1).await.unwrap(), None);
}

#[tokio::test]
async fn persistent_failures_exhaust_retries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, FetchOptions::default());
    let err = fetcher.zone_name(887).await.unwrap_err();

    match err {
        FetchError::RetriesExhausted { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*source, FetchError::Status { status: 503, .. }));
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, FetchOptions::default());
    let err = fetcher.zone_name(887).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 401, .. }));
}

#[tokio::test]
async fn graphql_errors_surface_messages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "You do not have permission to view this report." }]
        })))
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, FetchOptions::default());
    let err = fetcher.zone_name(887).await.unwrap_err();
    match err {
        FetchError::GraphQl { messages } => {
            assert_eq!(
                messages,
                vec!["You do not have permission to view this report.".to_string()]
            );
        }
        other => panic!("expected GraphQl error, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_report_is_not_cached() {
    let server = MockServer::start().await;
    mount_reports(&server, vec![report("R1", REPORT_START, standard_fights())]).await;
    mount_events(&server, 2, json!([cast(41_000, 18864)])).await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_partial_json(json!({ "variables": { "fightId": 3 } })))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let mut fetcher = fetcher(&server, FetchOptions::default());
    assert!(fetcher.fetch_attempts(42, 887).await.is_err());

    let cache = fetcher.into_cache();
    assert!(!cache.contains(&report_cache_key("R1")));
    assert_eq!(cache.commits(), 0);
}
