use std::time::Duration;

use httpmock::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use battletrack_shared::{MatchStatus, Tournament, TournamentStatus, errors::UpstreamError};
use battletrack_upstream_api::{RetryPolicy, UpstreamClient};

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        block_floor: Duration::from_millis(10),
    }
}

fn client_for(server: &MockServer) -> UpstreamClient {
    UpstreamClient::new(server.base_url()).with_retry_policy(fast_retry())
}

fn active_tournament(id: i64) -> Tournament {
    Tournament {
        id,
        name: format!("Tournament {id}"),
        location_id: None,
        status: TournamentStatus::Active,
    }
}

/// Serves one canned HTTP response per accepted connection, then reports how
/// many connections it answered. Lets a test script a 500-500-200 sequence,
/// which a plain mock endpoint cannot express.
async fn serve_sequence(
    responses: Vec<(u16, &'static str)>,
) -> (String, tokio::task::JoinHandle<u32>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut served = 0u32;
        for (status, body) in responses {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let reason = match status {
                200 => "OK",
                403 => "Forbidden",
                429 => "Too Many Requests",
                _ => "Internal Server Error",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len(),
            );
            let _ = sock.write_all(response.as_bytes()).await;
            served += 1;
        }
        served
    });

    (base_url, handle)
}

#[tokio::test]
async fn two_failures_then_success_returns_result_in_three_attempts() {
    let (base_url, server) = serve_sequence(vec![
        (500, "{}"),
        (500, "{}"),
        (200, r##"[{"id": 1, "token": "Wembley", "color": "#008080"}]"##),
    ])
    .await;

    let client = UpstreamClient::new(base_url).with_retry_policy(fast_retry());
    let locations = client.get_locations().await.unwrap();

    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].name, "Wembley");
    assert_eq!(server.await.unwrap(), 3);
    assert_eq!(client.metrics.attempts(), 3);
    assert_eq!(client.metrics.retries(), 2);
}

#[tokio::test]
async fn exhausted_rate_limit_maps_to_rate_limited() {
    let (base_url, server) = serve_sequence(vec![(429, ""), (429, ""), (429, "")]).await;

    let client = UpstreamClient::new(base_url).with_retry_policy(fast_retry());
    let err = client.get_locations().await.unwrap_err();

    assert!(matches!(
        err,
        UpstreamError::RateLimited { attempts: 3, .. }
    ));
    assert!(err.is_block_signal());
    assert_eq!(server.await.unwrap(), 3);
}

#[tokio::test]
async fn exhausted_forbidden_maps_to_forbidden() {
    let (base_url, _server) = serve_sequence(vec![(403, ""), (403, ""), (403, "")]).await;

    let client = UpstreamClient::new(base_url).with_retry_policy(fast_retry());
    let err = client.get_locations().await.unwrap_err();

    assert!(matches!(err, UpstreamError::Forbidden { attempts: 3, .. }));
}

#[tokio::test]
async fn persistent_garbage_body_maps_to_schema_error() {
    let (base_url, server) = serve_sequence(vec![
        (200, "<html>maintenance</html>"),
        (200, "<html>maintenance</html>"),
        (200, "<html>maintenance</html>"),
    ])
    .await;

    let client = UpstreamClient::new(base_url).with_retry_policy(fast_retry());
    let err = client.get_locations().await.unwrap_err();

    assert!(matches!(err, UpstreamError::Schema { .. }));
    assert_eq!(server.await.unwrap(), 3);
}

#[tokio::test]
async fn not_found_fails_immediately_without_retry() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/locations");
            then.status(404);
        })
        .await;

    let client = client_for(&server);
    let err = client.get_locations().await.unwrap_err();

    assert!(matches!(err, UpstreamError::Unavailable { attempts: 1, .. }));
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn locations_are_cached_within_the_ttl() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/locations");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"[{"id": 1, "token": "Anfield"}]"#);
        })
        .await;

    let client = client_for(&server).with_location_ttl(Duration::from_millis(80));

    let first = client.get_locations().await.unwrap();
    let second = client.get_locations().await.unwrap();
    assert_eq!(first, second);
    mock.assert_hits_async(1).await;

    tokio::time::sleep(Duration::from_millis(120)).await;

    client.get_locations().await.unwrap();
    mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn tournament_pages_carry_the_page_count() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/tournaments").query_param("page", "1");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    r#"{
                        "totalPages": 2,
                        "tournaments": [
                            {"id": 10, "status_id": 2, "token_international": "Morning Cup"},
                            {"id": 11, "status_id": 3, "token": "closed"}
                        ]
                    }"#,
                );
        })
        .await;

    let client = client_for(&server);
    let page = client.get_tournaments_page(1).await.unwrap();

    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].name, "Morning Cup");
    assert!(page.items[0].status.is_active());
    assert!(!page.items[1].status.is_active());
}

#[tokio::test]
async fn empty_match_list_is_a_valid_result() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/tournaments/10/matches");
            then.status(200)
                .header("content-type", "application/json")
                .body("[]");
        })
        .await;

    let client = client_for(&server);
    let matches = client
        .get_tournament_matches(&active_tournament(10))
        .await
        .unwrap();

    assert!(matches.is_empty());
}

#[tokio::test]
async fn matches_are_tagged_and_cancelled_ones_dropped() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/tournaments/10/matches");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    r#"[
                        {
                            "id": 1906579,
                            "status_id": 2,
                            "date": "2025-08-06T18:20:00Z",
                            "participant1": {"nickname": "aguuero"},
                            "participant2": {"nickname": "Linox"},
                            "score1": 3,
                            "score2": 3
                        },
                        {
                            "id": 1906580,
                            "status_id": 4,
                            "participant1": {"nickname": "x"},
                            "participant2": {"nickname": "y"}
                        }
                    ]"#,
                );
        })
        .await;

    let client = client_for(&server);
    let matches = client
        .get_tournament_matches(&active_tournament(10))
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, 1906579);
    assert_eq!(matches[0].tournament_id, 10);
    assert_eq!(matches[0].status, MatchStatus::Live);
    assert!(matches[0].kickoff.is_some());
}
