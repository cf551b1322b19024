//! Integration tests for `YoutubeClient` using wiremock HTTP mocks.

use chanscout_youtube::{YoutubeClient, YoutubeError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> YoutubeClient {
    YoutubeClient::with_base_url("test-key", 30, 2, 0, base_url)
        .expect("client construction should not fail")
}

fn error_body(code: u16, reason: &str) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "code": code,
            "message": format!("{reason} message"),
            "errors": [{ "domain": "youtube", "reason": reason, "message": "x" }]
        }
    })
}

#[tokio::test]
async fn search_channels_sends_query_and_returns_ids() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("key", "test-key"))
        .and(query_param("type", "channel"))
        .and(query_param("q", "rust programming"))
        .and(query_param("order", "viewCount"))
        .and(query_param("maxResults", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nextPageToken": "PAGE2",
            "items": [
                { "id": { "kind": "youtube#channel", "channelId": "UCaaa" } },
                { "id": { "kind": "youtube#channel", "channelId": "UCbbb" } }
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .search_channels("rust programming", "viewCount", 50, None)
        .await
        .expect("search should succeed");

    assert_eq!(page.channel_ids(), vec!["UCaaa", "UCbbb"]);
    assert_eq!(page.next_page_token.as_deref(), Some("PAGE2"));
}

#[tokio::test]
async fn search_channels_forwards_page_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("pageToken", "PAGE2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .search_channels("rust", "date", 25, Some("PAGE2"))
        .await
        .expect("search should succeed");

    assert!(page.channel_ids().is_empty());
    assert!(page.next_page_token.is_none());
}

#[tokio::test]
async fn list_channels_parses_channel_details() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("id", "UCaaa,UCbbb"))
        .and(query_param("part", "snippet,statistics,contentDetails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{
                "id": "UCaaa",
                "snippet": {
                    "title": "Alpha",
                    "description": "Follow me https://twitter.com/alpha",
                    "customUrl": "@alpha",
                    "thumbnails": { "medium": { "url": "https://yt3.example/m.jpg" } }
                },
                "statistics": { "subscriberCount": "4500", "hiddenSubscriberCount": false },
                "contentDetails": { "relatedPlaylists": { "uploads": "UUaaa" } }
            }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ids = vec!["UCaaa".to_string(), "UCbbb".to_string()];
    let channels = client.list_channels(&ids).await.expect("should parse");

    assert_eq!(channels.len(), 1, "unknown ids are simply absent");
    assert_eq!(channels[0].id, "UCaaa");
    assert_eq!(channels[0].subscriber_count(), Some(4500));
    assert_eq!(channels[0].uploads_playlist_id(), Some("UUaaa"));
}

#[tokio::test]
async fn list_channels_with_no_ids_skips_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let channels = client.list_channels(&[]).await.expect("empty is fine");
    assert!(channels.is_empty());
}

#[tokio::test]
async fn quota_exceeded_is_reported_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403).set_body_json(error_body(403, "quotaExceeded")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .search_channels("rust", "relevance", 50, None)
        .await
        .expect_err("quota should fail");

    assert!(matches!(err, YoutubeError::QuotaExceeded(_)));
}

#[tokio::test]
async fn server_errors_are_retried_until_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(503).set_body_json(error_body(503, "backendError")))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .list_video_statistics(&["v1".to_string()])
        .await
        .expect_err("should give up");

    assert!(matches!(err, YoutubeError::Api { status: 503, .. }));
}

#[tokio::test]
async fn missing_playlist_surfaces_as_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "UUgone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_body(404, "playlistNotFound")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .list_playlist_items("UUgone", 10)
        .await
        .expect_err("404 should fail");

    assert!(err.is_not_found());
}

#[tokio::test]
async fn playlist_items_and_video_stats_parse() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("maxResults", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                { "contentDetails": { "videoId": "v1", "videoPublishedAt": "2026-10-01T12:00:00Z" } },
                { "contentDetails": { "videoId": "v2" } }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v1,v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                { "id": "v1", "statistics": { "viewCount": "100", "likeCount": "7", "commentCount": "2" } },
                { "id": "v2", "statistics": { "viewCount": "300" } }
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let items = client
        .list_playlist_items("UUaaa", 10)
        .await
        .expect("items should parse");
    assert_eq!(items.len(), 2);
    assert!(items[0].content_details.video_published_at.is_some());
    assert!(items[1].content_details.video_published_at.is_none());

    let ids: Vec<String> = items
        .iter()
        .map(|i| i.content_details.video_id.clone())
        .collect();
    let videos = client
        .list_video_statistics(&ids)
        .await
        .expect("stats should parse");
    let stats = videos[1].statistics.as_ref().expect("statistics present");
    assert_eq!(stats.views(), 300);
    assert_eq!(stats.likes(), 0);
}

#[tokio::test]
async fn malformed_body_reports_endpoint_not_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .list_channels(&["UCaaa".to_string()])
        .await
        .expect_err("garbage should fail");

    let rendered = err.to_string();
    assert!(rendered.contains("channels"));
    assert!(!rendered.contains("test-key"), "API key leaked: {rendered}");
}
