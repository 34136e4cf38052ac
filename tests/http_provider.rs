// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP gateway provider using wiremock.

#![cfg(feature = "http")]

use std::sync::Arc;
use std::time::Duration;

use officehub_lib::model::{PlayState, Severity, Track};
use officehub_lib::provider::{HttpProvider, HttpProviderBuilder, MusicSource, SnapshotProvider};
use officehub_lib::{Error, FetchError, HubConfig, OfficeHub, RejectReason};
use wiremock::matchers::{basic_auth, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn snapshot_body() -> serde_json::Value {
    serde_json::json!({
        "music": {
            "playState": "playing",
            "currentTrack": {
                "title": "Teardrop",
                "artist": "Massive Attack",
                "album": "Mezzanine",
                "albumArtRef": "art/mezzanine.jpg"
            }
        },
        "rooms": [{
            "name": "Studio",
            "lights": [{
                "id": "1-1",
                "name": "Desk lamp",
                "state": { "reachable": true, "on": false, "brightness": 80 }
            }]
        }],
        "gates": [{ "name": "Front" }],
        "alert": {
            "severity": "warning",
            "title": "Printer",
            "description": "Toner is running low",
            "link": "https://intranet.local/printer"
        }
    })
}

fn track(title: &str) -> Track {
    Track::new(title, "Portishead", "Dummy", "art/dummy.jpg")
}

fn provider_for(server: &MockServer) -> HttpProvider {
    HttpProviderBuilder::new()
        .host(server.uri().replace("http://", ""))
        .build()
        .unwrap()
}

// ============================================================================
// Snapshot polling
// ============================================================================

mod snapshot {
    use super::*;

    #[tokio::test]
    async fn fetch_decodes_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snapshot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body()))
            .expect(1)
            .mount(&server)
            .await;

        let snapshot = provider_for(&server).fetch().await.unwrap();

        assert_eq!(snapshot.music.play_state, PlayState::Playing);
        assert_eq!(snapshot.music.current_track.title, "Teardrop");
        let lamp = snapshot.light("Studio", "1-1").unwrap();
        assert_eq!(lamp.state.brightness.value(), 80);
        let gate = snapshot.gate("Front").unwrap();
        assert!(!gate.is_open());
        let alert = snapshot.alert.unwrap();
        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.link.as_deref(), Some("https://intranet.local/printer"));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snapshot"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = provider_for(&server).fetch().await;

        assert!(matches!(result, Err(FetchError::Status(503))));
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snapshot"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = provider_for(&server).fetch().await;

        assert!(matches!(result, Err(FetchError::InvalidPayload(_))));
    }

    #[tokio::test]
    async fn out_of_range_brightness_is_invalid_payload() {
        let server = MockServer::start().await;
        let mut body = snapshot_body();
        body["rooms"][0]["lights"][0]["state"]["brightness"] = serde_json::json!(140);
        Mock::given(method("GET"))
            .and(path("/snapshot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let result = provider_for(&server).fetch().await;

        assert!(matches!(result, Err(FetchError::InvalidPayload(_))));
    }

    #[tokio::test]
    async fn slow_gateway_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snapshot"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(snapshot_body())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let provider = HttpProviderBuilder::new()
            .host(server.uri())
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        let result = provider.fetch().await;

        assert!(matches!(result, Err(FetchError::Timeout(200))));
    }

    #[tokio::test]
    async fn credentials_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snapshot"))
            .and(basic_auth("admin", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = HttpProviderBuilder::new()
            .host(server.uri())
            .credentials("admin", "secret")
            .build()
            .unwrap();

        assert!(provider.fetch().await.is_ok());
    }
}

// ============================================================================
// Music source
// ============================================================================

mod music {
    use super::*;

    #[tokio::test]
    async fn next_track_posts_current_track() {
        let server = MockServer::start().await;
        let current = track("Glory Box");
        let next = track("Roads");
        Mock::given(method("POST"))
            .and(path("/music/next"))
            .and(body_json(&current))
            .respond_with(ResponseTemplate::new(200).set_body_json(&next))
            .expect(1)
            .mount(&server)
            .await;

        let result = provider_for(&server).next_track(&current).await;

        assert_eq!(result.unwrap(), next);
    }

    #[tokio::test]
    async fn prev_track_uses_prev_endpoint() {
        let server = MockServer::start().await;
        let previous = track("Mysterons");
        Mock::given(method("POST"))
            .and(path("/music/prev"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&previous))
            .expect(1)
            .mount(&server)
            .await;

        let result = provider_for(&server)
            .prev_track(&track("Glory Box"))
            .await;

        assert_eq!(result.unwrap(), previous);
    }
}

// ============================================================================
// Hub over HTTP
// ============================================================================

mod hub {
    use super::*;

    #[tokio::test]
    async fn connect_and_change_track() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snapshot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/music/next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(track("Roads")))
            .mount(&server)
            .await;

        let gateway = Arc::new(provider_for(&server));
        let hub = OfficeHub::connect(
            HubConfig::default().without_auto_refresh(),
            Arc::clone(&gateway),
            gateway,
        )
        .await
        .unwrap();

        hub.commands().next_track().await.unwrap();
        assert_eq!(hub.snapshot().music.current_track.title, "Roads");
        assert!(!hub.is_refreshing());
    }

    #[tokio::test]
    async fn music_endpoint_failure_rejects_command() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snapshot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/music/next"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let gateway = Arc::new(provider_for(&server));
        let hub = OfficeHub::connect(
            HubConfig::default().without_auto_refresh(),
            Arc::clone(&gateway),
            gateway,
        )
        .await
        .unwrap();

        let err = hub.commands().next_track().await.unwrap_err();
        assert_eq!(err.reason, RejectReason::SourceUnavailable);
        assert_eq!(hub.snapshot().music.current_track.title, "Teardrop");
    }

    #[tokio::test]
    async fn connect_fails_on_gateway_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snapshot"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let gateway = Arc::new(provider_for(&server));
        let result = OfficeHub::connect(HubConfig::default(), Arc::clone(&gateway), gateway).await;

        assert!(matches!(result, Err(Error::Fetch(FetchError::Status(500)))));
    }
}
