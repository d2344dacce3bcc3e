//! Server router definition.
//!
//! The following routes are supported:
//!
//! - GET: `/health`
//! - POST: `/webhook`

use crate::{
    config::Config,
    report::{auth::BasicAuth, router::report_router},
    slack::{api::SlackClient, channel::ChannelRouting, message::MessageFormat},
};
use axum::{http::StatusCode, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::{self, TraceLayer};
use tracing::Level;

/// Dependencies shared by routes across requests. Everything in here is
/// read-only once the server is up.
#[derive(Clone)]
pub struct Deps {
    pub slack_client: Arc<SlackClient>,
    pub channels: Arc<ChannelRouting>,
    pub basic_auth: Option<Arc<BasicAuth>>,
    pub message_format: MessageFormat,
}

impl Deps {
    pub fn from_config(config: Config) -> reqwest::Result<Self> {
        let slack_client = SlackClient::new(
            &config.slack_api_base,
            config.slack_token,
            config.slack_timeout,
        )?;

        Ok(Deps {
            slack_client: Arc::new(slack_client),
            channels: Arc::new(config.channels),
            basic_auth: config.basic_auth.map(Arc::new),
            message_format: config.message_format,
        })
    }
}

/// Instantiate a new router with tracing.
pub fn new(deps: Deps) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
        .on_response(trace::DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .merge(report_router())
        .layer(trace_layer)
        // Exclude the health check route from tracing.
        .route("/health", get(|| async { StatusCode::OK }))
        .with_state(deps)
}


#[cfg(test)]
mod tests_webhook {
    use super::*;
    use crate::{
        report::payload::{tests::SAMPLE, ProjectId},
        slack::{
            auth::SlackAccessToken,
            channel::{ChannelId, ChannelMap},
        },
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use base64::{engine::general_purpose::STANDARD as b64, Engine};
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;
    use url::Url;

    fn router_with(
        base_slack_url: &str,
        basic_auth: Option<BasicAuth>,
        format: MessageFormat,
    ) -> Router {
        let client = SlackClient::new(
            &Url::parse(base_slack_url).unwrap(),
            SlackAccessToken("xoxb-test".to_owned()),
            Duration::from_secs(5),
        )
        .unwrap();

        let channels = ChannelRouting::new(
            ChannelMap::from([(ProjectId("proj-a".into()), ChannelId("C111".into()))]),
            ChannelId("C999".into()),
        );

        super::new(Deps {
            slack_client: Arc::new(client),
            channels: Arc::new(channels),
            basic_auth: basic_auth.map(Arc::new),
            message_format: format,
        })
    }

    fn router(base_slack_url: &str) -> Router {
        router_with(
            base_slack_url,
            Some(BasicAuth::new("reporter", "hunter2")),
            MessageFormat::Attachment,
        )
    }

    async fn server() -> mockito::ServerGuard {
        mockito::Server::new_async().await
    }

    /// A mock that fails the test if Slack is contacted at all.
    async fn no_slack_calls(srv: &mut mockito::ServerGuard) -> mockito::Mock {
        srv.mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await
    }

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", b64.encode(format!("{}:{}", user, pass)))
    }

    fn webhook<T: Into<Body>>(body: T) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(header::AUTHORIZATION, basic("reporter", "hunter2"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn plaintext_body(body: Body) -> String {
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_bad_method() {
        let mut srv = server().await;
        let mock = no_slack_calls(&mut srv).await;

        let req = Request::builder()
            .method("GET")
            .uri("/webhook")
            .header(header::AUTHORIZATION, basic("reporter", "hunter2"))
            .body(Body::empty())
            .unwrap();

        let res = router(&srv.url()).oneshot(req).await.unwrap();

        mock.assert_async().await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_missing_server_credentials() {
        let mut srv = server().await;
        let mock = no_slack_calls(&mut srv).await;

        let res = router_with(&srv.url(), None, MessageFormat::Attachment)
            .oneshot(webhook(SAMPLE))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(plaintext_body(res.into_body()).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_auth() {
        let mut srv = server().await;
        let mock = no_slack_calls(&mut srv).await;

        let req = Request::builder()
            .method("POST")
            .uri("/webhook")
            .body(Body::from(SAMPLE))
            .unwrap();

        let res = router(&srv.url()).oneshot(req).await.unwrap();

        mock.assert_async().await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            res.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            r#"Basic realm="Restricted""#
        );
    }

    #[tokio::test]
    async fn test_bad_auth() {
        let mut srv = server().await;
        let mock = no_slack_calls(&mut srv).await;

        for auth in [
            basic("reporter", "hunter3"),
            basic("someone", "hunter2"),
            "Bearer hunter2".to_owned(),
            "Basic not-base64!".to_owned(),
        ] {
            let req = Request::builder()
                .method("POST")
                .uri("/webhook")
                .header(header::AUTHORIZATION, auth)
                .body(Body::from(SAMPLE))
                .unwrap();

            let res = router(&srv.url()).oneshot(req).await.unwrap();

            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let mut srv = server().await;
        let mock = no_slack_calls(&mut srv).await;

        let res = router(&srv.url())
            .oneshot(webhook(r#"{"group_info": "#))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(plaintext_body(res.into_body())
            .await
            .starts_with("Error decoding JSON: EOF while parsing"));
    }

    #[tokio::test]
    async fn test_success() {
        let mut srv = server().await;
        let mock = srv
            .mock("POST", "/chat.postMessage")
            .match_header("authorization", "Bearer xoxb-test")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({ "channel": "C111" })),
                Matcher::Regex(r#""title":"\[Alert\] New error reported in service: api""#.into()),
            ]))
            .with_body(r#"{"ok": true, "channel": "C111", "ts": "1.2"}"#)
            .expect(1)
            .create_async()
            .await;

        let res = router(&srv.url()).oneshot(webhook(SAMPLE)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(plaintext_body(res.into_body()).await.is_empty());
    }

    #[tokio::test]
    async fn test_success_with_blocks() {
        let mut srv = server().await;
        let mock = srv
            .mock("POST", "/chat.postMessage")
            .match_body(Matcher::PartialJson(json!({
                "channel": "C111",
                "text": "[Alert] New error reported in service: api: Connection pool exhausted"
            })))
            .with_body(r#"{"ok": true}"#)
            .expect(1)
            .create_async()
            .await;

        let res = router_with(
            &srv.url(),
            Some(BasicAuth::new("reporter", "hunter2")),
            MessageFormat::Blocks,
        )
        .oneshot(webhook(SAMPLE))
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unmapped_project_goes_to_default() {
        let mut srv = server().await;
        let mock = srv
            .mock("POST", "/chat.postMessage")
            .match_body(Matcher::PartialJson(json!({ "channel": "C999" })))
            .with_body(r#"{"ok": true}"#)
            .expect(1)
            .create_async()
            .await;

        let body = json!({ "group_info": { "project_id": "proj-x" } }).to_string();
        let res = router(&srv.url()).oneshot(webhook(body)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_null_fields_are_delivered() {
        let mut srv = server().await;
        let mock = srv
            .mock("POST", "/chat.postMessage")
            .match_body(Matcher::PartialJson(json!({ "channel": "C111" })))
            .with_body(r#"{"ok": true}"#)
            .expect(1)
            .create_async()
            .await;

        let body = json!({
            "version": null,
            "group_info": { "project_id": "proj-a", "detail_link": null },
            "exception_info": null,
            "event_info": { "referrer": null, "service": "api" }
        })
        .to_string();
        let res = router(&srv.url()).oneshot(webhook(body)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_slack_rejection_is_acknowledged() {
        let mut srv = server().await;
        let mock = srv
            .mock("POST", "/chat.postMessage")
            .with_body(r#"{"ok": false, "error": "channel_not_found"}"#)
            .expect(1)
            .create_async()
            .await;

        let res = router(&srv.url()).oneshot(webhook(SAMPLE)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(plaintext_body(res.into_body()).await.is_empty());
    }

    #[tokio::test]
    async fn test_slack_unreachable_is_acknowledged() {
        let res = router("http://127.0.0.1:0")
            .oneshot(webhook(SAMPLE))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
    }
}
