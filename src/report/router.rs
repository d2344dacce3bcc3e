//! Error report subrouter definition.
//!
//! The following route is supported:
//!
//! - POST: `/webhook`

use super::{notify::dispatch, payload::WebhookPayload};
use crate::router::Deps;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use hyper::body::Bytes;
use tracing::{error, info, warn};

/// Instantiate a new error report subrouter.
pub fn report_router() -> Router<Deps> {
    Router::new().route("/webhook", post(webhook_handler))
}

/// Handler for the POST route `/webhook`.
///
/// An `Authorization: Basic` header matching `$BASIC_AUTH_USERNAME` and
/// `$BASIC_AUTH_PASSWORD` must be present. If the server has no credentials
/// configured every request is refused.
///
/// Accepts a [WebhookPayload] in JSON format. Once decoded, the report is
/// forwarded to Slack and the request is acknowledged whatever the delivery
/// outcome; failures are only logged.
async fn webhook_handler(
    State(deps): State<Deps>,
    auth: Option<TypedHeader<Authorization<Basic>>>,
    // Authentication has to happen before we look at the body at all.
    body_bytes: Bytes,
) -> Result<StatusCode, Response> {
    let expected = deps.basic_auth.as_ref().ok_or_else(|| {
        error!("Basic auth credentials are not configured, refusing webhook");

        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })?;

    let authorised = auth
        .map(|TypedHeader(basic)| expected.is_valid(basic.username(), basic.password()))
        .unwrap_or(false);

    if !authorised {
        warn!("Rejected webhook with missing or invalid credentials");

        return Err((
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, r#"Basic realm="Restricted""#)],
        )
            .into_response());
    }

    let payload = serde_json::from_slice::<WebhookPayload>(&body_bytes).map_err(|e| {
        let msg = format!("Error decoding JSON: {}", e);
        warn!("{}", msg);

        (StatusCode::BAD_REQUEST, msg).into_response()
    })?;

    match dispatch(&deps, &payload).await {
        Ok(receipt) => info!(
            channel = %receipt.channel,
            ts = receipt.ts.as_deref().unwrap_or_default(),
            project = %payload.group_info.project_id,
            "Message sent to Slack"
        ),
        Err(e) => error!(
            channel = %e.channel,
            project = %e.project,
            "{}",
            e
        ),
    }

    Ok(StatusCode::OK)
}
