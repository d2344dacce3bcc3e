//! Type definitions and helpers for the Slack Web API.

use super::auth::*;
use serde::{de::Error, Deserialize, Deserializer};
use std::time::Duration;
use url::Url;

/// The base URL of the Slack API.
pub const API_BASE: &str = "https://slack.com/api";

/// A reusable client that holds a connection pool internally, as per
/// [reqwest::Client], alongside the API base and the bot token every request
/// is authenticated with.
///
/// The client is never mutated after startup, so it's shared across requests
/// behind a plain `Arc`.
pub struct SlackClient {
    http: reqwest::Client,
    base: String,
    token: SlackAccessToken,
}

impl SlackClient {
    /// Build a client against `base`. Every request is bounded by `timeout`.
    pub fn new(base: &Url, token: SlackAccessToken, timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(SlackClient {
            http,
            // `Url` always renders a trailing slash on bare hosts, and our
            // paths carry their own leading slash.
            base: base.as_str().trim_end_matches('/').to_owned(),
            token,
        })
    }

    /// Create a POST request to any Slack API endpoint, handling
    /// authentication.
    pub fn post<T: ToString>(&self, path: T) -> reqwest::RequestBuilder {
        self.http
            .post(self.base.to_owned() + &path.to_string())
            .header(reqwest::header::AUTHORIZATION, to_auth_header_val(&self.token))
    }
}

/// Slack's API returns a common "untagged" response, representing whether a
/// request was successful.
///
/// ```json
/// {
///     "ok": true,
///     "channel": "C123ABC456",
///     "ts": "1503435956.000247"
/// }
/// ```
///
/// ```json
/// {
///     "ok": false,
///     "error": "channel_not_found"
/// }
/// ```
#[derive(Deserialize)]
#[serde(untagged)]
pub enum APIResult<T> {
    Ok(T),
    Err(ErrorResponse),
}

/// The universal response in case of an unsuccessful request.
// The `ok` field is checked here, and should be checked on responses too,
// primarily to ensure appropriate deserialization behaviour in case of an
// otherwise empty successful response.
//
// Ideally we'd be able to use `ok` as a tag, rather than defining `APIResult`
// as untagged. See:
//   <https://github.com/serde-rs/serde/issues/745#issuecomment-294314786>
#[derive(Deserialize)]
pub struct ErrorResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "ok_false")]
    ok: bool,
    pub error: Option<String>,
}

/// Accept Slack's `ok` flag only if it's `true`.
pub fn ok_true<'a, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    ok_flag(deserializer, true)
}

/// Accept Slack's `ok` flag only if it's `false`.
pub fn ok_false<'a, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    ok_flag(deserializer, false)
}

fn ok_flag<'a, D>(deserializer: D, expected: bool) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    bool::deserialize(deserializer).and_then(|b| {
        if b == expected {
            Ok(b)
        } else {
            Err(Error::custom(format!("unexpected ok flag: {}", b)))
        }
    })
}
