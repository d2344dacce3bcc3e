use std::fmt;

/// Sum type representing every possible unexceptional fail state when talking
/// to Slack.
#[derive(Debug)]
pub enum SlackError {
    /// The request never produced a Slack API response: connection failure,
    /// timeout, or a body that isn't one of Slack's JSON envelopes.
    APIRequestFailed(reqwest::Error),
    /// Slack answered with `"ok": false` and this `error` code.
    APIResponseError(String),
    /// Slack answered with `"ok": false` but no `error` code.
    APIResponseMissingError,
}

impl From<reqwest::Error> for SlackError {
    fn from(e: reqwest::Error) -> Self {
        SlackError::APIRequestFailed(e)
    }
}

impl fmt::Display for SlackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            SlackError::APIRequestFailed(e) => format!("Slack API request failed: {}", e),
            SlackError::APIResponseError(e) => format!("Slack API returned error: {}", e),
            SlackError::APIResponseMissingError => "Slack API failed to return error.".into(),
        };

        write!(f, "{}", x)
    }
}

impl std::error::Error for SlackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SlackError::APIRequestFailed(e) => Some(e),
            _ => None,
        }
    }
}
