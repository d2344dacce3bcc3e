//! HTTP Basic authentication for the webhook endpoint.
//!
//! The reporting service is configured with a username and password which it
//! sends with every request. Both halves are compared in constant time by
//! verifying HMAC-SHA256 tags rather than comparing strings directly.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// The credentials the server expects.
pub struct BasicAuth {
    username: String,
    password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl BasicAuth {
    pub fn new<T: Into<String>>(username: T, password: T) -> Self {
        BasicAuth {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Compare offered credentials against our own. Both halves are always
    /// checked so that timing doesn't reveal which one was wrong.
    pub fn is_valid(&self, username: &str, password: &str) -> bool {
        let user_ok = verify(&self.username, username);
        let pass_ok = verify(&self.password, password);

        user_ok & pass_ok
    }
}

/// Sign both values with `expected` as the key and compare the tags.
/// [Mac::verify_slice] compares in constant time.
fn verify(expected: &str, offered: &str) -> bool {
    let sign = |x: &str| {
        HmacSha256::new_from_slice(expected.as_bytes()).map(|mut mac| {
            mac.update(x.as_bytes());
            mac
        })
    };

    match (sign(expected), sign(offered)) {
        (Ok(want), Ok(got)) => got.verify_slice(&want.finalize().into_bytes()).is_ok(),
        _ => false,
    }
}
