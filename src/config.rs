// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Validated configuration types for the snapshot pipeline.
//!
//! Settings arrive from command line flags with environment variable
//! fallbacks; every value defaults to the empty string so that an absent
//! required setting surfaces as a validation error before any remote call or
//! storage write is attempted. Instances are immutable for the lifetime of
//! the invocation.

use std::fmt;

use crate::error::Error;

/// Default object key when no override is supplied.
pub const DEFAULT_OBJECT_KEY: &str = "github-stats.svg";
/// Prefix used when deriving a per-user object key.
const USER_KEY_PREFIX: &str = "github-stats";
/// Cache lifetime applied to published artifacts.
pub const DEFAULT_CACHE_CONTROL: &str = "max-age=3600";

/// Account identifier and bearer token for the remote statistics source.
///
/// The token is redacted from `Debug` output so it cannot leak through logs
/// or panic messages.
///
/// # Examples
///
/// ```
/// use risp::Credentials;
///
/// let credentials =
///     Credentials::from_parts("octocat", "ghp_example").expect("valid credentials");
/// assert_eq!(credentials.username, "octocat");
/// ```
#[derive(Clone)]
pub struct Credentials {
    /// Account whose repositories are collected.
    pub username: String,
    /// Bearer token presented to the remote API.
    pub token:    String
}

impl Credentials {
    /// Builds credentials from raw values, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when either value is empty after
    /// trimming, which covers the empty-string defaults used by the CLI
    /// environment fallbacks.
    pub fn from_parts(username: &str, token: &str) -> Result<Self, Error> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::validation("GITHUB_USERNAME must be provided"));
        }

        let token = token.trim();
        if token.is_empty() {
            return Err(Error::validation("GITHUB_TOKEN must be provided"));
        }

        Ok(Self {
            username: username.to_owned(),
            token:    token.to_owned()
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Destination for the published artifact.
///
/// The bucket and key address the storage object; `public_read` controls
/// whether a public-read canned ACL is applied per object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageTarget {
    /// Bucket receiving the artifact.
    pub bucket:        String,
    /// Object key within the bucket.
    pub key:           String,
    /// Whether to apply a public-read ACL to the object.
    pub public_read:   bool,
    /// Cache control header applied to the object.
    pub cache_control: String
}

impl StorageTarget {
    /// Builds a storage target, falling back to [`DEFAULT_OBJECT_KEY`] when
    /// no key override is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the bucket name is empty after
    /// trimming.
    pub fn new(bucket: &str, key: Option<&str>, public_read: bool) -> Result<Self, Error> {
        let bucket = bucket.trim();
        if bucket.is_empty() {
            return Err(Error::validation("S3_BUCKET_NAME must be provided"));
        }

        let key = key
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_OBJECT_KEY);

        Ok(Self {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            public_read,
            cache_control: DEFAULT_CACHE_CONTROL.to_owned()
        })
    }
}

/// Derives the per-user object key of the form `github-stats/{username}.svg`.
///
/// # Examples
///
/// ```
/// use risp::user_object_key;
///
/// assert_eq!(user_object_key("octocat"), "github-stats/octocat.svg");
/// ```
pub fn user_object_key(username: &str) -> String {
    format!("{USER_KEY_PREFIX}/{}.svg", username.trim())
}

#[cfg(test)]
mod tests {
    use super::{Credentials, DEFAULT_CACHE_CONTROL, DEFAULT_OBJECT_KEY, StorageTarget};

    #[test]
    fn credentials_trim_surrounding_whitespace() {
        let credentials =
            Credentials::from_parts("  octocat  ", "  token  ").expect("expected valid credentials");
        assert_eq!(credentials.username, "octocat");
        assert_eq!(credentials.token, "token");
    }

    #[test]
    fn credentials_reject_empty_username() {
        let error = Credentials::from_parts("   ", "token").expect_err("expected validation error");
        assert!(error.to_string().contains("GITHUB_USERNAME"));
    }

    #[test]
    fn credentials_reject_empty_token() {
        let error = Credentials::from_parts("octocat", "").expect_err("expected validation error");
        assert!(error.to_string().contains("GITHUB_TOKEN"));
    }

    #[test]
    fn credentials_debug_redacts_token() {
        let credentials =
            Credentials::from_parts("octocat", "ghp_secret").expect("expected valid credentials");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("octocat"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("ghp_secret"));
    }

    #[test]
    fn storage_target_defaults_object_key() {
        let target = StorageTarget::new("stats-bucket", None, false)
            .expect("expected valid storage target");
        assert_eq!(target.key, DEFAULT_OBJECT_KEY);
        assert_eq!(target.cache_control, DEFAULT_CACHE_CONTROL);
        assert!(!target.public_read);
    }

    #[test]
    fn storage_target_treats_blank_key_as_missing() {
        let target = StorageTarget::new("stats-bucket", Some("   "), true)
            .expect("expected valid storage target");
        assert_eq!(target.key, DEFAULT_OBJECT_KEY);
        assert!(target.public_read);
    }

    #[test]
    fn storage_target_accepts_key_override() {
        let target = StorageTarget::new("stats-bucket", Some("custom/key.svg"), false)
            .expect("expected valid storage target");
        assert_eq!(target.key, "custom/key.svg");
    }

    #[test]
    fn storage_target_rejects_empty_bucket() {
        let error =
            StorageTarget::new("", None, false).expect_err("expected validation error");
        assert!(error.to_string().contains("S3_BUCKET_NAME"));
    }

    #[test]
    fn user_object_key_embeds_username() {
        assert_eq!(super::user_object_key(" octocat "), "github-stats/octocat.svg");
    }
}
