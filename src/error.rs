#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the snapshot pipeline."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free while still
//! exposing a thoroughly documented error surface for library consumers.

use std::path::{Path, PathBuf};

/// Unified error type returned by the collector, renderer, and publisher.
///
/// The pipeline has two terminal failure exits: collection failures
/// ([`Error::Authentication`] and [`Error::RemoteUnavailable`]) and publish
/// failures ([`Error::Publish`]). The remaining variants cover configuration
/// validation, local artifact I/O, and serialization of the upload receipt.
/// Each variant captures sufficient context for diagnostics while avoiding
/// accidental exposure of sensitive data such as the access token.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Returned when the remote source rejects the supplied credential.
    #[error("authentication failed: {message}")]
    Authentication {
        /// Human readable message describing the credential problem.
        message: String
    },
    /// Returned when the remote source cannot be reached or answers with a
    /// non-authentication failure.
    #[error("remote source unavailable: {message}")]
    RemoteUnavailable {
        /// Human readable message describing the remote failure.
        message: String
    },
    /// Returned when the storage write does not complete.
    #[error("publish failed: {message}")]
    Publish {
        /// Human readable message describing the storage failure.
        message: String
    },
    /// Returned when the configuration violates invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps I/O errors that occur while reading or writing local artifacts.
    #[error("failed to process artifact at {path:?}: {source}")]
    ArtifactIo {
        /// Location of the artifact being processed.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Wraps serialization errors when writing the upload receipt.
    #[error("failed to serialize output: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    }
}

impl Error {
    /// Constructs an authentication error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the credential failure.
    pub fn authentication<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Authentication {
            message: message.into()
        }
    }

    /// Constructs a remote-unavailable error from the provided displayable
    /// value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the remote failure.
    pub fn remote_unavailable<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::RemoteUnavailable {
            message: message.into()
        }
    }

    /// Constructs a publish error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the storage failure.
    pub fn publish<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Publish {
            message: message.into()
        }
    }

    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Reports whether the error belongs to the collection stage.
    ///
    /// Collection failures cover both credential rejections and remote
    /// outages; the invocation is terminal either way and the next scheduled
    /// tick performs the retry.
    pub fn is_collection_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::RemoteUnavailable { .. })
    }

    /// Reports whether the error belongs to the publish stage.
    pub fn is_publish_failure(&self) -> bool {
        matches!(self, Self::Publish { .. })
    }

    /// Reports whether retrying the failed operation can succeed.
    ///
    /// Only remote outages are transient; authentication and validation
    /// failures repeat deterministically until the configuration changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable { .. })
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// This method is primarily intended for CLI contexts where the variant
    /// name does not add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::ArtifactIo`] variant capturing the failing path and
/// source.
///
/// # Parameters
///
/// * `path` - Location of the artifact that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn artifact_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::ArtifactIo {
        path: path.to_path_buf(),
        source
    }
}
