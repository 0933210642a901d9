// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Scheduled collection and publishing of GitHub repository statistics.
//!
//! The crate implements a three-stage pipeline invoked once per run: the
//! collector fetches repository statistics for an account from the GitHub
//! GraphQL API, the renderer turns the normalized records into an SVG
//! dashboard artifact, and the publisher stores the artifact in an S3
//! bucket under a deterministic key. Runs are independent and idempotent in
//! effect; re-running overwrites the same object key.

mod aggregate;
mod artifact;
mod chart;
mod collector;
mod config;
mod error;
mod publisher;
mod retry;

pub use aggregate::{LanguageTotal, RunSummary, aggregate_languages, summarize, top_repositories};
pub use artifact::{read_artifact, write_artifact};
pub use chart::{OutputArtifact, SVG_CONTENT_TYPE, render_dashboard};
pub use collector::{LanguageSlice, RepositoryStats, collect_statistics};
pub use config::{
    Credentials, DEFAULT_CACHE_CONTROL, DEFAULT_OBJECT_KEY, StorageTarget, user_object_key,
};
pub use error::{Error, artifact_io_error};
pub use publisher::{Publisher, UploadReceipt, public_url};
pub use retry::{RetryConfig, retry_with_backoff};
