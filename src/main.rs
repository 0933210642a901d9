//! Command-line interface for the risp binary.
//!
//! The CLI exposes the full pipeline under `run` plus the split `generate`
//! and `upload` modes for staging the artifact on disk between invocations.
//! Required settings fall back to environment variables and default to the
//! empty string, so an absent value surfaces as a validation error before
//! any remote call is made.

use std::{io, path::PathBuf, process};

use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use octocrab::Octocrab;
use risp::{
    Credentials, Error, OutputArtifact, Publisher, RepositoryStats, RetryConfig, StorageTarget,
    SVG_CONTENT_TYPE, UploadReceipt, aggregate_languages, collect_statistics, read_artifact,
    render_dashboard, summarize, user_object_key, write_artifact,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line interface for collecting and publishing repository insights.
#[derive(Debug, Parser,)]
#[command(name = "risp", version, about = "Publish GitHub repository insight snapshots")]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Collect statistics, render the dashboard, and upload it.
    Run(RunArgs,),
    /// Collect statistics and write the rendered dashboard to a local file.
    Generate(GenerateArgs,),
    /// Upload a previously generated dashboard artifact.
    Upload(UploadArgs,),
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `run` subcommand.
struct RunArgs
{
    #[command(flatten)]
    github: GitHubArgs,

    #[command(flatten)]
    storage: StorageArgs,

    /// Store the artifact under github-stats/<username>.svg.
    #[arg(long = "per-user-key", action = ArgAction::SetTrue, conflicts_with = "key")]
    per_user_key: bool,
}

#[derive(Debug, Args,)]
struct GenerateArgs
{
    #[command(flatten)]
    github: GitHubArgs,

    /// Destination path for the rendered SVG artifact.
    #[arg(long = "output", value_name = "PATH", default_value = "github-stats.svg")]
    output: PathBuf,
}

#[derive(Debug, Args,)]
struct UploadArgs
{
    /// Path of the SVG artifact to upload.
    #[arg(long = "input", value_name = "PATH", default_value = "github-stats.svg")]
    input: PathBuf,

    #[command(flatten)]
    storage: StorageArgs,
}

/// GitHub credential settings shared by collecting subcommands.
#[derive(Debug, Args,)]
struct GitHubArgs
{
    /// GitHub account whose repositories are collected.
    #[arg(long = "username", value_name = "USER", env = "GITHUB_USERNAME", default_value = "")]
    username: String,

    /// Personal access token used to authenticate against the API.
    #[arg(
        long = "token",
        value_name = "TOKEN",
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        default_value = ""
    )]
    token: String,
}

/// Storage destination settings shared by publishing subcommands.
#[derive(Debug, Args,)]
struct StorageArgs
{
    /// Bucket receiving the artifact.
    #[arg(long = "bucket", value_name = "BUCKET", env = "S3_BUCKET_NAME", default_value = "")]
    bucket: String,

    /// Object key override; defaults to github-stats.svg.
    #[arg(long = "key", value_name = "KEY", env = "S3_OBJECT_KEY")]
    key: Option<String,>,

    /// Apply a public-read canned ACL to the uploaded object.
    #[arg(long = "public-read", action = ArgAction::SetTrue)]
    public_read: bool,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env(),).init();

    if let Err(error,) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors originating from configuration validation, collection,
/// rendering, and publishing.
async fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args,) => run_pipeline(args,).await,
        Command::Generate(args,) => run_generate(args,).await,
        Command::Upload(args,) => run_upload(args,).await,
    }
}

async fn run_pipeline(args: RunArgs,) -> Result<(), Error,>
{
    let credentials = Credentials::from_parts(&args.github.username, &args.github.token,)?;
    let key = if args.per_user_key {
        Some(user_object_key(&credentials.username,),)
    } else {
        args.storage.key.clone()
    };
    let target = StorageTarget::new(&args.storage.bucket, key.as_deref(), args.storage.public_read,)?;

    let records = collect_with_spinner(&credentials,).await?;
    let artifact = render_dashboard(&records, Utc::now(),);
    info!("Rendered artifact of {} bytes", artifact.content.len());

    let publisher = Publisher::connect(target,).await;
    let receipt = publisher.publish(&artifact,).await?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_receipt(&mut handle, &receipt,)
}

async fn run_generate(args: GenerateArgs,) -> Result<(), Error,>
{
    let credentials = Credentials::from_parts(&args.github.username, &args.github.token,)?;

    let records = collect_with_spinner(&credentials,).await?;
    let artifact = render_dashboard(&records, Utc::now(),);
    write_artifact(&args.output, &artifact,)?;

    println!("{}", args.output.display());
    info!("Wrote artifact to {}", args.output.display());

    Ok((),)
}

async fn run_upload(args: UploadArgs,) -> Result<(), Error,>
{
    let target = StorageTarget::new(
        &args.storage.bucket,
        args.storage.key.as_deref(),
        args.storage.public_read,
    )?;

    let content = read_artifact(&args.input,)?;
    let artifact = OutputArtifact {
        content,
        content_type: SVG_CONTENT_TYPE,
        generated_at: Utc::now(),
    };

    let publisher = Publisher::connect(target,).await;
    info!(
        "Publishing {} to s3://{}/{}",
        args.input.display(),
        publisher.target().bucket,
        publisher.target().key
    );
    let receipt = publisher.publish(&artifact,).await?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_receipt(&mut handle, &receipt,)
}

async fn collect_with_spinner(
    credentials: &Credentials,
) -> Result<Vec<RepositoryStats,>, Error,>
{
    let octocrab = Octocrab::builder()
        .personal_token(credentials.token.clone(),)
        .build()
        .map_err(|e| Error::remote_unavailable(format!("failed to build GitHub client: {e}"),),)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
            .expect("valid template",),
    );
    pb.set_message(format!("Collecting statistics for {}...", credentials.username),);

    let retry_config = RetryConfig::default();
    let records = collect_statistics(&octocrab, &credentials.username, &retry_config,).await?;

    pb.finish_with_message(format!("Collected {} repositories", records.len()),);

    let languages = aggregate_languages(&records,);
    let summary = summarize(&records, &languages,);
    info!(
        "Run summary: {} commits, {} stars, {} active repositories",
        summary.total_commits, summary.total_stars, summary.active_repositories
    );

    Ok(records,)
}

fn write_receipt<W: io::Write,>(writer: &mut W, receipt: &UploadReceipt,) -> Result<(), Error,>
{
    let mut rendered = serde_json::to_string_pretty(receipt,)?;
    rendered.push('\n',);
    writer.write_all(rendered.as_bytes(),).map_err(serde_json::Error::io,)?;

    Ok((),)
}
