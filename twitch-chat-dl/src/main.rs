use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use twitch_chat_lib::cache::DEFAULT_CACHE_DIR;
use twitch_chat_lib::config::{
    DEFAULT_CLIENT_ID, DEFAULT_MAX_CONCURRENT, DEFAULT_SEGMENT_WIDTH_SECS,
};
use twitch_chat_lib::{
    fetch_comments_cached, ClientConfig, CommentCache, CommentSet, CommentSource, GqlClient,
    SchedulerConfig, SegmentScheduler,
};

#[derive(Parser)]
#[command(name = "twitch-chat-dl")]
#[command(about = "Download the chat replay of a Twitch VOD")]
struct Args {
    /// Numeric Twitch video id
    video_id: String,

    /// Directory holding one JSON document per video
    #[arg(long, default_value = DEFAULT_CACHE_DIR)]
    cache_dir: String,

    /// Width of each pagination window, in seconds
    #[arg(long, default_value_t = DEFAULT_SEGMENT_WIDTH_SECS)]
    segment_width: u64,

    /// Maximum number of windows paginated at once
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT)]
    max_concurrent: usize,

    /// Client-ID header sent with every request
    #[arg(long, env = "TWITCH_CLIENT_ID", default_value = DEFAULT_CLIENT_ID)]
    client_id: String,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Ignore any cached copy and do not write one
    #[arg(long)]
    no_cache: bool,

    /// Print the comments as JSON to stdout
    #[arg(long)]
    json: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} segments ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Run `work`, then clear the bar whether it succeeded or not.
async fn cleared_after<T>(pb: &ProgressBar, work: impl Future<Output = T>) -> T {
    let result = work.await;
    pb.finish_and_clear();
    result
}

async fn collect_uncached<F>(
    scheduler: &SegmentScheduler,
    video_id: &str,
    progress: F,
) -> Result<CommentSet>
where
    F: Fn(usize, usize) + Sync,
{
    let video = scheduler
        .source()
        .fetch_video_info(video_id)
        .await
        .context("Failed to fetch video info")?;
    scheduler
        .collect_all_with_progress(video_id, &video, progress)
        .await
        .context("Failed to collect comments")
}

async fn run(args: &Args) -> Result<()> {
    let client = GqlClient::new(ClientConfig {
        client_id: args.client_id.clone(),
        timeout: Duration::from_secs(args.timeout),
        ..Default::default()
    })
    .context("Failed to build GraphQL client")?;

    let scheduler = SegmentScheduler::new(
        Arc::new(client),
        SchedulerConfig {
            segment_width: args.segment_width,
            max_concurrent: args.max_concurrent,
        },
    )?;

    let pb = progress_bar()?;
    let on_progress = |done: usize, total: usize| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    };

    let collecting = async {
        if args.no_cache {
            collect_uncached(&scheduler, &args.video_id, on_progress).await
        } else {
            let cache = CommentCache::new(&args.cache_dir);
            fetch_comments_cached(&scheduler, &cache, &args.video_id, on_progress)
                .await
                .context("Failed to collect comments")
        }
    };
    let comments = cleared_after(&pb, collecting).await?;

    info!("Got {} comments", comments.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comments)?);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    tokio::select! {
        result = run(&args) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Unhandled error: {:?}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Exiting...");
            ExitCode::SUCCESS
        }
    }
}
