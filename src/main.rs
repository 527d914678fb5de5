use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use clap::{Parser, Subcommand};
use ih::api::TrackerApi;
use ih::cache::{IssueCache, IssueUpdate, Listener};
use ih::changes::ChangeFeed;
use ih::config::{Config, PathOpt, USizeOpt};
use ih::env::Env;
use ih::fs::Fs;
use ih::loader::IssueLoader;
use ih::log::Log;
use ih::net::Net;
use ih::{ArcOsStr, ArcPath, IssueId};

#[derive(Parser)]
#[command(name = "issue-hub")]
#[command(about = "A live cache of issue tracker fields with change notifications")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Subscribe to issues and stream field updates until interrupted
    Watch {
        /// Issue IDs to watch
        #[arg(required = true)]
        issues: Vec<IssueId>,
    },
    /// Print the current fields of one issue and exit
    Show {
        /// The issue ID
        #[arg(required = true)]
        issue: IssueId,
    },
    /// Print the configured field set
    Fields,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize actors
    let env = Env::spawn();
    let fs = Fs::spawn();

    let home = env.env(ArcOsStr::from(OsStr::new("HOME"))).await?;
    let config_path = Path::new(&*home)
        .join(".config")
        .join("issue-hub")
        .join("config.toml");
    let config = Config::spawn(env.clone(), fs.clone(), ArcPath::from(config_path.as_path()));

    if config.load().await.is_err() {
        config.save().await?;
    }

    let log = Log::spawn(
        fs.clone(),
        config.log_level().await,
        config.usize(USizeOpt::MaxAge).await,
        config.path(PathOpt::LogDir).await,
    )
    .await?;
    log.collect_garbage().await;

    let net = Net::spawn(config.clone(), log.clone()).await;
    let api = TrackerApi::spawn(net, config.clone()).await;

    let poll_interval = Duration::from_secs(config.usize(USizeOpt::PollInterval).await as u64);
    let feed = ChangeFeed::spawn(api.clone(), log.clone(), poll_interval);
    let loader = IssueLoader::spawn(api, log.clone());
    let cache = IssueCache::spawn(feed, loader, log.clone(), config.fields().await).await;

    log.info("main", "Starting issue-hub CLI");

    match cli.command {
        Commands::Watch { issues } => {
            handle_watch_command(&cache, issues).await?;
        }
        Commands::Show { issue } => {
            handle_show_command(&cache, issue).await?;
        }
        Commands::Fields => {
            handle_fields_command(&cache).await;
        }
    }

    log.flush().await;
    Ok(())
}

/// Handle the watch command: stream updates for the given issues.
async fn handle_watch_command(cache: &IssueCache, issues: Vec<IssueId>) -> anyhow::Result<()> {
    let issues: HashSet<IssueId> = issues.into_iter().collect();
    let (listener, mut updates) = Listener::channel();
    let subscription = cache.subscribe(issues.clone(), listener).await;

    println!("Watching {} issue(s); press Ctrl-C to stop", issues.len());

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(update) => print_update(&update),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    cache.unsubscribe(subscription).await;
    Ok(())
}

/// Handle the show command: print the fields of one issue once it loads.
async fn handle_show_command(cache: &IssueCache, issue: IssueId) -> anyhow::Result<()> {
    let (listener, mut updates) = Listener::channel();
    let subscription = cache.subscribe(HashSet::from([issue]), listener).await;

    let update = updates
        .recv()
        .await
        .ok_or_else(|| anyhow::anyhow!("The cache went away before issue {} loaded", issue))?;

    let mut fields: Vec<_> = update.changed.iter().collect();
    fields.sort_by(|left, right| left.0.cmp(right.0));
    println!("Issue {}:", update.issue);
    for (field, value) in fields {
        println!("  {}: {}", field, value);
    }

    cache.unsubscribe(subscription).await;
    Ok(())
}

/// Handle the fields command: print the configured field set.
async fn handle_fields_command(cache: &IssueCache) {
    for field in cache.field_ids().await.iter() {
        println!("{}", field);
    }
}

fn print_update(update: &IssueUpdate) {
    let mut fields: Vec<_> = update.changed.iter().collect();
    fields.sort_by(|left, right| left.0.cmp(right.0));
    let rendered = fields
        .iter()
        .map(|(field, value)| format!("{}={}", field, value))
        .collect::<Vec<_>>()
        .join(" ");
    println!("issue {}: {}", update.issue, rendered);
}
