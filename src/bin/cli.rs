//! CLI binary for streamscout.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use streamscout::{AppConfig, PlaybackOutcome, Player, ProviderManager, ProviderSource, app_dirs};
use streamscout_search::orchestrator::url_normalize;
use streamscout_search::{
    Discovery, DiscoveryStage, EmbedResolver, EmbedStrategy, FallbackOrchestrator, HealthStatus,
    SearchError, SearchResult,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Shortest query accepted by `watch`.
const MIN_QUERY_CHARS: usize = 2;

/// Find a movie or episode across streaming sites and play it locally.
#[derive(Parser)]
#[command(name = "streamscout", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// HTTP(S) proxy for every request, overriding the config file.
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Search for a title and play or download it.
    Watch {
        /// Title to search for.
        query: String,
        #[command(flatten)]
        opts: WatchOpts,
    },

    /// Search for a TV episode.
    Tv {
        /// Show name.
        show: String,
        /// Season number.
        #[arg(short, long)]
        season: u32,
        /// Episode number.
        #[arg(short, long)]
        episode: u32,
        #[command(flatten)]
        opts: WatchOpts,
    },

    /// Check which configured providers are reachable.
    TestProviders {
        /// Seconds to wait for each provider (2-10).
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Refresh the provider list from the remote source.
    Update,

    /// Check the provider list for problems.
    Validate,

    /// Show where configuration lives.
    Config,
}

#[derive(Args)]
struct WatchOpts {
    /// Only search legal, free-to-watch sources.
    #[arg(long)]
    legal_only: bool,

    /// Take the first result without prompting.
    #[arg(long)]
    no_interactive: bool,

    /// Download instead of playing.
    #[arg(long)]
    download: bool,

    /// Download directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print results as JSON and exit.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "streamscout=debug,streamscout_search=debug"
    } else {
        "streamscout=info,streamscout_search=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(app_dirs::config_file);
    let mut config = AppConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(proxy) = cli.proxy {
        config.network.proxy = Some(proxy);
    }

    match cli.command {
        Command::Watch { query, opts } => run_watch(&config, &query, &opts).await,
        Command::Tv {
            show,
            season,
            episode,
            opts,
        } => run_watch(&config, &episode_query(&show, season, episode), &opts).await,
        Command::TestProviders { timeout } => test_providers(&config, timeout).await,
        Command::Update => update_providers(&config).await,
        Command::Validate => validate_providers(&config).await,
        Command::Config => show_config(&config, &config_path),
    }
}

fn provider_manager(config: &AppConfig) -> anyhow::Result<ProviderManager> {
    let client = streamscout_search::http::build_client(&config.search_config()?)?;
    Ok(ProviderManager::new(
        app_dirs::providers_file(),
        config.providers.remote_url.clone(),
        client,
    ))
}

async fn run_watch(config: &AppConfig, query: &str, opts: &WatchOpts) -> anyhow::Result<()> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        anyhow::bail!("query must be at least {MIN_QUERY_CHARS} characters");
    }

    let search_config = config.search_config()?;
    let mut manager = provider_manager(config)?;
    let (providers, source) = manager.load().await;
    let legal_only = opts.legal_only || config.providers.legal_only;
    let bases = providers.search_bases(legal_only).to_vec();
    info!(
        providers = bases.len(),
        source = source_label(source),
        legal_only,
        "provider list loaded"
    );

    let orchestrator = FallbackOrchestrator::from_config(search_config)?;
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            cancel_clone.cancel();
        }
    });

    eprintln!("Searching for \"{query}\"...");
    let discovery = match orchestrator
        .discover_with_cancel(query, &bases, &cancel)
        .await
    {
        Ok(discovery) => discovery,
        Err(SearchError::Cancelled) => return cancelled(),
        Err(e) => return Err(e.into()),
    };

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&discovery)?);
        return Ok(());
    }

    print_results(&discovery);
    let chosen = if opts.no_interactive {
        discovery.results.first()
    } else {
        let mut input = stdin_lines();
        match prompt_selection(&mut input, discovery.displayed().len(), &cancel).await? {
            Some(index) => discovery.displayed().get(index),
            None if cancel.is_cancelled() => return cancelled(),
            None => {
                println!("Nothing selected.");
                return Ok(());
            }
        }
    };
    let Some(chosen) = chosen else {
        return Ok(());
    };

    let Some((target, is_embed)) = until_cancelled(
        &cancel,
        playable_target(&orchestrator, &discovery, chosen, &bases),
    )
    .await
    else {
        return cancelled();
    };
    let player = Player::new(config.playback.clone());

    if opts.download {
        let Some(dir) =
            until_cancelled(&cancel, player.download(&target, opts.output.as_deref())).await
        else {
            return cancelled();
        };
        println!("Downloaded to {}", dir?.display());
        return Ok(());
    }

    match until_cancelled(&cancel, player.play(&target, is_embed)).await {
        None => return cancelled(),
        Some(outcome) => match outcome? {
            PlaybackOutcome::Played => {}
            PlaybackOutcome::ManualFallback(url) => {
                println!(
                    "{} is not installed. Open this URL in your player or browser:\n  {url}",
                    config.playback.player
                );
            }
        },
    }
    Ok(())
}

fn cancelled() -> anyhow::Result<()> {
    println!("\nCancelled.");
    Ok(())
}

/// Run `fut` unless `cancel` fires first. Dropping `fut` stops any child
/// process it spawned.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

/// The URL to hand to the player and whether it still needs stream resolution.
async fn playable_target(
    orchestrator: &FallbackOrchestrator,
    discovery: &Discovery,
    chosen: &SearchResult,
    bases: &[String],
) -> (String, bool) {
    if discovery.stage == DiscoveryStage::ExternalToolSearch {
        return (chosen.url.clone(), false);
    }

    let base = bases.first().and_then(|b| url_normalize::origin(b));
    let resolver = EmbedResolver::with_client(orchestrator.client().clone());
    match resolver.resolve(&chosen.url, base.as_deref()).await {
        Some(embed) => {
            info!(strategy = %embed.strategy, "embed resolved");
            let is_embed = !matches!(
                embed.strategy,
                EmbedStrategy::VideoTag | EmbedStrategy::VideoSource | EmbedStrategy::DirectUrl
            );
            (embed.url, is_embed)
        }
        None => {
            info!("no embed found, trying the result page directly");
            let url = match base {
                Some(origin) => url_normalize::normalize(&chosen.url, &origin),
                None => chosen.url.clone(),
            };
            (url, true)
        }
    }
}

fn print_results(discovery: &Discovery) {
    println!(
        "\nFound {} result(s) via {}:\n",
        discovery.results.len(),
        discovery.stage
    );
    for (i, result) in discovery.displayed().iter().enumerate() {
        println!("{:>3}. {}", i + 1, clip(&result.title, 60));
        println!("     {}", clip(&result.url, 80));
    }
    println!();
}

/// Lines typed on stdin.
///
/// Read on a plain thread rather than the runtime's blocking pool, so a
/// pending read never holds up shutdown after Ctrl+C.
fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Ask for a 1-based choice until one is valid.
///
/// Returns `None` on quit, end of input, or when `cancel` fires.
async fn prompt_selection(
    input: &mut mpsc::Receiver<String>,
    count: usize,
    cancel: &CancellationToken,
) -> anyhow::Result<Option<usize>> {
    loop {
        print!("Select 1-{count} (q to quit): ");
        std::io::stdout().flush()?;
        let Some(Some(line)) = until_cancelled(cancel, input.recv()).await else {
            return Ok(None);
        };
        match parse_selection(&line, count) {
            Selection::Index(i) => return Ok(Some(i)),
            Selection::Quit => return Ok(None),
            Selection::Invalid => println!("Please enter a number between 1 and {count}."),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Selection {
    Index(usize),
    Quit,
    Invalid,
}

/// Parse a 1-based menu choice into a 0-based index.
fn parse_selection(input: &str, count: usize) -> Selection {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Selection::Quit;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Selection::Index(n - 1),
        _ => Selection::Invalid,
    }
}

/// `"<show> S01E05"`.
fn episode_query(show: &str, season: u32, episode: u32) -> String {
    format!("{} S{season:02}E{episode:02}", show.trim())
}

/// First `max` characters of `s`.
fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn source_label(source: ProviderSource) -> &'static str {
    match source {
        ProviderSource::LocalFile => "local file",
        ProviderSource::Remote => "remote",
        ProviderSource::Defaults => "defaults",
    }
}

async fn test_providers(config: &AppConfig, timeout: Option<u64>) -> anyhow::Result<()> {
    let mut manager = provider_manager(config)?;
    let (providers, _) = manager.load().await;
    let urls: Vec<String> = providers
        .movie_search_bases
        .iter()
        .chain(&providers.legal_search_bases)
        .cloned()
        .collect();

    let timeout = timeout.unwrap_or(config.network.probe_timeout_seconds);
    println!("Probing {} provider(s)...\n", urls.len());
    let records =
        streamscout_search::probe_providers(&urls, timeout, &config.search_config()?).await?;

    let mut healthy = 0;
    for record in &records {
        let status = record.status();
        if status == HealthStatus::Healthy {
            healthy += 1;
        }
        println!(
            "  [{:^7}] {:>5.2}s  {}",
            status.to_string(),
            record.elapsed_seconds,
            record.url
        );
    }
    println!("\n{healthy}/{} healthy", records.len());
    Ok(())
}

async fn update_providers(config: &AppConfig) -> anyhow::Result<()> {
    let mut manager = provider_manager(config)?;
    println!("Fetching {}...", manager.remote_url());
    let providers = manager.update().await?;
    println!(
        "Updated: {} search, {} legal, {} embed hosts",
        providers.movie_search_bases.len(),
        providers.legal_search_bases.len(),
        providers.embed_fallbacks.len()
    );
    Ok(())
}

async fn validate_providers(config: &AppConfig) -> anyhow::Result<()> {
    let mut manager = provider_manager(config)?;
    let (providers, source) = manager.load().await;
    let problems = providers.validate();
    if problems.is_empty() {
        println!("Provider list ({}) is valid.", source_label(source));
        return Ok(());
    }
    for problem in &problems {
        println!("  - {problem}");
    }
    anyhow::bail!("{} problem(s) in the provider list", problems.len())
}

fn show_config(config: &AppConfig, config_path: &std::path::Path) -> anyhow::Result<()> {
    let providers_file = app_dirs::providers_file();
    println!("Config dir:      {}", app_dirs::config_dir().display());
    println!(
        "Config file:     {} ({})",
        config_path.display(),
        presence(config_path)
    );
    println!(
        "Providers file:  {} ({})",
        providers_file.display(),
        presence(&providers_file)
    );
    println!("Remote list:     {}", config.providers.remote_url);
    println!(
        "Player:          {} {}",
        config.playback.player,
        config.playback.player_args.join(" ")
    );
    println!("Downloader:      {}", config.playback.downloader);
    Ok(())
}

fn presence(path: &std::path::Path) -> &'static str {
    if path.exists() { "exists" } else { "missing" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_query_pads_numbers() {
        assert_eq!(episode_query("The Wire ", 1, 5), "The Wire S01E05");
        assert_eq!(episode_query("Lost", 10, 112), "Lost S10E112");
    }

    #[test]
    fn selection_is_one_based() {
        assert_eq!(parse_selection("1\n", 3), Selection::Index(0));
        assert_eq!(parse_selection(" 3 ", 3), Selection::Index(2));
    }

    #[test]
    fn selection_rejects_out_of_range() {
        assert_eq!(parse_selection("0", 3), Selection::Invalid);
        assert_eq!(parse_selection("4", 3), Selection::Invalid);
        assert_eq!(parse_selection("two", 3), Selection::Invalid);
    }

    #[test]
    fn selection_quit() {
        assert_eq!(parse_selection("q", 3), Selection::Quit);
        assert_eq!(parse_selection("Q\n", 3), Selection::Quit);
    }

    #[tokio::test]
    async fn prompt_reads_until_a_valid_choice() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.send("seven".to_owned()).await.expect("send");
        tx.send("2".to_owned()).await.expect("send");
        let cancel = CancellationToken::new();
        let choice = prompt_selection(&mut rx, 3, &cancel).await.expect("prompt");
        assert_eq!(choice, Some(1));
    }

    #[tokio::test]
    async fn prompt_ends_at_end_of_input() {
        let (tx, mut rx) = mpsc::channel::<String>(1);
        drop(tx);
        let cancel = CancellationToken::new();
        assert_eq!(prompt_selection(&mut rx, 3, &cancel).await.expect("prompt"), None);
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn ctrl_c_at_prompt_aborts_while_input_pending() {
        // Sender kept alive: input stays pending until cancelled.
        let (_tx, mut rx) = mpsc::channel::<String>(1);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let choice = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            prompt_selection(&mut rx, 3, &cancel),
        )
        .await
        .expect("prompt returns once cancelled")
        .expect("prompt");
        assert_eq!(choice, None);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn cancellation_drops_pending_work() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let out = until_cancelled(&cancel, std::future::pending::<()>()).await;
        assert!(out.is_none());

        let live = CancellationToken::new();
        assert_eq!(until_cancelled(&live, async { 7 }).await, Some(7));
    }

    #[test]
    fn clip_counts_chars() {
        assert_eq!(clip("héllo wörld", 5), "héllo");
        assert_eq!(clip("short", 60), "short");
    }

    #[test]
    fn cli_parses_tv_episode() {
        let cli = Cli::parse_from(["streamscout", "tv", "Lost", "-s", "2", "-e", "7", "--json"]);
        match cli.command {
            Command::Tv {
                show,
                season,
                episode,
                opts,
            } => {
                assert_eq!(episode_query(&show, season, episode), "Lost S02E07");
                assert!(opts.json);
            }
            _ => panic!("expected tv"),
        }
    }

    #[test]
    fn cli_global_proxy_after_subcommand() {
        let cli = Cli::parse_from([
            "streamscout",
            "watch",
            "inception",
            "--proxy",
            "http://127.0.0.1:8080",
            "--legal-only",
        ]);
        assert_eq!(cli.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert!(matches!(cli.command, Command::Watch { ref opts, .. } if opts.legal_only));
    }
}
