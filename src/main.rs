use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgGroup, CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use fundmatch_core::{Dataset, FundmatchConfig, OutputFormat};
use fundmatch_screen::views::{self, MatchRequest};
use fundmatch_screen::{InputWarning, Report, ScreeningSession, ViewOutcome};

const CONFIG_FILE: &str = ".fundmatch.toml";

#[derive(Parser)]
#[command(
    name = "fundmatch",
    version,
    about = "Match funding calls to organisations by embedding similarity",
    long_about = "fundmatch screens a precomputed dataset of funding calls and organisation\n\
                   websites. Calls and sites are compared by the cosine similarity of their\n\
                   embeddings; competencies explain why a pair matches.\n\n\
                   Examples:\n  \
                     fundmatch similarity 'solar cells' 'photovoltaics'\n  \
                     fundmatch calls 'hydrogen storage' -n 5\n  \
                     fundmatch matches --call 12\n  \
                     fundmatch matches --all -n 20\n  \
                     fundmatch details 12 40\n  \
                     fundmatch doctor                 Check setup and environment"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .fundmatch.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the embedded dataset (overrides [data] path)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Plain text, one block per result (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown tables"
    )]
    format: OutputFormat,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Compare two free texts
    #[command(long_about = "Compare two free texts.\n\n\
        Both texts are embedded with the configured model and reported as a\n\
        cosine similarity percentage.\n\n\
        Examples:\n  fundmatch similarity 'machine learning' 'neural networks'")]
    Similarity {
        /// First text
        first: String,
        /// Second text
        second: String,
    },
    /// Search funding calls by title
    #[command(long_about = "Search funding calls by title.\n\n\
        Without a query, lists the first calls in dataset order.\n\n\
        Examples:\n  fundmatch calls 'quantum sensing'\n  fundmatch calls -n 50")]
    Calls {
        /// Search query (omit to list calls)
        query: Option<String>,

        /// Number of results (default from config; invalid values fall back to it)
        #[arg(long, short = 'n', allow_hyphen_values = true)]
        results: Option<String>,
    },
    /// Search sites by summary
    #[command(long_about = "Search organisation sites by their summary.\n\n\
        Without a query, lists the first sites in dataset order. Sites are shown\n\
        by their first scraped page.\n\n\
        Examples:\n  fundmatch sites 'battery recycling' -n 5")]
    Sites {
        /// Search query (omit to list sites)
        query: Option<String>,

        /// Number of results (default from config; invalid values fall back to it)
        #[arg(long, short = 'n', allow_hyphen_values = true)]
        results: Option<String>,
    },
    /// Show the competencies closest to a call or site
    #[command(group(ArgGroup::new("subject").required(true).args(["call", "site"])))]
    Competencies {
        /// Funding call number
        #[arg(long, allow_hyphen_values = true)]
        call: Option<String>,

        /// Site number
        #[arg(long, allow_hyphen_values = true)]
        site: Option<String>,

        /// Number of competencies
        #[arg(long, short = 'n', allow_hyphen_values = true)]
        results: Option<String>,
    },
    /// Rank matches for a call, a site, or the whole dataset
    #[command(
        long_about = "Rank matches from the call x site similarity matrix.\n\n\
        --call ranks sites for one call, --site ranks calls for one site, and\n\
        --all scans the whole matrix for the best pairs.\n\n\
        Examples:\n  fundmatch matches --call 3\n  fundmatch matches --site 17 -n 5\n  fundmatch matches --all -n 25",
        group(ArgGroup::new("scope").required(true).args(["call", "site", "all"]))
    )]
    Matches {
        /// Funding call number
        #[arg(long, allow_hyphen_values = true)]
        call: Option<String>,

        /// Site number
        #[arg(long, allow_hyphen_values = true)]
        site: Option<String>,

        /// Best pairs across all calls and sites
        #[arg(long)]
        all: bool,

        /// Number of matches
        #[arg(long, short = 'n', allow_hyphen_values = true)]
        results: Option<String>,
    },
    /// Explain a call/site match through shared competencies
    #[command(long_about = "Explain a call/site match.\n\n\
        Prints the stored similarity of the pair, then the call's top competencies\n\
        with the score of both the call and the site against each.\n\n\
        Examples:\n  fundmatch details 3 17 -n 5")]
    Details {
        /// Funding call number
        #[arg(allow_hyphen_values = true)]
        call: String,

        /// Site number
        #[arg(allow_hyphen_values = true)]
        site: String,

        /// Number of competencies
        #[arg(long, short = 'n', allow_hyphen_values = true)]
        results: Option<String>,
    },
    /// Create a default .fundmatch.toml configuration file
    #[command(long_about = "Create a default .fundmatch.toml configuration file.\n\n\
        Generates a commented template with all available options.\n\
        Fails if .fundmatch.toml already exists.")]
    Init,
    /// Check your fundmatch setup and environment
    #[command(long_about = "Check your fundmatch setup and environment.\n\n\
        Checks the config file, the dataset, and the embedding provider and its\n\
        API key. Use --format json for machine-readable output.")]
    Doctor,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1mfundmatch\x1b[0m v{version}: match funding calls to organisations\n");

        println!("Quick start:");
        println!("  \x1b[36mfundmatch init\x1b[0m                 Create a .fundmatch.toml config file");
        println!("  \x1b[36mfundmatch doctor\x1b[0m               Check the dataset and embedding setup");
        println!("  \x1b[36mfundmatch matches --all\x1b[0m        Best call/site pairs overall\n");

        println!("All commands:");
        println!("  \x1b[32msimilarity\x1b[0m    Compare two free texts");
        println!("  \x1b[32mcalls\x1b[0m         Search funding calls");
        println!("  \x1b[32msites\x1b[0m         Search organisation sites");
        println!("  \x1b[32mcompetencies\x1b[0m  Closest competencies of a call or site");
        println!("  \x1b[32mmatches\x1b[0m       Top matches for a call, a site, or overall");
        println!("  \x1b[32mdetails\x1b[0m       Explain one call/site match");
        println!("  \x1b[32mdoctor\x1b[0m        Check your setup and environment");
        println!("  \x1b[32minit\x1b[0m          Create default configuration\n");
    } else {
        println!("fundmatch v{version}: match funding calls to organisations\n");

        println!("Quick start:");
        println!("  fundmatch init                 Create a .fundmatch.toml config file");
        println!("  fundmatch doctor               Check the dataset and embedding setup");
        println!("  fundmatch matches --all        Best call/site pairs overall\n");

        println!("All commands:");
        println!("  similarity    Compare two free texts");
        println!("  calls         Search funding calls");
        println!("  sites         Search organisation sites");
        println!("  competencies  Closest competencies of a call or site");
        println!("  matches       Top matches for a call, a site, or overall");
        println!("  details       Explain one call/site match");
        println!("  doctor        Check your setup and environment");
        println!("  init          Create default configuration\n");
    }

    println!("Run 'fundmatch <command> --help' for details.");
}

/// Load the dataset, then the embedder, then build the session. The dataset
/// comes first so a bad path fails before any model is loaded.
async fn open_session(config: &FundmatchConfig) -> Result<ScreeningSession> {
    let dataset = Dataset::load(&config.data.path)?;
    let embedder = fundmatch_embed::provider_from_config(&config.embedding)?;
    let session = ScreeningSession::new(
        dataset,
        &config.competencies.terms,
        embedder,
        config.screening.clone(),
    )
    .await?;
    log::debug!("{session:?}");
    Ok(session)
}

fn print_warning(warning: &InputWarning, use_color: bool) {
    if use_color {
        eprintln!("\x1b[33m{}:\x1b[0m {warning}", warning.title());
    } else {
        eprintln!("{}: {warning}", warning.title());
    }
}

/// Print a report on stdout, or its warning on stderr. Warnings are not
/// failures: the exit status stays zero.
fn emit<R: Report>(outcome: ViewOutcome<R>, format: OutputFormat, use_color: bool) -> Result<()> {
    match outcome {
        ViewOutcome::Report(report) => print!("{}", report.render(format)?),
        ViewOutcome::Warning(warning) => print_warning(&warning, use_color),
    }
    Ok(())
}

fn scan_spinner() -> Option<indicatif::ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
    {
        pb.set_style(style);
    }
    pb.set_message("Scanning all call/site pairs...");
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

#[derive(serde::Serialize)]
struct CheckResult {
    name: &'static str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "pass",
            detail: detail.into(),
            hint: None,
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name,
            status: "fail",
            detail: detail.into(),
            hint: Some(hint.into()),
        }
    }

    fn info(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "info",
            detail: detail.into(),
            hint: None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self.status {
            "pass" => "\u{2713}",
            "fail" => "\u{2717}",
            _ => "~",
        }
    }

    fn colored_symbol(&self) -> String {
        match self.status {
            "pass" => "\x1b[32m\u{2713}\x1b[0m".into(),
            "fail" => "\x1b[31m\u{2717}\x1b[0m".into(),
            _ => "\x1b[33m~\x1b[0m".into(),
        }
    }
}

fn run_doctor(
    config: &FundmatchConfig,
    config_path: &Path,
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    let mut checks: Vec<CheckResult> = Vec::new();

    // 1. Config file
    if config_path.exists() {
        checks.push(CheckResult::pass(
            "config_file",
            format!("{} found", config_path.display()),
        ));
    } else {
        checks.push(CheckResult::info(
            "config_file",
            format!("{} not found, using defaults", config_path.display()),
        ));
    }

    // 2. Dataset
    let data_path = &config.data.path;
    match Dataset::load(data_path) {
        Ok(dataset) => checks.push(CheckResult::pass(
            "dataset",
            format!(
                "{} ({} calls, {} sites, {} dimensions)",
                data_path.display(),
                dataset.calls().len(),
                dataset.sites().len(),
                dataset
                    .dimensions()
                    .map_or_else(|| "no".to_string(), |d| d.to_string())
            ),
        )),
        Err(e) => checks.push(CheckResult::fail(
            "dataset",
            e.to_string(),
            "pass --data <path> or set [data] path in .fundmatch.toml",
        )),
    }

    // 3. Embedding provider
    let provider = config.embedding.provider.as_str();
    let model = &config.embedding.model;
    match provider {
        "local" | "fastembed" => match fundmatch_embed::local::resolve_model(model) {
            Ok(_) => checks.push(CheckResult::pass(
                "embedding_provider",
                format!("local (model: {model})"),
            )),
            Err(e) => checks.push(CheckResult::fail(
                "embedding_provider",
                e.to_string(),
                "set [embedding] model to the model that embedded the dataset",
            )),
        },
        "openai" | "remote" => {
            checks.push(CheckResult::pass(
                "embedding_provider",
                format!("{provider} (model: {model})"),
            ));
            let key_set = config.embedding.api_key.is_some()
                || std::env::var("FUNDMATCH_EMBEDDING_API_KEY").is_ok()
                || std::env::var("OPENAI_API_KEY").is_ok();
            if key_set {
                checks.push(CheckResult::pass("embedding_api_key", "API key set"));
            } else {
                checks.push(CheckResult::fail(
                    "embedding_api_key",
                    "FUNDMATCH_EMBEDDING_API_KEY not set",
                    "export FUNDMATCH_EMBEDDING_API_KEY=... or set api_key in .fundmatch.toml [embedding]",
                ));
            }
        }
        other => checks.push(CheckResult::fail(
            "embedding_provider",
            format!("unknown provider '{other}'"),
            "set [embedding] provider to \"local\" or \"openai\"",
        )),
    }

    // 4. Competency vocabulary
    checks.push(CheckResult::info(
        "competencies",
        format!("{} terms", config.competencies.terms.len()),
    ));

    match format {
        OutputFormat::Json => {
            let version = env!("CARGO_PKG_VERSION");
            let json = serde_json::json!({
                "version": version,
                "checks": checks,
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        _ => {
            let version = env!("CARGO_PKG_VERSION");
            println!("fundmatch v{version}: environment check\n");

            for check in &checks {
                let sym = if use_color {
                    check.colored_symbol()
                } else {
                    check.symbol().to_string()
                };
                let label = check.name.replace('_', " ");
                println!("  {sym} {label:<20} {}", check.detail);
                if let Some(hint) = &check.hint {
                    println!("    hint: {hint}");
                }
            }

            let passed = checks.iter().filter(|c| c.status == "pass").count();
            let failed = checks.iter().filter(|c| c.status == "fail").count();
            let info = checks.iter().filter(|c| c.status == "info").count();
            println!("\n{passed} checks passed, {failed} failed, {info} info");
        }
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# fundmatch configuration

[data]
# Precomputed [calls, sites] JSON file
# path = "all_data_embedded.json"

[embedding]
# "local" runs the model in-process; "openai" calls an OpenAI-compatible API.
# The model must be the one that embedded the dataset.
# provider = "local"
# model = "paraphrase-multilingual-MiniLM-L12-v2"
# api_key = "..."              # or FUNDMATCH_EMBEDDING_API_KEY
# base_url = "https://api.openai.com/v1"
# cache_dir = ".fastembed_cache"

[screening]
# default_results = 10
# bar_width = 100

[competencies]
# Replaces the built-in vocabulary; order breaks ties.
# terms = ["Artificial intelligence", "Robotics", "Photonics"]
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(default_filter));

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let mut config = if cli.config.is_some() || config_path.exists() {
        FundmatchConfig::from_file(&config_path)?
    } else {
        FundmatchConfig::default()
    };
    if let Some(data) = &cli.data {
        config.data.path = data.clone();
    }
    log::debug!(
        "format: {}, data: {}, embedding: {} ({})",
        cli.format,
        config.data.path.display(),
        config.embedding.provider,
        config.embedding.model
    );

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    match cli.command {
        None => print_welcome(use_color),
        Some(Command::Similarity {
            ref first,
            ref second,
        }) => {
            let session = open_session(&config).await?;
            let outcome = views::text_similarity(&session, first, second).await?;
            emit(outcome, cli.format, use_color)?;
        }
        Some(Command::Calls {
            ref query,
            ref results,
        }) => {
            let session = open_session(&config).await?;
            let query = query.as_deref().unwrap_or_default();
            let outcome = views::search_calls(&session, query, results.as_deref()).await?;
            emit(outcome, cli.format, use_color)?;
        }
        Some(Command::Sites {
            ref query,
            ref results,
        }) => {
            let session = open_session(&config).await?;
            let query = query.as_deref().unwrap_or_default();
            let outcome = views::search_sites(&session, query, results.as_deref()).await?;
            emit(outcome, cli.format, use_color)?;
        }
        Some(Command::Competencies {
            ref call,
            ref site,
            ref results,
        }) => {
            let session = open_session(&config).await?;
            let outcome = match (call, site) {
                (Some(call), _) => views::call_competencies(&session, call, results.as_deref()),
                (None, Some(site)) => views::site_competencies(&session, site, results.as_deref()),
                (None, None) => miette::bail!("pass --call <N> or --site <N>"),
            };
            emit(outcome, cli.format, use_color)?;
        }
        Some(Command::Matches {
            ref call,
            ref site,
            all,
            ref results,
        }) => {
            let request = match (call, site, all) {
                (Some(call), _, _) => MatchRequest::Call(call),
                (None, Some(site), _) => MatchRequest::Site(site),
                (None, None, true) => MatchRequest::All,
                (None, None, false) => miette::bail!("pass --call <N>, --site <N> or --all"),
            };
            let session = open_session(&config).await?;

            let spinner = if request == MatchRequest::All {
                scan_spinner()
            } else {
                None
            };
            let outcome = views::top_matches(&session, request, results.as_deref()).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            emit(outcome?, cli.format, use_color)?;
        }
        Some(Command::Details {
            ref call,
            ref site,
            ref results,
        }) => {
            let session = open_session(&config).await?;
            let outcome = views::match_details(&session, call, site, results.as_deref());
            emit(outcome, cli.format, use_color)?;
        }
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!("{CONFIG_FILE} already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
        Some(Command::Doctor) => {
            run_doctor(&config, &config_path, cli.format, use_color)?;
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "fundmatch", &mut std::io::stdout());
        }
    }

    Ok(())
}
