//! u-rulematch CLI - rank strategy rules against a query
//!
//! Reads a JSON request holding rules, weights and a query, ranks the rules
//! and prints the outcome as JSON.
//!
//! Usage:
//!     u-rulematch request.json
//!     u-rulematch --query "Brand 1, Basketball, NBA" request.json
//!     u-rulematch --mode exact_entity --strict --pretty request.json
//!     u-rulematch --tie-break by_strategy --limit 3 request.json
//!     cat request.json | u-rulematch -

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use u_rulematch::matching::{MatchMode, QueryContext};
use u_rulematch::ranking::{ErrorPolicy, RankConfig, RawRule, RuleEngine, TieBreaker};
use u_rulematch::scoring::WeightTable;

#[derive(Parser, Debug)]
#[command(name = "u-rulematch")]
#[command(about = "Rank strategy rules against a query context")]
#[command(version)]
struct Args {
    /// Path to the JSON request file, or "-" for stdin
    input: PathBuf,

    /// Match policy (any_value or exact_entity); overrides the request's "mode"
    #[arg(short, long)]
    mode: Option<MatchMode>,

    /// Comma-separated query values (any_value mode only); overrides the request's "query"
    #[arg(short, long)]
    query: Option<String>,

    /// Fail on the first malformed condition instead of skipping the rule
    #[arg(long)]
    strict: bool,

    /// Keep only the top N matches
    #[arg(long)]
    limit: Option<usize>,

    /// Ordering of equal scores (preserve_order or by_strategy)
    #[arg(long, value_name = "ORDER")]
    tie_break: Option<TieBreaker>,

    /// Required entity names (repeatable); defaults to Brand and Sport
    #[arg(long = "require", value_name = "ENTITY")]
    required: Vec<String>,

    /// Evaluate rules in parallel (needs the `parallel` feature)
    #[arg(long)]
    parallel: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long)]
    verbose: bool,
}

/// Request file layout.
#[derive(Debug, Deserialize)]
struct RankRequest {
    #[serde(default)]
    rules: Vec<RawRule>,

    #[serde(default)]
    weights: WeightTable,

    #[serde(default)]
    query: Option<QueryContext>,

    #[serde(default)]
    mode: Option<MatchMode>,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let request = match load_request(&args.input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error loading request: {}", e);
            std::process::exit(1);
        }
    };

    let config = build_config(&args, request.mode);
    let query = match resolve_query(args.query.as_deref(), request.query, config.match_mode) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        rules = request.rules.len(),
        weights = request.weights.len(),
        query = query.len(),
        mode = %config.match_mode,
        "ranking request"
    );

    let engine = RuleEngine::new(config);
    let outcome = match engine.rank(&request.rules, &request.weights, &query) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    for skipped in &outcome.skipped {
        warn!("{}", skipped);
    }

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&outcome)
    } else {
        serde_json::to_string(&outcome)
    };
    match rendered {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing outcome: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_request(path: &Path) -> Result<RankRequest, String> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?
    };

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse request JSON: {}", e))
}

/// `--query` only builds a value list, so it is refused under exact_entity.
fn resolve_query(
    csv: Option<&str>,
    request_query: Option<QueryContext>,
    mode: MatchMode,
) -> Result<QueryContext, String> {
    match (csv, request_query) {
        (Some(_), _) if mode == MatchMode::ExactEntity => Err(format!(
            "--query builds a value list, which {mode} mode does not accept; \
             put an entity map in the request's \"query\" field"
        )),
        (Some(csv), _) => Ok(QueryContext::from_csv(csv)),
        (None, Some(q)) => Ok(q),
        (None, None) => Err("no query supplied (use --query or a \"query\" field)".to_string()),
    }
}

fn build_config(args: &Args, request_mode: Option<MatchMode>) -> RankConfig {
    let mut config = RankConfig::default()
        .with_match_mode(args.mode.or(request_mode).unwrap_or_default())
        .with_parallel(args.parallel);

    if args.strict {
        config = config.with_error_policy(ErrorPolicy::Strict);
    }
    if let Some(tie_breaker) = args.tie_break {
        config = config.with_tie_breaker(tie_breaker);
    }
    if let Some(n) = args.limit {
        config = config.with_limit(n);
    }
    if !args.required.is_empty() {
        config = config.with_required_entities(args.required.iter().cloned());
    }
    config
}
