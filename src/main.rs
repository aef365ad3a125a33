use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use sigma_tree::{Config, DynamicEvent, RuleSet, RulesetConfig};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "sigma-tree")]
#[command(about = "Compile Sigma rules and match NDJSON events from stdin", long_about = None)]
struct Cli {
    /// Rule directory, may be given several times
    #[arg(short, long = "rules", value_name = "DIR")]
    rules: Vec<PathBuf>,

    /// Only evaluate rules of this logsource product
    #[arg(short, long)]
    product: Option<String>,

    /// Stop at the first matching rule of a product
    #[arg(long)]
    first_match: bool,

    /// Fold ASCII case when matching patterns
    #[arg(long)]
    case_insensitive: bool,

    /// Keep whitespace runs in patterns as written
    #[arg(long)]
    no_collapse_ws: bool,

    /// Abort when any rule fails to compile
    #[arg(long)]
    fail_on_parse_error: bool,

    /// YAML ruleset configuration; command line flags are applied on top
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn ruleset_config(&self) -> Result<RulesetConfig> {
        let mut config = match &self.config {
            Some(path) => RulesetConfig::from_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => RulesetConfig::default(),
        };
        config.directories.extend(self.rules.iter().cloned());
        config.fail_on_parse_error |= self.fail_on_parse_error;
        config.compile = Config::new()
            .with_case_insensitive(config.compile.case_insensitive || self.case_insensitive)
            .with_no_collapse_ws(config.compile.no_collapse_ws || self.no_collapse_ws);
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    sigma_tree::init_tracing(cli.json_logs, &cli.log_level);

    let config = cli.ruleset_config()?;
    let ruleset = RuleSet::load(&config).context("failed to load rules")?;
    info!(
        total = ruleset.total,
        ok = ruleset.rules.len(),
        unsupported = ruleset.unsupported.len(),
        broken = ruleset.broken.len(),
        "ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let data: Value = match serde_json::from_str(&line) {
            Ok(data) => data,
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping malformed event");
                continue;
            }
        };

        let event = DynamicEvent::new(data);
        let results = match &cli.product {
            Some(product) => ruleset.check(&event, product, cli.first_match),
            None => ruleset.check_all(&event, cli.first_match),
        };
        if let Some(results) = results {
            let output = serde_json::json!({
                "event": event.data(),
                "matches": results,
            });
            println!("{}", serde_json::to_string(&output)?);
        }
    }

    Ok(())
}
