//! aspic CLI: structured argumentation over JSON rule documents.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use aspic_engine::argument::ValuationKind;
use aspic_engine::config::ReasonerConfig;
use aspic_engine::document::RuleDocument;
use aspic_engine::engine::Engine;
use aspic_engine::reasoner::Semantics;
use aspic_engine::term::Term;

#[derive(Parser)]
#[command(name = "aspic", version, about = "ASPIC+ structured argumentation engine")]
struct Cli {
    /// TOML reasoner configuration; flags below override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Acceptance semantics (grounded, preferred-credulous).
    #[arg(long, global = true)]
    semantics: Option<Semantics>,

    /// Argument valuation (weakest-link, last-link).
    #[arg(long, global = true)]
    valuation: Option<ValuationKind>,

    /// Generate contrapositives of strict rules.
    #[arg(long, global = true)]
    transposition: bool,

    /// Forbid defeasible arguments from rebutting strict-topped ones.
    #[arg(long, global = true)]
    restricted_rebutting: bool,

    /// Minimum strength of query arguments.
    #[arg(long, global = true)]
    min_strength: Option<f64>,

    /// Maximum argument nesting depth.
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the queries of a rule document.
    Query {
        /// Path to the JSON rule document.
        document: PathBuf,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show knowledge base statistics for a rule document.
    Info {
        /// Path to the JSON rule document.
        document: PathBuf,
    },
}

impl Cli {
    fn reasoner_config(&self) -> Result<ReasonerConfig> {
        let mut config = match &self.config {
            Some(path) => ReasonerConfig::load(path)?,
            None => ReasonerConfig::default(),
        };
        if let Some(semantics) = self.semantics {
            config.semantics = semantics;
        }
        if let Some(valuation) = self.valuation {
            config.valuation = valuation;
        }
        if self.transposition {
            config.transposition = true;
        }
        if self.restricted_rebutting {
            config.restricted_rebutting = true;
        }
        if let Some(min_strength) = self.min_strength {
            config.min_strength = min_strength;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_argument_depth = max_depth;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.reasoner_config()?;

    match &cli.command {
        Commands::Query { document, json } => {
            let document = RuleDocument::load(document)?;
            let engine = Engine::from_document(config, &document)?;
            let queries = document.queries()?;
            if queries.is_empty() {
                miette::bail!("the rule document has no queries");
            }

            let mut reports = Vec::new();
            for expression in queries {
                let text = render(&expression);
                let outcome = engine.query(expression);
                if *json {
                    reports.push(serde_json::json!({
                        "query": text,
                        "report": outcome.report(),
                    }));
                    continue;
                }
                println!("?- {text}.");
                if outcome.results.is_empty() {
                    println!("  no arguments");
                }
                for result in &outcome.results {
                    let verdict = if result.undefeated { "undefeated" } else { "defeated" };
                    let strengths: Vec<String> = result
                        .arguments
                        .iter()
                        .map(|a| format!("{:.2}", a.strength()))
                        .collect();
                    println!(
                        "  {}  {verdict}  [{}]",
                        render(&result.expression),
                        strengths.join(", ")
                    );
                }
                println!("  proof: {} argument(s)", outcome.proof.len());
            }
            if *json {
                let out = serde_json::to_string_pretty(&reports).into_diagnostic()?;
                println!("{out}");
            }
        }

        Commands::Info { document } => {
            let document = RuleDocument::load(document)?;
            let engine = Engine::from_document(config, &document)?;
            println!("{}", engine.info());
            for rule in engine.kb().user_rules() {
                match rule.caption() {
                    Some(caption) => println!("  {}  {rule}  -- {caption}", rule.id()),
                    None => println!("  {}  {rule}", rule.id()),
                }
            }
        }
    }

    Ok(())
}

fn render(expression: &[Term]) -> String {
    expression
        .iter()
        .map(Term::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
