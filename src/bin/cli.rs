use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use codesentinel::config::Config;
use codesentinel::output::OutputFormat;
use codesentinel::rules::{RuleRegistry, Severity};
use codesentinel::ScanOptions;

#[derive(Parser)]
#[command(
    name = "codesentinel",
    about = "Local scanner for leaked secrets and security misconfigurations",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a source tree for secrets and misconfigurations
    Scan {
        /// Path to the directory or file to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (console, json, markdown)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Minimum severity to fail (low, medium, high, critical)
        #[arg(long)]
        fail_on: Option<String>,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Worker threads (0 uses one per logical CPU)
        #[arg(long, short = 'j')]
        jobs: Option<usize>,
    },

    /// List all available detection rules
    ListRules {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter .codesentinel.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            path,
            config,
            format,
            fail_on,
            output,
            jobs,
        } => cmd_scan(path, config, format, fail_on, output, jobs),
        Commands::ListRules { format } => cmd_list_rules(format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn cmd_scan(
    path: PathBuf,
    config: Option<PathBuf>,
    format_str: String,
    fail_on_str: Option<String>,
    output_path: Option<PathBuf>,
    jobs: Option<usize>,
) -> Result<i32, codesentinel::error::SentinelError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    let fail_on = fail_on_str.and_then(|s| {
        let sev = Severity::from_str_lenient(&s);
        if sev.is_none() {
            eprintln!("Warning: unknown severity '{}', using config default", s);
        }
        sev
    });

    let options = ScanOptions {
        config_path: config,
        format,
        fail_on_override: fail_on,
        threads_override: jobs,
    };

    let report = codesentinel::scan(&path, &options)?;
    let rendered = codesentinel::render_report(&report, format)?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = pass, 1 = findings above threshold
    Ok(if report.verdict.pass { 0 } else { 1 })
}

fn cmd_list_rules(format_str: String) -> Result<i32, codesentinel::error::SentinelError> {
    let registry = RuleRegistry::builtin(&Default::default());
    let rules: Vec<_> = registry.rules().iter().map(|r| r.metadata().clone()).collect();

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&rules)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<28} {:<34} {:<10} {:<6} CATEGORY",
                "ID", "NAME", "SEVERITY", "PREC"
            );
            println!("{}", "-".repeat(100));
            for rule in &rules {
                println!(
                    "{:<28} {:<34} {:<10} {:<6} {}",
                    rule.id,
                    rule.name,
                    rule.severity.to_string(),
                    rule.precedence,
                    rule.category,
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, codesentinel::error::SentinelError> {
    let path = PathBuf::from(".codesentinel.toml");

    if path.exists() && !force {
        eprintln!(".codesentinel.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Wrote {}", path.display());
    Ok(0)
}
