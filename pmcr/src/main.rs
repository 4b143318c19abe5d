//! Fixed-topology agent pipeline CLI.
//!
//! Drives one goal through the Plan-Make-Check-Reflect chain against the
//! configured generator backend and prints the run report as JSON.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use pmcr::core::topology::Topology;
use pmcr::io::audit::JsonlAuditSink;
use pmcr::io::config::{PipelineConfig, load_config, write_config};
use pmcr::io::generator::CommandGenerator;
use pmcr::io::knowledge::{JsonlKnowledgeSink, demo_product_info};
use pmcr::run::{Pipeline, RunContext};

#[derive(Parser)]
#[command(
    name = "pmcr",
    version,
    about = "Fixed-topology agent pipeline with schema-enforced stage contracts"
)]
struct Cli {
    /// Path to the pipeline configuration file.
    #[arg(long, default_value = "pmcr.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one goal through the pipeline and print the run report.
    Run {
        /// The goal to pursue.
        goal: String,
        /// Seed the run context with canned documentation for this product.
        #[arg(long)]
        product: Option<String>,
    },
    /// Print the stage chain of the baseline topology.
    Topology,
    /// Write a default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    pmcr::logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run { goal, product } => cmd_run(&cli.config, &goal, product.as_deref()),
        Command::Topology => cmd_topology(),
        Command::InitConfig { force } => cmd_init_config(&cli.config, force),
    }
}

fn cmd_run(config_path: &PathBuf, goal: &str, product: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let generator = CommandGenerator::new(
        config.generator.command.clone(),
        Duration::from_secs(config.generator.call_timeout_secs),
        config.generator.output_limit_bytes,
    )?;
    let audit = JsonlAuditSink::new(&config.audit_log);
    let knowledge = JsonlKnowledgeSink::new(&config.knowledge_log);

    let mut ctx = RunContext::from_defaults(goal, &config.run);
    if let Some(product) = product {
        ctx.context = demo_product_info(product);
    }

    let pipeline = Pipeline::new(Topology::baseline(), &generator, &audit, &knowledge);
    let report = pipeline.run(&ctx)?;
    print_json(&report)
}

fn cmd_topology() -> Result<()> {
    for stage in Topology::baseline().chain() {
        println!("{stage}");
    }
    Ok(())
}

fn cmd_init_config(path: &PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &PipelineConfig::default())
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Serialize `value` to pretty-printed JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize report")?;
    println!("{payload}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_with_product() {
        let cli = Cli::parse_from(["pmcr", "run", "Document GlowBrew", "--product", "GlowBrew"]);
        match cli.command {
            Command::Run { goal, product } => {
                assert_eq!(goal, "Document GlowBrew");
                assert_eq!(product.as_deref(), Some("GlowBrew"));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn parse_init_config_force() {
        let cli = Cli::parse_from(["pmcr", "init-config", "--force"]);
        assert!(matches!(cli.command, Command::InitConfig { force: true }));
    }

    #[test]
    fn parse_custom_config_path() {
        let cli = Cli::parse_from(["pmcr", "--config", "/tmp/p.toml", "topology"]);
        assert_eq!(cli.config, PathBuf::from("/tmp/p.toml"));
    }
}
