use anyhow::Result;
use log::{error, info};
use std::env;

use tree_names::cli::parse_cli_to_run_config;
use tree_names::logging::init_logging;
use tree_names::orchestrator;
use tree_names::util::envfile::{load_dotenv_if_present, write_env_template};

fn main() {
    init_logging();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    load_dotenv_if_present()?;
    let args: Vec<String> = env::args().collect();

    // Utility subcommand: generate .env.template
    if args.get(1).map(|s| s.as_str()) == Some("env-template") {
        let path = args
            .get(2)
            .cloned()
            .unwrap_or_else(|| ".env.template".to_string());
        write_env_template(&path)?;
        println!("Wrote {}. Copy to .env and edit values as needed.", path);
        return Ok(());
    }

    let cfg = match parse_cli_to_run_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Invalid arguments: {}", e);
            std::process::exit(2);
        }
    };
    let summary = orchestrator::run(&cfg)?;
    if summary.failed > 0 {
        info!(
            "Finished with {} of {} records failed",
            summary.failed, summary.total
        );
    }
    Ok(())
}
