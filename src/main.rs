//! edu-smoke - end-to-end smoke tests for the school management API
//!
//! Registers and logs in one account per role, exercises every resource
//! endpoint, checks role-based access control and prints a summary. The
//! exit code is 0 only when every check passed.

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use edu_smoke::common::{logging, Config};
use edu_smoke::testing::{Runner, SessionContext};

#[derive(Parser)]
#[command(name = "edu-smoke", about = "Smoke-test the school management REST API")]
#[command(version, long_about = None)]
struct Cli {
    /// TOML file overriding the default target and fixtures
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// API root, e.g. http://localhost:3000/api
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    let runner = match load(&cli) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "{}",
        "Starting School Management System Backend Tests".bold()
    );
    println!("Testing API at: {}", runner.client().base_url());
    println!("{}", "=".repeat(80));

    let report = runner.run(SessionContext::new()).await;
    let summary = report.summary();
    summary.print();

    std::process::exit(summary.exit_code());
}

fn load(cli: &Cli) -> edu_smoke::Result<Runner> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
        config.validate()?;
    }
    Runner::standard(&config)
}
