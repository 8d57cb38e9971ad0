use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::filter::{Filters, Selection};
use crate::loader::DataSource;
use crate::models::RankingRow;

mod aggregate;
mod dashboard;
mod error;
mod filter;
mod kpi;
mod loader;
mod models;
mod ranking;
mod report;
#[cfg(test)]
mod testing;

#[derive(Parser)]
#[command(name = "otd-dashboard")]
#[command(about = "On-time delivery metrics for service tickets by contract", long_about = None)]
struct Cli {
    /// Tickets table (NOTA, ABERTURA, STATUS, SAW, CONTRATO, EC)
    #[arg(long, env = "OTD_TICKETS", default_value = "data/tickets.csv", global = true)]
    tickets: PathBuf,
    /// Goals table (CONTRATO, META OTD (%))
    #[arg(long, env = "OTD_GOALS", default_value = "data/goals.csv", global = true)]
    goals: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long, default_value_t = 2025)]
    year: i32,
    /// Dealer code, matched as a case-insensitive substring, or ALL
    #[arg(long, default_value = "ALL")]
    dealer: Selection,
    /// Exact contract id, or ALL
    #[arg(long, default_value = "ALL")]
    contract: Selection,
}

impl From<FilterArgs> for Filters {
    fn from(args: FilterArgs) -> Self {
        Filters {
            dealer: args.dealer,
            contract: args.contract,
            ..Filters::for_year(args.year)
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the dealers and contracts available as filters
    Filters,
    /// Print headline OTD metrics and the worst performers
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value_t = ranking::TOP_N)]
        limit: usize,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export the computed tables as JSON
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "dashboard.json")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = DataSource {
        tickets: cli.tickets,
        goals: cli.goals,
    };
    let dataset = loader::load(&source).with_context(|| {
        format!(
            "failed to load OTD data from {} and {}",
            source.tickets.display(),
            source.goals.display()
        )
    })?;

    match cli.command {
        Commands::Filters => {
            let options = filter::filter_options(&dataset);
            println!("Dealers (SAW):");
            for dealer in &options.dealers {
                println!("- {dealer}");
            }
            println!("Contracts:");
            for contract in &options.contracts {
                println!("- {contract}");
            }
        }
        Commands::Summary { filters, limit } => {
            let dashboard = dashboard::build(&dataset, &filters.into());
            let kpis = &dashboard.kpis;

            println!("OTD analysis of {}", dashboard.scope);
            println!("- OTD in period: {:.2}%", kpis.otd_percent);
            println!("- Total tickets: {}", kpis.total);
            println!("- On time: {}", kpis.on_time);
            println!("- Late: {}", kpis.late);

            if let Some(alert) = report::below_target_message(&dashboard) {
                println!("WARNING: {alert}");
            }
            for warning in &dashboard.warnings {
                println!("Note: {}", report::warning_message(warning));
            }

            print_ranking("Dealers with the worst OTD:", &dashboard.worst_dealers, limit);
            print_ranking("Contracts with the worst OTD:", &dashboard.worst_contracts, limit);
        }
        Commands::Report { filters, out } => {
            let dashboard = dashboard::build(&dataset, &filters.into());
            let report = report::render_markdown(&dashboard);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(path = %out.display(), "report written");
            println!("Report written to {}.", out.display());
        }
        Commands::Export { filters, out } => {
            let dashboard = dashboard::build(&dataset, &filters.into());
            let json = serde_json::to_string_pretty(&dashboard)?;
            std::fs::write(&out, json)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(path = %out.display(), "dashboard exported");
            println!("Dashboard written to {}.", out.display());
        }
    }

    Ok(())
}

fn print_ranking(title: &str, rows: &[RankingRow], limit: usize) {
    println!("{title}");
    if rows.is_empty() {
        println!("No tickets to rank.");
        return;
    }
    for row in rows.iter().take(limit) {
        println!(
            "- {}: OTD {} across {} tickets ({} on time)",
            row.key,
            report::format_percent(row.otd_percent),
            row.total_count,
            row.on_time_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_limit_defaults_to_ranking_cap() {
        let cli = Cli::try_parse_from(["otd-dashboard", "summary", "--dealer", "north"]).unwrap();
        let Commands::Summary { filters, limit } = cli.command else {
            panic!("expected the summary command");
        };
        assert_eq!(limit, ranking::TOP_N);

        let filters: Filters = filters.into();
        assert_eq!(filters.year, 2025);
        assert_eq!(filters.dealer, Selection::Only("north".to_string()));
        assert_eq!(filters.contract, Selection::All);
    }
}
