#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `EcoRoad` server and toolbox.
//!
//! ```text
//! ecoroad_server serve [--bind-addr 0.0.0.0] [--port 8080]
//! ecoroad_server simulate [--grid-size 100] [--num-potholes 5] [--seed 50]
//! ecoroad_server reports
//! ```
//!
//! Running with no subcommand enters interactive mode.

use clap::{Parser, Subcommand};
use ecoroad_database::{paths, queries};
use ecoroad_server::ServerConfig;
use ecoroad_simulation::{SimulationConfig, SimulationParams};

#[derive(Parser)]
#[command(name = "ecoroad_server", about = "EcoRoad road damage dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind (overrides `BIND_ADDR`)
        #[arg(long)]
        bind_addr: Option<String>,
        /// Port to listen on (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one pothole simulation and print the summary
    Simulate {
        /// Samples per axis
        #[arg(long, default_value = "100")]
        grid_size: usize,
        /// Number of depressions
        #[arg(long, default_value = "5")]
        num_potholes: usize,
        /// Selling price per cubic meter, in thousands
        #[arg(long, default_value = "40")]
        selling_rate: f64,
        /// Manufacturing price per cubic meter, in thousands
        #[arg(long, default_value = "27")]
        manufacturing_rate: f64,
        /// Fix the random draws
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List stored reports
    Reports,
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        ecoroad_server::interactive::run().await?;
        return Ok(());
    };

    match command {
        Commands::Serve { bind_addr, port } => {
            let mut config = ServerConfig::from_env();
            if let Some(bind_addr) = bind_addr {
                config.bind_addr = bind_addr;
            }
            if let Some(port) = port {
                config.port = port;
            }
            ecoroad_server::run_server(config).await?;
        }
        Commands::Simulate {
            grid_size,
            num_potholes,
            selling_rate,
            manufacturing_rate,
            seed,
        } => {
            let params = SimulationParams {
                grid_size,
                num_potholes,
                selling_rate,
                manufacturing_rate,
            };
            let config = match seed {
                Some(seed) => SimulationConfig::from_env().with_seed(seed),
                None => SimulationConfig::from_env(),
            };
            let result = ecoroad_simulation::simulate(&params, &config)?;

            println!(
                "Bounding box:        {:.2} cm x {:.2} cm",
                result.bounding_length, result.bounding_width
            );
            println!("Maximum depth:       {:.2} cm", result.max_depth);
            println!("Original volume:     {:.2} cm3", result.original_volume);
            println!("Scaled volume:       {:.2} cm3", result.scaled_volume);
            println!("Cuboid volume:       {:.2} cm3", result.cuboid.volume());
            if let Some(waste) = result.waste_percent {
                println!("Cuboid waste:        {waste:.2} %");
            }
            println!("Selling price:       {:.2}", result.costs.selling_price);
            println!("Manufacturing price: {:.2}", result.costs.manufacturing_price);
            println!("Profit:              {:.2}", result.costs.profit);
            println!("Margin:              {:.2} %", result.costs.margin_percent);
        }
        Commands::Reports => {
            let db = ecoroad_database::open_db(&paths::db_path_from_env()).await?;
            let reports = queries::fetch_reports(db.as_ref()).await?;

            if reports.is_empty() {
                println!("No reports found.");
                return Ok(());
            }

            println!(
                "{:<6} {:<30} {:<14} {:<22} {:<20} SIZE (m)",
                "ID", "EMAIL", "PHONE", "LOCATION", "CITY"
            );
            println!("{}", "-".repeat(110));

            for report in &reports {
                let location = format!(
                    "{:.5},{:.5}",
                    report.coordinates.latitude, report.coordinates.longitude
                );
                let d = report.dimensions;
                println!(
                    "{:<6} {:<30} {:<14} {:<22} {:<20} {} x {} x {}",
                    report.id,
                    report.contact.email,
                    report.contact.phone,
                    location,
                    report.address.city.as_deref().unwrap_or("-"),
                    d.breadth,
                    d.length,
                    d.depth
                );
            }

            println!("\n{} report(s)", reports.len());
        }
    }

    Ok(())
}
