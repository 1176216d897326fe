pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "devassets")]
#[command(about = "DevAssets CLI - manage the asset registry service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve,

    #[command(about = "Create the database schema if it does not exist")]
    Init,

    #[command(about = "Populate the database with demo departments, employees and assets")]
    Seed {
        #[arg(long, default_value_t = 10, help = "Number of employees to create")]
        employees: u32,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve => crate::server::serve().await,
        Commands::Init => commands::init::handle().await,
        Commands::Seed { employees } => commands::seed::handle(employees).await,
    }
}
