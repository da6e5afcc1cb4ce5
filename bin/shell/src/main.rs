use anyhow::Result;
use clap::Parser;
use cli::{tui::handle_sql_command, Cli, Commands};
use common::util::trace::initialize_tracing;
use network::start_server;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let config = match args.command() {
        Commands::Sql(args) => args.config().load()?,
        Commands::Serve(args) => args.load_config()?,
    };
    initialize_tracing(config.log_filter())?;
    info!(database = %config.database(), storage = %config.storage_uri(), "simpledb started");

    match args.command() {
        Commands::Sql(args) => {
            let code = handle_sql_command(args, &config).await?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Serve(_) => start_server(&config).await?,
    }

    Ok(())
}
