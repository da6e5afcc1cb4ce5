use clap::{command, Args, Parser, Subcommand};
use common::{DbConfig, DbConfigError};
use getset::Getters;
use std::path::PathBuf;

pub mod tui;

/// simpledb: SQL over a document store
#[derive(Debug, Parser, Getters)]
#[command(name = "simpledb")]
#[command(about = "simpledb: SQL over a schemaless document store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    #[getset(get = "pub")]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start an interactive SQL shell or execute a single statement
    Sql(SqlArgs),
    /// Serve a database over HTTP (POST /query)
    Serve(ServeArgs),
}

/// Options shared by every command that opens a database.
#[derive(Debug, Args, Getters)]
#[getset(get = "pub")]
pub struct ConfigArgs {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Storage URI, `memory://` or `file:///<dir>` (overrides the configuration)
    #[arg(long)]
    storage: Option<String>,
    /// Database name (overrides the configuration)
    #[arg(short, long)]
    database: Option<String>,
}

impl ConfigArgs {
    /// Loads the layered configuration, then applies command-line overrides.
    pub fn load(&self) -> Result<DbConfig, DbConfigError> {
        let mut config = DbConfig::load(self.config.as_deref())?;
        if let Some(storage) = &self.storage {
            config.set_storage_uri(storage.clone());
        }
        if let Some(database) = &self.database {
            config.set_database(database.clone());
        }
        config.storage_target()?;
        Ok(config)
    }
}

#[derive(Debug, Args, Getters)]
pub struct SqlArgs {
    /// SQL statement to execute instead of starting the shell
    #[arg(short, long)]
    #[getset(get = "pub")]
    command: Option<String>,
    #[command(flatten)]
    #[getset(get = "pub")]
    config: ConfigArgs,
}

#[derive(Debug, Args, Getters)]
pub struct ServeArgs {
    /// Address to listen on (overrides the configuration)
    #[arg(long)]
    #[getset(get = "pub")]
    host: Option<String>,
    /// Port to listen on (overrides the configuration)
    #[arg(short, long)]
    #[getset(get = "pub")]
    port: Option<u16>,
    #[command(flatten)]
    #[getset(get = "pub")]
    config: ConfigArgs,
}

impl ServeArgs {
    pub fn load_config(&self) -> Result<DbConfig, DbConfigError> {
        let mut config = self.config.load()?;
        if let Some(host) = &self.host {
            config.set_http_host(host.clone());
        }
        if let Some(port) = self.port {
            config.set_http_port(port);
        }
        Ok(config)
    }
}
