use crate::SqlArgs;
use anyhow::Result;
use common::DbConfig;
use driver::{shell::Shell, Driver};
use std::sync::Arc;
use tracing::{info, instrument};

/// Runs `-c <statement>` once, or the interactive shell. Returns the process
/// exit code.
#[instrument(skip_all, fields(database = %config.database()))]
pub async fn handle_sql_command(args: &SqlArgs, config: &DbConfig) -> Result<i32> {
    let driver = Arc::new(Driver::connect(config).await?);

    let code = match args.command() {
        Some(sql) => match driver.process_sql_command(sql).await {
            Ok(()) => 0,
            Err(_) => 1,
        },
        None => {
            let mut shell = Shell::new(driver.clone(), config.history_file())?;
            shell.run().await?
        }
    };

    driver.shutdown().await?;
    info!(code, "SQL command processing completed");
    Ok(code)
}
