use self::{highlighter::SqlHighlighter, prompt::SqlPrompt};
use crate::{render, Driver, DriverRef};
use anyhow::Result;
use nu_ansi_term::{Color, Style};
use owo_colors::OwoColorize;
use prettytable::{row, Table};
use reedline::{DefaultHinter, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

mod highlighter;
mod prompt;

const HISTORY_CAPACITY: usize = 1000;

/// A line of shell input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Tables,
    /// `.bail` alone reports the current mode.
    Bail(Option<bool>),
    Clear,
    Exit(i32),
    Sql(String),
    Unrecognized(String),
}

impl Command {
    pub fn parse(input: &str) -> Option<Command> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let command = match input.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["help"] | [".help"] => Command::Help,
            ["clear"] | [".clear"] => Command::Clear,
            ["exit"] | ["quit"] | [".exit"] | [".quit"] => Command::Exit(0),
            [".exit", code] => match code.parse::<i32>() {
                Ok(code) => Command::Exit(code),
                Err(_) => Command::Unrecognized(input.to_string()),
            },
            [".tables"] => Command::Tables,
            [".bail"] => Command::Bail(None),
            [".bail", "on"] => Command::Bail(Some(true)),
            [".bail", "off"] => Command::Bail(Some(false)),
            _ if input.starts_with('.') => Command::Unrecognized(input.to_string()),
            _ => Command::Sql(input.to_string()),
        };
        Some(command)
    }
}

#[derive(TypedBuilder)]
pub struct Shell {
    driver: DriverRef,
    prompt: SqlPrompt,
    line_editor: Reedline,
    #[builder(default = false)]
    bail_on_error: bool,
}

impl Shell {
    pub fn new(driver: DriverRef, history_file: impl Into<PathBuf>) -> Result<Self> {
        let prompt = SqlPrompt::new(driver.name());
        let history = FileBackedHistory::with_file(HISTORY_CAPACITY, history_file.into())?;
        let hinter =
            DefaultHinter::default().with_style(Style::new().italic().fg(Color::LightGray));

        let line_editor = Reedline::create()
            .with_highlighter(Box::new(SqlHighlighter))
            .with_history(Box::new(history))
            .with_hinter(Box::new(hinter));

        Ok(Shell::builder()
            .driver(driver)
            .prompt(prompt)
            .line_editor(line_editor)
            .build())
    }

    /// Reads and runs input until the user leaves. Returns the exit code.
    pub async fn run(&mut self) -> Result<i32> {
        println!(
            "Connected to {}. Type {} for help.",
            self.driver.name().cyan(),
            ".help".yellow()
        );

        loop {
            let input = self.line_editor.read_line(&self.prompt)?;
            match input {
                Signal::Success(buffer) => {
                    self.prompt.increment_line_count();

                    let Some(command) = Command::parse(&buffer) else {
                        continue;
                    };
                    debug!(?command, "Shell command");

                    match self.process_command(command).await {
                        Ok(Some(code)) => {
                            println!("Goodbye!");
                            return Ok(code);
                        }
                        Ok(None) => {}
                        Err(e) if self.bail_on_error => {
                            warn!(error = %e, "Stopping on error");
                            return Err(e);
                        }
                        Err(_) => {}
                    }
                }
                Signal::CtrlC | Signal::CtrlD => {
                    println!("Goodbye!");
                    return Ok(0);
                }
            }
        }
    }

    /// Returns an exit code when the command ends the session.
    async fn process_command(&mut self, command: Command) -> Result<Option<i32>> {
        match command {
            Command::Sql(sql) => self.driver.process_sql_command(&sql).await?,
            Command::Help => show_help(),
            Command::Tables => list_tables(&self.driver).await.map_err(report)?,
            Command::Bail(Some(on)) => self.bail_on_error = on,
            Command::Bail(None) => println!(
                "{}",
                format!(
                    "Error stop mode is {}",
                    if self.bail_on_error {
                        "on".green().to_string()
                    } else {
                        "off".red().to_string()
                    }
                )
                .purple()
            ),
            Command::Clear => self.line_editor.clear_screen().map_err(|e| report(e.into()))?,
            Command::Exit(code) => return Ok(Some(code)),
            Command::Unrecognized(command) => println!(
                "{}{}{}{}{}",
                "Unrecognized command".purple(),
                ":".black(),
                " `".red(),
                command.yellow(),
                "`".red(),
            ),
        }
        Ok(None)
    }
}

/// Prints a failure that did not come from a SQL statement. Statement errors
/// are printed by [`Driver::process_sql_command`].
fn report(error: anyhow::Error) -> anyhow::Error {
    eprintln!("{}", render::render_failure(&error));
    error
}

async fn list_tables(driver: &Driver) -> Result<()> {
    let tables = driver.tables().await?;
    if tables.is_empty() {
        println!("{}", "No tables".purple());
    }
    for table in tables {
        println!("{}", table);
    }
    Ok(())
}

fn show_help() {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row!["General Help", "Description"]);
    table.add_row(row!["Press Ctrl+D or type .exit to exit", "Exit this program"]);
    table.add_row(row!["Press Ctrl+R to search through command history", "Search history"]);
    table.add_row(row![
        "Press Up/Down arrows or Ctrl+n/p to browse history",
        "Browse history"
    ]);
    table.printstd();

    println!();
    println!("Available commands:");

    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row!["Command", "Description"]);
    table.add_row(row![".bail [on|off]", "Stop at the first failing statement"]);
    table.add_row(row![".clear", "Clear the screen"]);
    table.add_row(row![".exit [CODE]", "Exit this program with return-code [CODE]"]);
    table.add_row(row![".help", "Show this help information"]);
    table.add_row(row![".quit", "Exit this program (with return-code 0)"]);
    table.add_row(row![".tables", "List the names of all tables"]);
    table.printstd();

    println!();
    println!("Statements:");

    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row!["Statement", "Example"]);
    table.add_row(row![
        "CREATE TABLE",
        "CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(50) NOT NULL)"
    ]);
    table.add_row(row!["INSERT", "INSERT INTO users (name) VALUES ('Ada')"]);
    table.add_row(row![
        "SELECT",
        "SELECT name FROM users JOIN orders ON users.id = orders.user_id"
    ]);
    table.add_row(row!["UPDATE", "UPDATE users SET name = 'Grace' WHERE id = 1"]);
    table.add_row(row!["DELETE", "DELETE FROM users WHERE id = 1"]);
    table.add_row(row!["DROP TABLE", "DROP TABLE users"]);
    table.printstd();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;

    #[test]
    fn test_blank_input_is_skipped() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   \t"), None);
    }

    #[test]
    fn test_dot_commands() {
        assert_eq!(Command::parse(".help"), Some(Command::Help));
        assert_eq!(Command::parse(".tables"), Some(Command::Tables));
        assert_eq!(Command::parse(".clear"), Some(Command::Clear));
        assert_eq!(Command::parse(".bail"), Some(Command::Bail(None)));
        assert_eq!(Command::parse(".bail on"), Some(Command::Bail(Some(true))));
        assert_eq!(Command::parse(".bail off"), Some(Command::Bail(Some(false))));
        assert_eq!(Command::parse(".quit"), Some(Command::Exit(0)));
        assert_eq!(Command::parse(".exit"), Some(Command::Exit(0)));
        assert_eq!(Command::parse(".exit 3"), Some(Command::Exit(3)));
    }

    #[test]
    fn test_bare_word_aliases() {
        assert_eq!(Command::parse("help"), Some(Command::Help));
        assert_eq!(Command::parse("clear"), Some(Command::Clear));
        assert_eq!(Command::parse("exit"), Some(Command::Exit(0)));
        assert_eq!(Command::parse(" quit "), Some(Command::Exit(0)));
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(
            Command::parse(".vfslist"),
            Some(Command::Unrecognized(".vfslist".into()))
        );
        assert_eq!(
            Command::parse(".exit soon"),
            Some(Command::Unrecognized(".exit soon".into()))
        );
    }

    #[tokio::test]
    async fn test_list_tables_fails_once_disconnected() -> Result<()> {
        let driver = Driver::connect(&common::DbConfig::default()).await?;
        driver.execute("CREATE TABLE users (id INT PRIMARY KEY)").await?;
        assert!(list_tables(&driver).await.is_ok());

        driver.shutdown().await?;
        let error = list_tables(&driver).await.map_err(report);
        assert!(error.is_err());
        Ok(())
    }

    #[test]
    fn test_everything_else_is_sql() {
        assert_eq!(
            Command::parse("SELECT * FROM users;  "),
            Some(Command::Sql("SELECT * FROM users;".into()))
        );
    }
}
