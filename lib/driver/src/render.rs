use execution::{ExecutionError, QueryOutput};
use owo_colors::OwoColorize;
use prettytable::{format::consts::FORMAT_NO_LINESEP_WITH_TITLE, Cell, Row as TableRow, Table};
use ty::Row;

pub fn render_output(output: &QueryOutput) -> String {
    match output {
        QueryOutput::Rows(rows) if rows.is_empty() => "(0 rows)".to_string(),
        QueryOutput::Rows(rows) => format!("{}({} rows)", render_table(rows), rows.len()),
        QueryOutput::Status { message, .. } => format!("SUCCESS: {}", message),
    }
}

/// Lays rows out under the union of their keys, in first-seen order. A key a
/// row lacks renders as an empty cell.
pub fn render_table(rows: &[Row]) -> Table {
    let mut headers: Vec<&str> = Vec::new();
    for key in rows.iter().flat_map(|row| row.keys()) {
        if !headers.contains(&key) {
            headers.push(key);
        }
    }

    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(TableRow::new(headers.iter().map(|h| Cell::new(h)).collect()));
    for row in rows {
        table.add_row(TableRow::new(
            headers
                .iter()
                .map(|key| match row.get(key) {
                    Some(value) => Cell::new(&value.to_string()),
                    None => Cell::new(""),
                })
                .collect(),
        ));
    }
    table
}

/// Parse errors render as a source diagnostic, everything else as a single
/// colored line.
pub fn render_error(sql: &str, error: &ExecutionError) -> String {
    if let ExecutionError::Parse(parse_error) = error {
        let mut buffer = Vec::new();
        if compile::report_errors(&mut buffer, sql, std::slice::from_ref(parse_error)).is_ok() {
            return String::from_utf8_lossy(&buffer).into_owned();
        }
    }
    format!("{} {}", "Error:".red().bold(), error)
}

/// Failures outside statement execution, such as shell commands.
pub fn render_failure(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}
