//! Report rendering for stdout.

use std::io::{self, Write};

use courtside_core::ApiError;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::metadata::ReportMeta;

/// One unit of command output.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub data: Value,
    pub errors: Vec<ApiError>,
}

/// Writes reports in the selected format and tallies warnings and errors.
#[derive(Debug)]
pub struct Renderer {
    format: OutputFormat,
    pretty: bool,
    warning_count: usize,
    error_count: usize,
}

impl Renderer {
    pub fn new(format: OutputFormat, pretty: bool) -> Self {
        Self {
            format,
            pretty,
            warning_count: 0,
            error_count: 0,
        }
    }

    pub fn emit(&mut self, report: &Report) -> Result<(), CliError> {
        self.warning_count += report.meta.warnings.len();
        self.error_count += report.errors.len();

        let rendered = render(report, self.format, self.pretty)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    pub const fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub const fn error_count(&self) -> usize {
        self.error_count
    }
}

/// Renders `report` to a newline-terminated string.
pub fn render(report: &Report, format: OutputFormat, pretty: bool) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => {
            let mut out = if pretty {
                serde_json::to_string_pretty(report)?
            } else {
                serde_json::to_string(report)?
            };
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Ndjson => render_ndjson(report),
        OutputFormat::Table => Ok(render_table(report)),
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum NdjsonLine<'a> {
    Meta { meta: &'a ReportMeta },
    Row { row: &'a Value },
    Error { error: &'a ApiError },
}

fn render_ndjson(report: &Report) -> Result<String, CliError> {
    let mut lines = vec![serde_json::to_string(&NdjsonLine::Meta { meta: &report.meta })?];
    for row in rows(&report.data) {
        lines.push(serde_json::to_string(&NdjsonLine::Row { row })?);
    }
    for error in &report.errors {
        lines.push(serde_json::to_string(&NdjsonLine::Error { error })?);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

/// The list a payload is "about": the payload itself if it is an array, its
/// only array field if it has exactly one, otherwise the payload as one row.
fn rows(data: &Value) -> Vec<&Value> {
    match data {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        Value::Object(fields) => {
            let mut arrays = fields.values().filter_map(Value::as_array);
            match (arrays.next(), arrays.next()) {
                (Some(items), None) => items.iter().collect(),
                _ => vec![data],
            }
        }
        scalar => vec![scalar],
    }
}

fn render_table(report: &Report) -> String {
    let mut out = String::new();

    let meta = &report.meta;
    out.push_str(&format!(
        "{} {} latency={}ms",
        meta.request_id, meta.endpoint, meta.latency_ms
    ));
    if let Some(status) = meta.status {
        out.push_str(&format!(" status={status}"));
    }
    if let Some(revision) = meta.revision {
        out.push_str(&format!(" revision={revision}"));
    }
    if let Some(remaining) = meta.rate_limit.and_then(|rate_limit| rate_limit.remaining) {
        out.push_str(&format!(" remaining={remaining}"));
    }
    out.push('\n');

    let cells = rows(&report.data)
        .into_iter()
        .map(flatten_row)
        .collect::<Vec<_>>();
    if !cells.is_empty() {
        out.push_str(&table(&cells));
    }

    for warning in &meta.warnings {
        out.push_str(&format!("warning: {warning}\n"));
    }
    for error in &report.errors {
        out.push_str(&format!("error {}: {}\n", error.code(), error.message()));
    }
    out
}

/// Scalar cells of a row; nested objects are flattened one level as `parent.child`.
fn flatten_row(row: &Value) -> Vec<(String, String)> {
    let Value::Object(fields) = row else {
        return vec![(String::from("value"), cell(row))];
    };

    let mut out = Vec::new();
    for (key, value) in fields {
        match value {
            Value::Object(nested) => push_scalars(&mut out, key, nested),
            Value::Array(_) => {}
            scalar => out.push((key.clone(), cell(scalar))),
        }
    }
    out
}

fn push_scalars(out: &mut Vec<(String, String)>, prefix: &str, fields: &Map<String, Value>) {
    for (key, value) in fields {
        if !value.is_object() && !value.is_array() {
            out.push((format!("{prefix}.{key}"), cell(value)));
        }
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn table(rows: &[Vec<(String, String)>]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for (name, _) in row {
            if !columns.contains(&name.as_str()) {
                columns.push(name);
            }
        }
    }

    let lookup = |row: &[(String, String)], column: &str| -> String {
        row.iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    };

    let widths = columns
        .iter()
        .map(|column| {
            rows.iter()
                .map(|row| lookup(row, column).chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    let line = |values: Vec<String>| -> String {
        let mut rendered = values
            .iter()
            .zip(&widths)
            .map(|(value, &width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        rendered.truncate(rendered.trim_end().len());
        rendered.push('\n');
        rendered
    };

    let mut out = line(columns.iter().map(|column| column.to_string()).collect());
    out.push_str(&line(widths.iter().map(|width| "-".repeat(*width)).collect()));
    for row in rows {
        out.push_str(&line(
            columns.iter().map(|column| lookup(row, column)).collect(),
        ));
    }
    out
}
