//! Output formatters for ordering reports.

use std::io::Write;

use serde_json::Value;

use crate::config::OutputFormat;
use crate::core::Result;
use crate::report::OrderReport;

/// Output format enum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Text,
    Json,
    Markdown,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Format::Text,
            OutputFormat::Json => Format::Json,
            OutputFormat::Markdown => Format::Markdown,
        }
    }
}

impl Format {
    pub fn write_report<W: Write>(&self, report: &OrderReport, writer: &mut W) -> Result<()> {
        match self {
            Format::Text => format_text(report, writer),
            Format::Json => format_json(&serde_json::to_value(report)?, writer),
            Format::Markdown => {
                writeln!(writer, "# Test Order\n")?;
                format_value_as_markdown(&serde_json::to_value(report)?, writer, 1)
            }
        }
    }
}

fn format_json<W: Write>(value: &Value, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// The console layout: the history as loaded, then the run order.
fn format_text<W: Write>(report: &OrderReport, writer: &mut W) -> Result<()> {
    writeln!(
        writer,
        "FailureLedger({} executions of {} tests):",
        report.executions, report.tests
    )?;
    if let Some(history) = &report.history {
        for record in history {
            writeln!(writer, "{record}")?;
        }
    }
    writeln!(writer, "Summary: {}", report.summary)?;
    writeln!(writer, "Test ordering: {}", join(&report.order))?;
    if let Some(names) = &report.named_order {
        writeln!(writer, "Named ordering: {}", join(names))?;
    }
    Ok(())
}

fn join<T: ToString>(items: &[T]) -> String {
    let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

fn format_value_as_markdown<W: Write>(value: &Value, writer: &mut W, depth: usize) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let header_level = "#".repeat((depth + 1).min(6));
                match val {
                    Value::Object(_) | Value::Array(_) => {
                        writeln!(writer, "{} {}\n", header_level, format_key(key))?;
                        format_value_as_markdown(val, writer, depth + 1)?;
                    }
                    _ => {
                        writeln!(writer, "**{}**: {}\n", format_key(key), format_scalar(val))?;
                    }
                }
            }
        }
        Value::Array(arr) => {
            if arr.is_empty() {
                writeln!(writer, "_No items_\n")?;
            } else if arr.iter().all(is_scalar) {
                writeln!(writer, "{}\n", format_scalar_list(arr))?;
            } else if arr.iter().all(is_scalar_list) {
                for item in arr {
                    if let Value::Array(row) = item {
                        writeln!(writer, "- {}", format_scalar_list(row))?;
                    }
                }
                writeln!(writer)?;
            } else if is_table_compatible(arr) {
                format_as_table(arr, writer)?;
            } else {
                for item in arr {
                    writeln!(writer, "---\n")?;
                    format_value_as_markdown(item, writer, depth)?;
                }
            }
        }
        _ => {
            writeln!(writer, "{}\n", format_scalar(value))?;
        }
    }
    Ok(())
}

fn format_key(key: &str) -> String {
    key.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
        Value::Null => "-".to_string(),
        _ => value.to_string(),
    }
}

fn format_scalar_list(values: &[Value]) -> String {
    let parts: Vec<String> = values.iter().map(format_scalar).collect();
    format!("[{}]", parts.join(", "))
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn is_scalar_list(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.iter().all(is_scalar))
}

fn is_table_compatible(arr: &[Value]) -> bool {
    arr.iter().all(|v| {
        if let Value::Object(map) = v {
            map.values().all(is_scalar)
        } else {
            false
        }
    })
}

fn format_as_table<W: Write>(arr: &[Value], writer: &mut W) -> Result<()> {
    // Headers come from the first object
    let headers: Vec<&str> = match arr.first() {
        Some(Value::Object(map)) => map.keys().map(|s| s.as_str()).collect(),
        _ => return Ok(()),
    };

    write!(writer, "|")?;
    for header in &headers {
        write!(writer, " {} |", format_key(header))?;
    }
    writeln!(writer)?;

    write!(writer, "|")?;
    for _ in &headers {
        write!(writer, " --- |")?;
    }
    writeln!(writer)?;

    for item in arr {
        if let Value::Object(map) = item {
            write!(writer, "|")?;
            for header in &headers {
                let value = map.get(*header).unwrap_or(&Value::Null);
                write!(writer, " {} |", format_scalar(value))?;
            }
            writeln!(writer)?;
        }
    }

    writeln!(writer)?;
    Ok(())
}
