use std::io::{self, BufRead, Write};

use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::database::models::{MeasurementView, Series};

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": false,
                "error": message
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Print a value as pretty JSON
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ collection_name: [] }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

pub fn series_table(series: &[Series]) -> String {
    let mut out = format!(
        "{:>5}  {:<24} {:>12} {:>12}  {:<8} {}\n",
        "ID", "NAME", "MIN", "MAX", "COLOR", "ICON"
    );
    for s in series {
        out.push_str(&format!(
            "{:>5}  {:<24} {:>12} {:>12}  {:<8} {}\n",
            s.id,
            s.name,
            s.min_value,
            s.max_value,
            s.color.as_deref().unwrap_or("-"),
            s.icon.as_deref().unwrap_or("")
        ));
    }
    out
}

/// Measurement rows, newest first as returned; `highlight` marks one row.
pub fn measurement_table(rows: &[MeasurementView], highlight: Option<i32>) -> String {
    let mut out = format!(
        "  {:>6}  {:<25} {:<20} {:>12}\n",
        "ID", "TIMESTAMP", "SERIES", "VALUE"
    );
    for row in rows {
        let marker = if highlight == Some(row.id) { '>' } else { ' ' };
        out.push_str(&format!(
            "{} {:>6}  {:<25} {:<20} {:>12}\n",
            marker,
            row.id,
            row.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            row.series_name,
            row.value
        ));
    }
    out
}

/// Read a secret from stdin after printing a prompt to stderr.
pub fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Use the given value or ask for it.
pub fn value_or_prompt(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt(label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn measurement_table_marks_highlighted_row() {
        let rows = vec![
            MeasurementView {
                id: 2,
                value: 21.5,
                timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap(),
                series_id: 1,
                series_name: "Temp".into(),
                color: None,
            },
            MeasurementView {
                id: 1,
                value: 19.0,
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
                series_id: 1,
                series_name: "Temp".into(),
                color: None,
            },
        ];
        let table = measurement_table(&rows, Some(1));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("  "));
        assert!(lines[2].starts_with("> "));
        assert!(lines[1].contains("2024-01-02 08:00:00 UTC"));
        assert!(lines[1].contains("21.5"));
    }

    #[test]
    fn series_table_shows_defaults() {
        let table = series_table(&[Series {
            id: 3,
            name: "Humidity".into(),
            min_value: 0.0,
            max_value: 100.0,
            color: None,
            icon: None,
        }]);
        assert!(table.lines().nth(1).unwrap().contains("Humidity"));
        assert!(table.contains(" - "));
    }
}
