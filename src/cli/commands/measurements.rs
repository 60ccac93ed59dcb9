use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{measurement_table, output_empty_collection, output_json, output_success};
use crate::cli::{Context, OutputFormat};
use crate::client::ListParams;
use crate::services::{MeasurementInput, Numeric};

#[derive(Subcommand)]
pub enum MeasurementCommands {
    #[command(about = "List measurements, newest first")]
    List {
        #[arg(long, value_delimiter = ',', help = "Series ids, e.g. 1,2")]
        series: Vec<i32>,
        #[arg(long, help = "Earliest timestamp (RFC 3339, YYYY-MM-DDTHH:MM or YYYY-MM-DD)")]
        start: Option<String>,
        #[arg(long, help = "Latest timestamp")]
        end: Option<String>,
    },

    #[command(about = "Record a measurement")]
    Add {
        #[arg(long, help = "Series id")]
        series: i32,
        #[arg(long, allow_hyphen_values = true, help = "Measured value")]
        value: f64,
        #[arg(long, help = "Timestamp (defaults to now)")]
        timestamp: Option<String>,
    },

    #[command(about = "Replace a measurement")]
    Edit {
        #[arg(help = "Measurement id")]
        id: i32,
        #[arg(long, help = "Series id")]
        series: i32,
        #[arg(long, allow_hyphen_values = true, help = "Measured value")]
        value: f64,
        #[arg(long, help = "Timestamp")]
        timestamp: String,
    },

    #[command(about = "Delete a measurement")]
    Delete {
        #[arg(help = "Measurement id")]
        id: i32,
    },
}

pub fn measurement_input(series: i32, value: f64, timestamp: Option<String>) -> MeasurementInput {
    MeasurementInput {
        value: Some(Numeric::Number(value)),
        series_id: Some(Numeric::Number(f64::from(series))),
        timestamp,
    }
}

pub async fn handle(cmd: MeasurementCommands, ctx: &mut Context) -> anyhow::Result<()> {
    match cmd {
        MeasurementCommands::List { series, start, end } => {
            let params = ListParams {
                series_ids: series,
                start,
                end,
            };
            let rows = ctx.client.list_measurements(&params).await?;
            if rows.is_empty() {
                return output_empty_collection(ctx.format, "measurements", "No measurements found");
            }
            match ctx.format {
                OutputFormat::Json => output_json(&rows),
                OutputFormat::Text => {
                    print!("{}", measurement_table(&rows, None));
                    Ok(())
                }
            }
        }
        MeasurementCommands::Add { series, value, timestamp } => {
            let row = ctx
                .client
                .create_measurement(&measurement_input(series, value, timestamp))
                .await?;
            output_success(
                ctx.format,
                &format!("Recorded measurement {} = {}", row.id, row.value),
                Some(json!({ "measurement": row })),
            )
        }
        MeasurementCommands::Edit { id, series, value, timestamp } => {
            let row = ctx
                .client
                .update_measurement(id, &measurement_input(series, value, Some(timestamp)))
                .await?;
            output_success(
                ctx.format,
                &format!("Updated measurement {}", row.id),
                Some(json!({ "measurement": row })),
            )
        }
        MeasurementCommands::Delete { id } => {
            ctx.client.delete_measurement(id).await?;
            output_success(ctx.format, &format!("Deleted measurement {}", id), None)
        }
    }
}
