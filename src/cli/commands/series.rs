use clap::{Args, Subcommand};
use serde_json::json;

use crate::cli::utils::{output_empty_collection, output_json, output_success, series_table};
use crate::cli::{Context, OutputFormat};
use crate::database::models::SeriesInput;

#[derive(Args)]
pub struct SeriesFields {
    #[arg(long, help = "Display name")]
    pub name: String,
    #[arg(long, allow_hyphen_values = true, help = "Lowest accepted value")]
    pub min: f64,
    #[arg(long, allow_hyphen_values = true, help = "Highest accepted value")]
    pub max: f64,
    #[arg(long, help = "Color, e.g. #ff0000")]
    pub color: Option<String>,
    #[arg(long, help = "Icon name")]
    pub icon: Option<String>,
}

impl From<SeriesFields> for SeriesInput {
    fn from(fields: SeriesFields) -> Self {
        SeriesInput {
            name: Some(fields.name),
            min_value: Some(fields.min),
            max_value: Some(fields.max),
            color: fields.color,
            icon: fields.icon,
        }
    }
}

#[derive(Subcommand)]
pub enum SeriesCommands {
    #[command(about = "List all series")]
    List,

    #[command(about = "Create a series")]
    Add(SeriesFields),

    #[command(about = "Replace a series' fields")]
    Edit {
        #[arg(help = "Series id")]
        id: i32,
        #[command(flatten)]
        fields: SeriesFields,
    },

    #[command(about = "Delete a series and all its measurements")]
    Delete {
        #[arg(help = "Series id")]
        id: i32,
    },
}

pub async fn handle(cmd: SeriesCommands, ctx: &mut Context) -> anyhow::Result<()> {
    match cmd {
        SeriesCommands::List => {
            let series = ctx.client.list_series().await?;
            if series.is_empty() {
                return output_empty_collection(ctx.format, "series", "No series defined");
            }
            match ctx.format {
                OutputFormat::Json => output_json(&series),
                OutputFormat::Text => {
                    print!("{}", series_table(&series));
                    Ok(())
                }
            }
        }
        SeriesCommands::Add(fields) => {
            let series = ctx.client.create_series(&fields.into()).await?;
            output_success(
                ctx.format,
                &format!("Created series '{}' (id {})", series.name, series.id),
                Some(json!({ "series": series })),
            )
        }
        SeriesCommands::Edit { id, fields } => {
            let series = ctx.client.update_series(id, &fields.into()).await?;
            output_success(
                ctx.format,
                &format!("Updated series '{}' (id {})", series.name, series.id),
                Some(json!({ "series": series })),
            )
        }
        SeriesCommands::Delete { id } => {
            let deleted = ctx.client.delete_series(id).await?;
            output_success(
                ctx.format,
                &format!("Deleted series '{}' and its measurements", deleted.name),
                Some(json!({ "deleted": deleted })),
            )
        }
    }
}
