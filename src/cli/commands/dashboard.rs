use clap::Args;
use serde_json::json;

use crate::cli::utils::{measurement_table, output_json};
use crate::cli::{Context, OutputFormat};
use crate::client::Dashboard;

#[derive(Args)]
pub struct DashboardArgs {
    #[arg(long, value_delimiter = ',', help = "Only show these series (default: all)")]
    pub series: Vec<i32>,
    #[arg(long, help = "Earliest timestamp")]
    pub start: Option<String>,
    #[arg(long, help = "Latest timestamp")]
    pub end: Option<String>,
    #[arg(long, help = "Measurement id to highlight")]
    pub highlight: Option<i32>,
}

pub async fn handle(args: DashboardArgs, ctx: &mut Context) -> anyhow::Result<()> {
    let format = ctx.format;
    let mut dashboard = Dashboard::new(&mut ctx.client);

    dashboard.load().await?;
    if !args.series.is_empty() {
        dashboard.select_only(&args.series).await?;
    }
    if args.start.is_some() || args.end.is_some() {
        dashboard.set_time_range(args.start, args.end).await?;
    }
    if let Some(id) = args.highlight {
        dashboard.state.select_row(id);
    }

    let state = &dashboard.state;
    match format {
        OutputFormat::Json => output_json(&json!({
            "series": state.series,
            "selected": state.filters.selected,
            "start": state.filters.start,
            "end": state.filters.end,
            "measurements": state.measurements,
            "highlighted": state.highlighted_row(),
        })),
        OutputFormat::Text => {
            let names: Vec<String> = state
                .series
                .iter()
                .map(|s| {
                    let mark = if state.filters.selected.contains(&s.id) { 'x' } else { ' ' };
                    format!("[{}] {} ({})", mark, s.name, s.id)
                })
                .collect();
            println!("Series: {}", names.join("  "));
            if let (None, None) = (&state.filters.start, &state.filters.end) {
                println!("Time range: all");
            } else {
                println!(
                    "Time range: {} .. {}",
                    state.filters.start.as_deref().unwrap_or("*"),
                    state.filters.end.as_deref().unwrap_or("*")
                );
            }
            println!();
            if state.measurements.is_empty() {
                println!("No measurements found");
            } else {
                print!("{}", measurement_table(&state.measurements, state.highlighted));
            }
            if let Some(row) = state.highlighted_row() {
                println!();
                println!(
                    "Highlighted: #{} {} = {} at {}",
                    row.id,
                    row.series_name,
                    row.value,
                    row.timestamp.to_rfc3339()
                );
            }
            Ok(())
        }
    }
}
