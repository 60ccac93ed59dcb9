pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use config::Session;

#[derive(Parser)]
#[command(name = "measure")]
#[command(about = "Measure CLI - Command-line client for the Measurement API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "MEASURE_API_URL",
        help = "Server URL (defaults to the saved session, then http://localhost:3001)"
    )]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Login, registration and password management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Series definitions and their value ranges")]
    Series {
        #[command(subcommand)]
        cmd: commands::series::SeriesCommands,
    },

    #[command(about = "Record, edit and list measurements")]
    Measurements {
        #[command(subcommand)]
        cmd: commands::measurements::MeasurementCommands,
    },

    #[command(about = "Filtered measurement table with series selection and highlighting")]
    Dashboard(commands::dashboard::DashboardArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command needs: the API client and the persisted session.
pub struct Context {
    pub client: ApiClient,
    pub session: Session,
    pub format: OutputFormat,
}

impl Context {
    /// Copy the client's token back into the session and write it out.
    pub fn persist(&mut self) -> anyhow::Result<()> {
        self.session.server_url = self.client.base_url().to_string();
        self.session.token = self.client.token().map(str::to_string);
        if self.session.token.is_none() {
            self.session.username = None;
        }
        config::save_session(&self.session)
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = OutputFormat::from_cli(&cli);
    let mut session = config::load_session()?;

    // Tokens belong to the server that issued them
    if let Some(server) = cli.server.as_deref() {
        if session.server_url.trim_end_matches('/') != server.trim_end_matches('/') {
            session = Session::for_server(server);
        }
    }

    let client = ApiClient::new(&session.server_url)?.with_token(session.token.clone());
    let mut ctx = Context {
        client,
        session,
        format,
    };

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &mut ctx).await,
        Commands::Series { cmd } => commands::series::handle(cmd, &mut ctx).await,
        Commands::Measurements { cmd } => commands::measurements::handle(cmd, &mut ctx).await,
        Commands::Dashboard(args) => commands::dashboard::handle(args, &mut ctx).await,
    };

    ctx.persist()?;
    result
}
