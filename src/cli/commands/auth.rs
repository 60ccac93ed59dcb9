use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_json, output_success, value_or_prompt};
use crate::cli::{Context, OutputFormat};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, env = "MEASURE_PASSWORD", help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, env = "MEASURE_PASSWORD", help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Forget the stored token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Change the password of the logged-in user")]
    Passwd {
        #[arg(long, help = "Current password (will prompt if not provided)")]
        old: Option<String>,
        #[arg(long, help = "New password (will prompt if not provided)")]
        new: Option<String>,
    },
}

pub async fn handle(cmd: AuthCommands, ctx: &mut Context) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { username, password } => {
            let password = value_or_prompt(password, "Password")?;
            let result = ctx.client.login(&username, &password).await?;
            ctx.session.username = Some(result.user.username.clone());
            output_success(
                ctx.format,
                &format!("Logged in as {}", result.user.username),
                Some(json!({ "user": result.user })),
            )
        }
        AuthCommands::Register { username, password } => {
            let password = value_or_prompt(password, "Password")?;
            let message = ctx.client.register(&username, &password).await?;
            output_success(ctx.format, &message, Some(json!({ "username": username })))
        }
        AuthCommands::Logout => {
            ctx.client.logout();
            output_success(ctx.format, "Logged out", None)
        }
        AuthCommands::Status => {
            let logged_in = ctx.client.is_authenticated();
            match ctx.format {
                OutputFormat::Json => output_json(&json!({
                    "server": ctx.session.server_url,
                    "authenticated": logged_in,
                    "username": ctx.session.username,
                })),
                OutputFormat::Text => {
                    println!("Server: {}", ctx.session.server_url);
                    match (&ctx.session.username, logged_in) {
                        (Some(user), true) => println!("Logged in as {}", user),
                        (None, true) => println!("Logged in"),
                        _ => println!("Not logged in"),
                    }
                    Ok(())
                }
            }
        }
        AuthCommands::Passwd { old, new } => {
            let old = value_or_prompt(old, "Current password")?;
            let new = value_or_prompt(new, "New password")?;
            let message = ctx.client.change_password(&old, &new).await?;
            output_success(ctx.format, &message, None)
        }
    }
}
