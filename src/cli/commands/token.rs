use clap::Subcommand;
use serde_json::json;

use crate::auth::TokenService;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a token for a user id and email")]
    Issue {
        #[arg(long, help = "Numeric user id placed in the token subject")]
        user_id: i32,
        #[arg(long, help = "Email claim")]
        email: String,
    },

    #[command(about = "Verify a token and print its claims")]
    Verify {
        #[arg(help = "Token to verify, with or without a 'Bearer ' prefix")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    // Only the security section matters here; no database is needed
    let config = AppConfig::from_env();
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET is not set");
    }
    let tokens = TokenService::from_config(&config.security);

    match cmd {
        TokenCommands::Issue { user_id, email } => {
            let token = tokens.issue(user_id, &email)?;
            match output_format {
                OutputFormat::Json => output_success(
                    output_format,
                    "Token issued",
                    Some(json!({ "token": token, "user_id": user_id })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        TokenCommands::Verify { token } => {
            let token = token.strip_prefix("Bearer ").unwrap_or(&token).trim();
            match tokens.verify(token) {
                Ok(claims) => {
                    let message = format!("Valid token for user {} ({})", claims.user_id, claims.email);
                    output_success(output_format, &message, Some(json!({ "claims": claims })))
                }
                Err(e) => {
                    output_error(output_format, &e.to_string(), Some("TOKEN_INVALID"))?;
                    anyhow::bail!("token verification failed")
                }
            }
        }
    }
}
