use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;

use crate::auth::PasswordHasher;
use crate::cli::utils::{connect, load_config, output_success};
use crate::cli::OutputFormat;
use crate::database::models::NewUser;
use crate::database::{schema, PgStore};
use crate::services::CredentialStore;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create the users, posts, comments and likes tables")]
    Init {
        #[arg(long, help = "Drop existing tables first (destroys all data)")]
        reset: bool,
    },

    #[command(about = "Insert the example divers, skipping emails already present")]
    Seed,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config()?;
    let pool = connect(&config).await?;

    match cmd {
        DbCommands::Init { reset } => {
            if reset {
                schema::reset_schema(&pool).await?;
            } else {
                schema::ensure_schema(&pool).await?;
            }

            let message = if reset { "Schema reset" } else { "Schema ready" };
            output_success(output_format, message, Some(json!({ "reset": reset })))
        }
        DbCommands::Seed => {
            schema::ensure_schema(&pool).await?;

            let credentials = CredentialStore::new(
                Arc::new(PgStore::new(pool)),
                PasswordHasher::new(config.security.bcrypt_cost),
            );

            let mut created = Vec::new();
            let mut skipped = Vec::new();
            for diver in example_divers() {
                if credentials.find_by_email(&diver.email).await?.is_some() {
                    skipped.push(diver.email);
                    continue;
                }
                let id = credentials.insert(&diver).await?;
                tracing::info!("Seeded user {} ({})", id, diver.email);
                created.push(json!({ "id": id, "email": diver.email }));
            }

            output_success(
                output_format,
                &format!("Seeded {} users ({} already present)", created.len(), skipped.len()),
                Some(json!({ "created": created, "skipped": skipped })),
            )
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn diver(
    first_name: &str,
    last_name: &str,
    email: &str,
    (latitude, longitude): (f64, f64),
    age: i32,
    password: &str,
    bio: &str,
    avatar: &str,
) -> NewUser {
    NewUser {
        first_name: first_name.into(),
        last_name: last_name.into(),
        email: email.into(),
        latitude,
        longitude,
        age,
        password: password.into(),
        bio: Some(bio.into()),
        avatar: Some(avatar.into()),
    }
}

fn example_divers() -> Vec<NewUser> {
    vec![
        diver(
            "Thad",
            "Sandidge",
            "thad@example.com",
            (37.7749, -122.4194),
            30,
            "password123",
            "A passionate diver exploring the world's oceans.",
            "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=400&fit=crop",
        ),
        diver(
            "Maya",
            "Kensington",
            "maya@example.com",
            (34.0522, -118.2437),
            27,
            "securepass",
            "Marine biologist and adventure seeker.",
            "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=400&fit=crop",
        ),
        diver(
            "Liam",
            "O'Connor",
            "liam@example.com",
            (40.7128, -74.0060),
            35,
            "liamrules",
            "Underwater photographer and explorer.",
            "https://images.unsplash.com/photo-1534528741775-53994a69daeb?w=400&fit=crop",
        ),
    ]
}
