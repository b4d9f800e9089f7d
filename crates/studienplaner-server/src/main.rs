//! studienplaner server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, and serves the JSON API over HTTP.
//!
//! # First administrator
//!
//! Registering users needs an ADMIN, so the first one is created directly in
//! the store:
//!
//! ```text
//! cargo run -p studienplaner-server -- --create-admin
//! ```

mod settings;

use std::{
  io::{self, BufRead, Write},
  path::PathBuf,
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use studienplaner_api::auth::hash_password;
use studienplaner_core::{
  service::Services,
  store::CourseStore,
  user::{NewUser, Role},
};
use studienplaner_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Studienplaner course-management server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Prompt for an administrator on stdin, store it, and exit.
  #[arg(long)]
  create_admin: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store_path = server_cfg.resolved_store_path();
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if cli.create_admin {
    return create_admin(&store).await;
  }

  let services = Arc::new(Services::new(Arc::new(store)));
  let app = Router::new()
    .nest("/api", studienplaner_api::api_router(services))
    .layer(TraceLayer::new_for_http());

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}/api");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read the administrator's details from stdin and insert them, bypassing
/// the access checks that would otherwise require an existing ADMIN.
async fn create_admin(store: &SqliteStore) -> anyhow::Result<()> {
  let name = prompt("Name")?;
  let surname = prompt("Surname")?;
  let email = prompt("Email")?;
  let password = prompt("Password")?;
  anyhow::ensure!(!email.is_empty(), "email must not be empty");
  anyhow::ensure!(!password.is_empty(), "password must not be empty");

  let password_hash = hash_password(&password).context("failed to hash password")?;
  let user = store
    .insert_user(NewUser { name, surname, role: Role::Admin, email, password_hash })
    .await
    .map_err(studienplaner_core::Error::from)
    .context("failed to store administrator")?;

  tracing::info!(user_id = %user.user_id, email = %user.email, "administrator created");
  println!("{}", user.user_id);
  Ok(())
}

fn prompt(label: &str) -> anyhow::Result<String> {
  print!("{label}: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
