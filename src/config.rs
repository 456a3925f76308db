use anyhow::Result;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use crate::db::StoreType;
use crate::error::SeedError;

const APP_NAME: &str = "rsvp-seed";
const DEFAULT_SQLITE_PATH: &str = "dev/sqlite/rsvp.db";

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "rsvp-seed")]
#[command(about = "Seed an event's RSVP table with sample guest responses", long_about = None)]
pub struct Args {
    /// Backend to write to
    #[arg(long, value_enum, default_value = "supabase")]
    pub store: StoreType,

    /// YAML guest list; the bundled wedding sample when omitted
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Host email of the target event; overrides the guest list's host_email
    #[arg(long)]
    pub host_email: Option<String>,

    /// Seed for reproducible created_at values
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, env = "SUPABASE_URL", hide_env_values = true)]
    pub supabase_url: Option<String>,

    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "RSVP_SEED_SQLITE")]
    pub sqlite_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreSettings {
    Supabase { url: String, key: String },
    Postgres { url: String },
    Sqlite { path: PathBuf },
}

impl StoreSettings {
    pub fn store_type(&self) -> StoreType {
        match self {
            StoreSettings::Supabase { .. } => StoreType::Supabase,
            StoreSettings::Postgres { .. } => StoreType::Postgres,
            StoreSettings::Sqlite { .. } => StoreType::Sqlite,
        }
    }
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store: StoreSettings,
    pub dataset: Option<PathBuf>,
    pub host_email: Option<String>,
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, SeedError> {
        let store = match args.store {
            StoreType::Supabase => match (non_blank(args.supabase_url), non_blank(args.supabase_key)) {
                (Some(url), Some(key)) => StoreSettings::Supabase { url, key },
                _ => {
                    return Err(SeedError::MissingConfiguration(
                        "SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY environment variables are required"
                            .into(),
                    ))
                }
            },
            StoreType::Postgres => match non_blank(args.database_url) {
                Some(url) => StoreSettings::Postgres { url },
                None => {
                    return Err(SeedError::MissingConfiguration(
                        "DATABASE_URL environment variable is required for the postgres store".into(),
                    ))
                }
            },
            StoreType::Sqlite => StoreSettings::Sqlite {
                path: args
                    .sqlite_path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_PATH)),
            },
        };

        Ok(Self {
            store,
            dataset: args.dataset,
            host_email: non_blank(args.host_email),
            seed: args.seed,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Return the application config directory path, creating it if missing.
pub fn get_app_config_path() -> Result<PathBuf> {
    let mut path = if cfg!(target_os = "macos") {
        dirs_next::home_dir().map(|h| h.join(".config"))
    } else {
        dirs_next::config_dir()
    }
    .ok_or_else(|| anyhow::anyhow!("failed to find os config dir."))?;

    path.push(APP_NAME);
    fs::create_dir_all(&path)?;
    Ok(path)
}
