use anyhow::{Context, Result};
use std::str::FromStr;

/// One band of the category table. A band covers `(min_rating, max_rating]`;
/// the first band of a table also includes its `min_rating`.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBand {
    pub name: String,
    pub min_rating: f64,
    pub max_rating: f64,
}

impl CategoryBand {
    pub fn new(name: &str, min_rating: f64, max_rating: f64) -> Self {
        Self {
            name: name.to_string(),
            min_rating,
            max_rating,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RatingSettings {
    pub initial_rating: f64,
    pub k_factor: f64,
    pub rating_scale: f64,
    pub min_rating: f64,
    pub max_rating: f64,
    pub categories: Vec<CategoryBand>,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            initial_rating: 1000.0,
            k_factor: 32.0,
            rating_scale: 400.0,
            min_rating: 100.0,
            max_rating: 3000.0,
            categories: vec![
                CategoryBand::new("beginner", 0.0, 1200.0),
                CategoryBand::new("intermediate", 1200.0, 1800.0),
                CategoryBand::new("advanced", 1800.0, 2400.0),
                CategoryBand::new("elite", 2400.0, 3000.0),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub database_path: String,
    pub cors_origins: Vec<String>,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            database_path: "spinmaster.db".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8000".to_string(),
            ],
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub rating: RatingSettings,
    pub server: ServerSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by whatever is set in the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, so that
    /// tests do not need to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(path) = lookup("DATABASE_PATH") {
            config.server.database_path = path;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            config.server.cors_origins = parse_origins(&origins);
        }

        override_with(&lookup, "INITIAL_RATING", &mut config.rating.initial_rating)?;
        override_with(&lookup, "K_FACTOR", &mut config.rating.k_factor)?;
        override_with(&lookup, "MIN_RATING", &mut config.rating.min_rating)?;
        override_with(&lookup, "MAX_RATING", &mut config.rating.max_rating)?;

        Ok(config)
    }
}

fn override_with<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw))?;
    }
    Ok(())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
