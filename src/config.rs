use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::directory::User;
use crate::validate;

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// One seed directory entry from config. Avatar is optional; missing
/// avatars get the built-in round-robin assignment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Users the directory starts with each session.
    #[serde(default = "default_seed")]
    pub seed: Vec<SeedUser>,

    /// Simulated latency before an add/edit completes, in milliseconds.
    /// Zero disables the delay entirely.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Where session transcripts go. Defaults to .roster/sessions under
    /// the working directory.
    #[serde(default)]
    pub transcripts_dir: Option<PathBuf>,
}

fn default_latency_ms() -> u64 {
    600
}

fn default_seed() -> Vec<SeedUser> {
    let entries = [
        (1, "Praveen", "praveen@gmail.com", "👨‍💻"),
        (2, "Rahul", "rahul@gmail.com", "👨‍🎓"),
        (3, "Priya", "priya@gmail.com", "👩‍💼"),
        (4, "Amit", "amit@gmail.com", "👨‍🔧"),
    ];
    entries
        .iter()
        .map(|(id, name, email, avatar)| SeedUser {
            id: *id,
            name: name.to_string(),
            email: email.to_string(),
            avatar: Some(avatar.to_string()),
        })
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            latency_ms: default_latency_ms(),
            transcripts_dir: None,
        }
    }
}

impl Config {
    /// Load from .roster/config.toml under `root`, falling back to the
    /// built-in defaults when no config file exists.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(".roster").join("config.toml");
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Check the seed list: ids positive and unique, every entry passing
    /// the same form validation an interactive add would.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for (i, entry) in self.seed.iter().enumerate() {
            let field = format!("seed[{}]", i);
            if entry.id == 0 {
                errors.push(ValidationError {
                    field: format!("{}.id", field),
                    message: "id must be positive".to_string(),
                });
            }
            if !seen.insert(entry.id) {
                errors.push(ValidationError {
                    field: format!("{}.id", field),
                    message: format!("duplicate id {}", entry.id),
                });
            }
            let v = validate::validate(&entry.name, &entry.email);
            if let Some(e) = v.name_error {
                errors.push(ValidationError {
                    field: format!("{}.name", field),
                    message: e.message().to_string(),
                });
            }
            if let Some(e) = v.email_error {
                errors.push(ValidationError {
                    field: format!("{}.email", field),
                    message: e.message().to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Materialize the seed list as directory users.
    pub fn seed_users(&self) -> Vec<User> {
        const AVATAR_FALLBACK: &[&str] = &[
            "👨‍💻", "👩‍💻", "👨‍🎓", "👩‍🎓", "👨‍💼", "👩‍💼", "👨‍🔧", "👩‍🔧", "👨‍🍳", "👩‍🍳",
        ];
        self.seed
            .iter()
            .map(|s| User {
                id: s.id,
                name: s.name.trim().to_string(),
                email: s.email.trim().to_string(),
                avatar: s.avatar.clone().unwrap_or_else(|| {
                    AVATAR_FALLBACK[(s.id as usize - 1) % AVATAR_FALLBACK.len()].to_string()
                }),
            })
            .collect()
    }
}
