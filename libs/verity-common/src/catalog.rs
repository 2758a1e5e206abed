// Read-only challenge catalog, keyed by slug
use crate::types::Challenge;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct ChallengesJson {
    challenges: Vec<Challenge>,
}

/// In-memory catalog, loaded once and never mutated
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    challenges: BTreeMap<String, Challenge>,
}

impl Catalog {
    /// Load the catalog from a `{"challenges": [...]}` JSON file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Challenge catalog not found: {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_json(&content)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let parsed: ChallengesJson =
            serde_json::from_str(content).context("Failed to parse challenge catalog")?;

        Self::from_challenges(parsed.challenges)
    }

    pub fn from_challenges(challenges: Vec<Challenge>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for challenge in challenges {
            if challenge.slug.trim().is_empty() {
                bail!("Challenge '{}' has an empty slug", challenge.title);
            }
            let slug = challenge.slug.clone();
            if map.insert(slug.clone(), challenge).is_some() {
                bail!("Duplicate challenge slug: {}", slug);
            }
        }

        tracing::debug!(challenges = map.len(), "Challenge catalog loaded");

        Ok(Self { challenges: map })
    }

    pub fn get(&self, slug: &str) -> Option<&Challenge> {
        self.challenges.get(slug)
    }

    /// All challenges, ordered by slug
    pub fn iter(&self) -> impl Iterator<Item = &Challenge> {
        self.challenges.values()
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }
}
