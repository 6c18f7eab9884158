// Profile remap configuration.
//
// Cluster IDs from the upstream model are arbitrary, so each deployment
// pins the clusters it cares about to a display rank. The table can be
// replaced with a JSON file without touching the code.
use crate::error::{DashboardError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSpec {
    /// Display label, e.g. `"1"`.
    pub rank: String,
    pub cluster_id: i64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub profiles: Vec<ProfileSpec>,
}

static DEFAULT_PROFILES: Lazy<ProfileConfig> = Lazy::new(|| ProfileConfig {
    profiles: vec![
        ProfileSpec {
            rank: "1".to_string(),
            cluster_id: 8,
            description: Some("Homens jovens de 0 a 18 anos".to_string()),
        },
        ProfileSpec {
            rank: "2".to_string(),
            cluster_id: 1,
            description: Some("Homens mais velhos, prioritariamente de 59 anos ou mais".to_string()),
        },
        ProfileSpec {
            rank: "3".to_string(),
            cluster_id: 7,
            description: Some("Mulheres entre 34 e 43 ou de 59 ou mais".to_string()),
        },
    ],
});

impl Default for ProfileConfig {
    fn default() -> Self {
        DEFAULT_PROFILES.clone()
    }
}

impl ProfileConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: ProfileConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Ranks and cluster IDs must each be unique.
    pub fn validate(&self) -> Result<()> {
        let mut ranks = HashSet::new();
        let mut clusters = HashSet::new();
        for p in &self.profiles {
            if !ranks.insert(p.rank.as_str()) {
                return Err(DashboardError::Config(format!("duplicate rank {:?}", p.rank)));
            }
            if !clusters.insert(p.cluster_id) {
                return Err(DashboardError::Config(format!("cluster {} mapped twice", p.cluster_id)));
            }
        }
        Ok(())
    }

    pub fn cluster_ids(&self) -> HashSet<i64> {
        self.profiles.iter().map(|p| p.cluster_id).collect()
    }
}
