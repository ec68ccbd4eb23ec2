//! Facade declarations and description tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog verbosity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailTier {
    /// Every facade, with per-action signatures.
    #[default]
    Full,
    /// Every facade, short descriptions.
    Compact,
    /// Only micro-eligible facades, short descriptions.
    Micro,
}

impl DetailTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailTier::Full => "full",
            DetailTier::Compact => "compact",
            DetailTier::Micro => "micro",
        }
    }

    /// Whether `facade` is advertised at this tier.
    pub fn includes(&self, facade: &FacadeSpec) -> bool {
        match self {
            DetailTier::Full | DetailTier::Compact => true,
            DetailTier::Micro => facade.micro_eligible,
        }
    }
}

impl fmt::Display for DetailTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(DetailTier::Full),
            "compact" => Ok(DetailTier::Compact),
            "micro" => Ok(DetailTier::Micro),
            other => Err(format!("unknown detail tier: {}", other)),
        }
    }
}

/// An externally advertised tool bundling internal tools behind `action`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacadeSpec {
    pub name: String,
    /// Long description; its first sentence heads the full-tier text.
    pub description: String,
    pub compact_description: String,
    /// `(action, internal tool)` pairs in declared order.
    pub actions: Vec<(String, String)>,
    pub micro_eligible: bool,
}

impl FacadeSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        compact_description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            compact_description: compact_description.into(),
            actions: Vec::new(),
            micro_eligible: false,
        }
    }

    /// Map `action` to internal tool `tool`.
    pub fn action(mut self, action: impl Into<String>, tool: impl Into<String>) -> Self {
        self.actions.push((action.into(), tool.into()));
        self
    }

    pub fn micro(mut self, eligible: bool) -> Self {
        self.micro_eligible = eligible;
        self
    }

    /// Internal tool behind `action`.
    pub fn tool_for(&self, action: &str) -> Option<&str> {
        self.actions
            .iter()
            .find(|(a, _)| a == action)
            .map(|(_, t)| t.as_str())
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|(a, _)| a.as_str()).collect()
    }
}
