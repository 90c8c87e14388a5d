//! Typed configuration loader.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` (selected by
//! `RUST_ENV`) + `HEARINGS_*` environment variables. Every knob has a
//! default, so a missing config file yields a working setup.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::types::PartyMatch;

/// Weights for fixed-weight rank fusion. A configuration surface, not
/// business logic; weights are renormalized over the signals a hit has.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusionWeights {
    pub keyword: f32,
    pub vector: f32,
    pub rerank: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            keyword: 0.4,
            vector: 0.4,
            rerank: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result count when the request does not specify `top`.
    pub default_top: usize,
    /// Server-enforced ceiling on `top`.
    pub max_top: usize,
    /// Character budget for result snippets.
    pub snippet_max_chars: usize,
    /// Ceiling on the context-window radius for evidence expansion.
    pub max_context_window: u32,
    pub fusion: FusionWeights,
    /// Party-name comparison mode for Protected A access.
    pub party_match: PartyMatch,
    pub index_timeout_ms: u64,
    pub embed_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top: 10,
            max_top: 50,
            snippet_max_chars: 500,
            max_context_window: 5,
            fusion: FusionWeights::default(),
            party_match: PartyMatch::default(),
            index_timeout_ms: 10_000,
            embed_timeout_ms: 10_000,
        }
    }
}

impl SearchConfig {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = std::env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("HEARINGS_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("failed to load search config: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.max_top == 0 || self.default_top == 0 {
            anyhow::bail!("top limits must be positive");
        }
        if self.default_top > self.max_top {
            anyhow::bail!("default_top must not exceed max_top");
        }
        if self.snippet_max_chars < 80 {
            anyhow::bail!("snippet_max_chars too small to hold a citation-worthy excerpt");
        }
        let w = &self.fusion;
        if w.keyword < 0.0 || w.vector < 0.0 || w.rerank < 0.0 {
            anyhow::bail!("fusion weights must be non-negative");
        }
        if w.keyword + w.vector + w.rerank <= 0.0 {
            anyhow::bail!("at least one fusion weight must be positive");
        }
        Ok(())
    }
}
