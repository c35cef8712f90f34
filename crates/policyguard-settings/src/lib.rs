//! Config parsing and profile/preset resolution.
//!
//! This crate is IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{CONFIG_SCHEMA_V1, CheckConfig, PathsConfig, PolicyguardConfigV1};
pub use presets::PROFILES;
pub use resolve::{Overrides, ResolvedConfig};

/// Parse `policyguard.toml` into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<PolicyguardConfigV1> {
    let cfg: PolicyguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the engine (profile + overrides + per-check config + paths).
pub fn resolve_config(
    cfg: PolicyguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
