use crate::model::RepoModel;
use crate::policy::EffectiveConfig;
use policyguard_types::Finding;

mod managed_settings;
mod ownership;
mod repo;
mod settings;
mod utils;
mod workflows;

#[cfg(test)]
mod tests;

pub use ownership::{REQUIRED_GUIDANCE_PHRASES, REQUIRED_OWNERSHIP_PATTERNS};
pub use settings::{
    DANGEROUS_COMMAND_DENIALS, MIN_PACKAGE_DENIALS, REQUIRED_DOMAINS, SENSITIVE_PATH_DENIALS,
};

pub fn run_all(model: &RepoModel, cfg: &EffectiveConfig, out: &mut Vec<Finding>) {
    repo::run(model, cfg, out);
    settings::run(model, cfg, out);
    ownership::run(model, cfg, out);
    workflows::run(model, cfg, out);
    managed_settings::run(model, cfg, out);
}
