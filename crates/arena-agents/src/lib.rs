//! Debating agents for the arena engine.
//!
//! - [`template::TemplateAgent`]: canned phrases and a keyword-scoring judge
//! - [`remote::RemoteAgent`]: utterances and verdicts from a remote model
//!
//! Both are built over the same fixed [`roster::PROFILES`].

pub mod config;
pub mod prompts;
pub mod remote;
pub mod roster;
pub mod template;

use std::path::Path;
use std::sync::Arc;

use arena_engine::{AgentError, SharedAgent};

use crate::config::{AgentKind, RemoteSettings};
use crate::remote::{RemoteAgent, ResponsesClient};
use crate::roster::PROFILES;
use crate::template::TemplateAgent;

/// The five template agents, seeded from the tournament seed.
pub fn template_roster(seed: u64) -> Vec<SharedAgent> {
    PROFILES
        .iter()
        .map(|p| Arc::new(TemplateAgent::new(p, seed)) as SharedAgent)
        .collect()
}

/// The five remote agents sharing one HTTP client.
pub fn remote_roster(
    settings: &RemoteSettings,
    profiles_dir: Option<&Path>,
) -> Result<Vec<SharedAgent>, AgentError> {
    let client = Arc::new(ResponsesClient::new(settings)?);
    Ok(PROFILES
        .iter()
        .map(|p| {
            let text = p.load_text(profiles_dir);
            Arc::new(RemoteAgent::new(p, &text, Arc::clone(&client))) as SharedAgent
        })
        .collect())
}

/// Roster for the chosen agent kind.
pub fn build_roster(
    kind: AgentKind,
    seed: u64,
    settings: &RemoteSettings,
    profiles_dir: Option<&Path>,
) -> Result<Vec<SharedAgent>, AgentError> {
    match kind {
        AgentKind::Template => Ok(template_roster(seed)),
        AgentKind::Remote => remote_roster(settings, profiles_dir),
    }
}
