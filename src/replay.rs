//! Replay file format: a self-contained JSON document holding the static
//! collaborator state, pool registrations and the event log.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::{Event, PoolId, Token};
use crate::engine::{Engine, EngineParams, ReplayReport};
use crate::feeds::StaticFeeds;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolRegistration {
    pub pool: PoolId,
    pub tokens: [Token; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayFile {
    pub feeds: StaticFeeds,
    #[serde(default)]
    pub pools: Vec<PoolRegistration>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl ReplayFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading event log {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing event log {}", path.display()))
    }
}

/// Build an engine for the file, register its pools and replay its log.
pub fn run(file: &ReplayFile, params: EngineParams) -> anyhow::Result<(Engine, ReplayReport)> {
    let mut engine = Engine::new(params)?;
    for registration in &file.pools {
        engine.register_pool(registration.pool.clone(), registration.tokens.clone());
    }
    let report = engine.replay(file.events.clone(), &file.feeds);
    Ok((engine, report))
}
