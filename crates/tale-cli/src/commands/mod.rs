//! Subcommand implementations.

pub(crate) mod check_config;
pub(crate) mod serve;
pub(crate) mod start_story;

use std::sync::Arc;

use anyhow::{Context, Result};
use tale_config::Config;
use tale_core::{Engine, LlmStoryteller, Platform, Storyteller};
use tale_graph::GraphClient;
use tale_llm::OpenAiCompatProvider;

use crate::config_bridge;

/// Wire the Graph client and the model provider into an [`Engine`].
pub(crate) fn build_engine(cfg: &Config) -> Result<Engine> {
    let graph = GraphClient::new(&config_bridge::to_graph_config(cfg))
        .context("failed to build Graph API client")?;

    let provider = OpenAiCompatProvider::from_config(&config_bridge::to_provider_config(cfg))
        .context("failed to build model provider")?;
    let storyteller = LlmStoryteller::new(provider).with_system_prompt(&cfg.model.system_prompt);

    Ok(Engine::new(
        Arc::new(graph) as Arc<dyn Platform>,
        Arc::new(storyteller) as Arc<dyn Storyteller>,
        config_bridge::to_story_settings(cfg)?,
    ))
}
