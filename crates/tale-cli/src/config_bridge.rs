//! Conversion from `tale_config::Config` to the runtime types.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tale_config::Config;
use tale_core::{MovePolicy, RouterSettings, StorySettings};
use tale_gateway::GatewaySettings;
use tale_graph::GraphConfig;
use tale_llm::ProviderConfig;
use tale_telemetry::{LogConfig, LogFormat};

/// Convert config to [`LogConfig`].
pub(crate) fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or(LogFormat::Compact);

    let mut log_config = LogConfig::new(&cfg.logging.level).with_format(format);
    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }
    log_config
}

/// Convert config to [`ProviderConfig`].
///
/// The key already includes environment fallbacks applied by
/// [`Config::load`].
pub(crate) fn to_provider_config(cfg: &Config) -> ProviderConfig {
    let api_key = cfg.model.api_key.clone().unwrap_or_default();

    let mut provider = ProviderConfig::new(api_key, &cfg.model.model)
        .max_tokens(cfg.model.max_tokens)
        .temperature(cfg.model.temperature)
        .timeout_secs(cfg.model.timeout_secs);

    if let Some(url) = &cfg.model.api_url {
        provider = provider.base_url(url);
    }
    provider
}

/// Convert config to [`GraphConfig`].
pub(crate) fn to_graph_config(cfg: &Config) -> GraphConfig {
    let fb = &cfg.facebook;
    GraphConfig::new(&fb.page_id, &fb.access_token)
        .graph_url(&fb.graph_url)
        .api_version(&fb.api_version)
        .timeout_secs(fb.timeout_secs)
}

/// Convert config to [`StorySettings`].
pub(crate) fn to_story_settings(cfg: &Config) -> Result<StorySettings> {
    let policy = cfg
        .story
        .move_policy
        .parse::<MovePolicy>()
        .map_err(anyhow::Error::msg)
        .context("invalid story.move_policy")?;

    Ok(StorySettings::new(&cfg.facebook.page_id)
        .with_move_policy(policy)
        .with_seed_prompt(&cfg.story.seed_prompt))
}

/// Convert config to [`RouterSettings`].
pub(crate) fn to_router_settings(cfg: &Config) -> RouterSettings {
    RouterSettings::new(&cfg.facebook.verify_token)
        .with_trigger_token(cfg.facebook.effective_trigger_token())
        .with_trigger_keyword(&cfg.story.trigger_keyword)
}

/// Convert config to [`GatewaySettings`].
pub(crate) fn to_gateway_settings(cfg: &Config) -> GatewaySettings {
    GatewaySettings::new(&cfg.facebook.app_secret)
        .with_dedup_window(Duration::from_secs(cfg.server.dedup_window_secs))
}

/// Listen address from config, with optional overrides.
///
/// `bind` may be an IP address or a host name; the first resolved address
/// is used.
pub(crate) async fn listen_addr(
    cfg: &Config,
    bind: Option<&str>,
    port: Option<u16>,
) -> Result<SocketAddr> {
    let host = bind.unwrap_or(&cfg.server.bind);
    let port = port.unwrap_or(cfg.server.port);
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("cannot resolve listen address {host}:{port}"))?
        .next()
        .with_context(|| format!("no addresses for {host}:{port}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut cfg = Config::default();
        cfg.facebook.page_id = "page".to_owned();
        cfg.facebook.verify_token = "verify".to_owned();
        cfg
    }

    #[test]
    fn log_config_falls_back_to_compact() {
        let mut cfg = config();
        cfg.logging.format = "json".to_owned();
        cfg.logging.directives = vec!["tale_core=debug".to_owned()];
        let lc = to_log_config(&cfg);
        assert_eq!(lc.format, LogFormat::Json);
        assert_eq!(lc.directives.len(), 1);

        cfg.logging.format = "fancy".to_owned();
        assert_eq!(to_log_config(&cfg).format, LogFormat::Compact);
    }

    #[test]
    fn story_settings_parse_policy() {
        let mut cfg = config();
        cfg.story.move_policy = "strict".to_owned();
        let settings = to_story_settings(&cfg).unwrap();
        assert_eq!(settings.move_policy, MovePolicy::Strict);
        assert_eq!(settings.page_id, "page");

        cfg.story.move_policy = "loose".to_owned();
        assert!(to_story_settings(&cfg).is_err());
    }

    #[test]
    fn trigger_token_defaults_to_verify_token() {
        let settings = to_router_settings(&config());
        assert_eq!(settings.trigger_token, "verify");
        assert_eq!(settings.trigger_keyword, "start");
    }

    #[tokio::test]
    async fn listen_addr_overrides() {
        let cfg = config();
        assert_eq!(listen_addr(&cfg, None, None).await.unwrap().port(), 8080);
        let addr = listen_addr(&cfg, Some("127.0.0.1"), Some(9000)).await.unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:9000");
        assert!(listen_addr(&cfg, Some("not a host"), None).await.is_err());
    }

    #[tokio::test]
    async fn listen_addr_resolves_host_names() {
        let mut cfg = config();
        cfg.server.bind = "localhost".to_owned();
        let addr = listen_addr(&cfg, None, Some(9001)).await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 9001);

        let v6 = listen_addr(&cfg, Some("::1"), Some(9002)).await.unwrap();
        assert_eq!(v6.to_string(), "[::1]:9002");
    }

    #[test]
    fn provider_config_carries_model_settings() {
        let mut cfg = config();
        cfg.model.api_url = Some("http://localhost:1234/v1/chat/completions".to_owned());
        let provider = to_provider_config(&cfg);
        assert_eq!(provider.model, "gpt-3.5-turbo");
        assert_eq!(provider.max_tokens, 500);
        assert!(provider.base_url.is_some());
    }
}
