//! `tale check-config`.

use anyhow::{Context, Result};
use tale_config::{Purpose, ResolvedConfig};

use crate::config_bridge;

/// Print the effective configuration and which commands it is ready for.
pub(crate) fn run(resolved: &ResolvedConfig, show_sources: bool) -> Result<()> {
    let cfg = &resolved.config;

    // Fails on settings that only the runtime types can reject.
    config_bridge::to_story_settings(cfg)?;

    match &resolved.loaded_file {
        Some(path) => println!("# Loaded from {}", path.display()),
        None => println!("# No configuration file found; using defaults and environment"),
    }
    let rendered = toml::to_string_pretty(cfg).context("failed to render configuration")?;
    println!("{rendered}");

    for (name, purpose) in [("serve", Purpose::Serve), ("start-story", Purpose::StartStory)] {
        match cfg.require_credentials(purpose) {
            Ok(()) => println!("# {name}: ready"),
            Err(e) => println!("# {name}: {e}"),
        }
    }

    if show_sources {
        let mut sources: Vec<_> = resolved.field_sources.iter().collect();
        sources.sort_by(|a, b| a.0.cmp(b.0));
        println!();
        for (field, layer) in sources {
            println!("# {field} <- {layer}");
        }
    }
    Ok(())
}
