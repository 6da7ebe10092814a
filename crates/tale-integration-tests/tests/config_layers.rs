//! Configuration layering as the binary sees it.

use std::collections::HashMap;

use tale_config::{ConfigError, ConfigLayer, LoadOptions, Purpose, loader};
use tale_test::{test_dir, test_file_in_dir};

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

#[test]
fn environment_fills_what_the_file_leaves_unset() {
    let dir = test_dir();
    test_file_in_dir(
        &dir,
        "tale.toml",
        "[facebook]\npage_id = \"from-file\"\n\n[story]\nmove_policy = \"strict\"\n",
    );
    let options = LoadOptions {
        working_dir: Some(dir.path().to_path_buf()),
        ..LoadOptions::default()
    };
    let vars = env(&[
        ("FACEBOOK_PAGE_ID", "from-env"),
        ("FACEBOOK_ACCESS_TOKEN", "EAAB"),
        ("FACEBOOK_APP_SECRET", "secret"),
        ("FACEBOOK_WEBHOOK_VERIFICATION_TOKEN", "verify"),
        ("OPENAI_KEY", "sk-test"),
    ]);

    let resolved = loader::load_from(&options, &vars).unwrap();
    let cfg = &resolved.config;

    assert_eq!(cfg.facebook.page_id, "from-file");
    assert_eq!(cfg.facebook.access_token, "EAAB");
    assert_eq!(cfg.model.api_key.as_deref(), Some("sk-test"));
    assert_eq!(cfg.story.move_policy, "strict");
    assert_eq!(
        resolved.field_sources.get("facebook.access_token"),
        Some(&ConfigLayer::Environment)
    );
    assert!(cfg.require_credentials(Purpose::Serve).is_ok());
}

#[test]
fn missing_secret_names_its_variable() {
    let dir = test_dir();
    let options = LoadOptions {
        working_dir: Some(dir.path().to_path_buf()),
        ..LoadOptions::default()
    };
    let vars = env(&[("FACEBOOK_PAGE_ID", "page"), ("FACEBOOK_ACCESS_TOKEN", "EAAB")]);

    let cfg = loader::load_from(&options, &vars).unwrap().config;

    assert!(cfg.require_credentials(Purpose::StartStory).is_err());
    match cfg.require_credentials(Purpose::Serve) {
        Err(ConfigError::MissingSetting { field, env_hint }) => {
            assert_eq!(field, "facebook.app_secret");
            assert_eq!(env_hint, "FACEBOOK_APP_SECRET");
        },
        other => panic!("expected a missing setting, got {other:?}"),
    }
}

#[test]
fn explicit_file_must_exist() {
    let dir = test_dir();
    let options = LoadOptions {
        explicit: Some(dir.path().join("absent.toml")),
        ..LoadOptions::default()
    };
    assert!(loader::load_from(&options, &HashMap::new()).is_err());
}
