// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-FlowiseMcp-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowise-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;

use rstest::rstest;

use super::*;
use crate::model::Chatflow;

fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let env = vars
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect::<HashMap<_, _>>();
    Config::from_lookup(|key| env.get(key).cloned())
}

fn mode(vars: &[(&str, &str)]) -> Result<ServerMode, ConfigError> {
    config(vars).expect("config").mode()
}

#[test]
fn defaults_apply_when_nothing_is_set() {
    let config = config(&[]).expect("config");
    assert_eq!(config.endpoint, DEFAULT_API_ENDPOINT);
    assert_eq!(config.api_key, None);
    assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    assert!(config.filter.is_empty());
    assert!(!config.debug);
    assert_eq!(config.redacted_api_key(), "<not set>");
}

#[test]
fn empty_values_count_as_unset() {
    let config = config(&[
        (ENV_API_KEY, ""),
        (ENV_API_ENDPOINT, "  "),
        (ENV_CHATFLOW_ID, ""),
        (ENV_ASSISTANT_ID, ""),
        (ENV_CHATFLOW_DESCRIPTIONS, ""),
    ])
    .expect("config");
    assert_eq!(config.api_key, None);
    assert_eq!(config.endpoint, DEFAULT_API_ENDPOINT);
    assert_eq!(config.mode().expect("mode"), ServerMode::Catalog);
}

#[test]
fn endpoint_trailing_slash_is_dropped() {
    let config = config(&[(ENV_API_ENDPOINT, "https://flowise.example.com/")]).expect("config");
    assert_eq!(config.endpoint, "https://flowise.example.com");
}

#[rstest]
#[case("not a url")]
#[case("ftp://flowise.example.com")]
fn rejects_bad_endpoints(#[case] endpoint: &str) {
    config(&[(ENV_API_ENDPOINT, endpoint)]).unwrap_err();
}

#[test]
fn neither_target_selects_catalog_mode() {
    assert_eq!(mode(&[]).expect("mode"), ServerMode::Catalog);
}

#[test]
fn chatflow_id_selects_locked_chatflow() {
    let ServerMode::Locked(target) = mode(&[(ENV_CHATFLOW_ID, "cf-1")]).expect("mode") else {
        panic!("expected locked mode");
    };
    assert_eq!(target, PredictionTarget::Chatflow(ChatflowId::new("cf-1").expect("id")));
}

#[test]
fn assistant_id_selects_locked_assistant() {
    let ServerMode::Locked(target) = mode(&[(ENV_ASSISTANT_ID, "as-1")]).expect("mode") else {
        panic!("expected locked mode");
    };
    assert_eq!(target, PredictionTarget::Assistant(AssistantId::new("as-1").expect("id")));
}

#[test]
fn both_targets_refuse_to_start() {
    let err = mode(&[(ENV_CHATFLOW_ID, "cf-1"), (ENV_ASSISTANT_ID, "as-1")]).unwrap_err();
    assert!(matches!(err, ConfigError::ConflictingTargets));
}

#[test]
fn both_targets_refuse_to_start_even_with_descriptions() {
    let err = mode(&[
        (ENV_CHATFLOW_ID, "cf-1"),
        (ENV_ASSISTANT_ID, "as-1"),
        (ENV_CHATFLOW_DESCRIPTIONS, "cf-1:One"),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::ConflictingTargets));
}

#[test]
fn descriptions_select_dynamic_mode() {
    let ServerMode::Dynamic(entries) =
        mode(&[(ENV_CHATFLOW_DESCRIPTIONS, "id1:Desc One,id2:Desc Two")]).expect("mode")
    else {
        panic!("expected dynamic mode");
    };
    let described = entries
        .iter()
        .map(|entry| (entry.id.as_str(), entry.description.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(described, vec![("id1", "Desc One"), ("id2", "Desc Two")]);
}

#[test]
fn descriptions_win_over_a_single_target() {
    let mode = mode(&[(ENV_CHATFLOW_ID, "cf-1"), (ENV_CHATFLOW_DESCRIPTIONS, "id1:Desc One")])
        .expect("mode");
    assert_eq!(mode.label(), "dynamic");
}

#[test]
fn unusable_descriptions_refuse_to_start() {
    let err = mode(&[(ENV_CHATFLOW_DESCRIPTIONS, "garbage")]).unwrap_err();
    assert!(matches!(err, ConfigError::NoDynamicTools));
}

#[test]
fn invalid_target_id_is_reported_with_its_variable() {
    let err = config(&[(ENV_CHATFLOW_ID, "a/b")]).unwrap_err();
    assert!(
        matches!(err, ConfigError::InvalidId { variable: ENV_CHATFLOW_ID, .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn filter_lists_and_patterns_are_parsed() {
    let config = config(&[
        (ENV_CHATFLOW_WHITELIST, "keep-1, keep-2,,"),
        (ENV_BLACKLIST_NAME_REGEX, "(?i)internal"),
    ])
    .expect("config");
    let keep = Chatflow::new(ChatflowId::new("keep-1").expect("id"), "Internal tools");
    let drop = Chatflow::new(ChatflowId::new("other").expect("id"), "Public");
    assert!(config.filter.allows(&keep));
    assert!(!config.filter.allows(&drop));
    assert!(config.filter.allows_id("keep-2"));
}

#[test]
fn invalid_regex_is_rejected() {
    let err = config(&[(ENV_WHITELIST_NAME_REGEX, "(")]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRegex { variable: ENV_WHITELIST_NAME_REGEX, .. }));
}

#[rstest]
#[case("0")]
#[case("-3")]
#[case("soon")]
fn invalid_timeout_is_rejected(#[case] value: &str) {
    let err = config(&[(ENV_TIMEOUT_SECS, value)]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTimeout { .. }));
}

#[rstest]
#[case("true", true)]
#[case("YES", true)]
#[case("1", true)]
#[case("false", false)]
#[case("on", false)]
fn debug_flag_accepts_common_truthy_values(#[case] value: &str, #[case] expected: bool) {
    assert_eq!(config(&[(ENV_DEBUG, value)]).expect("config").debug, expected);
}

#[rstest]
#[case("", "<not set>")]
#[case("abcd", "<not set>")]
#[case("abcde", "ab*de")]
#[case("sk-1234567890", "sk*********90")]
fn redacts_api_keys(#[case] key: &str, #[case] expected: &str) {
    assert_eq!(redact_api_key(key), expected);
}

#[test]
fn missing_env_file_is_ignored() {
    let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "no .env");
    assert_eq!(check_env_file(Err(dotenvy::Error::Io(missing))).expect("missing .env"), None);

    let path = PathBuf::from("/srv/app/.env");
    assert_eq!(check_env_file(Ok(path.clone())).expect("loaded .env"), Some(path));
}

#[test]
fn malformed_env_file_is_an_error() {
    let dir = std::env::temp_dir().join(format!("flowise-mcp-dotenv-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join(".env");
    std::fs::write(&path, "FLOWISE_MCP_DOTENV_OK=1\nthis line is not an assignment\n")
        .expect("write .env");

    // Parse without touching the process environment.
    let parsed = dotenvy::from_path_iter(&path)
        .expect("open .env")
        .collect::<Result<Vec<_>, _>>()
        .map(|_| path.clone());
    let err = check_env_file(parsed).unwrap_err();
    assert!(matches!(err, ConfigError::EnvFile(dotenvy::Error::LineParse(..))), "unexpected: {err}");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unreadable_env_file_is_an_error() {
    let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err = check_env_file(Err(dotenvy::Error::Io(denied))).unwrap_err();
    assert!(err.to_string().starts_with("cannot load .env"));
}
