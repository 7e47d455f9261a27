use std::io::Write;

use nova_interop_config::{ConfigError, InteropConfig, ResolverConfig, CURRENT_ABI_VERSION};
use pretty_assertions::assert_eq;

#[test]
fn empty_config_uses_defaults() {
    let config = InteropConfig::load_from_str("").unwrap();
    assert_eq!(config, InteropConfig::default());
    assert_eq!(config.resolver.abi_version, CURRENT_ABI_VERSION);
    assert!(config.resolver.alternative_signatures);
    assert!(config
        .resolver
        .is_not_null_annotation("org.jetbrains.annotations.NotNull"));
    assert_eq!(config.logging.level, "info");
}

#[test]
fn sections_override_defaults() {
    let config = InteropConfig::load_from_str(
        r#"
        [resolver]
        abi_version = 6
        not_null_annotations = ["javax.annotation.Nonnull"]
        alternative_signatures = false

        [logging]
        level = "debug"
        json = true
        "#,
    )
    .unwrap();
    assert_eq!(
        config.resolver,
        ResolverConfig {
            abi_version: 6,
            not_null_annotations: vec!["javax.annotation.Nonnull".to_string()],
            alternative_signatures: false,
        }
    );
    assert!(config.logging.json);
    assert!(!config
        .resolver
        .is_not_null_annotation("org.jetbrains.annotations.NotNull"));
}

#[test]
fn unknown_resolver_keys_are_rejected() {
    let err = InteropConfig::load_from_str("[resolver]\nabi = 3\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)), "{err:?}");
}

#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[resolver]\nabi_version = 9").unwrap();
    let config = InteropConfig::load_from_path(file.path()).unwrap();
    assert_eq!(config.resolver.abi_version, 9);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    let err = InteropConfig::load_from_path(&path).unwrap_err();
    match err {
        ConfigError::Io { path: reported, .. } => {
            assert_eq!(reported, path.display().to_string())
        }
        other => panic!("unexpected error {other:?}"),
    }
}
