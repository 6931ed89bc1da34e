//! Configuration loading tests

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use robot_xml_loader::config::OutputFormatConfig;
use robot_xml_loader::{Cli, ConfigManager, EnvProvider};
use tempfile::TempDir;

struct FixedEnv(Vec<(&'static str, &'static str)>);

impl EnvProvider for FixedEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string())
    }
}

#[test]
fn test_precedence_file_then_env_then_cli() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("robot-xml.toml");
    fs::write(
        &config_path,
        r#"
[resources]
base_path = "/from/file"

[expansion]
max_expansions = 10

[output]
format = "summary"
"#,
    )
    .unwrap();

    let env = FixedEnv(vec![
        ("ROBOT_XML_BASE_PATH", "/from/env"),
        ("ROBOT_XML_MAX_EXPANSIONS", "20"),
    ]);
    let cli = Cli::try_parse_from([
        "robot-xml",
        "--config",
        config_path.to_str().unwrap(),
        "--max-expansions",
        "30",
        "robot.xml",
    ])
    .unwrap();

    let config = ConfigManager::load_config_with(&env, &cli).unwrap();

    assert_eq!(config.resources.base_path, PathBuf::from("/from/env"));
    assert_eq!(config.expansion.max_expansions, 30);
    assert_eq!(config.output.format, OutputFormatConfig::Summary);
}

#[test]
fn test_invalid_merged_config_is_rejected() {
    let env = FixedEnv(vec![("ROBOT_XML_THREADS", "0")]);
    let cli = Cli::try_parse_from(["robot-xml", "robot.xml"]).unwrap();

    assert!(ConfigManager::load_config_with(&env, &cli).is_err());
}

#[test]
fn test_env_quiet_and_cli_verbose() {
    let env = FixedEnv(vec![("ROBOT_XML_QUIET", "true")]);
    let cli = Cli::try_parse_from(["robot-xml", "--verbose", "robot.xml"]).unwrap();

    let config = ConfigManager::load_config_with(&env, &cli).unwrap();
    assert!(config.output.verbose);
    assert!(!config.output.quiet);
}
