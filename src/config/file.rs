//! Loading the TOML configuration file.

use super::RebazerConfig;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file.
const CONFIG_ENV_VAR: &str = "REBAZER_CONFIG";

/// Directory name for rebazer within the user config dir.
const CONFIG_DIR: &str = "rebazer";

/// Filename of the config file.
const CONFIG_FILE: &str = "config.toml";

/// Default config path: `<config dir>/rebazer/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Pick the config path: explicit argument, then `$REBAZER_CONFIG`, then the default.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    default_config_path()
        .ok_or_else(|| Error::Config("cannot determine the user config directory".to_string()))
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RebazerConfig> {
    let config: RebazerConfig =
        toml::from_str(content).map_err(|e| Error::Config(format!("invalid TOML: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Load and validate configuration from disk.
pub fn load_config(path: &Path) -> Result<RebazerConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    parse_config(&content).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HostType;
    use tempfile::TempDir;

    const FULL: &str = r#"
poll_interval = 30
workspace = "/tmp/rebazer"
state_file = "/tmp/rebazer/handled.toml"
bot_name = "merge-bot"

[[hosts]]
type = "github"

  [[hosts.teams]]
  name = "acme"
  user = "bot"
  pass = "secret"

    [[hosts.teams.repos]]
    name = "widgets"

    [[hosts.teams.repos]]
    name = "gadgets"

[[hosts]]
type = "gitlab"
url = "https://gitlab.example.com/api/v4/"

  [[hosts.teams]]
  name = "infra"
  user = "bot"
  pass = "token"

    [[hosts.teams.repos]]
    name = "terraform"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(FULL).unwrap();
        assert_eq!(config.poll_interval, 30);
        assert_eq!(config.bot_name, "merge-bot");
        assert_eq!(
            config.state_file.as_deref(),
            Some(Path::new("/tmp/rebazer/handled.toml"))
        );
        assert_eq!(config.hosts.len(), 2);
        assert_eq!(config.hosts[0].host_type, HostType::GitHub);
        assert_eq!(config.hosts[0].api_url(), "https://api.github.com");
        assert_eq!(
            config.hosts[1].api_url(),
            "https://gitlab.example.com/api/v4"
        );
    }

    #[test]
    fn test_repositories_walks_tree_in_order() {
        let config = parse_config(FULL).unwrap();
        let names: Vec<_> = config
            .repositories()
            .map(|(host, team, repo)| format!("{}/{}/{}", host.host_type, team.name, repo.name))
            .collect();
        assert_eq!(
            names,
            vec![
                "GitHub/acme/widgets",
                "GitHub/acme/gadgets",
                "GitLab/infra/terraform"
            ]
        );
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse_config(
            r#"
[[hosts]]
type = "github"
[[hosts.teams]]
name = "acme"
user = "bot"
pass = "secret"
[[hosts.teams.repos]]
name = "widgets"
"#,
        )
        .unwrap();
        assert_eq!(config.poll_interval, super::super::POLL_INTERVAL_DEFAULT);
        assert_eq!(config.bot_name, "rebazer");
        assert!(config.state_file.is_none());
        assert_eq!(config.workspace, PathBuf::from("rebazer-workspace"));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let err = parse_config(&FULL.replace("poll_interval = 30", "poll_interval = 0"))
            .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("poll_interval")));
    }

    #[test]
    fn test_no_repositories_rejected() {
        let err = parse_config("poll_interval = 10").unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("no repositories")));
    }

    #[test]
    fn test_unknown_host_type_rejected() {
        let err = parse_config(&FULL.replace(r#"type = "gitlab""#, r#"type = "svn""#))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_config_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, FULL).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.repositories().count(), 3);
    }

    #[test]
    fn test_load_missing_file_mentions_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.toml");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_resolve_explicit_path_wins() {
        let explicit = Path::new("/etc/rebazer.toml");
        assert_eq!(resolve_config_path(Some(explicit)).unwrap(), explicit);
    }
}
