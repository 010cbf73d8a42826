//! Configuration loader.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        let expanded = Self::expand_env_vars(&content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_empty_config_uses_defaults() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, ":memory:");
        assert_eq!(config.jobmanager.name, "slurm");
        assert_eq!(config.resourcemanager.name, "none");
        assert_eq!(config.scheduler.command_timeout_secs, 60);
    }

    #[test]
    fn load_basic_config() {
        let content = r#"
            [server]
            host = "0.0.0.0"
            port = 3000

            [database]
            path = "/var/lib/stagehand/wf.db"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, "/var/lib/stagehand/wf.db");
    }

    #[test]
    fn load_scheduler_and_rm_sections() {
        let content = r#"
            [scheduler]
            batch_cmd = "/opt/slurm/bin/sbatch"
            lua_directives = true

            [resourcemanager]
            name = "remote"
            host = "rm.cluster"
            port = 9000
            version = "v2.1.0"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.scheduler.batch_cmd, "/opt/slurm/bin/sbatch");
        assert!(config.scheduler.lua_directives);
        assert_eq!(config.resourcemanager.name, "remote");
        assert_eq!(config.resourcemanager.host, "rm.cluster");
        assert_eq!(config.resourcemanager.version, "v2.1.0");
    }

    #[test]
    fn env_var_expansion() {
        // Modifying the environment is process-wide; pick a name no other
        // test uses.
        unsafe { std::env::set_var("STAGEHAND_TEST_DB_DIR", "/data") };
        let content = r#"
            [database]
            path = "${STAGEHAND_TEST_DB_DIR}/wf.db"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.database.path, "/data/wf.db");
    }

    #[test]
    fn unset_env_var_is_an_error() {
        let content = r#"
            [database]
            path = "${STAGEHAND_TEST_UNSET_VAR}/wf.db"
        "#;
        let result = ConfigLoader::load_str(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(name)) if name == "STAGEHAND_TEST_UNSET_VAR"));
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]").unwrap();
        writeln!(file, "port = 5000").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
