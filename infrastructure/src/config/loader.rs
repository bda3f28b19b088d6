//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order
const PROJECT_FILES: [&str; 2] = ["gateway.toml", ".gateway.toml"];

/// Environment variable prefix (`TOOL_GATEWAY_CACHE__TTL_SECONDS=60`)
pub const ENV_PREFIX: &str = "TOOL_GATEWAY_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `TOOL_GATEWAY_*` environment variables (nested keys split on `__`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./gateway.toml` or `./.gateway.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/tool-gateway/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path,
        )
        .extract()
        .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global.filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file_exact(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tool-gateway").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        let env_vars = std::env::vars()
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .count();
        println!("  [{:>5}] Env:     {}* ({} set)", mark(env_vars > 0), ENV_PREFIX, env_vars);

        if let Some(path) = config_path {
            println!("  [{:>5}] Explicit: {}", mark(path.exists()), path.display());
        }

        match Self::project_config_path() {
            Some(path) => println!("  [FOUND] Project: {}", path.display()),
            None => println!("  [     ] Project: ./gateway.toml or ./.gateway.toml"),
        }

        if let Some(path) = Self::global_config_path() {
            println!("  [{:>5}] Global:  {}", mark(path.exists()), path.display());
        }

        println!("  [     ] Default: built-in defaults");
    }
}

fn mark(found: bool) -> &'static str {
    if found { "FOUND" } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.cache.enabled);
        assert!(config.providers.builtin.enabled);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.to_string_lossy().contains("tool-gateway"));
    }

    #[test]
    fn test_later_sources_override_earlier() {
        let global = toml_file("[cache]\nttl_seconds = 10\n\n[metrics]\nsummary_every = 4\n");
        let project = toml_file("[cache]\nttl_seconds = 20\n");
        let explicit = toml_file("[circuit_breaker]\nfailure_threshold = 9\n");

        let config: FileConfig = ConfigLoader::figment(
            Some(global.path()),
            Some(project.path()),
            Some(explicit.path()),
        )
        .extract()
        .unwrap();

        assert_eq!(config.cache.ttl_seconds, 20);
        assert_eq!(config.metrics.summary_every, 4);
        assert_eq!(config.circuit_breaker.failure_threshold, 9);
        assert_eq!(config.circuit_breaker.success_threshold, 3);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result: Result<FileConfig, _> =
            ConfigLoader::figment(None, None, Some(Path::new("/no/such/gateway.toml"))).extract();
        assert!(result.is_err());
    }

    #[test]
    fn test_environment_overrides_files() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("explicit.toml", "[cache]\nttl_seconds = 20\n")?;
            jail.set_env("TOOL_GATEWAY_CACHE__TTL_SECONDS", "45");
            jail.set_env("TOOL_GATEWAY_LOGGING__ENABLED", "false");

            let config: FileConfig =
                ConfigLoader::figment(None, None, Some(Path::new("explicit.toml"))).extract()?;
            assert_eq!(config.cache.ttl_seconds, 45);
            assert!(!config.logging.enabled);
            Ok(())
        });
    }
}
