use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use prov_lineage::WalkerConfig;

/// Contents of the `--config` file.
///
/// ```toml
/// [walker]
/// reserved_fields = ["log", "notes"]
/// skip_empty_downstream = true
/// max_nodes = 5000
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub walker: WalkerConfig,
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_path_gives_defaults() {
        let config = CliConfig::load(None).unwrap();
        assert_eq!(config.walker, WalkerConfig::default());
    }

    #[test]
    fn walker_section_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[walker]\nreserved_fields = [\"log\", \"notes\"]\nmax_nodes = 50").unwrap();
        let config = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.walker.reserved_fields, vec!["log", "notes"]);
        assert_eq!(config.walker.max_nodes, Some(50));
        assert!(config.walker.skip_empty_downstream);
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(CliConfig::parse("[walker\n").is_err());
        assert!(CliConfig::load(Some(Path::new("/nonexistent/prov.toml"))).is_err());
    }
}
