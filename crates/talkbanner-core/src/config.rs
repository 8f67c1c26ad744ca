//! Bot configuration
//!
//! Every field has a default matching the production deployment, so an
//! empty TOML table is a valid configuration.

use crate::error::ConfigError;
use crate::types::{CategoryTitle, PageTitle, TemplateTitle};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Categories whose closure is processed by a run
    pub seed_categories: Vec<CategoryTitle>,
    /// Banner to add
    pub banner_template: TemplateTitle,
    /// Bot exclusion template
    pub opt_out_template: TemplateTitle,
    /// Control page; non-empty halts the run
    pub kill_switch_page: PageTitle,
    /// Banner parameter carrying the assessment
    pub classification_key: String,
    /// Appended to every edit summary
    pub summary_suffix: String,
    /// Namespace filter for category members
    pub member_namespace: Option<i32>,
    /// Skip pages whose subject page is a redirect
    pub exclude_redirects: bool,
    /// Drop duplicate pages within a category closure
    pub dedupe_pages: bool,
    /// Upper bound on in-flight page pipelines
    pub max_concurrent_pages: usize,
    /// Compose edits without writing them
    pub dry_run: bool,
}

impl BotConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_pages == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_pages must be at least 1".to_string(),
            ));
        }
        if self.banner_template.as_str().is_empty() {
            return Err(ConfigError::Invalid("banner_template is empty".to_string()));
        }
        if self.opt_out_template.as_str().is_empty() {
            return Err(ConfigError::Invalid("opt_out_template is empty".to_string()));
        }
        if self.kill_switch_page.as_str().is_empty() {
            return Err(ConfigError::Invalid("kill_switch_page is empty".to_string()));
        }
        if self.classification_key.is_empty() {
            return Err(ConfigError::Invalid("classification_key is empty".to_string()));
        }
        Ok(())
    }

    /// With seed categories
    #[must_use]
    pub fn with_seed_categories(
        mut self,
        categories: impl IntoIterator<Item = CategoryTitle>,
    ) -> Self {
        self.seed_categories = categories.into_iter().collect();
        self
    }

    /// With max in-flight pages
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_pages(mut self, max: usize) -> Self {
        self.max_concurrent_pages = max;
        self
    }

    /// With redirect exclusion
    #[inline]
    #[must_use]
    pub fn with_exclude_redirects(mut self, enabled: bool) -> Self {
        self.exclude_redirects = enabled;
        self
    }

    /// With per-category deduplication
    #[inline]
    #[must_use]
    pub fn with_dedupe_pages(mut self, enabled: bool) -> Self {
        self.dedupe_pages = enabled;
        self
    }

    /// With dry-run mode
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            seed_categories: [
                "Category:Parks in Brooklyn",
                "Category:Parks in the Bronx",
                "Category:Parks in Manhattan",
                "Category:Parks in Queens, New York",
                "Category:Parks in Staten Island",
            ]
            .into_iter()
            .map(CategoryTitle::new)
            .collect(),
            banner_template: PageTitle::new("Template:WikiProject Protected areas"),
            opt_out_template: PageTitle::new("Template:Bots"),
            kill_switch_page: PageTitle::new("User:ProgrammingBot/shutoff"),
            classification_key: "class".to_string(),
            summary_suffix: "(BOT)".to_string(),
            member_namespace: None,
            exclude_redirects: false,
            dedupe_pages: false,
            max_concurrent_pages: 8,
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = BotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.seed_categories.len(), 5);
        assert!(!config.exclude_redirects);
        assert!(!config.dedupe_pages);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = BotConfig::from_toml_str("").unwrap();
        assert_eq!(config, BotConfig::default());
    }

    #[test]
    fn toml_overrides() {
        let config = BotConfig::from_toml_str(
            r#"
            seed_categories = ["Category:Parks in Brooklyn"]
            max_concurrent_pages = 2
            exclude_redirects = true
            member_namespace = 0
            "#,
        )
        .unwrap();

        assert_eq!(
            config.seed_categories,
            vec![CategoryTitle::new("Category:Parks in Brooklyn")]
        );
        assert_eq!(config.max_concurrent_pages, 2);
        assert!(config.exclude_redirects);
        assert_eq!(config.member_namespace, Some(0));
        assert_eq!(config.banner_template.as_str(), "Template:WikiProject Protected areas");
    }

    #[test]
    fn zero_concurrency_rejected() {
        let err = BotConfig::from_toml_str("max_concurrent_pages = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_types_rejected() {
        let err = BotConfig::from_toml_str("dry_run = \"maybe\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dry_run = true").unwrap();

        let config = BotConfig::load(file.path()).unwrap();
        assert!(config.dry_run);

        let missing = BotConfig::load(file.path().with_extension("absent"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
