//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

/// Default nesting limit for embedded entities.
pub const DEFAULT_MAX_DEPTH: u32 = 20;

/// Settings consumed by the entity embed filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSettings {
    /// Maximum number of nested embeds before rendering is aborted (default: 20).
    pub max_depth: u32,

    /// Stop after the first successfully embedded marker (default: false).
    pub first_match_only: bool,

    /// Render tree children removed before an embedded entity is rendered
    /// (default: "links").
    pub suppressed_regions: Vec<String>,
}

impl Default for EmbedSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            first_match_only: false,
            suppressed_regions: vec!["links".to_string()],
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Filter settings.
    pub embed: EmbedSettings,

    /// Language used when the caller does not pass one (default: "en").
    pub langcode: String,

    /// Tera glob for element templates. When None, inline rendering is used.
    pub templates: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_depth = lookup("EMBED_MAX_DEPTH")
            .unwrap_or_else(|| DEFAULT_MAX_DEPTH.to_string())
            .parse()
            .context("EMBED_MAX_DEPTH must be a valid u32")?;

        let first_match_only = lookup("EMBED_FIRST_MATCH_ONLY")
            .map(|v| parse_bool(&v))
            .transpose()
            .context("EMBED_FIRST_MATCH_ONLY must be a boolean")?
            .unwrap_or(false);

        let suppressed_regions = lookup("EMBED_SUPPRESSED_REGIONS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["links".to_string()]);

        let langcode = lookup("EMBED_LANGCODE").unwrap_or_else(|| "en".to_string());

        let templates = lookup("EMBED_TEMPLATES").filter(|v| !v.trim().is_empty());

        Ok(Self {
            embed: EmbedSettings {
                max_depth,
                first_match_only,
                suppressed_regions,
            },
            langcode,
            templates,
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("unrecognized boolean '{other}'"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.embed, EmbedSettings::default());
        assert_eq!(config.langcode, "en");
        assert!(config.templates.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("EMBED_MAX_DEPTH", "5"),
            ("EMBED_FIRST_MATCH_ONLY", "yes"),
            ("EMBED_SUPPRESSED_REGIONS", "links, comments,,"),
            ("EMBED_LANGCODE", "de"),
            ("EMBED_TEMPLATES", "templates/**/*.html"),
        ]))
        .unwrap();

        assert_eq!(config.embed.max_depth, 5);
        assert!(config.embed.first_match_only);
        assert_eq!(config.embed.suppressed_regions, vec!["links", "comments"]);
        assert_eq!(config.langcode, "de");
        assert_eq!(config.templates.as_deref(), Some("templates/**/*.html"));
    }

    #[test]
    fn rejects_bad_depth() {
        let err = Config::from_lookup(lookup_from(&[("EMBED_MAX_DEPTH", "deep")])).unwrap_err();
        assert!(err.to_string().contains("EMBED_MAX_DEPTH"));
    }

    #[test]
    fn rejects_bad_bool() {
        assert!(Config::from_lookup(lookup_from(&[("EMBED_FIRST_MATCH_ONLY", "maybe")])).is_err());
    }

    #[test]
    fn empty_templates_is_none() {
        let config = Config::from_lookup(lookup_from(&[("EMBED_TEMPLATES", "  ")])).unwrap();
        assert!(config.templates.is_none());
    }
}
