//! Prefix tree configuration
//!
//! Serializable settings a factory turns into a tree. Loadable from JSON,
//! TOML (with the `toml` feature) or a flat string key/value bag such as
//! schema field attributes.

use crate::error::{PrefixTreeError, Result};
use geoprefix_types::context::SpatialContext;
use serde::de::Error;
use serde::{Deserialize, Serialize};

/// Key in an argument bag naming the maximum tree depth.
pub const MAX_LEVELS: &str = "maxLevels";

/// Key in an argument bag naming the largest acceptable cell size, in degrees.
pub const MAX_DIST_ERR: &str = "maxDistErr";

/// Settings for building a prefix tree.
///
/// `max_levels` takes precedence over `max_dist_err`. With neither set, a
/// geographic context resolves to about one meter of detail.
///
/// # Example
///
/// ```rust
/// use geoprefix::PrefixTreeConfig;
///
/// let json = r#"{ "max_dist_err": 0.001 }"#;
/// let config = PrefixTreeConfig::from_json(json).unwrap();
/// assert_eq!(config.max_dist_err, Some(0.001));
/// assert!(config.context.is_geo());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrefixTreeConfig {
    /// Explicit maximum tree depth
    #[serde(default)]
    pub max_levels: Option<usize>,

    /// Largest acceptable cell width/height, in degrees
    #[serde(default)]
    pub max_dist_err: Option<f64>,

    /// Coordinate system the tree decomposes
    #[serde(default)]
    pub context: SpatialContext,
}

impl PrefixTreeConfig {
    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = Some(max_levels);
        self
    }

    pub fn with_max_dist_err(mut self, degrees: f64) -> Self {
        self.max_dist_err = Some(degrees);
        self
    }

    pub fn with_context(mut self, context: SpatialContext) -> Self {
        self.context = context;
        self
    }

    /// Builds a config from string arguments. Unknown keys are ignored.
    ///
    /// ```rust
    /// use geoprefix::PrefixTreeConfig;
    ///
    /// let config = PrefixTreeConfig::from_args([("maxLevels", "9"), ("units", "degrees")]).unwrap();
    /// assert_eq!(config.max_levels, Some(9));
    /// ```
    pub fn from_args<I, K, V>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in args {
            let value = value.as_ref().trim();
            match key.as_ref() {
                MAX_LEVELS => {
                    let levels = value.parse().map_err(|e| {
                        PrefixTreeError::InvalidConfig(format!(
                            "{} must be an integer, got {:?}: {}",
                            MAX_LEVELS, value, e
                        ))
                    })?;
                    config.max_levels = Some(levels);
                }
                MAX_DIST_ERR => {
                    let degrees = value.parse().map_err(|e| {
                        PrefixTreeError::InvalidConfig(format!(
                            "{} must be a number, got {:?}: {}",
                            MAX_DIST_ERR, value, e
                        ))
                    })?;
                    config.max_dist_err = Some(degrees);
                }
                _ => {}
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// `max_levels` is range-checked by the tree it is handed to.
    pub fn validate(&self) -> Result<()> {
        if let Some(dist) = self.max_dist_err
            && (!dist.is_finite() || dist < 0.0)
        {
            return Err(PrefixTreeError::InvalidConfig(format!(
                "Max distance error must be finite and non-negative, got {}",
                dist
            )));
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: PrefixTreeConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: PrefixTreeConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = PrefixTreeConfig::default();
        assert!(config.max_levels.is_none());
        assert!(config.max_dist_err.is_none());
        assert!(config.context.is_geo());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builders() {
        let config = PrefixTreeConfig::default()
            .with_max_levels(8)
            .with_max_dist_err(0.5);
        assert_eq!(config.max_levels, Some(8));
        assert_eq!(config.max_dist_err, Some(0.5));
    }

    #[test]
    fn test_config_serialization() {
        let config = PrefixTreeConfig::default()
            .with_max_levels(10)
            .with_max_dist_err(0.01);

        let json = config.to_json().unwrap();
        let deserialized = PrefixTreeConfig::from_json(&json).unwrap();

        assert_eq!(deserialized.max_levels, Some(10));
        assert_eq!(deserialized.max_dist_err, Some(0.01));
        assert_eq!(deserialized.context, SpatialContext::geo());
    }

    #[test]
    fn test_config_json_validation() {
        assert!(PrefixTreeConfig::from_json(r#"{ "max_dist_err": -1.0 }"#).is_err());
        assert!(PrefixTreeConfig::from_json("{}").is_ok());
    }

    #[test]
    fn test_config_from_args() {
        let mut args = HashMap::new();
        args.insert("maxLevels".to_string(), "11".to_string());
        args.insert("maxDistErr".to_string(), " 0.000009 ".to_string());
        args.insert("distanceUnits".to_string(), "degrees".to_string());

        let config = PrefixTreeConfig::from_args(&args).unwrap();
        assert_eq!(config.max_levels, Some(11));
        assert_eq!(config.max_dist_err, Some(0.000009));
    }

    #[test]
    fn test_config_from_args_rejects_garbage() {
        let err = PrefixTreeConfig::from_args([(MAX_LEVELS, "twelve")]).unwrap_err();
        assert!(matches!(err, PrefixTreeError::InvalidConfig(_)));

        let err = PrefixTreeConfig::from_args([(MAX_LEVELS, "-1")]).unwrap_err();
        assert!(matches!(err, PrefixTreeError::InvalidConfig(_)));

        // Zero parses; the tree rejects it at construction
        let config = PrefixTreeConfig::from_args([(MAX_LEVELS, "0")]).unwrap();
        assert_eq!(config.max_levels, Some(0));

        assert!(PrefixTreeConfig::from_args([(MAX_DIST_ERR, "NaN")]).is_err());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml() {
        let config = PrefixTreeConfig::from_toml("max_levels = 6\n").unwrap();
        assert_eq!(config.max_levels, Some(6));

        let text = config.to_toml().unwrap();
        let back = PrefixTreeConfig::from_toml(&text).unwrap();
        assert_eq!(back.max_levels, Some(6));
    }
}
