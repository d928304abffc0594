//! Building configured trees.

use crate::config::PrefixTreeConfig;
use crate::error::Result;
use crate::geohash_tree::GeohashPrefixTree;
use crate::tree::SpatialPrefixTree;
use geoprefix_types::context::SpatialContext;

/// Detail used for geographic trees when no level or distance is configured.
pub const DEFAULT_GEO_MAX_DETAIL_KM: f64 = 0.001;

/// Turns a [`PrefixTreeConfig`] into a tree, resolving its maximum level.
pub trait SpatialPrefixTreeFactory {
    type Tree: SpatialPrefixTree;

    fn config(&self) -> &PrefixTreeConfig;

    /// Level for a cell size of `degrees`, computed on a reference tree of
    /// the finest possible precision regardless of the configured maximum.
    fn level_for_distance(&self, degrees: f64) -> Result<usize>;

    /// A tree with exactly `max_levels`, or the implementation's default.
    fn new_tree_with_levels(&self, max_levels: Option<usize>) -> Result<Self::Tree>;

    /// Maximum level implied by the configuration.
    ///
    /// An explicit `max_levels` wins. Otherwise `max_dist_err` is converted
    /// with [`level_for_distance`](Self::level_for_distance); with neither
    /// set, geographic contexts default to [`DEFAULT_GEO_MAX_DETAIL_KM`] and
    /// others to the implementation default (`None`).
    fn max_levels(&self) -> Result<Option<usize>> {
        let config = self.config();
        if let Some(levels) = config.max_levels {
            if config.max_dist_err.is_some() {
                log::warn!(
                    "Both max_levels ({}) and max_dist_err are set; ignoring max_dist_err",
                    levels
                );
            }
            return Ok(Some(levels));
        }

        let degrees = match config.max_dist_err {
            Some(degrees) => degrees,
            None if config.context.is_geo() => {
                SpatialContext::dist_to_degrees(DEFAULT_GEO_MAX_DETAIL_KM)
            }
            None => return Ok(None),
        };

        let levels = self.level_for_distance(degrees)?;
        log::debug!(
            "Resolved max levels {} from a distance of {} degrees",
            levels,
            degrees
        );
        Ok(Some(levels))
    }

    fn new_tree(&self) -> Result<Self::Tree> {
        self.new_tree_with_levels(self.max_levels()?)
    }
}

/// Factory for [`GeohashPrefixTree`]s.
///
/// # Examples
///
/// ```rust
/// use geoprefix::{GeohashPrefixTreeFactory, PrefixTreeConfig, SpatialPrefixTree, SpatialPrefixTreeFactory};
///
/// // Defaults to about one meter of detail
/// let factory = GeohashPrefixTreeFactory::new(PrefixTreeConfig::default())?;
/// assert_eq!(factory.new_tree()?.max_levels(), 11);
///
/// let factory = GeohashPrefixTreeFactory::new(PrefixTreeConfig::default().with_max_levels(6))?;
/// assert_eq!(factory.new_tree()?.max_levels(), 6);
/// # Ok::<(), geoprefix::PrefixTreeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GeohashPrefixTreeFactory {
    config: PrefixTreeConfig,
}

impl GeohashPrefixTreeFactory {
    pub fn new(config: PrefixTreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl SpatialPrefixTreeFactory for GeohashPrefixTreeFactory {
    type Tree = GeohashPrefixTree;

    fn config(&self) -> &PrefixTreeConfig {
        &self.config
    }

    fn level_for_distance(&self, degrees: f64) -> Result<usize> {
        let grid = GeohashPrefixTree::new(
            self.config.context,
            GeohashPrefixTree::max_levels_possible(),
        )?;
        Ok(grid.level_for_distance(degrees))
    }

    fn new_tree_with_levels(&self, max_levels: Option<usize>) -> Result<GeohashPrefixTree> {
        GeohashPrefixTree::new(
            self.config.context,
            max_levels.unwrap_or_else(GeohashPrefixTree::max_levels_possible),
        )
    }
}

/// Builds a geohash tree straight from a configuration.
pub fn make_tree(config: PrefixTreeConfig) -> Result<GeohashPrefixTree> {
    GeohashPrefixTreeFactory::new(config)?.new_tree()
}
