//! Runtime configuration for the paint session.
//!
//! DESIGN
//! ======
//! Every tunable has a compiled-in default and an optional `PAINT_*`
//! environment override, so deployments can resize the grid or retune the
//! cooldown without a rebuild. Values that fail to parse fall back to the
//! default rather than aborting startup.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use canvas::consts::DRAG_THRESHOLD_PX;
use canvas::grid::GridSize;
use canvas::viewport::ViewportConfig;

const DEFAULT_GRID_WIDTH: u32 = 100;
const DEFAULT_GRID_HEIGHT: u32 = 100;
const DEFAULT_COOLDOWN_MS: u64 = 15_000;
const DEFAULT_LEADERBOARD_REFRESH_MS: u64 = 30_000;

/// Session-wide tunables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Grid width in cells.
    pub grid_width: u32,
    /// Grid height in cells.
    pub grid_height: u32,
    /// Minimum wait between two successful paints by this participant.
    pub cooldown: Duration,
    /// How often the leaderboard is re-fetched in the background.
    pub leaderboard_refresh: Duration,
    /// Zoom bounds, step ratio, and default cell size for the viewport.
    pub viewport: ViewportConfig,
    /// Pixel distance before a press is treated as a drag.
    pub drag_threshold_px: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            leaderboard_refresh: Duration::from_millis(DEFAULT_LEADERBOARD_REFRESH_MS),
            viewport: ViewportConfig::default(),
            drag_threshold_px: DRAG_THRESHOLD_PX,
        }
    }
}

impl Config {
    /// Build a config from `PAINT_*` environment variables, falling back to
    /// defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let viewport_defaults = defaults.viewport;
        Self {
            grid_width: parse_or(&lookup, "PAINT_GRID_WIDTH", defaults.grid_width),
            grid_height: parse_or(&lookup, "PAINT_GRID_HEIGHT", defaults.grid_height),
            cooldown: Duration::from_millis(parse_or(&lookup, "PAINT_COOLDOWN_MS", DEFAULT_COOLDOWN_MS)),
            leaderboard_refresh: Duration::from_millis(parse_or(
                &lookup,
                "PAINT_LEADERBOARD_REFRESH_MS",
                DEFAULT_LEADERBOARD_REFRESH_MS,
            )),
            viewport: ViewportConfig {
                default_cell_px: parse_or(&lookup, "PAINT_DEFAULT_CELL_PX", viewport_defaults.default_cell_px),
                min_scale: parse_or(&lookup, "PAINT_MIN_SCALE", viewport_defaults.min_scale),
                max_scale: parse_or(&lookup, "PAINT_MAX_SCALE", viewport_defaults.max_scale),
                zoom_step_ratio: parse_or(&lookup, "PAINT_ZOOM_STEP_RATIO", viewport_defaults.zoom_step_ratio),
            },
            drag_threshold_px: parse_or(&lookup, "PAINT_DRAG_THRESHOLD_PX", defaults.drag_threshold_px),
        }
    }

    /// The grid dimensions as the engine's size type.
    #[must_use]
    pub fn grid_size(&self) -> GridSize {
        GridSize::new(self.grid_width, self.grid_height)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
