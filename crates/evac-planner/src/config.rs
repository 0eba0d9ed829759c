//! Planner configuration and per-request options.

use evac_regions::{DEFAULT_MATCH_THRESHOLD, STRICT_MATCH_THRESHOLD};

use crate::speed::{SpeedModel, WeatherCondition};
use crate::{PlanError, PlanResult};

/// Hard upper bound on destinations per request.
pub const MAX_ROUTES: usize = 10;

// ── PlannerConfig ─────────────────────────────────────────────────────────────

/// Long-lived planner settings.
///
/// | Field                    | Default |
/// |--------------------------|---------|
/// | `default_k`              | 5       |
/// | `max_k`                  | 10      |
/// | `match_threshold`        | 40      |
/// | `strict_match_threshold` | 50      |
/// | `speed`                  | [`SpeedModel::default`] |
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Destinations returned when a request does not say.
    pub default_k:              usize,
    /// Requests asking for more are silently capped to this.
    pub max_k:                  usize,
    pub match_threshold:        u8,
    pub strict_match_threshold: u8,
    pub speed:                  SpeedModel,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_k:              5,
            max_k:                  MAX_ROUTES,
            match_threshold:        DEFAULT_MATCH_THRESHOLD,
            strict_match_threshold: STRICT_MATCH_THRESHOLD,
            speed:                  SpeedModel::default(),
        }
    }
}

impl PlannerConfig {
    /// # Errors
    ///
    /// [`PlanError::Config`] on an out-of-range `k` or threshold, or an
    /// invalid speed model.
    pub fn validate(&self) -> PlanResult<()> {
        if self.max_k == 0 || self.max_k > MAX_ROUTES {
            return Err(PlanError::Config(format!(
                "max_k must be in 1..={MAX_ROUTES}, got {}",
                self.max_k
            )));
        }
        if self.default_k > self.max_k {
            return Err(PlanError::Config(format!(
                "default_k {} exceeds max_k {}",
                self.default_k, self.max_k
            )));
        }
        for (what, t) in [
            ("match_threshold", self.match_threshold),
            ("strict_match_threshold", self.strict_match_threshold),
        ] {
            if t > 100 {
                return Err(PlanError::Config(format!("{what} must be at most 100, got {t}")));
            }
        }
        self.speed.validate()
    }

    /// Options that resolve the origin at the strict threshold.
    pub fn strict_options(&self) -> RouteOptions {
        RouteOptions {
            match_threshold: Some(self.strict_match_threshold),
            ..RouteOptions::default()
        }
    }
}

// ── RouteOptions ──────────────────────────────────────────────────────────────

/// Per-request options.  `None` fields fall back to the [`PlannerConfig`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouteOptions {
    pub k:               Option<usize>,
    pub base_speed_kmph: Option<f64>,
    pub weather:         WeatherCondition,
    /// Local hour of departure, 0–23.
    pub hour_of_day:     u8,
    pub match_threshold: Option<u8>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            k:               None,
            base_speed_kmph: None,
            weather:         WeatherCondition::Clear,
            hour_of_day:     12,
            match_threshold: None,
        }
    }
}

impl RouteOptions {
    pub fn k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    pub fn base_speed(mut self, kmph: f64) -> Self {
        self.base_speed_kmph = Some(kmph);
        self
    }

    pub fn weather(mut self, weather: WeatherCondition) -> Self {
        self.weather = weather;
        self
    }

    pub fn hour(mut self, hour: u8) -> Self {
        self.hour_of_day = hour;
        self
    }

    pub fn threshold(mut self, threshold: u8) -> Self {
        self.match_threshold = Some(threshold);
        self
    }

    /// Fill defaults from `config` and check ranges.
    pub(crate) fn resolve(&self, config: &PlannerConfig) -> PlanResult<ResolvedOptions> {
        if self.hour_of_day > 23 {
            return Err(PlanError::InvalidOptions(format!(
                "hour_of_day must be 0–23, got {}",
                self.hour_of_day
            )));
        }
        let threshold = self.match_threshold.unwrap_or(config.match_threshold);
        if threshold > 100 {
            return Err(PlanError::InvalidOptions(format!(
                "match threshold must be at most 100, got {threshold}"
            )));
        }
        let base_speed_kmph = self.base_speed_kmph.unwrap_or(config.speed.base_speed_kmph);
        if !(base_speed_kmph.is_finite() && base_speed_kmph > 0.0) {
            return Err(PlanError::InvalidOptions(format!(
                "base speed must be finite and positive, got {base_speed_kmph}"
            )));
        }

        Ok(ResolvedOptions {
            k: self.k.unwrap_or(config.default_k).min(config.max_k),
            threshold,
            effective_speed_kmph: config.speed.effective_speed_kmph(
                base_speed_kmph,
                self.weather,
                self.hour_of_day,
            ),
        })
    }
}

/// Options after defaults and caps have been applied.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ResolvedOptions {
    pub k:                    usize,
    pub threshold:            u8,
    pub effective_speed_kmph: f64,
}
