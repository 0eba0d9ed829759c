//! Travel-speed model for ETA estimation.
//!
//! ```text
//! effective = max(base × weather(condition) × congestion(hour), min_speed)
//! eta_min   = distance_km × 60 / effective
//! ```
//!
//! # Default tables
//!
//! | Weather      | Multiplier |     | Hours (inclusive) | Congestion |
//! |--------------|-----------:|-----|-------------------|-----------:|
//! | `clear`      | 1.0        |     | 07–10             | 0.5        |
//! | `light_rain` | 0.8        |     | 17–20             | 0.4        |
//! | `heavy_rain` | 0.6        |     | 22–06 (wraps)     | 1.2        |
//! | `storm`      | 0.4        |     | anything else     | 1.0        |
//! | `flood`      | 0.3        |     |                   |            |

use std::str::FromStr;

use crate::{PlanError, PlanResult};

// ── WeatherCondition ──────────────────────────────────────────────────────────

/// Weather at departure, ordered by increasing severity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeatherCondition {
    #[default]
    Clear,
    LightRain,
    HeavyRain,
    Storm,
    Flood,
}

impl WeatherCondition {
    /// All conditions, mildest first.
    pub const ALL: [WeatherCondition; 5] = [
        WeatherCondition::Clear,
        WeatherCondition::LightRain,
        WeatherCondition::HeavyRain,
        WeatherCondition::Storm,
        WeatherCondition::Flood,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WeatherCondition::Clear     => "clear",
            WeatherCondition::LightRain => "light_rain",
            WeatherCondition::HeavyRain => "heavy_rain",
            WeatherCondition::Storm     => "storm",
            WeatherCondition::Flood     => "flood",
        }
    }
}

impl FromStr for WeatherCondition {
    type Err = PlanError;

    /// Case-insensitive; spaces and hyphens are read as `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        WeatherCondition::ALL
            .into_iter()
            .find(|w| w.as_str() == key)
            .ok_or_else(|| PlanError::InvalidOptions(format!("unknown weather condition {s:?}")))
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Tables ────────────────────────────────────────────────────────────────────

/// Speed multiplier per weather condition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WeatherMultipliers {
    pub clear:      f64,
    pub light_rain: f64,
    pub heavy_rain: f64,
    pub storm:      f64,
    pub flood:      f64,
}

impl Default for WeatherMultipliers {
    fn default() -> Self {
        Self {
            clear:      1.0,
            light_rain: 0.8,
            heavy_rain: 0.6,
            storm:      0.4,
            flood:      0.3,
        }
    }
}

impl WeatherMultipliers {
    pub fn get(&self, condition: WeatherCondition) -> f64 {
        match condition {
            WeatherCondition::Clear     => self.clear,
            WeatherCondition::LightRain => self.light_rain,
            WeatherCondition::HeavyRain => self.heavy_rain,
            WeatherCondition::Storm     => self.storm,
            WeatherCondition::Flood     => self.flood,
        }
    }
}

/// Congestion factor applied from `first_hour` to `last_hour`, both
/// inclusive.  A band with `first_hour > last_hour` wraps past midnight.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CongestionBand {
    pub first_hour: u8,
    pub last_hour:  u8,
    pub factor:     f64,
}

impl CongestionBand {
    pub fn new(first_hour: u8, last_hour: u8, factor: f64) -> Self {
        Self { first_hour, last_hour, factor }
    }

    pub fn contains(&self, hour: u8) -> bool {
        if self.first_hour <= self.last_hour {
            (self.first_hour..=self.last_hour).contains(&hour)
        } else {
            hour >= self.first_hour || hour <= self.last_hour
        }
    }
}

// ── SpeedModel ────────────────────────────────────────────────────────────────

/// Effective travel speed from base speed, weather and hour of day.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpeedModel {
    /// Speed used when a request does not supply one.
    pub base_speed_kmph: f64,
    pub weather:         WeatherMultipliers,
    /// Checked in order; the first band containing the hour wins.
    pub congestion:      Vec<CongestionBand>,
    /// Factor for hours outside every band.
    pub free_flow:       f64,
    /// Lower bound on the effective speed.
    pub min_speed_kmph:  f64,
}

impl Default for SpeedModel {
    fn default() -> Self {
        Self {
            base_speed_kmph: 25.0,
            weather:         WeatherMultipliers::default(),
            congestion:      vec![
                CongestionBand::new(7, 10, 0.5),
                CongestionBand::new(17, 20, 0.4),
                CongestionBand::new(22, 6, 1.2),
            ],
            free_flow:       1.0,
            min_speed_kmph:  1.0,
        }
    }
}

impl SpeedModel {
    /// Check the tables.
    ///
    /// # Errors
    ///
    /// [`PlanError::Config`] if any speed or factor is not finite and
    /// positive, if a worse weather condition has a larger multiplier than a
    /// milder one, if a band names an hour past 23, or if the congestion
    /// table lacks either a slowing (< 1.0) band or a free-flow (≥ 1.0)
    /// factor.
    pub fn validate(&self) -> PlanResult<()> {
        positive("base_speed_kmph", self.base_speed_kmph)?;
        positive("min_speed_kmph", self.min_speed_kmph)?;
        positive("free_flow", self.free_flow)?;

        let mut prev: Option<(WeatherCondition, f64)> = None;
        for w in WeatherCondition::ALL {
            let m = self.weather.get(w);
            positive(w.as_str(), m)?;
            match prev {
                Some((milder, pm)) if m > pm => {
                    return Err(PlanError::Config(format!(
                        "weather multiplier for {w} ({m}) exceeds {milder} ({pm})"
                    )));
                }
                _ => {}
            }
            prev = Some((w, m));
        }

        for band in &self.congestion {
            if band.first_hour > 23 || band.last_hour > 23 {
                return Err(PlanError::Config(format!(
                    "congestion band {}–{} names an hour past 23",
                    band.first_hour, band.last_hour
                )));
            }
            positive("congestion factor", band.factor)?;
        }
        if !self.congestion.iter().any(|b| b.factor < 1.0) {
            return Err(PlanError::Config("congestion table has no rush band (factor < 1.0)".into()));
        }
        if self.free_flow < 1.0 && !self.congestion.iter().any(|b| b.factor >= 1.0) {
            return Err(PlanError::Config("congestion table has no free-flow factor (≥ 1.0)".into()));
        }
        Ok(())
    }

    pub fn weather_multiplier(&self, condition: WeatherCondition) -> f64 {
        self.weather.get(condition)
    }

    /// Congestion factor for `hour` (0–23).
    pub fn congestion_factor(&self, hour: u8) -> f64 {
        self.congestion
            .iter()
            .find(|b| b.contains(hour))
            .map_or(self.free_flow, |b| b.factor)
    }

    /// Effective speed in km/h, never below `min_speed_kmph`.
    pub fn effective_speed_kmph(&self, base_speed_kmph: f64, weather: WeatherCondition, hour: u8) -> f64 {
        let speed = base_speed_kmph * self.weather_multiplier(weather) * self.congestion_factor(hour);
        speed.max(self.min_speed_kmph)
    }

    /// Minutes to cover `distance_km` at `speed_kmph`.
    #[inline]
    pub fn eta_min(distance_km: f64, speed_kmph: f64) -> f64 {
        distance_km * 60.0 / speed_kmph
    }

    /// Signed percentage change in speed caused by `weather` (e.g. −20 for
    /// light rain).
    pub fn weather_impact_pct(&self, weather: WeatherCondition) -> f64 {
        (self.weather_multiplier(weather) - 1.0) * 100.0
    }

    /// Signed percentage change in speed caused by traffic at `hour`.
    pub fn congestion_impact_pct(&self, hour: u8) -> f64 {
        (self.congestion_factor(hour) - 1.0) * 100.0
    }
}

fn positive(what: &str, v: f64) -> PlanResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(PlanError::Config(format!("{what} must be finite and positive, got {v}")))
    }
}
