//! Categorical flood-risk label attached to every region.
//!
//! Labels come from an external risk model and are consumed as-is.  Parsing
//! is case-insensitive and whitespace-tolerant; anything outside the four
//! known labels is rejected rather than silently mapped to `Unknown`.

use std::str::FromStr;

use crate::CoreError;

/// Flood-risk label of a region.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RiskLevel {
    /// Safe evacuation destination.
    Low,
    Moderate,
    High,
    /// The risk model produced no label for this region.
    #[default]
    Unknown,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::Unknown,
    ];

    /// `true` for regions that qualify as evacuation destinations.
    #[inline]
    pub fn is_safe(self) -> bool {
        matches!(self, RiskLevel::Low)
    }

    /// Lower-case label, as used in CSV input and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low      => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High     => "high",
            RiskLevel::Unknown  => "unknown",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low"      => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high"     => Ok(RiskLevel::High),
            "unknown"  => Ok(RiskLevel::Unknown),
            _ => Err(CoreError::InvalidRiskLevel(s.to_string())),
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
