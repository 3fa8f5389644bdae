use analysis_core::{AnalysisError, FactorKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Per-factor weights. They are normalized by their total at scoring time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub valuation: f64,
    pub profitability: f64,
    pub growth: f64,
    pub momentum: f64,
    pub safety: f64,
    /// Zero leaves the market-quality factor out entirely.
    #[serde(default)]
    pub market_quality: f64,
}

impl FactorWeights {
    pub const FIVE_FACTOR: FactorWeights = FactorWeights {
        valuation: 0.30,
        profitability: 0.25,
        growth: 0.20,
        momentum: 0.15,
        safety: 0.10,
        market_quality: 0.0,
    };

    pub const SIX_FACTOR: FactorWeights = FactorWeights {
        valuation: 0.25,
        profitability: 0.20,
        growth: 0.20,
        momentum: 0.15,
        safety: 0.10,
        market_quality: 0.10,
    };

    pub fn weight(&self, factor: FactorKind) -> f64 {
        match factor {
            FactorKind::Valuation => self.valuation,
            FactorKind::Profitability => self.profitability,
            FactorKind::Growth => self.growth,
            FactorKind::Momentum => self.momentum,
            FactorKind::Safety => self.safety,
            FactorKind::MarketQuality => self.market_quality,
        }
    }

    pub fn total(&self) -> f64 {
        self.valuation + self.profitability + self.growth + self.momentum + self.safety + self.market_quality
    }

    pub fn includes_market_quality(&self) -> bool {
        self.market_quality > 0.0
    }
}

/// Which weight table to aggregate with.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightScheme {
    #[default]
    FiveFactor,
    SixFactor,
    Custom(FactorWeights),
}

impl WeightScheme {
    pub fn weights(&self) -> FactorWeights {
        match self {
            WeightScheme::FiveFactor => FactorWeights::FIVE_FACTOR,
            WeightScheme::SixFactor => FactorWeights::SIX_FACTOR,
            WeightScheme::Custom(w) => *w,
        }
    }
}

impl FromStr for WeightScheme {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "five" | "5" | "five_factor" | "five-factor" => Ok(WeightScheme::FiveFactor),
            "six" | "6" | "six_factor" | "six-factor" => Ok(WeightScheme::SixFactor),
            other => Err(AnalysisError::ConfigError(format!(
                "unknown weight scheme '{}' (expected five or six)",
                other
            ))),
        }
    }
}

/// How the valuation factor picks its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMode {
    /// First available of PEG, forward P/E, price/sales.
    #[default]
    FirstAvailable,
    /// Weighted average over PEG, forward P/E, EV/EBITDA and price/FCF.
    Blended,
}

impl FromStr for ValuationMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" | "first_available" | "first-available" => Ok(ValuationMode::FirstAvailable),
            "blended" | "multi" => Ok(ValuationMode::Blended),
            other => Err(AnalysisError::ConfigError(format!(
                "unknown valuation mode '{}' (expected first or blended)",
                other
            ))),
        }
    }
}

/// Shape of the profitability and growth factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringFamily {
    /// Piecewise-linear maps of gross margin and revenue growth.
    #[default]
    Linear,
    /// Fixed point increments for each metric clearing its threshold.
    Banded,
}

impl FromStr for ScoringFamily {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(ScoringFamily::Linear),
            "banded" => Ok(ScoringFamily::Banded),
            other => Err(AnalysisError::ConfigError(format!(
                "unknown scoring family '{}' (expected linear or banded)",
                other
            ))),
        }
    }
}

/// Scoring configuration.
///
/// Example JSON:
/// ```json
/// { "weights": "six_factor", "valuation": "blended", "family": "linear" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub weights: WeightScheme,
    pub valuation: ValuationMode,
    pub family: ScoringFamily,
}

impl ScoringConfig {
    /// Read `SCORING_SCHEME`, `VALUATION_MODE` and `SCORING_FAMILY`, falling back to
    /// defaults for unset variables.
    pub fn from_env() -> Result<Self, AnalysisError> {
        let mut config = ScoringConfig::default();
        if let Ok(v) = std::env::var("SCORING_SCHEME") {
            config.weights = v.parse()?;
        }
        if let Ok(v) = std::env::var("VALUATION_MODE") {
            config.valuation = v.parse()?;
        }
        if let Ok(v) = std::env::var("SCORING_FAMILY") {
            config.family = v.parse()?;
        }
        Ok(config)
    }

    /// Validate the configuration, returning every problem at once.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let weights = self.weights.weights();

        let named = [
            ("valuation", weights.valuation),
            ("profitability", weights.profitability),
            ("growth", weights.growth),
            ("momentum", weights.momentum),
            ("safety", weights.safety),
            ("market_quality", weights.market_quality),
        ];
        for (name, w) in named {
            if !w.is_finite() {
                errors.push(format!("weights.{}: must be a finite number", name));
            } else if w < 0.0 {
                errors.push(format!("weights.{}: must be non-negative", name));
            }
        }

        if errors.is_empty() && weights.total() <= 0.0 {
            errors.push("weights: total weight must be greater than zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScoringConfig::default();
        assert_eq!(config.weights, WeightScheme::FiveFactor);
        assert_eq!(config.valuation, ValuationMode::FirstAvailable);
        assert_eq!(config.family, ScoringFamily::Linear);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builtin_tables_sum_to_one() {
        assert!((FactorWeights::FIVE_FACTOR.total() - 1.0).abs() < 1e-9);
        assert!((FactorWeights::SIX_FACTOR.total() - 1.0).abs() < 1e-9);
        assert!(!FactorWeights::FIVE_FACTOR.includes_market_quality());
        assert!(FactorWeights::SIX_FACTOR.includes_market_quality());
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("six".parse::<WeightScheme>().unwrap(), WeightScheme::SixFactor);
        assert_eq!("Five-Factor".parse::<WeightScheme>().unwrap(), WeightScheme::FiveFactor);
        assert_eq!("blended".parse::<ValuationMode>().unwrap(), ValuationMode::Blended);
        assert_eq!("banded".parse::<ScoringFamily>().unwrap(), ScoringFamily::Banded);
        assert!("seven".parse::<WeightScheme>().is_err());
        assert!("cheap".parse::<ValuationMode>().is_err());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = ScoringConfig {
            weights: WeightScheme::Custom(FactorWeights {
                valuation: -0.1,
                profitability: 0.2,
                growth: f64::NAN,
                momentum: 0.1,
                safety: 0.1,
                market_quality: 0.0,
            }),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("valuation"));
        assert!(errors[1].contains("growth"));
    }

    #[test]
    fn test_validate_zero_total() {
        let config = ScoringConfig {
            weights: WeightScheme::Custom(FactorWeights {
                valuation: 0.0,
                profitability: 0.0,
                growth: 0.0,
                momentum: 0.0,
                safety: 0.0,
                market_quality: 0.0,
            }),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("total weight"));
    }

    #[test]
    fn test_config_json_round_trip() {
        let json = r#"{"weights":"six_factor","valuation":"blended"}"#;
        let config: ScoringConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.weights, WeightScheme::SixFactor);
        assert_eq!(config.valuation, ValuationMode::Blended);
        assert_eq!(config.family, ScoringFamily::Linear);

        let back: ScoringConfig = serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(config, back);
    }
}
