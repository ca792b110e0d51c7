use crate::classes::{ClassId, ClassTable, ClassWeights};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reasons a [`StoreConfig`] can be rejected before a run starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("horizon must be positive and finite, got {0}")]
    NonPositiveHorizon(f64),
    #[error("{what} must be positive and finite, got {value}")]
    NonPositiveMean { what: String, value: f64 },
    #[error("{what} of {value} exceeds the largest supported time scale {limit}")]
    TimeScaleTooLarge { what: String, value: f64, limit: f64 },
    #[error("class weights {0:?} must be finite, non-negative and not all zero")]
    InvalidWeights(ClassTable<f64>),
    #[error("uniform range [{low}, {high}] for class {class} is empty or not finite")]
    InvalidUniformRange { class: ClassId, low: f64, high: f64 },
    #[error("profit for class {class} must be non-negative and finite, got {value}")]
    InvalidProfit { class: ClassId, value: f64 },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
}

/// How long a customer of some class occupies the server.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum ServiceModel {
    /// A fresh exponential draw with the given mean for every service.
    Exponential { mean: f64 },
    /// A single uniform draw on `[low, high]` taken when the run is built, then reused for every service of the class
    /// for the rest of the run.
    FixedPerRun { low: f64, high: f64 },
}

/// Per-class parameters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassConfig {
    /// Relative selection weight. Normalized against the other classes before sampling.
    pub weight: f64,
    /// Revenue booked whenever a customer of this class begins service.
    #[serde(default)]
    pub profit: f64,
    pub service: ServiceModel,
}

/// Parameters of one store simulation.
///
/// The [`Default`] implementation describes the reference store: customers arrive on average every three minutes over
/// an eight-hour day, and one customer in five buys nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Minimum simulated run length. The run overshoots it by one event and then drains the line.
    #[serde(default = "default_horizon")]
    pub horizon: f64,
    #[serde(default = "default_mean_interarrival")]
    pub mean_interarrival: f64,
    /// Seed handed to the stock random source by [`Simulation::seeded()`].
    ///
    /// [`Simulation::seeded()`]: crate::Simulation::seeded
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_classes")]
    pub classes: ClassTable<ClassConfig>,
}

fn default_horizon() -> f64 {
    480.0
}

fn default_mean_interarrival() -> f64 {
    3.0
}

fn default_seed() -> u64 {
    1
}

fn default_classes() -> ClassTable<ClassConfig> {
    ClassTable::new(
        ClassConfig {
            weight: 2.0,
            profit: 0.0,
            service: ServiceModel::Exponential { mean: 1.5 },
        },
        ClassConfig {
            weight: 5.0,
            profit: 2500.0,
            service: ServiceModel::FixedPerRun { low: 3.1, high: 3.8 },
        },
        ClassConfig {
            weight: 3.0,
            profit: 4500.0,
            service: ServiceModel::Exponential { mean: 7.0 },
        },
    )
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            mean_interarrival: default_mean_interarrival(),
            seed: default_seed(),
            classes: default_classes(),
        }
    }
}

impl StoreConfig {
    /// Largest horizon, mean or fixed service bound [`validate()`] accepts.
    ///
    /// An exponential draw from the stock source stays below fifty times its mean, so every clock value and scheduled
    /// time in a run stays several orders of magnitude below `f64::MAX`.
    ///
    /// [`validate()`]: StoreConfig::validate
    pub const MAX_TIME_SCALE: f64 = 1e300;

    /// Parse a configuration from TOML. Missing fields fall back to the reference store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid TOML or does not match the expected layout. The
    /// values themselves are not checked until [`validate()`] is called.
    ///
    /// [`validate()`]: StoreConfig::validate
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise behaves like [`from_toml_str()`].
    ///
    /// [`from_toml_str()`]: StoreConfig::from_toml_str
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let document = std::fs::read_to_string(path)?;
        Self::from_toml_str(&document)
    }

    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_mean_interarrival(mut self, mean: f64) -> Self {
        self.mean_interarrival = mean;
        self
    }

    pub fn with_class(mut self, class: ClassId, config: ClassConfig) -> Self {
        self.classes[class] = config;
        self
    }

    /// Check every parameter once, ahead of the run, and normalize the class weights.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, checking the horizon, then the interarrival mean, then the weight
    /// vector, then each class's service model and profit in class order.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(ConfigError::NonPositiveHorizon(self.horizon));
        }
        check_time_scale("horizon", self.horizon)?;
        check_mean("mean interarrival time", self.mean_interarrival)?;

        let weights = ClassWeights::new(self.classes.map(|_, class| class.weight))?;

        for (class, config) in self.classes.iter() {
            match config.service {
                ServiceModel::Exponential { mean } => check_mean(&format!("class {class} mean service time"), mean)?,
                ServiceModel::FixedPerRun { low, high } => {
                    if !(low.is_finite() && high.is_finite() && low >= 0.0 && low <= high) {
                        return Err(ConfigError::InvalidUniformRange { class, low, high });
                    }
                    check_time_scale(&format!("class {class} fixed service upper bound"), high)?;
                },
            }
            if !(config.profit.is_finite() && config.profit >= 0.0) {
                return Err(ConfigError::InvalidProfit {
                    class,
                    value: config.profit,
                });
            }
        }

        Ok(ValidatedConfig {
            config: self.clone(),
            weights,
        })
    }
}

fn check_mean(what: &str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::NonPositiveMean {
            what: what.to_owned(),
            value,
        });
    }
    check_time_scale(what, value)
}

fn check_time_scale(what: &str, value: f64) -> Result<(), ConfigError> {
    if value > StoreConfig::MAX_TIME_SCALE {
        return Err(ConfigError::TimeScaleTooLarge {
            what: what.to_owned(),
            value,
            limit: StoreConfig::MAX_TIME_SCALE,
        });
    }
    Ok(())
}

/// A [`StoreConfig`] that has passed [`StoreConfig::validate()`], paired with its normalized class weights.
#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    config: StoreConfig,
    weights: ClassWeights,
}

impl ValidatedConfig {
    pub fn horizon(&self) -> f64 {
        self.config.horizon
    }

    pub fn mean_interarrival(&self) -> f64 {
        self.config.mean_interarrival
    }

    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    pub fn class(&self, class: ClassId) -> &ClassConfig {
        &self.config.classes[class]
    }

    pub fn weights(&self) -> &ClassWeights {
        &self.weights
    }

    /// The configuration as it was before validation.
    pub fn raw(&self) -> &StoreConfig {
        &self.config
    }
}

impl TryFrom<StoreConfig> for ValidatedConfig {
    type Error = ConfigError;

    fn try_from(config: StoreConfig) -> Result<Self, Self::Error> {
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let validated = StoreConfig::default().validate().unwrap();
        assert_eq!(480.0, validated.horizon());
        assert_eq!(3.0, validated.mean_interarrival());
        assert!((validated.weights().probability(ClassId::B) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn non_positive_horizon_is_rejected() {
        for horizon in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = StoreConfig::default().with_horizon(horizon).validate();
            assert!(
                matches!(result, Err(ConfigError::NonPositiveHorizon(_))),
                "horizon {horizon} should be rejected"
            );
        }
    }

    #[test]
    fn non_positive_means_are_rejected() {
        let result = StoreConfig::default().with_mean_interarrival(0.0).validate();
        assert!(matches!(result, Err(ConfigError::NonPositiveMean { .. })));

        let result = StoreConfig::default()
            .with_class(
                ClassId::C,
                ClassConfig {
                    weight: 3.0,
                    profit: 4500.0,
                    service: ServiceModel::Exponential { mean: -7.0 },
                },
            )
            .validate();
        assert!(matches!(result, Err(ConfigError::NonPositiveMean { .. })));
    }

    #[test]
    fn time_scales_that_could_overflow_the_clock_are_rejected() {
        let result = StoreConfig::default().with_mean_interarrival(1e308).validate();
        assert!(matches!(result, Err(ConfigError::TimeScaleTooLarge { .. })));

        let result = StoreConfig::default().with_horizon(f64::MAX).validate();
        assert!(matches!(result, Err(ConfigError::TimeScaleTooLarge { .. })));

        let result = StoreConfig::default()
            .with_class(
                ClassId::B,
                ClassConfig {
                    weight: 5.0,
                    profit: 2500.0,
                    service: ServiceModel::FixedPerRun { low: 3.1, high: 1e305 },
                },
            )
            .validate();
        assert!(matches!(result, Err(ConfigError::TimeScaleTooLarge { .. })));

        let result = StoreConfig::default()
            .with_class(
                ClassId::C,
                ClassConfig {
                    weight: 3.0,
                    profit: 4500.0,
                    service: ServiceModel::Exponential { mean: 1e307 },
                },
            )
            .validate();
        assert!(matches!(result, Err(ConfigError::TimeScaleTooLarge { .. })));

        StoreConfig::default()
            .with_mean_interarrival(StoreConfig::MAX_TIME_SCALE)
            .validate()
            .unwrap();
    }

    #[test]
    fn inverted_uniform_range_is_rejected() {
        let result = StoreConfig::default()
            .with_class(
                ClassId::B,
                ClassConfig {
                    weight: 5.0,
                    profit: 2500.0,
                    service: ServiceModel::FixedPerRun { low: 3.8, high: 3.1 },
                },
            )
            .validate();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidUniformRange { class: ClassId::B, .. })
        ));
    }

    #[test]
    fn negative_profit_is_rejected() {
        let mut config = StoreConfig::default();
        config.classes.c.profit = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProfit { class: ClassId::C, .. })
        ));
    }

    #[test]
    fn toml_overrides_merge_with_defaults() {
        let config = StoreConfig::from_toml_str(
            r#"
            horizon = 60.0
            seed = 42

            [classes.a]
            weight = 1.0
            service = { distribution = "exponential", mean = 2.0 }

            [classes.b]
            weight = 1.0
            profit = 10.0
            service = { distribution = "fixed_per_run", low = 1.0, high = 2.0 }

            [classes.c]
            weight = 0.0
            profit = 20.0
            service = { distribution = "exponential", mean = 4.0 }
            "#,
        )
        .unwrap();

        assert_eq!(60.0, config.horizon);
        assert_eq!(42, config.seed);
        assert_eq!(3.0, config.mean_interarrival, "omitted field should keep its default");
        assert_eq!(0.0, config.classes.a.profit, "omitted profit should default to zero");
        assert_eq!(ServiceModel::FixedPerRun { low: 1.0, high: 2.0 }, config.classes.b.service);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = StoreConfig::from_toml_str("horizon = \"all day\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = StoreConfig::load("/nonexistent/checkout-sim/store.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
