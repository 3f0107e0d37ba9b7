//! Model parameters and caller-supplied lookup tables.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::math::EPSILON;

/// A named configuration value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Float(f64),
    Int(i64),
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

/// Untyped parameter set, as read from a configuration source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    values: HashMap<String, ParamValue>,
}

impl ParameterBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any previous value.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.values.insert(key.to_owned(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<ParamValue> {
        self.values.get(key).copied()
    }

    /// Numeric value of `key`; integers are widened.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingParameter`] if `key` is absent.
    pub fn float(&self, key: &'static str) -> Result<f64, ConfigError> {
        self.optional_float(key)
            .ok_or(ConfigError::MissingParameter(key))
    }

    /// Numeric value of `key`, or `None` if absent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn optional_float(&self, key: &str) -> Option<f64> {
        self.get(key).map(|v| match v {
            ParamValue::Float(f) => f,
            ParamValue::Int(i) => i as f64,
        })
    }

    /// Integer value of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingParameter`] if `key` is absent and
    /// [`ConfigError::WrongType`] if it holds a float.
    pub fn int(&self, key: &'static str) -> Result<i64, ConfigError> {
        match self.get(key) {
            Some(ParamValue::Int(i)) => Ok(i),
            Some(ParamValue::Float(_)) => Err(ConfigError::WrongType {
                key,
                expected: "an integer",
            }),
            None => Err(ConfigError::MissingParameter(key)),
        }
    }
}

impl<K: AsRef<str>> FromIterator<(K, ParamValue)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (K, ParamValue)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_owned(), v))
                .collect(),
        }
    }
}

const DEFAULT_TAU: f64 = 0.3;
const DEFAULT_DT: f64 = 1.0;
const MAX_DIRECTIONS: i64 = 1024;

/// Validated parameters of the movement model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    /// Visual range (m).
    pub r: f32,
    /// Wall-sticking threshold (m).
    pub w: f32,
    /// Allowed body overlap between occupants (m).
    pub delta_d: f32,
    /// Wall-avoidance weight.
    pub kw: f64,
    /// Crowd-density weight.
    pub kp: f64,
    /// Distance-field gradient weight.
    pub ks: f64,
    /// Number of candidate directions.
    pub q: usize,
    /// Probability that a contended cell admits nobody.
    pub tau: f64,
    /// Step duration (s).
    pub dt: f32,
}

impl ModelParams {
    /// Reads and validates `r, w, deltaD, kw, kp, ks, q` and the optional
    /// `tau` (default 0.3) and `dt` (default 1.0).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for missing, mistyped or out-of-range
    /// values.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_bag(bag: &ParameterBag) -> Result<Self, ConfigError> {
        let min_len = f64::from(EPSILON);
        let r = ranged("r", bag.float("r")?, min_len, f64::from(f32::MAX))?;
        let w = ranged("w", bag.float("w")?, 0.0, f64::from(f32::MAX))?;
        let delta_d = ranged("deltaD", bag.float("deltaD")?, 0.0, f64::from(f32::MAX))?;
        let kw = ranged("kw", bag.float("kw")?, 0.0, f64::MAX)?;
        let kp = ranged("kp", bag.float("kp")?, 0.0, f64::MAX)?;
        let ks = ranged("ks", bag.float("ks")?, 0.0, f64::MAX)?;

        let q = bag.int("q")?;
        if !(3..=MAX_DIRECTIONS).contains(&q) {
            return Err(ConfigError::OutOfRange {
                parameter: "q",
                value: q as f64,
                min: 3.0,
                max: MAX_DIRECTIONS as f64,
            });
        }

        let tau = ranged("tau", bag.optional_float("tau").unwrap_or(DEFAULT_TAU), 0.0, 1.0)?;
        let dt = ranged(
            "dt",
            bag.optional_float("dt").unwrap_or(DEFAULT_DT),
            min_len,
            f64::from(f32::MAX),
        )?;

        Ok(Self {
            r: r as f32,
            w: w as f32,
            delta_d: delta_d as f32,
            kw,
            kp,
            ks,
            q: q as usize,
            tau,
            dt: dt as f32,
        })
    }
}

fn ranged(parameter: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            parameter,
            value,
            min,
            max,
        })
    }
}

/// Options of a [`crate::movement::Simulation`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationOptions {
    /// Seed of every random draw; equal seeds replay equal runs.
    pub seed: u64,
}

/// Kind of ground an occupant is moving over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathType {
    Horizontal,
    Doorway,
    StairsDown,
    StairsUp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EmotionalState {
    Calm,
    #[default]
    Normal,
    Active,
    Panic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clothing {
    Light,
    Seasonal,
    Winter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    Child,
    Teen,
    Adult,
    Elderly,
}

/// Walking speed (m/s) by path type and emotional state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeedTable {
    speeds: HashMap<(PathType, EmotionalState), f32>,
}

impl SpeedTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Same speed for every emotional state on `path`.
    #[must_use]
    pub fn with_path(mut self, path: PathType, speed: f32) -> Self {
        for emotion in [
            EmotionalState::Calm,
            EmotionalState::Normal,
            EmotionalState::Active,
            EmotionalState::Panic,
        ] {
            self.speeds.insert((path, emotion), speed);
        }
        self
    }

    #[must_use]
    pub fn with(mut self, path: PathType, emotion: EmotionalState, speed: f32) -> Self {
        self.speeds.insert((path, emotion), speed);
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MissingLookup`] for an absent combination.
    pub fn speed(&self, path: PathType, emotion: EmotionalState) -> Result<f32, ConfigError> {
        self.speeds
            .get(&(path, emotion))
            .copied()
            .ok_or_else(|| ConfigError::MissingLookup(format!("speed for {path:?}/{emotion:?}")))
    }
}

/// Projection diameter (m) by clothing and age group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiameterTable {
    diameters: HashMap<(Clothing, AgeGroup), f32>,
}

impl DiameterTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, clothing: Clothing, age: AgeGroup, diameter: f32) -> Self {
        self.diameters.insert((clothing, age), diameter);
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MissingLookup`] for an absent combination.
    pub fn diameter(&self, clothing: Clothing, age: AgeGroup) -> Result<f32, ConfigError> {
        self.diameters.get(&(clothing, age)).copied().ok_or_else(|| {
            ConfigError::MissingLookup(format!("diameter for {clothing:?}/{age:?}"))
        })
    }
}
