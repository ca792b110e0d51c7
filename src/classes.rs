use crate::config::ConfigError;

use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::{Index, IndexMut};

/// The service class a customer is assigned when they reach the counter.
///
/// Classes are listed in their fixed sampling order, which is also the order used whenever the run draws something
/// once per class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassId {
    A,
    B,
    C,
}

impl ClassId {
    /// Every class, in sampling order.
    pub const ALL: [ClassId; 3] = [ClassId::A, ClassId::B, ClassId::C];
}

impl Display for ClassId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let name = match self {
            ClassId::A => "A",
            ClassId::B => "B",
            ClassId::C => "C",
        };
        f.write_str(name)
    }
}

/// One value per customer class.
///
/// Used both for per-class configuration and for per-class counters. Serializes as a table with `a`, `b` and `c`
/// keys.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassTable<T> {
    pub a: T,
    pub b: T,
    pub c: T,
}

impl<T> ClassTable<T> {
    pub fn new(a: T, b: T, c: T) -> Self {
        Self { a, b, c }
    }

    /// Iterate over `(class, value)` pairs in sampling order.
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &T)> + '_ {
        ClassId::ALL.into_iter().map(move |class| (class, &self[class]))
    }

    /// Apply `f` to each entry, keeping the class layout.
    pub fn map<U, F>(&self, mut f: F) -> ClassTable<U>
    where
        F: FnMut(ClassId, &T) -> U,
    {
        ClassTable {
            a: f(ClassId::A, &self.a),
            b: f(ClassId::B, &self.b),
            c: f(ClassId::C, &self.c),
        }
    }
}

impl<T> Index<ClassId> for ClassTable<T> {
    type Output = T;

    fn index(&self, class: ClassId) -> &T {
        match class {
            ClassId::A => &self.a,
            ClassId::B => &self.b,
            ClassId::C => &self.c,
        }
    }
}

impl<T> IndexMut<ClassId> for ClassTable<T> {
    fn index_mut(&mut self, class: ClassId) -> &mut T {
        match class {
            ClassId::A => &mut self.a,
            ClassId::B => &mut self.b,
            ClassId::C => &mut self.c,
        }
    }
}

/// Normalized class-selection distribution.
///
/// Built from a raw weight vector that only needs to be non-negative, finite, and not entirely zero; the weights are
/// divided by their sum, without overflowing, before anything samples from them. A [`WeightedIndex`] over the
/// normalized weights is built once here so that sampling does not repeat the validation.
#[derive(Clone, Debug)]
pub struct ClassWeights {
    probabilities: ClassTable<f64>,
    sampler: WeightedIndex<f64>,
}

impl ClassWeights {
    /// Validate and normalize a raw weight vector.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWeights`] if any weight is negative or not finite, or if all weights are zero.
    pub fn new(raw: ClassTable<f64>) -> Result<Self, ConfigError> {
        if raw.iter().any(|(_, weight)| !weight.is_finite() || *weight < 0.0) {
            return Err(ConfigError::InvalidWeights(raw));
        }

        let largest = raw.iter().map(|(_, weight)| *weight).fold(0.0, f64::max);
        if largest <= 0.0 {
            return Err(ConfigError::InvalidWeights(raw));
        }

        // Scaling by the largest weight first keeps the sum finite for any finite input.
        let scaled = raw.map(|_, weight| weight / largest);
        let total = scaled.a + scaled.b + scaled.c;
        let probabilities = scaled.map(|_, weight| weight / total);
        let sampler = WeightedIndex::new([probabilities.a, probabilities.b, probabilities.c])
            .map_err(|_| ConfigError::InvalidWeights(raw))?;

        Ok(Self { probabilities, sampler })
    }

    /// The normalized probability of drawing `class`.
    pub fn probability(&self, class: ClassId) -> f64 {
        self.probabilities[class]
    }

    /// All normalized probabilities; they sum to one.
    pub fn probabilities(&self) -> &ClassTable<f64> {
        &self.probabilities
    }

    /// Sampler over class indices, in the order of [`ClassId::ALL`].
    pub fn sampler(&self) -> &WeightedIndex<f64> {
        &self.sampler
    }
}
