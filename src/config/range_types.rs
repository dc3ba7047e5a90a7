use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A grid cell dimension in world units, always strictly positive
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct CellSize(f32);

impl CellSize {
    /// Returns `None` for zero, negative or non-finite sizes
    pub fn new(value: f32) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for CellSize {
    fn default() -> Self {
        Self(20.0)
    }
}

impl TryFrom<f32> for CellSize {
    type Error = String;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("cell size must be > 0, got {value}"))
    }
}

impl From<CellSize> for f32 {
    fn from(size: CellSize) -> Self {
        size.0
    }
}

/// An obstacle traversal cost constrained to [0.0, +inf)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct ObstacleCost(f32);

impl ObstacleCost {
    const MIN: f32 = 0.0;

    pub fn new(value: f32) -> Self {
        Self(value.max(Self::MIN))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for ObstacleCost {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl From<f32> for ObstacleCost {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<ObstacleCost> for f32 {
    fn from(cost: ObstacleCost) -> Self {
        cost.0
    }
}
