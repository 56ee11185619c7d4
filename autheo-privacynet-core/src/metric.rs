use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Integer distances between datasets count record edits.
pub type IntDistance = u64;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DistanceKind {
    Int,
    Float,
}

impl DistanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceKind::Int => "int",
            DistanceKind::Float => "float",
        }
    }
}

/// Input-distance bound fed to stability and privacy maps.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Distance {
    Int(IntDistance),
    Float(f64),
}

impl Distance {
    pub fn kind(&self) -> DistanceKind {
        match self {
            Distance::Int(_) => DistanceKind::Int,
            Distance::Float(_) => DistanceKind::Float,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Distance::Int(d) => *d as f64,
            Distance::Float(d) => *d,
        }
    }

    pub fn as_int(&self) -> CoreResult<IntDistance> {
        match self {
            Distance::Int(d) => Ok(*d),
            Distance::Float(_) => Err(CoreError::DistanceKind {
                expected: DistanceKind::Int.as_str(),
                found: DistanceKind::Float.as_str(),
            }),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Distance::Int(d) => *d == 0,
            Distance::Float(d) => *d == 0.0,
        }
    }

    /// Rejects distances of the wrong kind and negative or NaN floats.
    pub fn expect_kind(&self, kind: DistanceKind) -> CoreResult<()> {
        if self.kind() != kind {
            return Err(CoreError::DistanceKind {
                expected: kind.as_str(),
                found: self.kind().as_str(),
            });
        }
        if let Distance::Float(d) = self {
            if d.is_nan() || *d < 0.0 {
                return Err(CoreError::invalid(format!(
                    "distance must be non-negative, got {d}"
                )));
            }
        }
        Ok(())
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Distance::Int(a), Distance::Int(b)) => a.partial_cmp(b),
            (Distance::Float(a), Distance::Float(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<u64> for Distance {
    fn from(value: u64) -> Self {
        Distance::Int(value)
    }
}

impl From<f64> for Distance {
    fn from(value: f64) -> Self {
        Distance::Float(value)
    }
}

/// Distance between pairs of values in a domain.
///
/// Metrics promise an upper bound on the true distance, not an exact one.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "metric", content = "distance", rename_all = "snake_case")]
pub enum Metric {
    /// Additions plus removals between two multisets.
    SymmetricDistance,
    /// Insertions plus deletions, order sensitive.
    InsertDeleteDistance,
    /// Number of records changed between two equal-size datasets.
    ChangeOneDistance,
    /// Number of positions that differ.
    HammingDistance,
    AbsoluteDistance(DistanceKind),
    L1Distance(DistanceKind),
    L2Distance(DistanceKind),
}

impl Metric {
    pub fn distance_kind(&self) -> DistanceKind {
        match self {
            Metric::SymmetricDistance
            | Metric::InsertDeleteDistance
            | Metric::ChangeOneDistance
            | Metric::HammingDistance => DistanceKind::Int,
            Metric::AbsoluteDistance(kind) | Metric::L1Distance(kind) | Metric::L2Distance(kind) => {
                *kind
            }
        }
    }

    /// True for the record-edit metrics defined between datasets.
    pub fn is_dataset_metric(&self) -> bool {
        matches!(
            self,
            Metric::SymmetricDistance
                | Metric::InsertDeleteDistance
                | Metric::ChangeOneDistance
                | Metric::HammingDistance
        )
    }

    pub(crate) fn describe(&self) -> String {
        format!("{self:?}")
    }
}
