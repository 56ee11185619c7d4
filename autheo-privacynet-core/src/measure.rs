//! Privacy measures and the loss values their privacy maps emit.
//!
//! The measure set is closed: every pairing the composer accepts is listed
//! in [`Measure::unify`], and every loss shape a map may return is a
//! [`PrivacyLoss`] variant checked against the declared measure.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Divergence between the output distributions of a measurement on
/// neighboring inputs.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Pure ε-DP.
    MaxDivergence,
    /// ρ-zCDP.
    ZeroConcentratedDivergence,
    /// Rényi DP, reported as a curve ε(α).
    RenyiDivergence,
    /// Approximate DP, reported as a privacy curve ε(δ).
    SmoothedMaxDivergence,
    /// Any measure paired with an additive δ term.
    Approximate(Box<Measure>),
}

impl Measure {
    /// The fixed (ε, δ) measure.
    pub fn fixed_smoothed_max_divergence() -> Self {
        Measure::Approximate(Box::new(Measure::MaxDivergence))
    }

    pub fn approximate(self) -> CoreResult<Self> {
        if self.is_approximate() {
            return Err(CoreError::unsupported(&self, "an approximate measure"));
        }
        Ok(Measure::Approximate(Box::new(self)))
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self, Measure::Approximate(_))
    }

    /// Measure with any `Approximate` wrapper removed.
    pub fn base(&self) -> &Measure {
        match self {
            Measure::Approximate(inner) => inner.as_ref(),
            other => other,
        }
    }

    /// Common measure two losses can be combined under, if any.
    ///
    /// Identical measures unify as themselves; `M` and `Approximate(M)`
    /// unify to `Approximate(M)`. No other pairing is defined.
    pub fn unify(&self, other: &Measure) -> Option<Measure> {
        match (self, other) {
            (a, b) if a == b => Some(a.clone()),
            (Measure::Approximate(inner), plain) | (plain, Measure::Approximate(inner))
                if **inner == *plain =>
            {
                Some(Measure::Approximate(inner.clone()))
            }
            _ => None,
        }
    }

    /// Whether `loss` has the shape this measure reports.
    pub fn admits(&self, loss: &PrivacyLoss) -> bool {
        match (self, loss) {
            (Measure::MaxDivergence, PrivacyLoss::Epsilon(_))
            | (Measure::ZeroConcentratedDivergence, PrivacyLoss::Rho(_))
            | (Measure::RenyiDivergence, PrivacyLoss::Renyi(_))
            | (Measure::SmoothedMaxDivergence, PrivacyLoss::Curve(_)) => true,
            (Measure::Approximate(inner), PrivacyLoss::Approximate { loss, .. }) => {
                inner.admits(loss)
            }
            _ => false,
        }
    }

    pub(crate) fn describe(&self) -> String {
        format!("{self:?}")
    }
}

type CurveFn = dyn Fn(f64) -> CoreResult<f64> + Send + Sync;

/// ε(δ) curve of a smoothed max-divergence bound.
///
/// The closure and everything it captured are shared through an `Arc`, so a
/// curve handed out by a privacy map outlives the measurement and the
/// constructors that produced it.
#[derive(Clone)]
pub struct PrivacyCurve {
    repr: CurveRepr,
}

#[derive(Clone)]
enum CurveRepr {
    Leaf(Arc<CurveFn>),
    /// Flattened leaves of a composed curve.
    Sum(Arc<[PrivacyCurve]>),
}

impl PrivacyCurve {
    pub fn new(epsilon: impl Fn(f64) -> CoreResult<f64> + Send + Sync + 'static) -> Self {
        Self {
            repr: CurveRepr::Leaf(Arc::new(epsilon)),
        }
    }

    /// Basic composition of curves, `δ ↦ Σ εᵢ(δ / k)` over the `k` leaf
    /// curves. Composed inputs are flattened first, so nesting does not
    /// change the split.
    pub fn sum(curves: impl IntoIterator<Item = PrivacyCurve>) -> Self {
        let mut leaves = Vec::new();
        for curve in curves {
            match curve.repr {
                CurveRepr::Sum(parts) => leaves.extend(parts.iter().cloned()),
                leaf => leaves.push(PrivacyCurve { repr: leaf }),
            }
        }
        Self {
            repr: CurveRepr::Sum(leaves.into()),
        }
    }

    /// Smallest ε this curve guarantees at `delta`.
    pub fn epsilon(&self, delta: f64) -> CoreResult<f64> {
        if delta.is_nan() || delta < 0.0 {
            return Err(CoreError::invalid(format!(
                "delta must be non-negative, got {delta}"
            )));
        }
        let epsilon = match &self.repr {
            CurveRepr::Leaf(epsilon) => epsilon(delta)?,
            CurveRepr::Sum(leaves) => {
                let share = delta / leaves.len().max(1) as f64;
                leaves
                    .iter()
                    .map(|leaf| leaf.epsilon(share))
                    .sum::<CoreResult<f64>>()?
            }
        };
        checked_bound("epsilon", epsilon)
    }
}

impl fmt::Debug for PrivacyCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            CurveRepr::Leaf(_) => f.write_str("PrivacyCurve(..)"),
            CurveRepr::Sum(leaves) => write!(f, "PrivacyCurve(sum of {})", leaves.len()),
        }
    }
}

/// ε(α) curve of a Rényi-DP bound, defined for orders α > 1.
#[derive(Clone)]
pub struct RenyiCurve {
    epsilon: Arc<CurveFn>,
}

impl RenyiCurve {
    pub fn new(epsilon: impl Fn(f64) -> CoreResult<f64> + Send + Sync + 'static) -> Self {
        Self {
            epsilon: Arc::new(epsilon),
        }
    }

    pub fn eval(&self, alpha: f64) -> CoreResult<f64> {
        if alpha.is_nan() || alpha <= 1.0 {
            return Err(CoreError::invalid(format!(
                "Rényi order must exceed 1, got {alpha}"
            )));
        }
        let epsilon = (self.epsilon)(alpha)?;
        checked_bound("Rényi epsilon", epsilon)
    }
}

impl fmt::Debug for RenyiCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RenyiCurve(..)")
    }
}

/// Output-distance bound of a privacy map, shaped by its measure.
#[derive(Clone, Debug)]
pub enum PrivacyLoss {
    Epsilon(f64),
    Rho(f64),
    Renyi(RenyiCurve),
    Curve(PrivacyCurve),
    Approximate { loss: Box<PrivacyLoss>, delta: f64 },
}

impl PrivacyLoss {
    pub fn approximate(self, delta: f64) -> Self {
        PrivacyLoss::Approximate {
            loss: Box::new(self),
            delta,
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            PrivacyLoss::Epsilon(_) => "epsilon",
            PrivacyLoss::Rho(_) => "rho",
            PrivacyLoss::Renyi(_) => "renyi curve",
            PrivacyLoss::Curve(_) => "privacy curve",
            PrivacyLoss::Approximate { .. } => "approximate",
        }
    }

    pub fn epsilon(&self) -> CoreResult<f64> {
        match self {
            PrivacyLoss::Epsilon(epsilon) => Ok(*epsilon),
            other => Err(shape_error("epsilon", other)),
        }
    }

    pub fn rho(&self) -> CoreResult<f64> {
        match self {
            PrivacyLoss::Rho(rho) => Ok(*rho),
            other => Err(shape_error("rho", other)),
        }
    }

    pub fn curve(&self) -> CoreResult<&PrivacyCurve> {
        match self {
            PrivacyLoss::Curve(curve) => Ok(curve),
            other => Err(shape_error("privacy curve", other)),
        }
    }

    pub fn renyi(&self) -> CoreResult<&RenyiCurve> {
        match self {
            PrivacyLoss::Renyi(curve) => Ok(curve),
            other => Err(shape_error("renyi curve", other)),
        }
    }

    /// Splits an approximate loss into its inner loss and δ term.
    pub fn split_approximate(&self) -> CoreResult<(&PrivacyLoss, f64)> {
        match self {
            PrivacyLoss::Approximate { loss, delta } => Ok((loss.as_ref(), *delta)),
            other => Err(shape_error("approximate", other)),
        }
    }

    /// The (ε, δ) pair of a fixed approximate-DP loss.
    pub fn epsilon_delta(&self) -> CoreResult<(f64, f64)> {
        let (loss, delta) = self.split_approximate()?;
        Ok((loss.epsilon()?, delta))
    }

    /// Re-expresses this loss under `target`, wrapping plain losses as
    /// `(loss, 0)` when the target is their approximate form.
    pub fn upcast(self, target: &Measure) -> CoreResult<PrivacyLoss> {
        if target.admits(&self) {
            return Ok(self);
        }
        match target {
            Measure::Approximate(inner) if inner.admits(&self) => Ok(self.approximate(0.0)),
            _ => Err(CoreError::IncompatibleMeasures {
                left: self.shape().to_owned(),
                right: target.describe(),
            }),
        }
    }

    /// Rejects NaN and negative scalar components.
    pub fn validate(&self) -> CoreResult<()> {
        match self {
            PrivacyLoss::Epsilon(value) => checked_bound("epsilon", *value).map(|_| ()),
            PrivacyLoss::Rho(value) => checked_bound("rho", *value).map(|_| ()),
            PrivacyLoss::Renyi(_) | PrivacyLoss::Curve(_) => Ok(()),
            PrivacyLoss::Approximate { loss, delta } => {
                checked_bound("delta", *delta)?;
                loss.validate()
            }
        }
    }

    /// Whether this loss is no larger than `claim`, component-wise.
    ///
    /// Curves cannot be ordered without a concrete δ or α.
    pub fn within(&self, claim: &PrivacyLoss) -> CoreResult<bool> {
        match (self, claim) {
            (PrivacyLoss::Epsilon(a), PrivacyLoss::Epsilon(b))
            | (PrivacyLoss::Rho(a), PrivacyLoss::Rho(b)) => Ok(a <= b),
            (
                PrivacyLoss::Approximate { loss, delta },
                PrivacyLoss::Approximate {
                    loss: claim_loss,
                    delta: claim_delta,
                },
            ) => Ok(delta <= claim_delta && loss.within(claim_loss)?),
            (PrivacyLoss::Renyi(_), _) | (PrivacyLoss::Curve(_), _) => Err(CoreError::invalid(
                "curve-valued losses must be evaluated before comparison",
            )),
            (ours, theirs) => Err(CoreError::IncompatibleMeasures {
                left: ours.shape().to_owned(),
                right: theirs.shape().to_owned(),
            }),
        }
    }
}

fn shape_error(expected: &str, found: &PrivacyLoss) -> CoreError {
    CoreError::invalid(format!(
        "expected a {expected} loss, found {}",
        found.shape()
    ))
}

fn checked_bound(name: &str, value: f64) -> CoreResult<f64> {
    if value.is_nan() {
        return Err(CoreError::arithmetic(format!("{name} evaluated to NaN")));
    }
    if value < 0.0 {
        return Err(CoreError::arithmetic(format!(
            "{name} must be non-negative, got {value}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unify_table() {
        let pure = Measure::MaxDivergence;
        let fixed = Measure::fixed_smoothed_max_divergence();
        assert_eq!(pure.unify(&pure), Some(Measure::MaxDivergence));
        assert_eq!(pure.unify(&fixed), Some(fixed.clone()));
        assert_eq!(fixed.unify(&pure), Some(fixed.clone()));
        assert_eq!(pure.unify(&Measure::ZeroConcentratedDivergence), None);
        assert_eq!(
            fixed.unify(&Measure::ZeroConcentratedDivergence.approximate().unwrap()),
            None
        );
    }

    #[test]
    fn double_approximation_is_rejected() {
        let fixed = Measure::fixed_smoothed_max_divergence();
        assert!(matches!(
            fixed.approximate(),
            Err(CoreError::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn upcast_wraps_with_zero_delta() {
        let target = Measure::fixed_smoothed_max_divergence();
        let loss = PrivacyLoss::Epsilon(1.5).upcast(&target).unwrap();
        assert_eq!(loss.epsilon_delta().unwrap(), (1.5, 0.0));
        assert!(PrivacyLoss::Rho(0.1).upcast(&target).is_err());
    }

    #[test]
    fn curves_reject_negative_delta_and_nan_output() {
        let curve = PrivacyCurve::new(|_| Ok(f64::NAN));
        assert!(matches!(curve.epsilon(-0.1), Err(CoreError::InvalidParameter(_))));
        assert!(matches!(curve.epsilon(0.1), Err(CoreError::Arithmetic(_))));
    }

    #[test]
    fn curve_sums_split_delta_across_leaves() {
        let linear = || PrivacyCurve::new(|delta| Ok(1.0 - delta));
        let flat = PrivacyCurve::sum([linear(), linear(), linear(), linear()]);
        let nested = PrivacyCurve::sum([
            PrivacyCurve::sum([linear(), linear()]),
            linear(),
            linear(),
        ]);
        approx::assert_relative_eq!(flat.epsilon(0.4).unwrap(), 3.6);
        assert_eq!(nested.epsilon(0.4).unwrap(), flat.epsilon(0.4).unwrap());
    }

    #[test]
    fn renyi_order_must_exceed_one() {
        let curve = RenyiCurve::new(|alpha| Ok(alpha / 2.0));
        assert!(curve.eval(1.0).is_err());
        assert_eq!(curve.eval(4.0).unwrap(), 2.0);
    }

    #[test]
    fn within_compares_componentwise() {
        let small = PrivacyLoss::Epsilon(0.5).approximate(1e-7);
        let big = PrivacyLoss::Epsilon(1.0).approximate(1e-6);
        assert!(small.within(&big).unwrap());
        assert!(!big.within(&small).unwrap());
        assert!(PrivacyLoss::Epsilon(1.0)
            .within(&PrivacyLoss::Rho(1.0))
            .is_err());
    }
}
