//! Conversions between privacy measures. The release function is shared
//! with the source measurement; only the measure and privacy map change.

use autheo_privacynet_core::{
    Contrib, CoreError, CoreResult, Measure, Measurement, PrivacyCurve, PrivacyLoss, PrivacyMap,
};
use tracing::debug;

use crate::{
    config::SearchConfig,
    search::{cdp_epsilon, renyi_epsilon},
};

/// ε-DP implies (ε²/2)-zCDP.
pub fn make_pure_dp_to_zcdp(meas: &Measurement, _contrib: &Contrib) -> CoreResult<Measurement> {
    require(meas, &Measure::MaxDivergence, "zero-concentrated divergence")?;
    debug!("converting pure DP to zCDP");
    Ok(convert(meas, Measure::ZeroConcentratedDivergence, |loss| {
        let epsilon = loss.epsilon()?;
        Ok(PrivacyLoss::Rho(epsilon * epsilon / 2.0))
    }))
}

/// zCDP to a privacy curve, by the Canonne–Kamath–Steinke bound.
///
/// `Approximate(zCDP)` converts to `Approximate(SmoothedMaxDivergence)` and
/// keeps its δ term.
pub fn make_zcdp_to_approx_dp(
    meas: &Measurement,
    search: &SearchConfig,
    _contrib: &Contrib,
) -> CoreResult<Measurement> {
    let search = validated(search)?;
    let to_curve = move |loss: &PrivacyLoss| -> CoreResult<PrivacyLoss> {
        let rho = loss.rho()?;
        Ok(PrivacyLoss::Curve(PrivacyCurve::new(move |delta| {
            cdp_epsilon(rho, delta, &search)
        })))
    };
    let converted = curve_conversion(
        meas,
        &Measure::ZeroConcentratedDivergence,
        "zero-concentrated",
        to_curve,
    )?;
    debug!(
        "converted zCDP to approximate DP measure={:?}",
        converted.output_measure()
    );
    Ok(converted)
}

/// Rényi-DP to a privacy curve. Each δ evaluation runs a bounded search
/// over α.
pub fn make_renyi_to_approx_dp(
    meas: &Measurement,
    search: &SearchConfig,
    _contrib: &Contrib,
) -> CoreResult<Measurement> {
    let search = validated(search)?;
    let to_curve = move |loss: &PrivacyLoss| -> CoreResult<PrivacyLoss> {
        let renyi = loss.renyi()?.clone();
        Ok(PrivacyLoss::Curve(PrivacyCurve::new(move |delta| {
            renyi_epsilon(&renyi, delta, &search)
        })))
    };
    let converted = curve_conversion(meas, &Measure::RenyiDivergence, "renyi", to_curve)?;
    debug!(
        "converted Rényi DP to approximate DP measure={:?}",
        converted.output_measure()
    );
    Ok(converted)
}

/// A fixed (ε, δ) pair as the curve `δ′ ↦ ε` for `δ′ ≥ δ`, else `+∞`.
pub fn make_fixed_approx_dp_to_approx_dp(
    meas: &Measurement,
    _contrib: &Contrib,
) -> CoreResult<Measurement> {
    require(
        meas,
        &Measure::fixed_smoothed_max_divergence(),
        "smoothed max divergence",
    )?;
    debug!("converting fixed approximate DP to a privacy curve");
    Ok(convert(meas, Measure::SmoothedMaxDivergence, |loss| {
        let (epsilon, delta) = loss.epsilon_delta()?;
        Ok(PrivacyLoss::Curve(PrivacyCurve::new(move |delta_prime| {
            Ok(if delta_prime >= delta {
                epsilon
            } else {
                f64::INFINITY
            })
        })))
    }))
}

/// Wraps a measure as `Approximate(M)`, reporting each loss as `(loss, 0)`.
pub fn make_approximate(meas: &Measurement, _contrib: &Contrib) -> CoreResult<Measurement> {
    let measure = meas.output_measure().clone().approximate()?;
    debug!("wrapping measure as approximate measure={measure:?}");
    Ok(convert(meas, measure, |loss| Ok(loss.approximate(0.0))))
}

/// Pure DP as fixed (ε, 0)-DP.
pub fn make_pure_dp_to_fixed_approx_dp(
    meas: &Measurement,
    contrib: &Contrib,
) -> CoreResult<Measurement> {
    require(meas, &Measure::MaxDivergence, "fixed smoothed max divergence")?;
    make_approximate(meas, contrib)
}

fn require(meas: &Measurement, expected: &Measure, target: &str) -> CoreResult<()> {
    if meas.output_measure() != expected {
        return Err(CoreError::unsupported(meas.output_measure(), target));
    }
    Ok(())
}

fn validated(search: &SearchConfig) -> CoreResult<SearchConfig> {
    search
        .validate()
        .map_err(|err| CoreError::invalid(err.to_string()))?;
    Ok(*search)
}

/// Converts `base` or `Approximate(base)` to the matching smoothed measure.
fn curve_conversion(
    meas: &Measurement,
    base: &Measure,
    name: &str,
    to_curve: impl Fn(&PrivacyLoss) -> CoreResult<PrivacyLoss> + Send + Sync + 'static,
) -> CoreResult<Measurement> {
    match meas.output_measure() {
        measure if measure == base => Ok(convert(meas, Measure::SmoothedMaxDivergence, move |loss| {
            to_curve(&loss)
        })),
        Measure::Approximate(inner) if **inner == *base => Ok(convert(
            meas,
            Measure::Approximate(Box::new(Measure::SmoothedMaxDivergence)),
            move |loss| {
                let (inner_loss, delta) = loss.split_approximate()?;
                Ok(to_curve(inner_loss)?.approximate(delta))
            },
        )),
        other => Err(CoreError::unsupported(
            other,
            format!("smoothed max divergence from {name}"),
        )),
    }
}

fn convert(
    meas: &Measurement,
    measure: Measure,
    map: impl Fn(PrivacyLoss) -> CoreResult<PrivacyLoss> + Send + Sync + 'static,
) -> Measurement {
    let source = meas.clone();
    meas.remap(measure, PrivacyMap::new(move |d_in| map(source.map(d_in)?)))
}
