use autheo_privacynet_core::{
    Contrib, CoreError, CoreResult, Measure, Measurement, PrivacyLoss, PrivacyMap,
};
use tracing::debug;

/// Evaluates a privacy curve at a fixed `delta`, yielding fixed (ε, δ)-DP.
///
/// For `Approximate(SmoothedMaxDivergence)` the curve's share of the budget
/// is `delta − δ′`, where δ′ is the loss's own δ term; a map result with
/// `δ′ ≥ delta` fails at map time.
pub fn make_fix_delta(
    meas: &Measurement,
    delta: f64,
    _contrib: &Contrib,
) -> CoreResult<Measurement> {
    if !(delta > 0.0 && delta < 1.0) {
        return Err(CoreError::invalid(format!(
            "delta must lie in (0, 1), got {delta}"
        )));
    }
    let carries_delta = match meas.output_measure() {
        Measure::SmoothedMaxDivergence => false,
        Measure::Approximate(inner) if **inner == Measure::SmoothedMaxDivergence => true,
        other => {
            return Err(CoreError::unsupported(
                other,
                "fixed smoothed max divergence",
            ))
        }
    };
    let source = meas.clone();
    let privacy_map = PrivacyMap::new(move |d_in| {
        let loss = source.map(d_in)?;
        let epsilon = if carries_delta {
            let (curve_loss, inner_delta) = loss.split_approximate()?;
            if delta <= inner_delta {
                return Err(CoreError::invalid(format!(
                    "delta {delta} does not exceed the measurement's own delta {inner_delta}"
                )));
            }
            curve_loss.curve()?.epsilon(delta - inner_delta)?
        } else {
            loss.curve()?.epsilon(delta)?
        };
        Ok(PrivacyLoss::Epsilon(epsilon).approximate(delta))
    });
    debug!("fixed delta delta={delta} carries_delta={carries_delta}");
    Ok(meas.remap(Measure::fixed_smoothed_max_divergence(), privacy_map))
}
