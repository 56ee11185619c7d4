//! Basic composition of measurements over a shared input.

use autheo_privacynet_core::{
    Contrib, CoreError, CoreResult, Domain, Function, Measure, Measurement, PrivacyCurve,
    PrivacyLoss, PrivacyMap, RenyiCurve, Value,
};
use tracing::debug;

/// Releases every constituent's output on the same input as a tuple.
///
/// The privacy map combines the constituents' losses under their unified
/// measure; see [`combine`].
pub fn make_basic_composition(
    measurements: Vec<Measurement>,
    _contrib: &Contrib,
) -> CoreResult<Measurement> {
    let first = measurements.first().ok_or(CoreError::EmptyComposition)?;
    let input_domain = first.input_domain().clone();
    let input_metric = first.input_metric();
    let mut output_measure = first.output_measure().clone();
    for meas in &measurements[1..] {
        if *meas.input_domain() != input_domain {
            return Err(CoreError::DomainMismatch {
                expected: format!("{input_domain:?}"),
                found: format!("{:?}", meas.input_domain()),
            });
        }
        if meas.input_metric() != input_metric {
            return Err(CoreError::MetricMismatch {
                expected: format!("{input_metric:?}"),
                found: format!("{:?}", meas.input_metric()),
            });
        }
        output_measure = output_measure.unify(meas.output_measure()).ok_or_else(|| {
            CoreError::IncompatibleMeasures {
                left: format!("{output_measure:?}"),
                right: format!("{:?}", meas.output_measure()),
            }
        })?;
    }

    let output_domain = Domain::tuple(
        measurements
            .iter()
            .map(|meas| meas.output_domain().clone())
            .collect(),
    );
    let functions: Vec<Function> = measurements
        .iter()
        .map(|meas| meas.function().clone())
        .collect();
    let function = Function::new(move |arg| {
        functions
            .iter()
            .map(|function| function.eval(arg))
            .collect::<CoreResult<Vec<Value>>>()
            .map(Value::Tuple)
    });

    debug!(
        "basic composition built constituents={} measure={:?}",
        measurements.len(),
        output_measure
    );
    let target = output_measure.clone();
    let privacy_map = PrivacyMap::new(move |d_in| {
        let losses = measurements
            .iter()
            .map(|meas| meas.map(d_in)?.upcast(&target))
            .collect::<CoreResult<Vec<_>>>()?;
        combine(&target, losses)
    });

    Measurement::new(
        input_domain,
        input_metric,
        output_domain,
        output_measure,
        function,
        privacy_map,
    )
}

/// Basic-composition bound of `losses`, all already shaped for `measure`.
///
/// Scalars add, Rényi curves add pointwise, privacy curves split δ evenly
/// over their leaves, and approximate losses combine their inner losses by
/// the inner measure's rule while summing δ.
pub fn combine(measure: &Measure, losses: Vec<PrivacyLoss>) -> CoreResult<PrivacyLoss> {
    match measure {
        Measure::MaxDivergence => losses
            .iter()
            .map(PrivacyLoss::epsilon)
            .sum::<CoreResult<f64>>()
            .map(PrivacyLoss::Epsilon),
        Measure::ZeroConcentratedDivergence => losses
            .iter()
            .map(PrivacyLoss::rho)
            .sum::<CoreResult<f64>>()
            .map(PrivacyLoss::Rho),
        Measure::RenyiDivergence => {
            let curves = losses
                .iter()
                .map(|loss| loss.renyi().cloned())
                .collect::<CoreResult<Vec<RenyiCurve>>>()?;
            Ok(PrivacyLoss::Renyi(RenyiCurve::new(move |alpha| {
                curves.iter().map(|curve| curve.eval(alpha)).sum()
            })))
        }
        Measure::SmoothedMaxDivergence => {
            let curves = losses
                .iter()
                .map(|loss| loss.curve().cloned())
                .collect::<CoreResult<Vec<PrivacyCurve>>>()?;
            Ok(PrivacyLoss::Curve(PrivacyCurve::sum(curves)))
        }
        Measure::Approximate(inner) => {
            let mut inner_losses = Vec::with_capacity(losses.len());
            let mut delta = 0.0;
            for loss in &losses {
                let (inner_loss, inner_delta) = loss.split_approximate()?;
                inner_losses.push(inner_loss.clone());
                delta += inner_delta;
            }
            Ok(combine(inner, inner_losses)?.approximate(delta))
        }
    }
}
