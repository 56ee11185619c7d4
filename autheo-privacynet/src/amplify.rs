use autheo_privacynet_core::{
    Contrib, CoreError, CoreResult, HonestButCurious, Measure, Measurement, PrivacyLoss,
    PrivacyMap,
};
use tracing::{debug, warn};

/// Privacy amplification by subsampling from a larger population.
///
/// Sound only when the `n` input records were drawn uniformly without
/// replacement from a population of `population_size`, which the caller
/// vouches for through the [`HonestButCurious`] token. Nothing is sampled at
/// invocation; only the bound changes:
/// `ε′ = ln(1 + (n/N)(e^ε − 1))`, `δ′ = (n/N)·δ`.
pub fn make_population_amplification(
    meas: &Measurement,
    population_size: usize,
    _contrib: &Contrib,
    _honest_but_curious: &HonestButCurious,
) -> CoreResult<Measurement> {
    let sample_size = meas.input_domain().size().ok_or_else(|| {
        CoreError::invalid("amplification requires a vector input domain of known size")
    })?;
    if population_size == 0 || population_size < sample_size {
        return Err(CoreError::invalid(format!(
            "population size {population_size} must be positive and at least the sample size {sample_size}"
        )));
    }
    let approximate = match meas.output_measure() {
        Measure::MaxDivergence => false,
        Measure::Approximate(inner) if **inner == Measure::MaxDivergence => true,
        other => return Err(CoreError::unsupported(other, "an amplifiable measure")),
    };

    let rate = sample_size as f64 / population_size as f64;
    let source = meas.clone();
    let privacy_map = PrivacyMap::new(move |d_in| {
        let loss = source.map(d_in)?;
        if approximate {
            let (epsilon, delta) = loss.epsilon_delta()?;
            Ok(PrivacyLoss::Epsilon(amplify_epsilon(epsilon, rate)).approximate(delta * rate))
        } else {
            Ok(PrivacyLoss::Epsilon(amplify_epsilon(loss.epsilon()?, rate)))
        }
    });
    warn!(
        "population amplification assumes uniform sampling sample_size={sample_size} population_size={population_size}"
    );
    debug!("amplification built rate={rate} measure={:?}", meas.output_measure());
    Ok(meas.remap(meas.output_measure().clone(), privacy_map))
}

/// Never exceeds `epsilon`, even where `ln_1p(exp_m1(ε))` rounds above it.
fn amplify_epsilon(epsilon: f64, rate: f64) -> f64 {
    if epsilon.is_infinite() || rate == 1.0 {
        return epsilon;
    }
    (rate * epsilon.exp_m1()).ln_1p().min(epsilon)
}
