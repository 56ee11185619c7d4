//! Sequential chaining of transformations and measurements.

use autheo_privacynet_core::{
    Contrib, CoreError, CoreResult, Domain, Measurement, Metric, StabilityMap, Transformation,
};
use tracing::debug;

/// `outer ∘ inner` for two transformations.
pub fn make_chain_tt(
    outer: &Transformation,
    inner: &Transformation,
    _contrib: &Contrib,
) -> CoreResult<Transformation> {
    check_domains(outer.input_domain(), inner.output_domain())?;
    check_metrics(&outer.input_metric(), &inner.output_metric())?;
    let stability = {
        let outer = outer.stability_map().clone();
        let inner = inner.stability_map().clone();
        StabilityMap::new(move |d_in| outer.eval(&inner.eval(d_in)?))
    };
    let chained = Transformation::new(
        inner.input_domain().clone(),
        inner.input_metric(),
        outer.output_domain().clone(),
        outer.output_metric(),
        inner.function().then(outer.function()),
        stability,
    )?;
    debug!(
        "chained transformations input_metric={:?} output_metric={:?}",
        chained.input_metric(),
        chained.output_metric()
    );
    Ok(chained)
}

/// Measurement applied to the output of a transformation.
pub fn make_chain_mt(
    outer: &Measurement,
    inner: &Transformation,
    _contrib: &Contrib,
) -> CoreResult<Measurement> {
    check_domains(outer.input_domain(), inner.output_domain())?;
    check_metrics(&outer.input_metric(), &inner.output_metric())?;
    let chained = Measurement::new(
        inner.input_domain().clone(),
        inner.input_metric(),
        outer.output_domain().clone(),
        outer.output_measure().clone(),
        inner.function().then(outer.function()),
        outer.privacy_map().after(inner.stability_map()),
    )?;
    debug!(
        "chained measurement after transformation measure={:?}",
        chained.output_measure()
    );
    Ok(chained)
}

/// Post-processes a measurement's release. The privacy map is the inner
/// measurement's, unchanged.
pub fn make_chain_tm(
    outer: &Transformation,
    inner: &Measurement,
    _contrib: &Contrib,
) -> CoreResult<Measurement> {
    check_domains(outer.input_domain(), inner.output_domain())?;
    let chained = Measurement::new(
        inner.input_domain().clone(),
        inner.input_metric(),
        outer.output_domain().clone(),
        inner.output_measure().clone(),
        inner.function().then(outer.function()),
        inner.privacy_map().clone(),
    )?;
    debug!(
        "chained postprocessor after measurement measure={:?}",
        chained.output_measure()
    );
    Ok(chained)
}

/// Method-style chaining for transformations, in pipeline order.
pub trait TransformationExt {
    fn then_transformation(
        &self,
        next: &Transformation,
        contrib: &Contrib,
    ) -> CoreResult<Transformation>;

    fn then_measurement(&self, next: &Measurement, contrib: &Contrib) -> CoreResult<Measurement>;
}

impl TransformationExt for Transformation {
    fn then_transformation(
        &self,
        next: &Transformation,
        contrib: &Contrib,
    ) -> CoreResult<Transformation> {
        make_chain_tt(next, self, contrib)
    }

    fn then_measurement(&self, next: &Measurement, contrib: &Contrib) -> CoreResult<Measurement> {
        make_chain_mt(next, self, contrib)
    }
}

pub trait MeasurementExt {
    fn then_postprocess(&self, next: &Transformation, contrib: &Contrib)
        -> CoreResult<Measurement>;
}

impl MeasurementExt for Measurement {
    fn then_postprocess(
        &self,
        next: &Transformation,
        contrib: &Contrib,
    ) -> CoreResult<Measurement> {
        make_chain_tm(next, self, contrib)
    }
}

fn check_domains(outer_input: &Domain, inner_output: &Domain) -> CoreResult<()> {
    if outer_input != inner_output {
        return Err(CoreError::DomainMismatch {
            expected: format!("{inner_output:?}"),
            found: format!("{outer_input:?}"),
        });
    }
    Ok(())
}

fn check_metrics(outer_input: &Metric, inner_output: &Metric) -> CoreResult<()> {
    if outer_input != inner_output {
        return Err(CoreError::MetricMismatch {
            expected: format!("{inner_output:?}"),
            found: format!("{outer_input:?}"),
        });
    }
    Ok(())
}
