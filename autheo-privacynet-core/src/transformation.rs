use std::fmt;

use crate::{
    domain::Domain,
    error::{CoreError, CoreResult},
    function::{Function, StabilityMap},
    metric::{Distance, Metric},
    space::check_space,
    value::Value,
};

/// Deterministic data-to-data map with a stability bound.
#[derive(Clone)]
pub struct Transformation {
    input_domain: Domain,
    input_metric: Metric,
    output_domain: Domain,
    output_metric: Metric,
    function: Function,
    stability_map: StabilityMap,
}

impl Transformation {
    pub fn new(
        input_domain: Domain,
        input_metric: Metric,
        output_domain: Domain,
        output_metric: Metric,
        function: Function,
        stability_map: StabilityMap,
    ) -> CoreResult<Self> {
        check_space(&input_domain, &input_metric)?;
        check_space(&output_domain, &output_metric)?;
        Ok(Self {
            input_domain,
            input_metric,
            output_domain,
            output_metric,
            function,
            stability_map,
        })
    }

    pub fn input_domain(&self) -> &Domain {
        &self.input_domain
    }

    pub fn input_metric(&self) -> Metric {
        self.input_metric
    }

    pub fn output_domain(&self) -> &Domain {
        &self.output_domain
    }

    pub fn output_metric(&self) -> Metric {
        self.output_metric
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn stability_map(&self) -> &StabilityMap {
        &self.stability_map
    }

    pub fn invoke(&self, arg: &Value) -> CoreResult<Value> {
        self.input_domain.check_member(arg)?;
        self.function.eval(arg)
    }

    pub fn map(&self, d_in: &Distance) -> CoreResult<Distance> {
        d_in.expect_kind(self.input_metric.distance_kind())?;
        let d_out = self.stability_map.eval(d_in)?;
        d_out
            .expect_kind(self.output_metric.distance_kind())
            .map_err(|err| CoreError::Function(format!("stability map output rejected: {err}")))?;
        Ok(d_out)
    }

    /// Whether inputs `d_in`-close are guaranteed to map `d_out`-close.
    pub fn check(&self, d_in: &Distance, d_out: &Distance) -> CoreResult<bool> {
        let bound = self.map(d_in)?;
        bound
            .partial_cmp(d_out)
            .map(|ordering| ordering.is_le())
            .ok_or(CoreError::DistanceKind {
                expected: bound.kind().as_str(),
                found: d_out.kind().as_str(),
            })
    }
}

impl fmt::Debug for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformation")
            .field("input_domain", &self.input_domain)
            .field("input_metric", &self.input_metric)
            .field("output_domain", &self.output_domain)
            .field("output_metric", &self.output_metric)
            .finish_non_exhaustive()
    }
}
