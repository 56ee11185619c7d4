use std::fmt;

use crate::{
    domain::Domain,
    error::{CoreError, CoreResult},
    function::{Function, PrivacyMap},
    measure::{Measure, PrivacyLoss},
    metric::{Distance, Metric},
    space::check_space,
    value::Value,
};

/// Randomized data-to-answer map with a privacy bound in `output_measure`.
///
/// Clones share the function and map closures; a measurement placed in
/// several composites is released when the last of them drops.
#[derive(Clone)]
pub struct Measurement {
    input_domain: Domain,
    input_metric: Metric,
    output_domain: Domain,
    output_measure: Measure,
    function: Function,
    privacy_map: PrivacyMap,
}

impl Measurement {
    pub fn new(
        input_domain: Domain,
        input_metric: Metric,
        output_domain: Domain,
        output_measure: Measure,
        function: Function,
        privacy_map: PrivacyMap,
    ) -> CoreResult<Self> {
        check_space(&input_domain, &input_metric)?;
        Ok(Self {
            input_domain,
            input_metric,
            output_domain,
            output_measure,
            function,
            privacy_map,
        })
    }

    /// Same function and spaces under a new measure and privacy map.
    pub fn remap(&self, output_measure: Measure, privacy_map: PrivacyMap) -> Measurement {
        Measurement {
            input_domain: self.input_domain.clone(),
            input_metric: self.input_metric,
            output_domain: self.output_domain.clone(),
            output_measure,
            function: self.function.clone(),
            privacy_map,
        }
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

    pub fn output_measure(&self) -> &Measure {
        &self.output_measure
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn privacy_map(&self) -> &PrivacyMap {
        &self.privacy_map
    }

    pub fn invoke(&self, arg: &Value) -> CoreResult<Value> {
        self.input_domain.check_member(arg)?;
        self.function.eval(arg)
    }

    pub fn map(&self, d_in: &Distance) -> CoreResult<PrivacyLoss> {
        d_in.expect_kind(self.input_metric.distance_kind())?;
        let loss = self.privacy_map.eval(d_in)?;
        if !self.output_measure.admits(&loss) {
            return Err(CoreError::Function(format!(
                "privacy map returned a {} loss under {:?}",
                loss.shape(),
                self.output_measure
            )));
        }
        loss.validate()?;
        Ok(loss)
    }

    /// Whether inputs `d_in`-close are guaranteed a loss within `d_out`.
    pub fn check(&self, d_in: &Distance, d_out: &PrivacyLoss) -> CoreResult<bool> {
        self.map(d_in)?.within(d_out)
    }
}

impl fmt::Debug for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Measurement")
            .field("input_domain", &self.input_domain)
            .field("input_metric", &self.input_metric)
            .field("output_domain", &self.output_domain)
            .field("output_measure", &self.output_measure)
            .finish_non_exhaustive()
    }
}
