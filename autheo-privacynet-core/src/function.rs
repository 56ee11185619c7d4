use std::{fmt, sync::Arc};

use crate::{error::CoreResult, measure::PrivacyLoss, metric::Distance, value::Value};

type FunctionFn = dyn Fn(&Value) -> CoreResult<Value> + Send + Sync;
type StabilityFn = dyn Fn(&Distance) -> CoreResult<Distance> + Send + Sync;
type PrivacyFn = dyn Fn(&Distance) -> CoreResult<PrivacyLoss> + Send + Sync;

/// Data map of a transformation or measurement.
#[derive(Clone)]
pub struct Function {
    inner: Arc<FunctionFn>,
}

impl Function {
    pub fn new(function: impl Fn(&Value) -> CoreResult<Value> + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(function),
        }
    }

    pub fn eval(&self, arg: &Value) -> CoreResult<Value> {
        (self.inner)(arg)
    }

    /// `x ↦ outer(self(x))`.
    pub fn then(&self, outer: &Function) -> Function {
        let inner = self.clone();
        let outer = outer.clone();
        Function::new(move |arg| outer.eval(&inner.eval(arg)?))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function(..)")
    }
}

/// Monotone bound from input distance to output distance.
#[derive(Clone)]
pub struct StabilityMap {
    inner: Arc<StabilityFn>,
}

impl StabilityMap {
    pub fn new(map: impl Fn(&Distance) -> CoreResult<Distance> + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(map),
        }
    }

    /// 1-stable map: the output distance equals the input distance.
    pub fn identity() -> Self {
        StabilityMap::new(|d_in| Ok(*d_in))
    }

    pub fn eval(&self, d_in: &Distance) -> CoreResult<Distance> {
        (self.inner)(d_in)
    }
}

impl fmt::Debug for StabilityMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StabilityMap(..)")
    }
}

/// Monotone bound from input distance to privacy loss.
#[derive(Clone)]
pub struct PrivacyMap {
    inner: Arc<PrivacyFn>,
}

impl PrivacyMap {
    pub fn new(map: impl Fn(&Distance) -> CoreResult<PrivacyLoss> + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(map),
        }
    }

    pub fn eval(&self, d_in: &Distance) -> CoreResult<PrivacyLoss> {
        (self.inner)(d_in)
    }

    /// `d ↦ self(stability(d))`.
    pub fn after(&self, stability: &StabilityMap) -> PrivacyMap {
        let privacy = self.clone();
        let stability = stability.clone();
        PrivacyMap::new(move |d_in| privacy.eval(&stability.eval(d_in)?))
    }
}

impl fmt::Debug for PrivacyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivacyMap(..)")
    }
}
