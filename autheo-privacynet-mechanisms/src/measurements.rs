use autheo_privacynet_core::{
    AtomKind, CoreError, CoreResult, Distance, Domain, Function, Measure, Measurement, Metric,
    PrivacyLoss, PrivacyMap, Value,
};
use tracing::debug;

use crate::noise::{sample_discrete_laplace, sample_gaussian, sample_laplace};

/// Laplace mechanism under pure DP, `ε = d_in / scale`.
///
/// Accepts a numeric atom with `AbsoluteDistance` or a vector of numeric
/// atoms with `L1Distance`. Integer data receive discrete Laplace noise.
pub fn make_laplace(
    input_domain: Domain,
    input_metric: Metric,
    scale: f64,
) -> CoreResult<Measurement> {
    check_scale(scale)?;
    let space = NoiseSpace::resolve(&input_domain, &input_metric, NoiseFamily::Laplace)?;
    let function = match space.kind {
        AtomKind::Int => Function::new(move |arg| {
            let mut rng = rand::thread_rng();
            perturb(arg, &mut |value: &Value| match value {
                Value::Int(v) => {
                    let noise = sample_discrete_laplace(&mut rng, scale)?;
                    v.checked_add(noise)
                        .map(Value::Int)
                        .ok_or_else(|| CoreError::arithmetic("integer overflow adding noise"))
                }
                other => Err(unexpected(other)),
            })
        }),
        _ => Function::new(move |arg| {
            let mut rng = rand::thread_rng();
            perturb(arg, &mut |value: &Value| match value {
                Value::Float(v) => Ok(Value::Float(v + sample_laplace(&mut rng, scale))),
                other => Err(unexpected(other)),
            })
        }),
    };
    debug!("laplace mechanism built scale={scale} kind={:?}", space.kind);
    Measurement::new(
        input_domain,
        input_metric,
        space.output_domain,
        Measure::MaxDivergence,
        function,
        PrivacyMap::new(move |d_in| Ok(PrivacyLoss::Epsilon(ratio(d_in, scale)))),
    )
}

/// Gaussian mechanism under zCDP, `ρ = d_in² / (2·scale²)`.
///
/// Accepts a float atom with `AbsoluteDistance` or a vector of floats with
/// `L2Distance`.
pub fn make_gaussian(
    input_domain: Domain,
    input_metric: Metric,
    scale: f64,
) -> CoreResult<Measurement> {
    check_scale(scale)?;
    let space = NoiseSpace::resolve(&input_domain, &input_metric, NoiseFamily::Gaussian)?;
    if space.kind != AtomKind::Float {
        return Err(CoreError::invalid("gaussian noise requires float data"));
    }
    let function = Function::new(move |arg| {
        let mut rng = rand::thread_rng();
        perturb(arg, &mut |value: &Value| match value {
            Value::Float(v) => Ok(Value::Float(v + sample_gaussian(&mut rng, scale)?)),
            other => Err(unexpected(other)),
        })
    });
    debug!("gaussian mechanism built scale={scale}");
    Measurement::new(
        input_domain,
        input_metric,
        space.output_domain,
        Measure::ZeroConcentratedDivergence,
        function,
        PrivacyMap::new(move |d_in| Ok(PrivacyLoss::Rho(gaussian_rho(d_in, scale)))),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NoiseFamily {
    Laplace,
    Gaussian,
}

impl NoiseFamily {
    fn as_str(self) -> &'static str {
        match self {
            NoiseFamily::Laplace => "laplace",
            NoiseFamily::Gaussian => "gaussian",
        }
    }

    /// Vector metric the noise is calibrated for: L1 for Laplace, L2 for Gaussian.
    fn calibrates(self, metric: &Metric) -> bool {
        match self {
            NoiseFamily::Laplace => matches!(metric, Metric::L1Distance(_)),
            NoiseFamily::Gaussian => matches!(metric, Metric::L2Distance(_)),
        }
    }
}

struct NoiseSpace {
    kind: AtomKind,
    output_domain: Domain,
}

impl NoiseSpace {
    fn resolve(domain: &Domain, metric: &Metric, family: NoiseFamily) -> CoreResult<Self> {
        let mechanism = family.as_str();
        let (kind, output_domain) = match domain {
            Domain::Atom(atom) if matches!(metric, Metric::AbsoluteDistance(_)) => {
                (atom.kind, noisy_atom(atom.kind))
            }
            Domain::Vector(vector) if family.calibrates(metric) => {
                let kind = vector.element.atom_kind().ok_or_else(|| {
                    CoreError::invalid(format!("{mechanism} noise requires atomic elements"))
                })?;
                let element = noisy_atom(kind);
                let output = match vector.size {
                    Some(size) => Domain::sized_vector(element, size),
                    None => Domain::vector(element),
                };
                (kind, output)
            }
            _ => {
                return Err(CoreError::MetricMismatch {
                    expected: format!("a metric {mechanism} noise is calibrated for"),
                    found: format!("{metric:?} over {domain:?}"),
                })
            }
        };
        match kind {
            AtomKind::Int | AtomKind::Float => Ok(Self {
                kind,
                output_domain,
            }),
            other => Err(CoreError::invalid(format!(
                "{mechanism} noise cannot perturb {} data",
                other.as_str()
            ))),
        }
    }
}

fn noisy_atom(kind: AtomKind) -> Domain {
    match kind {
        AtomKind::Float => Domain::finite_float(),
        other => Domain::atom(other),
    }
}

fn perturb(
    arg: &Value,
    noise: &mut dyn FnMut(&Value) -> CoreResult<Value>,
) -> CoreResult<Value> {
    match arg {
        Value::Vector(items) => items
            .iter()
            .map(|item| noise(item))
            .collect::<CoreResult<Vec<_>>>()
            .map(Value::Vector),
        atom => noise(atom),
    }
}

fn check_scale(scale: f64) -> CoreResult<()> {
    if scale.is_nan() || scale < 0.0 {
        return Err(CoreError::invalid(format!(
            "scale must be non-negative, got {scale}"
        )));
    }
    Ok(())
}

fn ratio(d_in: &Distance, scale: f64) -> f64 {
    if d_in.is_zero() {
        0.0
    } else if scale == 0.0 {
        f64::INFINITY
    } else {
        d_in.as_f64() / scale
    }
}

fn gaussian_rho(d_in: &Distance, scale: f64) -> f64 {
    if d_in.is_zero() {
        0.0
    } else if scale == 0.0 {
        f64::INFINITY
    } else {
        let d = d_in.as_f64();
        d * d / (2.0 * scale * scale)
    }
}

fn unexpected(value: &Value) -> CoreError {
    CoreError::Function(format!("cannot add noise to a {} value", value.kind_name()))
}
