use autheo_privacynet_core::{
    AtomKind, Bounds, CoreError, CoreResult, Distance, DistanceKind, Domain, Function, Metric,
    StabilityMap, Transformation, Value,
};
use tracing::debug;

/// Number of records, 1-stable under the record-edit metrics.
pub fn make_count(input_domain: Domain, input_metric: Metric) -> CoreResult<Transformation> {
    require_vector(&input_domain, "count")?;
    require_edit_metric(&input_metric, "count")?;
    Transformation::new(
        input_domain,
        input_metric,
        Domain::atom(AtomKind::Int),
        Metric::AbsoluteDistance(DistanceKind::Int),
        Function::new(|arg| {
            let items = expect_vector(arg)?;
            i64::try_from(items.len())
                .map(Value::Int)
                .map_err(|_| CoreError::arithmetic("count exceeds i64"))
        }),
        StabilityMap::identity(),
    )
}

/// Clamps every float record into `bounds`.
pub fn make_clamp(
    input_domain: Domain,
    input_metric: Metric,
    bounds: Bounds,
) -> CoreResult<Transformation> {
    let element = require_vector(&input_domain, "clamp")?;
    if element.atom_kind() != Some(AtomKind::Float) {
        return Err(CoreError::invalid("clamp requires float records"));
    }
    require_edit_metric(&input_metric, "clamp")?;
    let bounded = Domain::bounded(AtomKind::Float, bounds)?;
    let output_domain = match input_domain.size() {
        Some(size) => Domain::sized_vector(bounded, size),
        None => Domain::vector(bounded),
    };
    debug!("clamp built lower={} upper={}", bounds.lower, bounds.upper);
    Transformation::new(
        input_domain,
        input_metric,
        output_domain,
        input_metric,
        Function::new(move |arg| {
            let clamped = float_records(arg)?
                .into_iter()
                .map(|v| Value::Float(bounds.clamp(v)));
            Ok(Value::Vector(clamped.collect()))
        }),
        StabilityMap::identity(),
    )
}

/// Sum of bounded float records.
///
/// Under the symmetric distance each edit moves the sum by at most the
/// largest bound magnitude; when the size is known, a pair of edits is one
/// replacement and moves it by at most the bound width.
pub fn make_sum(input_domain: Domain, input_metric: Metric) -> CoreResult<Transformation> {
    let bounds = require_bounded_floats(&input_domain, "sum")?;
    require_edit_metric(&input_metric, "sum")?;
    let size = input_domain.size();
    debug!("sum built size={size:?}");
    Transformation::new(
        input_domain,
        input_metric,
        Domain::finite_float(),
        Metric::AbsoluteDistance(DistanceKind::Float),
        Function::new(|arg| {
            let total: f64 = float_records(arg)?.into_iter().sum();
            finite(total, "sum")
        }),
        StabilityMap::new(move |d_in| {
            let d_in = d_in.as_int()?;
            let d_out = match size {
                Some(_) => (d_in / 2) as f64 * bounds.width(),
                None => d_in as f64 * bounds.max_abs(),
            };
            Ok(Distance::Float(d_out))
        }),
    )
}

/// Mean of a known number of bounded float records.
pub fn make_mean(input_domain: Domain, input_metric: Metric) -> CoreResult<Transformation> {
    let bounds = require_bounded_floats(&input_domain, "mean")?;
    require_edit_metric(&input_metric, "mean")?;
    let size = match input_domain.size() {
        Some(size) if size > 0 => size,
        _ => {
            return Err(CoreError::invalid(
                "mean requires a vector domain of known, non-zero size",
            ))
        }
    };
    debug!("mean built size={size}");
    Transformation::new(
        input_domain,
        input_metric,
        Domain::finite_float(),
        Metric::AbsoluteDistance(DistanceKind::Float),
        Function::new(move |arg| {
            let total: f64 = float_records(arg)?.into_iter().sum();
            finite(total / size as f64, "mean")
        }),
        StabilityMap::new(move |d_in| {
            let replacements = d_in.as_int()? / 2;
            Ok(Distance::Float(
                replacements as f64 * bounds.width() / size as f64,
            ))
        }),
    )
}

fn require_vector<'a>(domain: &'a Domain, name: &str) -> CoreResult<&'a Domain> {
    domain
        .element()
        .ok_or_else(|| CoreError::invalid(format!("{name} requires a vector domain")))
}

fn require_bounded_floats(domain: &Domain, name: &str) -> CoreResult<Bounds> {
    let element = require_vector(domain, name)?;
    match element.as_atom() {
        Some(atom) if atom.kind == AtomKind::Float => atom
            .bounds
            .ok_or_else(|| CoreError::invalid(format!("{name} requires bounded records"))),
        _ => Err(CoreError::invalid(format!("{name} requires float records"))),
    }
}

fn require_edit_metric(metric: &Metric, name: &str) -> CoreResult<()> {
    match metric {
        Metric::SymmetricDistance | Metric::InsertDeleteDistance => Ok(()),
        other => Err(CoreError::MetricMismatch {
            expected: format!("a record-edit metric for {name}"),
            found: format!("{other:?}"),
        }),
    }
}

fn expect_vector(arg: &Value) -> CoreResult<&[Value]> {
    arg.as_vector()
        .ok_or_else(|| CoreError::Function(format!("expected a vector, got {}", arg.kind_name())))
}

fn float_records(arg: &Value) -> CoreResult<Vec<f64>> {
    expect_vector(arg)?
        .iter()
        .map(|item| match item {
            Value::Float(v) => Ok(*v),
            other => Err(CoreError::Function(format!(
                "expected float records, got {}",
                other.kind_name()
            ))),
        })
        .collect()
}

fn finite(value: f64, name: &str) -> CoreResult<Value> {
    if value.is_finite() {
        Ok(Value::Float(value))
    } else {
        Err(CoreError::arithmetic(format!("{name} overflowed to {value}")))
    }
}
