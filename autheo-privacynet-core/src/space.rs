use crate::{
    domain::Domain,
    error::{CoreError, CoreResult},
    metric::Metric,
    value::AtomKind,
};

/// Rejects domain/metric pairings on which the metric is undefined.
pub fn check_space(domain: &Domain, metric: &Metric) -> CoreResult<()> {
    let valid = match metric {
        dataset if dataset.is_dataset_metric() => {
            matches!(domain, Domain::Vector(_) | Domain::Tuple { .. })
        }
        Metric::AbsoluteDistance(_) => is_numeric(domain.atom_kind()),
        Metric::L1Distance(_) | Metric::L2Distance(_) => {
            is_numeric(domain.element().and_then(Domain::atom_kind))
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CoreError::MetricMismatch {
            expected: format!("a domain {} is defined on", metric.describe()),
            found: domain.describe(),
        })
    }
}

fn is_numeric(kind: Option<AtomKind>) -> bool {
    matches!(kind, Some(AtomKind::Int) | Some(AtomKind::Float))
}
