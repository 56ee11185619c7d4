use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use approx::assert_relative_eq;
use autheo_privacynet::{
    cdp_epsilon, make_approximate, make_basic_composition, make_chain_mt, make_chain_tt,
    make_fix_delta, make_fixed_approx_dp_to_approx_dp, make_population_amplification,
    make_pure_dp_to_zcdp, make_renyi_to_approx_dp, make_zcdp_to_approx_dp, PrivacyNetConfig,
    SearchConfig,
};
use autheo_privacynet_core::{
    AtomKind, Bounds, Capabilities, Contrib, CoreError, Distance, DistanceKind, Domain, Function,
    HonestButCurious, Measure, Measurement, Metric, PrivacyLoss, PrivacyMap, RenyiCurve, Value,
};
use autheo_privacynet_mechanisms::{make_clamp, make_gaussian, make_laplace, make_mean, make_sum};
use pretty_assertions::assert_eq;

fn contrib() -> Contrib {
    PrivacyNetConfig::sample().capabilities.contrib().unwrap()
}

fn honest() -> HonestButCurious {
    PrivacyNetConfig::sample()
        .capabilities
        .honest_but_curious()
        .unwrap()
}

fn float_space() -> (Domain, Metric) {
    (
        Domain::finite_float(),
        Metric::AbsoluteDistance(DistanceKind::Float),
    )
}

fn laplace(scale: f64) -> Measurement {
    let (domain, metric) = float_space();
    make_laplace(domain, metric, scale).unwrap()
}

fn gaussian(scale: f64) -> Measurement {
    let (domain, metric) = float_space();
    make_gaussian(domain, metric, scale).unwrap()
}

fn epsilon_at(meas: &Measurement, d: f64) -> f64 {
    meas.map(&Distance::Float(d)).unwrap().epsilon().unwrap()
}

#[test]
fn capabilities_gate_every_combinator() {
    assert_eq!(
        Capabilities::none().contrib().unwrap_err(),
        CoreError::MissingCapability { name: "contrib" }
    );
    let default_config = PrivacyNetConfig::default();
    assert!(default_config.capabilities.contrib().is_err());
    assert!(default_config.capabilities.honest_but_curious().is_err());
}

#[test]
fn chained_transformations_match_nested_calls() {
    let clamp = make_clamp(
        Domain::vector(Domain::finite_float()),
        Metric::SymmetricDistance,
        Bounds::new(0.0, 1.0).unwrap(),
    )
    .unwrap();
    let sum = make_sum(clamp.output_domain().clone(), clamp.output_metric()).unwrap();
    let chained = make_chain_tt(&sum, &clamp, &contrib()).unwrap();
    let data = Value::floats([0.5, 2.0, -1.0, 0.25]);
    assert_eq!(
        chained.invoke(&data).unwrap(),
        sum.invoke(&clamp.invoke(&data).unwrap()).unwrap()
    );
    let d_in = Distance::Int(3);
    assert_eq!(
        chained.map(&d_in).unwrap(),
        sum.map(&clamp.map(&d_in).unwrap()).unwrap()
    );
}

#[test]
fn pure_compositions_add_epsilon() {
    let composed = make_basic_composition(vec![laplace(2.0), laplace(4.0)], &contrib()).unwrap();
    assert_relative_eq!(epsilon_at(&composed, 1.0), 0.75);
    match composed.invoke(&Value::Float(1.0)).unwrap() {
        Value::Tuple(items) => assert_eq!(items.len(), 2),
        other => panic!("expected a tuple, got {other:?}"),
    }
}

#[test]
fn nested_and_flat_compositions_agree() {
    let leaves = || vec![laplace(1.0), laplace(2.0), laplace(5.0)];
    let flat = make_basic_composition(leaves(), &contrib()).unwrap();
    let mut parts = leaves();
    let last = parts.pop().unwrap();
    let inner = make_basic_composition(parts, &contrib()).unwrap();
    let nested = make_basic_composition(vec![inner, last], &contrib()).unwrap();
    assert_relative_eq!(epsilon_at(&nested, 1.0), epsilon_at(&flat, 1.0));
    assert_eq!(nested.output_measure(), flat.output_measure());
}

#[test]
fn nested_curve_compositions_agree() {
    let search = SearchConfig::default();
    let curve = |scale: f64| make_zcdp_to_approx_dp(&gaussian(scale), &search, &contrib()).unwrap();
    let flat =
        make_basic_composition(vec![curve(1.0), curve(2.0), curve(3.0)], &contrib()).unwrap();
    let inner = make_basic_composition(vec![curve(1.0), curve(2.0)], &contrib()).unwrap();
    let nested = make_basic_composition(vec![inner, curve(3.0)], &contrib()).unwrap();
    let at = |meas: &Measurement| {
        meas.map(&Distance::Float(1.0))
            .unwrap()
            .curve()
            .unwrap()
            .epsilon(1e-6)
            .unwrap()
    };
    assert_relative_eq!(at(&nested), at(&flat));
}

#[test]
fn gaussian_curve_matches_reference() {
    let search = SearchConfig::default();
    let meas = gaussian(10.0);
    assert_eq!(meas.map(&Distance::Float(1.0)).unwrap().rho().unwrap(), 0.005);
    let curve_meas = make_zcdp_to_approx_dp(&meas, &search, &contrib()).unwrap();
    let loss = curve_meas.map(&Distance::Float(1.0)).unwrap();
    assert_eq!(loss.curve().unwrap().epsilon(1e-6).unwrap(), 0.42994146883694934);

    let fixed = make_fix_delta(&curve_meas, 1e-6, &contrib()).unwrap();
    let (epsilon, delta) = fixed
        .map(&Distance::Float(1.0))
        .unwrap()
        .epsilon_delta()
        .unwrap();
    assert_eq!((epsilon, delta), (0.42994146883694934, 1e-6));
}

#[test]
fn composed_fixed_gaussians_match_reference() {
    let search = SearchConfig::default();
    let fixed_gaussian = || {
        let curve = make_zcdp_to_approx_dp(&gaussian(1.0), &search, &contrib()).unwrap();
        make_fix_delta(&curve, 1e-7, &contrib()).unwrap()
    };
    let composed =
        make_basic_composition(vec![fixed_gaussian(), fixed_gaussian()], &contrib()).unwrap();
    let (epsilon, delta) = composed
        .map(&Distance::Float(1.0))
        .unwrap()
        .epsilon_delta()
        .unwrap();
    assert_eq!((epsilon, delta), (11.341717670937543, 2e-7));
}

#[test]
fn fix_delta_bounds() {
    let curve = make_zcdp_to_approx_dp(&gaussian(1.0), &SearchConfig::default(), &contrib())
        .unwrap();
    for delta in [0.0, 1.0, -1e-9] {
        assert!(matches!(
            make_fix_delta(&curve, delta, &contrib()),
            Err(CoreError::InvalidParameter(_))
        ));
    }
    for delta in [1e-12, 0.5, 0.999] {
        assert!(make_fix_delta(&curve, delta, &contrib()).is_ok());
    }
}

#[test]
fn zcdp_from_pure_composes_with_gaussian() {
    let pure_as_zcdp = make_pure_dp_to_zcdp(&laplace(10.0), &contrib()).unwrap();
    let composed =
        make_basic_composition(vec![pure_as_zcdp, gaussian(10.0)], &contrib()).unwrap();
    assert_eq!(*composed.output_measure(), Measure::ZeroConcentratedDivergence);
    assert_relative_eq!(
        composed.map(&Distance::Float(1.0)).unwrap().rho().unwrap(),
        0.01
    );
}

#[test]
fn approximate_reports_zero_delta() {
    let pure = make_approximate(&laplace(1.0), &contrib()).unwrap();
    assert_eq!(
        pure.map(&Distance::Float(1.0)).unwrap().epsilon_delta().unwrap(),
        (1.0, 0.0)
    );
    let zcdp = make_approximate(&gaussian(1.0), &contrib()).unwrap();
    let (rho_loss, delta) = match zcdp.map(&Distance::Float(1.0)).unwrap() {
        PrivacyLoss::Approximate { loss, delta } => (loss.rho().unwrap(), delta),
        other => panic!("expected an approximate loss, got {other:?}"),
    };
    assert_eq!((rho_loss, delta), (0.5, 0.0));
}

#[test]
fn fixed_approximate_laplace_as_curve() {
    let fixed = make_approximate(&laplace(10.0), &contrib()).unwrap();
    let curve = make_fixed_approx_dp_to_approx_dp(&fixed, &contrib()).unwrap();
    assert_eq!(*curve.output_measure(), Measure::SmoothedMaxDivergence);
    let loss = curve.map(&Distance::Float(1.0)).unwrap();
    assert_relative_eq!(loss.curve().unwrap().epsilon(1e-7).unwrap(), 0.1);
}

#[test]
fn approximate_zcdp_fix_spends_remaining_delta() {
    let (domain, metric) = float_space();
    let meas = Measurement::new(
        domain.clone(),
        metric,
        domain,
        Measure::ZeroConcentratedDivergence.approximate().unwrap(),
        Function::new(|arg| Ok(arg.clone())),
        PrivacyMap::new(|d_in| {
            let d = d_in.as_f64();
            Ok(PrivacyLoss::Rho(0.05 * d).approximate(1e-7 * d))
        }),
    )
    .unwrap();
    let search = SearchConfig::default();
    let curve = make_zcdp_to_approx_dp(&meas, &search, &contrib()).unwrap();
    let fixed = make_fix_delta(&curve, 1e-6, &contrib()).unwrap();
    let (epsilon, delta) = fixed
        .map(&Distance::Float(1.0))
        .unwrap()
        .epsilon_delta()
        .unwrap();
    assert_eq!(epsilon, cdp_epsilon(0.05, 1e-6 - 1e-7, &search).unwrap());
    assert_eq!(delta, 1e-6);
}

fn amplified_mean(population: usize) -> (Measurement, Measurement) {
    let bounded = Domain::bounded(AtomKind::Float, Bounds::new(0.0, 10.0).unwrap()).unwrap();
    let mean = make_mean(Domain::sized_vector(bounded, 10), Metric::SymmetricDistance).unwrap();
    let noisy = make_laplace(mean.output_domain().clone(), mean.output_metric(), 0.5).unwrap();
    let release = make_chain_mt(&noisy, &mean, &contrib()).unwrap();
    let amplified =
        make_population_amplification(&release, population, &contrib(), &honest()).unwrap();
    (release, amplified)
}

#[test]
fn amplification_tightens_mean_release() {
    let (release, amplified) = amplified_mean(100);
    let d_in = Distance::Int(2);
    assert_relative_eq!(release.map(&d_in).unwrap().epsilon().unwrap(), 2.0);
    assert!(amplified
        .check(&d_in, &PrivacyLoss::Epsilon(1.494))
        .unwrap());
    assert!(!amplified
        .check(&d_in, &PrivacyLoss::Epsilon(0.494))
        .unwrap());

    let (release, at_sample_size) = amplified_mean(10);
    assert_eq!(
        at_sample_size.map(&d_in).unwrap().epsilon().unwrap(),
        release.map(&d_in).unwrap().epsilon().unwrap()
    );
}

#[test]
fn amplification_preconditions() {
    let (release, _) = amplified_mean(100);
    assert!(matches!(
        make_population_amplification(&release, 5, &contrib(), &honest()),
        Err(CoreError::InvalidParameter(_))
    ));
    assert!(matches!(
        make_population_amplification(&laplace(1.0), 100, &contrib(), &honest()),
        Err(CoreError::InvalidParameter(_))
    ));
    let zcdp = make_pure_dp_to_zcdp(&release, &contrib()).unwrap();
    assert!(matches!(
        make_population_amplification(&zcdp, 100, &contrib(), &honest()),
        Err(CoreError::UnsupportedConversion { .. })
    ));

    let fixed = make_approximate(&release, &contrib()).unwrap();
    let amplified = make_population_amplification(&fixed, 100, &contrib(), &honest()).unwrap();
    let (epsilon, delta) = amplified
        .map(&Distance::Int(2))
        .unwrap()
        .epsilon_delta()
        .unwrap();
    assert!(epsilon < 2.0);
    assert_eq!(delta, 0.0);
}

#[test]
fn amplification_scales_fixed_delta() {
    let bounded = Domain::bounded(AtomKind::Float, Bounds::new(0.0, 1.0).unwrap()).unwrap();
    let fixed = Measurement::new(
        Domain::sized_vector(bounded, 10),
        Metric::SymmetricDistance,
        Domain::finite_float(),
        Measure::fixed_smoothed_max_divergence(),
        Function::new(|_| Ok(Value::Float(0.0))),
        PrivacyMap::new(|d_in| Ok(PrivacyLoss::Epsilon(0.8 * d_in.as_f64()).approximate(1e-6))),
    )
    .unwrap();
    let d_in = Distance::Int(1);
    let (epsilon, delta) = fixed.map(&d_in).unwrap().epsilon_delta().unwrap();

    for population in [10, 40, 1000] {
        let amplified =
            make_population_amplification(&fixed, population, &contrib(), &honest()).unwrap();
        let (amplified_epsilon, amplified_delta) =
            amplified.map(&d_in).unwrap().epsilon_delta().unwrap();
        let rate = 10.0 / population as f64;
        assert_eq!(amplified_delta, delta * rate);
        assert!(amplified_epsilon <= epsilon);
    }
    let amplified = make_population_amplification(&fixed, 40, &contrib(), &honest()).unwrap();
    let (amplified_epsilon, amplified_delta) =
        amplified.map(&d_in).unwrap().epsilon_delta().unwrap();
    assert_eq!(amplified_delta, 2.5e-7);
    assert_relative_eq!(amplified_epsilon, (1.0 + 0.25 * 0.8_f64.exp_m1()).ln());
    assert!(amplified_epsilon < epsilon);
}

struct DropCounter(Arc<AtomicUsize>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn shared_constituents_drop_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    let counter = DropCounter(drops.clone());
    let (domain, metric) = float_space();
    let tracked = Measurement::new(
        domain.clone(),
        metric,
        domain,
        Measure::MaxDivergence,
        Function::new(|arg| Ok(arg.clone())),
        PrivacyMap::new(move |d_in| {
            let _held = &counter;
            Ok(PrivacyLoss::Epsilon(d_in.as_f64()))
        }),
    )
    .unwrap();

    let first = make_basic_composition(vec![tracked.clone(), laplace(1.0)], &contrib()).unwrap();
    let second = make_basic_composition(vec![tracked.clone(), laplace(2.0)], &contrib()).unwrap();
    drop(tracked);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    assert_relative_eq!(epsilon_at(&first, 1.0), 2.0);
    drop(first);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    assert_relative_eq!(epsilon_at(&second, 1.0), 1.5);
    drop(second);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn renyi_curve_outlives_its_measurement() {
    let (domain, metric) = float_space();
    let meas = Measurement::new(
        domain.clone(),
        metric,
        domain,
        Measure::RenyiDivergence,
        Function::new(|arg| Ok(arg.clone())),
        PrivacyMap::new(|d_in| {
            let d = d_in.as_f64();
            Ok(PrivacyLoss::Renyi(RenyiCurve::new(move |alpha| {
                Ok(d * alpha / 2.0)
            })))
        }),
    )
    .unwrap();
    let converted = make_renyi_to_approx_dp(&meas, &SearchConfig::default(), &contrib()).unwrap();
    let renyi = meas.map(&Distance::Float(2.0)).unwrap();
    let approx_loss = converted.map(&Distance::Float(2.0)).unwrap();
    drop(meas);
    drop(converted);
    assert_eq!(renyi.renyi().unwrap().eval(3.0).unwrap(), 3.0);
    assert!(approx_loss.curve().unwrap().epsilon(1e-6).unwrap().is_finite());
}
