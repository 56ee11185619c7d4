use autheo_privacynet::{
    cdp_epsilon, make_basic_composition, make_population_amplification, PrivacyNetConfig,
    SearchConfig,
};
use autheo_privacynet_core::{
    AtomKind, Bounds, Distance, DistanceKind, Domain, Function, Measure, Measurement, Metric,
    PrivacyLoss, PrivacyMap, Value,
};
use proptest::prelude::*;

fn pure(scale: f64, size: usize) -> Measurement {
    let bounded = Domain::bounded(AtomKind::Float, Bounds::new(0.0, 1.0).unwrap()).unwrap();
    Measurement::new(
        Domain::sized_vector(bounded, size),
        Metric::SymmetricDistance,
        Domain::finite_float(),
        Measure::MaxDivergence,
        Function::new(|_| Ok(Value::Float(0.0))),
        PrivacyMap::new(move |d_in| Ok(PrivacyLoss::Epsilon(d_in.as_f64() * scale))),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn cdp_epsilon_decreases_in_delta(rho in 1e-4f64..10.0, small in 1e-12f64..1e-3, factor in 1.0f64..100.0) {
        let config = SearchConfig::default();
        let large = (small * factor).min(0.9);
        let tight = cdp_epsilon(rho, small, &config).unwrap();
        let loose = cdp_epsilon(rho, large, &config).unwrap();
        prop_assert!(loose <= tight + 1e-12);
    }

    #[test]
    fn cdp_epsilon_grows_with_rho(rho in 1e-4f64..5.0, bump in 0.0f64..5.0, delta in 1e-10f64..1e-2) {
        let config = SearchConfig::default();
        let base = cdp_epsilon(rho, delta, &config).unwrap();
        let bigger = cdp_epsilon(rho + bump, delta, &config).unwrap();
        prop_assert!(base <= bigger + 1e-12);
    }

    #[test]
    fn amplification_never_loosens(scale in 0.01f64..5.0, size in 1usize..50, extra in 0usize..500, d in 0u64..8) {
        let capabilities = PrivacyNetConfig::sample().capabilities;
        let contrib = capabilities.contrib().unwrap();
        let honest = capabilities.honest_but_curious().unwrap();
        let meas = pure(scale, size);
        let amplified = make_population_amplification(&meas, size + extra, &contrib, &honest).unwrap();
        let original = meas.map(&Distance::Int(d)).unwrap().epsilon().unwrap();
        let tightened = amplified.map(&Distance::Int(d)).unwrap().epsilon().unwrap();
        prop_assert!(tightened <= original);
    }

    #[test]
    fn composition_adds_pure_losses(scales in proptest::collection::vec(0.01f64..3.0, 1..6), d in 0.0f64..4.0) {
        let contrib = PrivacyNetConfig::sample().capabilities.contrib().unwrap();
        let leaves: Vec<Measurement> = scales
            .iter()
            .map(|&scale| {
                Measurement::new(
                    Domain::finite_float(),
                    Metric::AbsoluteDistance(DistanceKind::Float),
                    Domain::finite_float(),
                    Measure::MaxDivergence,
                    Function::new(|arg| Ok(arg.clone())),
                    PrivacyMap::new(move |d_in| Ok(PrivacyLoss::Epsilon(d_in.as_f64() * scale))),
                )
                .unwrap()
            })
            .collect();
        let composed = make_basic_composition(leaves, &contrib).unwrap();
        let total = composed.map(&Distance::Float(d)).unwrap().epsilon().unwrap();
        let expected: f64 = scales.iter().map(|scale| d * scale).sum();
        prop_assert!((total - expected).abs() <= 1e-9 * expected.max(1.0));
    }
}
