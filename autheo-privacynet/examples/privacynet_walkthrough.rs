use autheo_privacynet::{
    make_basic_composition, make_chain_mt, make_fix_delta, make_population_amplification,
    make_zcdp_to_approx_dp, PrivacyNetConfig,
};
use autheo_privacynet_core::{AtomKind, Bounds, Distance, Domain, Metric, Value};
use autheo_privacynet_mechanisms::{make_gaussian, make_laplace, make_mean};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let config = PrivacyNetConfig::sample();
    config.validate()?;
    let contrib = config.capabilities.contrib()?;
    let honest = config.capabilities.honest_but_curious()?;

    let records = Domain::sized_vector(
        Domain::bounded(AtomKind::Float, Bounds::new(0.0, 10.0)?)?,
        10,
    );
    let mean = make_mean(records, Metric::SymmetricDistance)?;

    let laplace = make_laplace(mean.output_domain().clone(), mean.output_metric(), 0.5)?;
    let pure_release = make_chain_mt(&laplace, &mean, &contrib)?;

    let gaussian = make_gaussian(mean.output_domain().clone(), mean.output_metric(), 1.0)?;
    let curve = make_zcdp_to_approx_dp(
        &make_chain_mt(&gaussian, &mean, &contrib)?,
        &config.search,
        &contrib,
    )?;
    let gaussian_release = make_fix_delta(&curve, 1e-7, &contrib)?;

    let composed = make_basic_composition(vec![pure_release.clone(), gaussian_release], &contrib)?;
    let data = Value::floats([1.0, 4.0, 2.5, 9.0, 7.5, 3.0, 0.5, 6.0, 8.0, 5.5]);
    println!("Composed release: {:?}", composed.invoke(&data)?);

    let d_in = Distance::Int(2);
    let (epsilon, delta) = composed.map(&d_in)?.epsilon_delta()?;
    println!("Composed bound at d_in=2: epsilon={epsilon:.4} delta={delta:.1e}");

    let amplified = make_population_amplification(&pure_release, 100, &contrib, &honest)?;
    println!(
        "Laplace mean epsilon {:.4} amplified to {:.4} over a population of 100",
        pure_release.map(&d_in)?.epsilon()?,
        amplified.map(&d_in)?.epsilon()?
    );
    Ok(())
}
