use autheo_privacynet_core::{CoreError, CoreResult};
use rand::Rng;
use rand_distr::{Distribution, Geometric, Normal};

/// Continuous Laplace noise with the given scale, by inverse CDF.
pub fn sample_laplace<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> f64 {
    if scale == 0.0 {
        return 0.0;
    }
    let u: f64 = rng.gen::<f64>() - 0.5;
    let sign = if u >= 0.0 { 1.0 } else { -1.0 };
    let magnitude = (1.0 - 2.0 * u.abs()).max(f64::MIN_POSITIVE);
    -scale * sign * magnitude.ln()
}

/// Discrete Laplace noise, the difference of two iid geometric draws.
pub fn sample_discrete_laplace<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> CoreResult<i64> {
    if scale == 0.0 {
        return Ok(0);
    }
    let p = -(-1.0 / scale).exp_m1();
    let geometric = Geometric::new(p)
        .map_err(|err| CoreError::Function(format!("geometric sampler: {err}")))?;
    let positive = geometric.sample(rng) as i64;
    let negative = geometric.sample(rng) as i64;
    Ok(positive - negative)
}

pub fn sample_gaussian<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> CoreResult<f64> {
    if scale == 0.0 {
        return Ok(0.0);
    }
    let normal = Normal::new(0.0, scale)
        .map_err(|err| CoreError::Function(format!("gaussian sampler: {err}")))?;
    Ok(normal.sample(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn zero_scale_is_noiseless() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(sample_laplace(&mut rng, 0.0), 0.0);
        assert_eq!(sample_discrete_laplace(&mut rng, 0.0).unwrap(), 0);
        assert_eq!(sample_gaussian(&mut rng, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn laplace_samples_are_centered() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let mean = (0..n).map(|_| sample_laplace(&mut rng, 1.0)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.1, "mean drifted to {mean}");
    }

    #[test]
    fn discrete_laplace_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 20_000;
        let total: i64 = (0..n)
            .map(|_| sample_discrete_laplace(&mut rng, 2.0).unwrap())
            .sum();
        assert!((total as f64 / n as f64).abs() < 0.2);
    }
}
