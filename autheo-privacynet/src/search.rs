//! Bounded searches over the Rényi order α used by the approximate-DP
//! conversions.
//!
//! Both searches minimize the Canonne–Kamath–Steinke conversion
//! `εᴿ(α) + (ln(1/δ) + (α−1)·ln(1−1/α) − ln α) / (α−1)`, where
//! `εᴿ(α) = αρ` for zCDP. Every α > 1 gives a valid bound, so the searches
//! only decide how tight the result is.

use autheo_privacynet_core::{CoreError, CoreResult, RenyiCurve};
use tracing::warn;

use crate::config::SearchConfig;

/// Coarse samples taken over the α bracket before refining.
const GRID_POINTS: usize = 32;

/// Smallest ε at which ρ-zCDP implies (ε, δ)-DP.
///
/// The optimal α is the root of `ρ(α−1)² + ln α − ln(1/δ)`, which is
/// increasing on α > 1. Bisection starts from `[1, hi]` with `hi` chosen so
/// `ρ(hi−1)² ≥ ln(1/δ)` and runs until the midpoint stops moving. The bound
/// is evaluated at the upper end with its sums and quotient rounded toward
/// `+∞`.
pub fn cdp_epsilon(rho: f64, delta: f64, config: &SearchConfig) -> CoreResult<f64> {
    if rho.is_nan() || rho < 0.0 {
        return Err(CoreError::invalid(format!(
            "rho must be non-negative, got {rho}"
        )));
    }
    if let Some(epsilon) = trivial_epsilon(delta)? {
        return Ok(epsilon);
    }
    if rho == 0.0 {
        return Ok(0.0);
    }
    if rho.is_infinite() {
        return Ok(f64::INFINITY);
    }

    let log_inv_delta = -delta.ln();
    let mut lo = 1.0_f64;
    let mut hi = (rho + 2.0 * (rho * log_inv_delta).sqrt() + 1.0) / (2.0 * rho) + 2.0;
    let mut converged = false;
    for _ in 0..config.max_iterations {
        let mid = lo + (hi - lo) / 2.0;
        if mid == lo || mid == hi {
            converged = true;
            break;
        }
        let derivative = rho * (mid - 1.0).powi(2) + mid.ln() - log_inv_delta;
        if derivative < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    if !converged {
        return Err(CoreError::NonConvergent {
            iterations: config.max_iterations,
        });
    }
    let hi_m1 = hi - 1.0;
    let numerator = add_up(log_inv_delta, hi_m1 * (-hi.recip()).ln_1p()) - hi.ln();
    Ok(add_up(hi * rho, div_up(numerator, hi_m1)).max(0.0))
}

/// Smallest ε the Rényi curve implies at `delta`, searched over
/// `t = ln(α−1)` inside the configured α bracket.
///
/// A coarse grid locates the best finite region, then golden-section search
/// refines it to `config.tolerance` in `t`.
pub fn renyi_epsilon(curve: &RenyiCurve, delta: f64, config: &SearchConfig) -> CoreResult<f64> {
    if let Some(epsilon) = trivial_epsilon(delta)? {
        return Ok(epsilon);
    }
    let log_inv_delta = -delta.ln();
    let objective = |t: f64| -> CoreResult<f64> {
        let alpha = 1.0 + t.exp();
        Ok(curve.eval(alpha)? + conversion_penalty(alpha, log_inv_delta))
    };

    let t_min = (config.renyi_alpha_min - 1.0).ln();
    let t_max = (config.renyi_alpha_max - 1.0).ln();
    let step = (t_max - t_min) / (GRID_POINTS - 1) as f64;
    let mut best: Option<(usize, f64)> = None;
    for i in 0..GRID_POINTS {
        let value = objective(t_min + step * i as f64)?;
        if value.is_finite() && best.map_or(true, |(_, b)| value < b) {
            best = Some((i, value));
        }
    }
    let (index, grid_value) = best.ok_or(CoreError::NonConvergent {
        iterations: GRID_POINTS,
    })?;
    if index == 0 || index == GRID_POINTS - 1 {
        warn!(
            "renyi search minimum at bracket edge alpha={}",
            1.0 + (t_min + step * index as f64).exp()
        );
    }

    let mut a = t_min + step * index.saturating_sub(1) as f64;
    let mut b = t_min + step * (index + 1).min(GRID_POINTS - 1) as f64;
    let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
    let mut c = b - ratio * (b - a);
    let mut d = a + ratio * (b - a);
    let mut fc = finite_or_inf(objective(c)?);
    let mut fd = finite_or_inf(objective(d)?);
    let mut iterations = 0;
    while (b - a).abs() > config.tolerance {
        if iterations == config.max_iterations {
            return Err(CoreError::NonConvergent { iterations });
        }
        iterations += 1;
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - ratio * (b - a);
            fc = finite_or_inf(objective(c)?);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + ratio * (b - a);
            fd = finite_or_inf(objective(d)?);
        }
    }
    Ok(grid_value.min(fc).min(fd).max(0.0))
}

/// Shared δ handling: negative is an error, zero admits no finite ε and
/// δ ≥ 1 holds with ε = 0.
fn trivial_epsilon(delta: f64) -> CoreResult<Option<f64>> {
    if delta.is_nan() || delta < 0.0 {
        return Err(CoreError::invalid(format!(
            "delta must be non-negative, got {delta}"
        )));
    }
    if delta == 0.0 {
        return Ok(Some(f64::INFINITY));
    }
    if delta >= 1.0 {
        return Ok(Some(0.0));
    }
    Ok(None)
}

fn conversion_penalty(alpha: f64, log_inv_delta: f64) -> f64 {
    let alpha_m1 = alpha - 1.0;
    (log_inv_delta + alpha_m1 * (-alpha.recip()).ln_1p() - alpha.ln()) / alpha_m1
}

/// `a + b` rounded toward `+∞`, from the exact TwoSum error term.
fn add_up(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if !sum.is_finite() {
        return sum;
    }
    let b_virtual = sum - a;
    let error = (a - (sum - b_virtual)) + (b - b_virtual);
    if error > 0.0 {
        next_up(sum)
    } else {
        sum
    }
}

/// `a / b` rounded toward `+∞`, from the exact fused remainder `a − q·b`.
fn div_up(a: f64, b: f64) -> f64 {
    let quotient = a / b;
    if !quotient.is_finite() {
        return quotient;
    }
    let remainder = (-quotient).mul_add(b, a);
    if remainder != 0.0 && (remainder > 0.0) == (b > 0.0) {
        next_up(quotient)
    } else {
        quotient
    }
}

fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

fn finite_or_inf(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        f64::INFINITY
    }
}
