//! Reference mechanisms for Autheo PrivacyNet: Laplace and Gaussian noise
//! measurements plus the dataset transformations (count, clamp, sum, mean)
//! that feed them.

pub mod measurements;
pub mod noise;
pub mod transformations;

pub use measurements::{make_gaussian, make_laplace};
pub use transformations::{make_clamp, make_count, make_mean, make_sum};
