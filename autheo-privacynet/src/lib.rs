//! Autheo PrivacyNet combinators – build larger differentially private
//! pipelines from transformations and measurements. Chaining, basic
//! composition, measure conversion, δ fixing and population amplification
//! each return a new immutable link whose privacy map is derived from its
//! constituents, gated by the capability tokens minted from
//! [`PrivacyNetConfig`].

pub mod amplify;
pub mod chain;
pub mod compose;
pub mod config;
pub mod convert;
pub mod errors;
pub mod fix_delta;
pub mod search;

pub use amplify::make_population_amplification;
pub use chain::{make_chain_mt, make_chain_tm, make_chain_tt, MeasurementExt, TransformationExt};
pub use compose::{combine, make_basic_composition};
pub use config::{load_config, ConfigError, ConfigFormat, PrivacyNetConfig, SearchConfig};
pub use convert::{
    make_approximate, make_fixed_approx_dp_to_approx_dp, make_pure_dp_to_fixed_approx_dp,
    make_pure_dp_to_zcdp, make_renyi_to_approx_dp, make_zcdp_to_approx_dp,
};
pub use errors::{PrivacyNetError, PrivacyNetResult};
pub use fix_delta::make_fix_delta;
pub use search::{cdp_epsilon, renyi_epsilon};
