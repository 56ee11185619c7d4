use autheo_privacynet_core::CoreError;
use thiserror::Error;

use crate::config::ConfigError;

pub type PrivacyNetResult<T> = Result<T, PrivacyNetError>;

#[derive(Debug, Error)]
pub enum PrivacyNetError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
