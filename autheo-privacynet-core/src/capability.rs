//! Opt-in capability tokens.
//!
//! Combinators take a token by reference, so the opt-in they require shows up
//! in their signature. Tokens are zero-sized and can only be minted from a
//! [`Capabilities`] set whose flag is enabled.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Grants access to combinators that are not safe for naive use.
#[derive(Clone, Copy, Debug)]
pub struct Contrib {
    _sealed: (),
}

/// Grants access to combinators whose soundness rests on caller-supplied
/// assumptions the library cannot verify.
#[derive(Clone, Copy, Debug)]
pub struct HonestButCurious {
    _sealed: (),
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Capabilities {
    #[serde(default)]
    pub contrib: bool,
    #[serde(default)]
    pub honest_but_curious: bool,
}

impl Capabilities {
    pub const fn none() -> Self {
        Self {
            contrib: false,
            honest_but_curious: false,
        }
    }

    pub const fn with_contrib(mut self) -> Self {
        self.contrib = true;
        self
    }

    pub const fn with_honest_but_curious(mut self) -> Self {
        self.honest_but_curious = true;
        self
    }

    pub fn contrib(&self) -> CoreResult<Contrib> {
        if !self.contrib {
            return Err(CoreError::MissingCapability { name: "contrib" });
        }
        Ok(Contrib { _sealed: () })
    }

    /// Requires `contrib` as well.
    pub fn honest_but_curious(&self) -> CoreResult<HonestButCurious> {
        self.contrib()?;
        if !self.honest_but_curious {
            return Err(CoreError::MissingCapability {
                name: "honest-but-curious",
            });
        }
        Ok(HonestButCurious { _sealed: () })
    }
}
