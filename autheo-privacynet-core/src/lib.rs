//! Autheo PrivacyNet core – the descriptors and link records every
//! PrivacyNet pipeline is assembled from. Domains, metrics and measures are
//! structural value descriptors; transformations and measurements pair them
//! with opaque function and map closures that stay immutable once built.

pub mod capability;
pub mod domain;
pub mod error;
pub mod function;
pub mod measure;
pub mod measurement;
pub mod metric;
pub mod space;
pub mod transformation;
pub mod value;

pub use capability::{Capabilities, Contrib, HonestButCurious};
pub use domain::{AtomDomain, Bounds, Domain, VectorDomain};
pub use error::{CoreError, CoreResult};
pub use function::{Function, PrivacyMap, StabilityMap};
pub use measure::{Measure, PrivacyCurve, PrivacyLoss, RenyiCurve};
pub use measurement::Measurement;
pub use metric::{Distance, DistanceKind, IntDistance, Metric};
pub use space::check_space;
pub use transformation::Transformation;
pub use value::{AtomKind, Value};
