use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, CoreResult},
    value::{AtomKind, Value},
};

/// Closed numeric interval `[lower, upper]`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> CoreResult<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(CoreError::invalid("bounds must be finite"));
        }
        if lower > upper {
            return Err(CoreError::invalid(format!(
                "lower bound {lower} exceeds upper bound {upper}"
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Largest magnitude any member can have.
    pub fn max_abs(&self) -> f64 {
        self.lower.abs().max(self.upper.abs())
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AtomDomain {
    pub kind: AtomKind,
    pub bounds: Option<Bounds>,
    /// Whether NaN is a member. Only meaningful for floats.
    pub nan: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VectorDomain {
    pub element: Box<Domain>,
    pub size: Option<usize>,
}

/// Set of valid values a link accepts or produces.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Domain {
    Atom(AtomDomain),
    Vector(VectorDomain),
    Tuple { members: Vec<Domain> },
}

impl Domain {
    pub fn atom(kind: AtomKind) -> Self {
        Domain::Atom(AtomDomain {
            kind,
            bounds: None,
            nan: kind == AtomKind::Float,
        })
    }

    /// Float atoms that exclude NaN.
    pub fn finite_float() -> Self {
        Domain::Atom(AtomDomain {
            kind: AtomKind::Float,
            bounds: None,
            nan: false,
        })
    }

    pub fn bounded(kind: AtomKind, bounds: Bounds) -> CoreResult<Self> {
        match kind {
            AtomKind::Int | AtomKind::Float => Ok(Domain::Atom(AtomDomain {
                kind,
                bounds: Some(bounds),
                nan: false,
            })),
            other => Err(CoreError::invalid(format!(
                "{} atoms cannot carry numeric bounds",
                other.as_str()
            ))),
        }
    }

    pub fn vector(element: Domain) -> Self {
        Domain::Vector(VectorDomain {
            element: Box::new(element),
            size: None,
        })
    }

    pub fn sized_vector(element: Domain, size: usize) -> Self {
        Domain::Vector(VectorDomain {
            element: Box::new(element),
            size: Some(size),
        })
    }

    pub fn tuple(members: Vec<Domain>) -> Self {
        Domain::Tuple { members }
    }

    pub fn as_atom(&self) -> Option<&AtomDomain> {
        match self {
            Domain::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    pub fn element(&self) -> Option<&Domain> {
        match self {
            Domain::Vector(vector) => Some(&vector.element),
            _ => None,
        }
    }

    /// Known dataset size, for vector domains that declare one.
    pub fn size(&self) -> Option<usize> {
        match self {
            Domain::Vector(vector) => vector.size,
            _ => None,
        }
    }

    pub fn atom_kind(&self) -> Option<AtomKind> {
        self.as_atom().map(|atom| atom.kind)
    }

    pub fn member(&self, value: &Value) -> bool {
        match (self, value) {
            (Domain::Atom(atom), value) => atom.member(value),
            (Domain::Vector(vector), Value::Vector(items)) => {
                if vector.size.is_some_and(|size| size != items.len()) {
                    return false;
                }
                items.iter().all(|item| vector.element.member(item))
            }
            (Domain::Tuple { members }, Value::Tuple(items)) => {
                members.len() == items.len()
                    && members
                        .iter()
                        .zip(items.iter())
                        .all(|(domain, item)| domain.member(item))
            }
            _ => false,
        }
    }

    pub fn check_member(&self, value: &Value) -> CoreResult<()> {
        if self.member(value) {
            Ok(())
        } else {
            Err(CoreError::NotInDomain(format!(
                "{} value outside {:?}",
                value.kind_name(),
                self
            )))
        }
    }

    pub(crate) fn describe(&self) -> String {
        format!("{self:?}")
    }
}

impl AtomDomain {
    pub fn member(&self, value: &Value) -> bool {
        if value.atom_kind() != Some(self.kind) {
            return false;
        }
        if let Value::Float(v) = value {
            if v.is_nan() {
                return self.nan;
            }
        }
        match (self.bounds, value.as_f64()) {
            (Some(bounds), Some(v)) => bounds.contains(v),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}
