use super::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ---------------------------------------------------
// We define some machinery here for enumerating the
// different cone types that can live in the composite cone
// ---------------------------------------------------

/// API type describing the type of a conic constraint.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SupportedConeT {
    /// The zero cone (used for equality constraints).
    ///
    /// The parameter indicates the cones dimension.
    ZeroConeT(usize),
    /// The negative orthant (used for inequality constraints).
    ///
    /// The parameter indicates the cones dimension.
    NegativeOrthantConeT(usize),
    /// The second order cone / Lorenz cone / ice-cream cone.
    ///
    /// The parameter indicates the cones dimension.
    SecondOrderConeT(usize),
}

impl SupportedConeT {
    // this reports the number of slack variables that will be generated by
    // this cone.  Equivalent to `numels` for the internal cone representation.

    pub(crate) fn nvars(&self) -> usize {
        match self {
            SupportedConeT::ZeroConeT(dim) => *dim,
            SupportedConeT::NegativeOrthantConeT(dim) => *dim,
            SupportedConeT::SecondOrderConeT(dim) => *dim,
        }
    }

    /// true if both describe the same kind of cone, regardless of dimension
    pub(crate) fn same_tag(&self, other: &SupportedConeT) -> bool {
        self.as_tag() == other.as_tag()
    }
}

impl std::fmt::Display for SupportedConeT {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.as_tag().as_str())
    }
}

// we will use the SupportedCone type as a user facing marker
// for the constraint types, and then map them through
// make_cone to get the internal cone representations.

pub(crate) fn make_cone<T: FloatT>(cone: &SupportedConeT) -> SupportedCone<T> {
    match *cone {
        SupportedConeT::ZeroConeT(dim) => ZeroCone::<T>::new(dim).into(),
        SupportedConeT::NegativeOrthantConeT(dim) => NegativeOrthantCone::<T>::new(dim).into(),
        SupportedConeT::SecondOrderConeT(dim) => SecondOrderCone::<T>::new(dim).into(),
    }
}

// -------------------------------------
// Here we make a corresponding internal SupportedCone type that
// uses enum_dispatch.   This allows for fast dispatching of the
// Cone trait, which happens once per constraint per iteration.
// -------------------------------------

#[allow(clippy::enum_variant_names)]
#[enum_dispatch(Cone<T>)]
#[derive(Debug)]
pub enum SupportedCone<T>
where
    T: FloatT,
{
    ZeroCone(ZeroCone<T>),
    NegativeOrthantCone(NegativeOrthantCone<T>),
    SecondOrderCone(SecondOrderCone<T>),
}

// -------------------------------------
// define the tag types used for printing
// and for comparing declared cone kinds
// -------------------------------------

#[derive(PartialEq, Eq, Clone, Debug, Copy, Hash)]
pub(crate) enum SupportedConeTag {
    ZeroCone = 0,
    NegativeOrthantCone,
    SecondOrderCone,
}

pub(crate) trait SupportedConeAsTag {
    fn as_tag(&self) -> SupportedConeTag;
}

impl SupportedConeAsTag for SupportedConeT {
    fn as_tag(&self) -> SupportedConeTag {
        match self {
            SupportedConeT::ZeroConeT(_) => SupportedConeTag::ZeroCone,
            SupportedConeT::NegativeOrthantConeT(_) => SupportedConeTag::NegativeOrthantCone,
            SupportedConeT::SecondOrderConeT(_) => SupportedConeTag::SecondOrderCone,
        }
    }
}

impl<T: FloatT> SupportedConeAsTag for SupportedCone<T> {
    fn as_tag(&self) -> SupportedConeTag {
        match self {
            SupportedCone::ZeroCone(_) => SupportedConeTag::ZeroCone,
            SupportedCone::NegativeOrthantCone(_) => SupportedConeTag::NegativeOrthantCone,
            SupportedCone::SecondOrderCone(_) => SupportedConeTag::SecondOrderCone,
        }
    }
}

impl SupportedConeTag {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            SupportedConeTag::ZeroCone => "ZeroCone",
            SupportedConeTag::NegativeOrthantCone => "NegativeOrthantCone",
            SupportedConeTag::SecondOrderCone => "SecondOrderCone",
        }
    }
}
