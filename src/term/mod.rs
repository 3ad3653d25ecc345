//! GO term identifiers, aspects and sets of terms

use core::fmt::Debug;
use std::fmt::Display;

use crate::{OrthoError, OrthoResult};

mod group;
pub use group::GoGroup;

/// The numerical identifier of a GO term
///
/// The id is the integer part of the `GO:0008150`-style accession. The
/// ontology itself (names, definitions, relations) lives in the ontology
/// source; the pipeline only ever handles ids.
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GoTermId {
    inner: u32,
}

impl GoTermId {
    /// Returns the id as `u32`, e.g. for writing fixed-width output columns
    pub fn as_u32(&self) -> u32 {
        self.inner
    }
}

impl From<u32> for GoTermId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl TryFrom<&str> for GoTermId {
    type Error = OrthoError;

    /// Parses either a plain integer (`8150`) or a prefixed
    /// accession (`GO:0008150`)
    fn try_from(s: &str) -> OrthoResult<Self> {
        let digits = s.strip_prefix("GO:").unwrap_or(s);
        Ok(GoTermId {
            inner: digits.parse::<u32>()?,
        })
    }
}

impl Debug for GoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GoTermId({})", self)
    }
}

impl Display for GoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GO:{:07}", self.inner)
    }
}

/// The three sub-ontologies of the Gene Ontology
///
/// Only one aspect contributes to an overlap's `processes` set; by default
/// that is [`GoAspect::BiologicalProcess`].
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum GoAspect {
    /// `P` terms, e.g. "signal transduction"
    BiologicalProcess,
    /// `F` terms, e.g. "kinase activity"
    MolecularFunction,
    /// `C` terms, e.g. "nucleus"
    CellularComponent,
}

impl TryFrom<&str> for GoAspect {
    type Error = OrthoError;

    fn try_from(value: &str) -> OrthoResult<Self> {
        match value {
            "P" | "biological_process" => Ok(GoAspect::BiologicalProcess),
            "F" | "molecular_function" => Ok(GoAspect::MolecularFunction),
            "C" | "cellular_component" => Ok(GoAspect::CellularComponent),
            _ => Err(OrthoError::DataFormat(format!(
                "unknown GO aspect: {value}"
            ))),
        }
    }
}

impl Display for GoAspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GoAspect::BiologicalProcess => "biological_process",
            GoAspect::MolecularFunction => "molecular_function",
            GoAspect::CellularComponent => "cellular_component",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_plain_id() {
        let id = GoTermId::try_from("8150").unwrap();
        assert_eq!(id.as_u32(), 8150);
    }

    #[test]
    fn parse_prefixed_id() {
        let id = GoTermId::try_from("GO:0008150").unwrap();
        assert_eq!(id, GoTermId::from(8150));
        assert_eq!(id.to_string(), "GO:0008150");
    }

    #[test]
    fn parse_invalid_id() {
        assert!(GoTermId::try_from("GO:00081A0").is_err());
    }

    #[test]
    fn parse_aspect_codes() {
        assert_eq!(
            GoAspect::try_from("P").unwrap(),
            GoAspect::BiologicalProcess
        );
        assert_eq!(
            GoAspect::try_from("molecular_function").unwrap(),
            GoAspect::MolecularFunction
        );
        assert!(GoAspect::try_from("X").is_err());
    }
}
