//! Genes, species codes, ortholog pairs and annotation closures

use core::fmt::Debug;
use std::fmt::Display;

use crate::term::{GoAspect, GoGroup, GoTermId};
use crate::{OrthoError, OrthoResult};

/// The numerical identifier of a gene within the genome database
#[derive(Clone, Copy, Default, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct EntryNr {
    inner: u32,
}

impl EntryNr {
    /// Returns the entry number as `u32`
    pub fn as_u32(&self) -> u32 {
        self.inner
    }
}

impl From<u32> for EntryNr {
    fn from(inner: u32) -> Self {
        EntryNr { inner }
    }
}

impl TryFrom<&str> for EntryNr {
    type Error = OrthoError;
    fn try_from(value: &str) -> OrthoResult<Self> {
        Ok(EntryNr {
            inner: value.parse::<u32>()?,
        })
    }
}

impl Display for EntryNr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// Maximum length of a [`SpeciesCode`] in bytes
pub const SPECIES_CODE_LEN: usize = 5;

/// A UniProt-style species mnemonic of up to 5 ASCII characters,
/// e.g. `HUMAN`, `MOUSE`, `YEAST`
///
/// Stored inline as a fixed, zero-padded byte array so it is `Copy` and
/// sorts the same way as the corresponding string.
#[derive(Clone, Copy, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpeciesCode {
    inner: [u8; SPECIES_CODE_LEN],
    len: u8,
}

impl SpeciesCode {
    /// The code as string slice
    pub fn as_str(&self) -> &str {
        // the constructor only accepts ASCII
        std::str::from_utf8(&self.inner[..usize::from(self.len)])
            .expect("species codes are always ASCII")
    }

    /// The code as zero-padded fixed-width bytes, used in binary output
    pub fn as_fixed_bytes(&self) -> [u8; SPECIES_CODE_LEN] {
        self.inner
    }
}

impl TryFrom<&str> for SpeciesCode {
    type Error = OrthoError;

    fn try_from(value: &str) -> OrthoResult<Self> {
        if value.is_empty() || value.len() > SPECIES_CODE_LEN || !value.is_ascii() {
            return Err(OrthoError::InvalidSpeciesCode(value.to_string()));
        }
        let mut inner = [0u8; SPECIES_CODE_LEN];
        inner[..value.len()].copy_from_slice(value.as_bytes());
        Ok(SpeciesCode {
            inner,
            len: value.len() as u8,
        })
    }
}

impl Debug for SpeciesCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpeciesCode({})", self.as_str())
    }
}

impl Display for SpeciesCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side of an ortholog pair a gene belongs to
///
/// The numeric values (`Query` = 0, `Model` = 1) are part of the output
/// format of the detail table.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum GeneRole {
    /// The gene of the query species
    Query = 0,
    /// The gene of the candidate model species
    Model = 1,
}

impl GeneRole {
    /// The role's numeric output value
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// A pair of orthologous genes, one per species
///
/// Produced by the ortholog source; read-only for the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OrthologPair {
    query: EntryNr,
    model: EntryNr,
}

impl OrthologPair {
    /// Constructs a pair from the query-species and model-species gene
    pub fn new(query: EntryNr, model: EntryNr) -> Self {
        Self { query, model }
    }

    /// The gene of the query species
    pub fn query(&self) -> EntryNr {
        self.query
    }

    /// The gene of the candidate model species
    pub fn model(&self) -> EntryNr {
        self.model
    }

    /// Both genes, tagged with their [`GeneRole`]
    pub fn genes(&self) -> [(GeneRole, EntryNr); 2] {
        [(GeneRole::Query, self.query), (GeneRole::Model, self.model)]
    }
}

/// The annotation closure of one gene
///
/// Contains every directly annotated GO term plus all of their ancestors,
/// and the subset of those terms that belongs to the aspect of interest.
/// Partitioning by aspect happens when the closure is built, so scoring
/// never has to consult the ontology again.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnnotationSet {
    all: GoGroup,
    of_aspect: GoGroup,
}

impl AnnotationSet {
    /// Constructs a closure from all terms and the aspect-of-interest subset
    ///
    /// `of_aspect` must be a subset of `all`; the [`crate::sources::AnnotationCache`]
    /// guarantees this.
    pub fn new(all: GoGroup, of_aspect: GoGroup) -> Self {
        Self { all, of_aspect }
    }

    /// Every term of the closure, regardless of aspect
    pub fn all(&self) -> &GoGroup {
        &self.all
    }

    /// The closure terms belonging to the aspect of interest
    pub fn of_aspect(&self) -> &GoGroup {
        &self.of_aspect
    }

    /// Returns `true` if the gene has no annotations at all
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Convenience for building annotation sets outside of a database, e.g.
/// in tests: partitions the given terms by the aspect lookup.
impl AnnotationSet {
    /// Builds a closure from id/aspect pairs
    pub fn from_terms<I>(terms: I, aspect_of_interest: GoAspect) -> Self
    where
        I: IntoIterator<Item = (GoTermId, GoAspect)>,
    {
        let mut all = GoGroup::new();
        let mut of_aspect = GoGroup::new();
        for (id, aspect) in terms {
            all.insert(id);
            if aspect == aspect_of_interest {
                of_aspect.insert(id);
            }
        }
        Self { all, of_aspect }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn species_code_roundtrip() {
        let code = SpeciesCode::try_from("HUMAN").unwrap();
        assert_eq!(code.as_str(), "HUMAN");
        assert_eq!(code.to_string(), "HUMAN");
        assert_eq!(code.as_fixed_bytes(), *b"HUMAN");
    }

    #[test]
    fn species_code_short() {
        let code = SpeciesCode::try_from("RAT").unwrap();
        assert_eq!(code.as_str(), "RAT");
        assert_eq!(code.as_fixed_bytes(), [b'R', b'A', b'T', 0, 0]);
    }

    #[test]
    fn species_code_sorts_like_str() {
        let a = SpeciesCode::try_from("RAT").unwrap();
        let b = SpeciesCode::try_from("RATNO").unwrap();
        let c = SpeciesCode::try_from("YEAST").unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn species_code_rejects_invalid() {
        assert!(SpeciesCode::try_from("").is_err());
        assert!(SpeciesCode::try_from("TOOLONG").is_err());
        assert!(SpeciesCode::try_from("HUMÄN").is_err());
    }

    #[test]
    fn annotation_set_partitions_by_aspect() {
        let set = AnnotationSet::from_terms(
            [
                (1u32.into(), GoAspect::BiologicalProcess),
                (2u32.into(), GoAspect::MolecularFunction),
                (3u32.into(), GoAspect::BiologicalProcess),
            ],
            GoAspect::BiologicalProcess,
        );
        assert_eq!(set.all().len(), 3);
        assert_eq!(set.of_aspect().len(), 2);
        assert!(set.of_aspect().contains(&1u32.into()));
        assert!(!set.of_aspect().contains(&2u32.into()));
    }
}
