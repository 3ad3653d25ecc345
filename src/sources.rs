//! Interfaces to the external genome database
//!
//! The pipeline does not decide how orthologs, GO annotations or gene
//! names are stored. It only requires the traits in this module and runs
//! against anything that implements them: the bundled flat-file database
//! ([`crate::db::FlatFileDb`]), or an in-memory mock in tests.

use std::collections::HashMap;
use std::rc::Rc;

use crate::annotations::{AnnotationSet, EntryNr, OrthologPair, SpeciesCode};
use crate::term::{GoAspect, GoGroup, GoTermId};
use crate::OrthoResult;

/// Source of pairwise orthologs between two species
pub trait OrthologSource {
    /// All ortholog pairs between the query and the candidate species
    ///
    /// # Errors
    ///
    /// [`crate::OrthoError::Collaborator`] when the source cannot be
    /// reached or does not know one of the species
    fn orthologs(
        &self,
        query: SpeciesCode,
        model: SpeciesCode,
    ) -> OrthoResult<Vec<OrthologPair>>;
}

/// Source of GO annotations and the term hierarchy
pub trait OntologySource {
    /// The terms directly annotated to a gene, without ancestors
    fn annotations_of(&self, gene: EntryNr) -> OrthoResult<GoGroup>;

    /// A term's ancestors over the is-a/part-of relation, including itself
    fn ancestors_including_self(&self, term: GoTermId) -> OrthoResult<GoGroup>;

    /// The sub-ontology a term belongs to
    fn aspect_of(&self, term: GoTermId) -> OrthoResult<GoAspect>;
}

/// Source of human-readable gene labels
pub trait GeneNaming {
    /// The display label of a gene, `None` when the source has no usable
    /// label (callers fall back to the numeric entry)
    fn display_name(&self, gene: EntryNr) -> OrthoResult<Option<String>>;
}

/// Hands out independent read-only database sessions
///
/// The parallel driver opens one session per candidate species task, so
/// implementations must allow any number of concurrent readers. A session
/// is dropped when its task finishes, on success and on failure alike.
pub trait SessionProvider: Sync {
    /// The session type handed to one aggregation task
    type Session<'a>: OrthologSource + OntologySource + GeneNaming
    where
        Self: 'a;

    /// Opens a new read-only session
    ///
    /// # Errors
    ///
    /// [`crate::OrthoError::Collaborator`] when no session can be acquired
    fn open_session(&self) -> OrthoResult<Self::Session<'_>>;
}

/// Memoizes per-gene annotation closures for one aggregation run
///
/// Both genes of every ortholog pair need their full ancestor closure;
/// genes participate in many pairs, so the closure is computed once per
/// gene and shared via `Rc`. The cache is owned by a single aggregation
/// task and dropped with it.
pub struct AnnotationCache<'a, O> {
    ontology: &'a O,
    aspect: GoAspect,
    cache: HashMap<EntryNr, Rc<AnnotationSet>>,
}

impl<'a, O: OntologySource> AnnotationCache<'a, O> {
    /// Constructs an empty cache on top of an ontology source
    pub fn new(ontology: &'a O, aspect: GoAspect) -> Self {
        Self {
            ontology,
            aspect,
            cache: HashMap::new(),
        }
    }

    /// The annotation closure of a gene, built on first use
    ///
    /// # Errors
    ///
    /// Propagates every ontology source failure; a gene whose annotations
    /// cannot be fetched aborts the whole aggregation run.
    pub fn closure(&mut self, gene: EntryNr) -> OrthoResult<Rc<AnnotationSet>> {
        if let Some(set) = self.cache.get(&gene) {
            return Ok(Rc::clone(set));
        }

        let direct = self.ontology.annotations_of(gene)?;
        let mut all = GoGroup::new();
        for term in &direct {
            all = &all | &self.ontology.ancestors_including_self(term)?;
        }
        let mut of_aspect = GoGroup::with_capacity(all.len());
        for term in &all {
            if self.ontology.aspect_of(term)? == self.aspect {
                of_aspect.insert(term);
            }
        }

        let set = Rc::new(AnnotationSet::new(all, of_aspect));
        self.cache.insert(gene, Rc::clone(&set));
        Ok(set)
    }

    /// The number of genes with a cached closure
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns `true` if no closure has been built yet
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
