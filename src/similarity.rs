//! Information-content weighted overlap scoring of ortholog pairs
//!
//! The similarity of an ortholog pair is the ratio between the summed
//! information content of the terms shared by both genes' annotation
//! closures and the summed information content of all their terms, after
//! discarding terms that are too unspecific to carry signal. The measure
//! is a set-based variant of the GraphIC similarity used for term-to-term
//! comparison.

use crate::annotations::{AnnotationSet, OrthologPair};
use crate::ic::InformationContent;
use crate::term::GoGroup;
use crate::DEFAULT_INF_THRESHOLD;

/// The scored GO overlap of one ortholog pair
///
/// Immutable once created. `processes` holds the aspect-of-interest terms
/// of the IC-filtered overlap; `similarity` is in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthologOverlap {
    ortholog: OrthologPair,
    processes: GoGroup,
    similarity: f64,
}

impl OrthologOverlap {
    /// Constructs an overlap record
    ///
    /// Produced by [`OverlapScorer::score`]; constructing one directly is
    /// mainly useful for tests of downstream stages.
    pub fn new(ortholog: OrthologPair, processes: GoGroup, similarity: f64) -> Self {
        Self {
            ortholog,
            processes,
            similarity,
        }
    }

    /// The scored ortholog pair
    pub fn ortholog(&self) -> &OrthologPair {
        &self.ortholog
    }

    /// The aspect-of-interest terms shared by both genes
    pub fn processes(&self) -> &GoGroup {
        &self.processes
    }

    /// The information-content weighted similarity of the pair
    pub fn similarity(&self) -> f64 {
        self.similarity
    }
}

/// Scores the GO overlap of ortholog pairs
///
/// # Examples
///
/// ```
/// use orthosim::annotations::{AnnotationSet, OrthologPair};
/// use orthosim::ic::InformationContent;
/// use orthosim::term::GoAspect;
/// use orthosim::OverlapScorer;
///
/// let ic: InformationContent =
///     [(10u32.into(), 9.0), (20u32.into(), 7.0)].into_iter().collect();
/// let scorer = OverlapScorer::new(&ic);
///
/// let closure = AnnotationSet::from_terms(
///     [
///         (10u32.into(), GoAspect::BiologicalProcess),
///         (20u32.into(), GoAspect::BiologicalProcess),
///     ],
///     GoAspect::BiologicalProcess,
/// );
/// let pair = OrthologPair::new(1u32.into(), 2u32.into());
///
/// let overlap = scorer.score(&pair, &closure, &closure).unwrap();
/// assert!((overlap.similarity() - 1.0).abs() < f64::EPSILON);
/// ```
pub struct OverlapScorer<'a> {
    ic: &'a InformationContent,
    inf_threshold: f64,
}

impl<'a> OverlapScorer<'a> {
    /// Constructs a scorer with the default information content threshold
    pub fn new(ic: &'a InformationContent) -> Self {
        Self::with_inf_threshold(ic, DEFAULT_INF_THRESHOLD)
    }

    /// Constructs a scorer with a custom information content threshold
    pub fn with_inf_threshold(ic: &'a InformationContent, inf_threshold: f64) -> Self {
        Self { ic, inf_threshold }
    }

    /// Scores one ortholog pair from the two genes' annotation closures
    ///
    /// Returns `None` when the pair contributes nothing: either no shared
    /// aspect-of-interest term survives the IC threshold, or the union
    /// information content sums to 0 and the ratio is undefined. Both are
    /// expected outcomes, not errors.
    ///
    /// The function is pure: identical inputs always produce identical
    /// output.
    pub fn score(
        &self,
        pair: &OrthologPair,
        query: &AnnotationSet,
        model: &AnnotationSet,
    ) -> Option<OrthologOverlap> {
        let overlap = self.informative(&(query.all() & model.all()));

        // aspect membership is a term property, so probing the query
        // closure's partition is enough
        let processes = &overlap & query.of_aspect();
        if processes.is_empty() {
            return None;
        }

        let union = self.informative(&(query.all() | model.all()));
        let union_ic = self.ic_sum(&union);
        if union_ic == 0.0 {
            return None;
        }
        let overlap_ic = self.ic_sum(&overlap);

        Some(OrthologOverlap {
            ortholog: *pair,
            processes,
            similarity: overlap_ic / union_ic,
        })
    }

    /// Keeps the terms whose information content reaches the threshold
    fn informative(&self, group: &GoGroup) -> GoGroup {
        group
            .iter()
            .filter(|term| self.ic.get(*term) >= self.inf_threshold)
            .collect()
    }

    fn ic_sum(&self, group: &GoGroup) -> f64 {
        group.iter().map(|term| self.ic.get(term)).sum()
    }
}

/// Keeps the overlaps whose similarity reaches the threshold
///
/// Lazy and order-preserving; the comparison is inclusive
/// (`similarity >= threshold`).
pub fn filter_similar<I>(results: I, threshold: f64) -> impl Iterator<Item = OrthologOverlap>
where
    I: IntoIterator<Item = OrthologOverlap>,
{
    results
        .into_iter()
        .filter(move |overlap| overlap.similarity() >= threshold)
}
