//! Per-species aggregation of scored ortholog pairs
//!
//! For one (query, candidate) species pair this module scores every
//! ortholog pair, keeps the sufficiently similar ones, selects the GO
//! terms within the configured occurrence range and pivots the surviving
//! pairs into a per-term summary table and a per-gene detail table.

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;
use statrs::statistics::Statistics;
use tracing::debug;

use crate::annotations::{EntryNr, GeneRole, SpeciesCode};
use crate::ic::InformationContent;
use crate::similarity::{filter_similar, OrthologOverlap, OverlapScorer};
use crate::sources::{AnnotationCache, GeneNaming, OntologySource, OrthologSource};
use crate::term::{GoAspect, GoGroup, GoTermId};
use crate::{
    OrthoResult, DEFAULT_INF_THRESHOLD, DEFAULT_MAX_TERM_OCCURRENCE,
    DEFAULT_SIMILARITY_THRESHOLD,
};

/// How often a GO term must be mentioned across the retained overlaps
/// to be selected
///
/// The upper bound is an explicit `Option`: `None` means unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceRange {
    /// Minimum number of mentioning overlaps (inclusive)
    pub min: usize,
    /// Maximum number of mentioning overlaps (inclusive), `None` for
    /// no upper bound
    pub max: Option<usize>,
}

impl OccurrenceRange {
    /// An unbounded range: every mentioned term is selected
    pub fn unbounded() -> Self {
        Self { min: 0, max: None }
    }

    /// Returns `true` if `count` lies within the range
    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl Default for OccurrenceRange {
    /// The pipeline default: no lower bound, at most
    /// [`DEFAULT_MAX_TERM_OCCURRENCE`] mentions
    fn default() -> Self {
        Self {
            min: 0,
            max: Some(DEFAULT_MAX_TERM_OCCURRENCE),
        }
    }
}

/// Tuning knobs of the aggregation pipeline
///
/// The defaults reproduce the published behavior; the CLI exposes the
/// thresholds for experimentation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// The GO aspect contributing to `processes`
    pub aspect: GoAspect,
    /// Minimum information content for a term to count at all
    pub inf_threshold: f64,
    /// Minimum pair similarity to keep an overlap
    pub similarity_threshold: f64,
    /// Occurrence range for term selection
    pub occurrence: OccurrenceRange,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            aspect: GoAspect::BiologicalProcess,
            inf_threshold: DEFAULT_INF_THRESHOLD,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            occurrence: OccurrenceRange::default(),
        }
    }
}

/// One line of the per-GO-term summary table
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// The GO term
    pub term: GoTermId,
    /// The candidate species
    pub species: SpeciesCode,
    /// Number of ortholog pairs contributing to the term
    pub n_orthologs: u32,
    /// Mean similarity of the contributing pairs
    pub mean_similarity: f64,
    /// Sample standard deviation of the similarities, 0.0 for a single
    /// observation
    pub stdev_similarity: f64,
    /// Summed similarity of the contributing pairs
    pub score: f64,
}

/// One line of the per-gene detail table
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    /// The GO term
    pub term: GoTermId,
    /// The candidate species
    pub species: SpeciesCode,
    /// Whether the gene belongs to the query or the candidate species
    pub role: GeneRole,
    /// The gene
    pub entry_nr: EntryNr,
    /// Display label, falling back to the decimal entry number
    pub label: String,
}

/// Selects the GO terms whose mention count lies within `range`
///
/// Every overlap mentions each of its `processes` terms exactly once
/// (the processes are a set), so the count per term is the number of
/// overlaps containing it.
pub fn processes_in_range(results: &[OrthologOverlap], range: &OccurrenceRange) -> GoGroup {
    let mut counts: HashMap<GoTermId, usize> = HashMap::new();
    for overlap in results {
        for term in overlap.processes() {
            *counts.entry(term).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(_, count)| range.contains(*count))
        .map(|(term, _)| term)
        .collect()
}

/// Runs the full per-species pipeline for one candidate species
///
/// Fetches the ortholog pairs, scores each pair over cached annotation
/// closures, filters by similarity, selects terms by occurrence and
/// pivots the result into summary and detail rows. Rows are emitted in
/// ascending term order, so the output is deterministic.
///
/// # Errors
///
/// Any collaborator failure (ortholog fetch, annotation closure, gene
/// naming) aborts the aggregation of this species; nothing is silently
/// skipped.
pub fn aggregate_species<S>(
    session: &S,
    ic: &InformationContent,
    config: &PipelineConfig,
    query: SpeciesCode,
    model: SpeciesCode,
) -> OrthoResult<(Vec<SummaryRow>, Vec<DetailRow>)>
where
    S: OrthologSource + OntologySource + GeneNaming,
{
    let orthologs = session.orthologs(query, model)?;
    debug!(%query, %model, pairs = orthologs.len(), "scoring ortholog pairs");

    let scorer = OverlapScorer::with_inf_threshold(ic, config.inf_threshold);
    let mut cache = AnnotationCache::new(session, config.aspect);

    let mut overlaps = Vec::new();
    for pair in &orthologs {
        let query_closure = cache.closure(pair.query())?;
        let model_closure = cache.closure(pair.model())?;
        if let Some(overlap) = scorer.score(pair, &query_closure, &model_closure) {
            overlaps.push(overlap);
        }
    }

    let similar: Vec<OrthologOverlap> =
        filter_similar(overlaps, config.similarity_threshold).collect();
    let processes = processes_in_range(&similar, &config.occurrence);
    debug!(
        %model,
        retained = similar.len(),
        processes = processes.len(),
        "pivoting retained overlaps"
    );

    let labels = gene_labels(session, &similar)?;
    Ok(pivot(&similar, &processes, model, &labels))
}

/// Resolves the display label of every gene mentioned in `similar`
///
/// A gene without a usable label is represented by its decimal entry
/// number.
fn gene_labels<S: GeneNaming>(
    naming: &S,
    similar: &[OrthologOverlap],
) -> OrthoResult<HashMap<EntryNr, String>> {
    let mut labels = HashMap::new();
    for overlap in similar {
        for (_, gene) in overlap.ortholog().genes() {
            if let std::collections::hash_map::Entry::Vacant(entry) = labels.entry(gene) {
                let label = naming
                    .display_name(gene)?
                    .unwrap_or_else(|| gene.to_string());
                entry.insert(label);
            }
        }
    }
    Ok(labels)
}

/// Pivots the retained overlaps into one summary row per selected term
/// and one detail row per distinct contributing gene and role
fn pivot(
    similar: &[OrthologOverlap],
    processes: &GoGroup,
    model: SpeciesCode,
    labels: &HashMap<EntryNr, String>,
) -> (Vec<SummaryRow>, Vec<DetailRow>) {
    let mut summary = Vec::with_capacity(processes.len());
    let mut detail = Vec::new();

    for term in processes {
        let mut similarities: SmallVec<[f64; 8]> = SmallVec::new();
        let mut seen: HashSet<(GeneRole, EntryNr)> = HashSet::new();

        for overlap in similar {
            if !overlap.processes().contains(&term) {
                continue;
            }
            for (role, gene) in overlap.ortholog().genes() {
                if seen.insert((role, gene)) {
                    detail.push(DetailRow {
                        term,
                        species: model,
                        role,
                        entry_nr: gene,
                        label: labels
                            .get(&gene)
                            .cloned()
                            .unwrap_or_else(|| gene.to_string()),
                    });
                }
            }
            similarities.push(overlap.similarity());
        }

        // a selected term is always mentioned by at least one overlap
        debug_assert!(!similarities.is_empty());
        let score: f64 = similarities.iter().sum();
        let mean = similarities.iter().mean();
        let stdev = if similarities.len() > 1 {
            similarities.iter().std_dev()
        } else {
            0.0
        };

        summary.push(SummaryRow {
            term,
            species: model,
            n_orthologs: similarities.len() as u32,
            mean_similarity: mean,
            stdev_similarity: stdev,
            score,
        });
    }

    (summary, detail)
}
