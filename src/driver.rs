//! Parallel fan-out over candidate species and the deterministic merge
//!
//! Every candidate species is aggregated by an independent task on the
//! rayon worker pool. Tasks share nothing mutable: each opens its own
//! database session and returns its own row buffers. The driver joins
//! all tasks, surfaces the first failure (in candidate-list order) or
//! merges and sorts the combined tables.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::aggregate::{aggregate_species, DetailRow, PipelineConfig, SummaryRow};
use crate::annotations::SpeciesCode;
use crate::ic::InformationContent;
use crate::sources::SessionProvider;
use crate::{OrthoError, OrthoResult};

/// Builds the combined summary and detail tables for all candidate species
///
/// One task per candidate species runs [`aggregate_species`] on its own
/// session. All tasks run to completion even when one fails; afterwards
/// the first failure in candidate-list order is returned as
/// [`OrthoError::SpeciesAggregation`], naming the offending species. Task
/// completion order never influences the result: rows are concatenated in
/// candidate-list order and sorted with stable sorts: the summary by
/// (term ascending, score descending), the detail by (term, species,
/// role) ascending.
///
/// # Errors
///
/// [`OrthoError::SpeciesAggregation`] wrapping the first task failure.
/// There is no partial output: either every species aggregated cleanly or
/// the build fails as a whole.
pub fn build<P>(
    provider: &P,
    ic: &InformationContent,
    config: &PipelineConfig,
    query: SpeciesCode,
    models: &[SpeciesCode],
) -> OrthoResult<(Vec<SummaryRow>, Vec<DetailRow>)>
where
    P: SessionProvider,
{
    info!(%query, candidates = models.len(), "building model organism ranking");

    let results: Vec<(SpeciesCode, OrthoResult<(Vec<SummaryRow>, Vec<DetailRow>)>)> = models
        .par_iter()
        .map(|model| {
            debug!(%model, "aggregating candidate species");
            let result = provider
                .open_session()
                .and_then(|session| aggregate_species(&session, ic, config, query, *model));
            (*model, result)
        })
        .collect();

    let mut summary = Vec::new();
    let mut detail = Vec::new();
    for (species, result) in results {
        match result {
            Ok((rows, genes)) => {
                summary.extend(rows);
                detail.extend(genes);
            }
            Err(source) => {
                return Err(OrthoError::SpeciesAggregation {
                    species,
                    source: Box::new(source),
                })
            }
        }
    }

    sort_summary(&mut summary);
    sort_detail(&mut detail);
    Ok((summary, detail))
}

/// Orders the summary by term ascending, then score descending
///
/// `sort_by` is stable, so rows tied on both keys keep their submission
/// order.
fn sort_summary(rows: &mut [SummaryRow]) {
    rows.sort_by(|a, b| {
        a.term
            .cmp(&b.term)
            .then_with(|| b.score.total_cmp(&a.score))
    });
}

/// Orders the detail by (term, species, role) ascending, stable
fn sort_detail(rows: &mut [DetailRow]) {
    rows.sort_by(|a, b| {
        a.term
            .cmp(&b.term)
            .then_with(|| a.species.cmp(&b.species))
            .then_with(|| a.role.cmp(&b.role))
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::annotations::GeneRole;

    fn summary_row(term: u32, species: &str, score: f64) -> SummaryRow {
        SummaryRow {
            term: term.into(),
            species: SpeciesCode::try_from(species).unwrap(),
            n_orthologs: 1,
            mean_similarity: score,
            stdev_similarity: 0.0,
            score,
        }
    }

    fn detail_row(term: u32, species: &str, role: GeneRole, gene: u32) -> DetailRow {
        DetailRow {
            term: term.into(),
            species: SpeciesCode::try_from(species).unwrap(),
            role,
            entry_nr: gene.into(),
            label: format!("G{gene}"),
        }
    }

    #[test]
    fn summary_sorts_by_term_then_score_desc() {
        let mut rows = vec![
            summary_row(20, "MOUSE", 0.5),
            summary_row(10, "RAT", 0.2),
            summary_row(10, "MOUSE", 0.8),
        ];
        sort_summary(&mut rows);

        assert_eq!(rows[0].term, 10u32.into());
        assert_eq!(rows[0].species.as_str(), "MOUSE");
        assert_eq!(rows[1].species.as_str(), "RAT");
        assert_eq!(rows[2].term, 20u32.into());
    }

    #[test]
    fn summary_sort_is_stable_on_ties() {
        let mut rows = vec![
            summary_row(10, "AAAAA", 0.5),
            summary_row(10, "BBBBB", 0.5),
        ];
        sort_summary(&mut rows);
        assert_eq!(rows[0].species.as_str(), "AAAAA");
        assert_eq!(rows[1].species.as_str(), "BBBBB");

        let mut reversed = vec![
            summary_row(10, "BBBBB", 0.5),
            summary_row(10, "AAAAA", 0.5),
        ];
        sort_summary(&mut reversed);
        assert_eq!(reversed[0].species.as_str(), "BBBBB");
        assert_eq!(reversed[1].species.as_str(), "AAAAA");
    }

    #[test]
    fn detail_sorts_by_term_species_role() {
        let mut rows = vec![
            detail_row(10, "RAT", GeneRole::Model, 4),
            detail_row(10, "MOUSE", GeneRole::Model, 2),
            detail_row(10, "MOUSE", GeneRole::Query, 1),
            detail_row(5, "RAT", GeneRole::Query, 3),
        ];
        sort_detail(&mut rows);

        assert_eq!(rows[0].term, 5u32.into());
        assert_eq!(rows[1].species.as_str(), "MOUSE");
        assert_eq!(rows[1].role, GeneRole::Query);
        assert_eq!(rows[2].role, GeneRole::Model);
        assert_eq!(rows[3].species.as_str(), "RAT");
    }
}
