//! A read-only flat-file genome database
//!
//! The pipeline only requires the collaborator traits of
//! [`crate::sources`]; this module provides the bundled implementation on
//! top of a directory of tab-separated files:
//!
//! - `terms.tsv`: `term`, `aspect` (`P`/`F`/`C`), `parents`
//!   (comma-separated term ids, may be empty)
//! - `annotations.tsv`: `entry_nr`, `term`; one row per direct annotation
//! - `orthologs.tsv`: `species1`, `species2`, `entry_nr1`, `entry_nr2`;
//!   one row per ortholog pair, query species first
//! - `xrefs.tsv`: `entry_nr`, `label`
//!
//! Everything is loaded into memory up front; ancestor closures are
//! resolved once at load time. The loaded database is immutable, so any
//! number of sessions can read it concurrently.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::annotations::{EntryNr, OrthologPair, SpeciesCode};
use crate::sources::{GeneNaming, OntologySource, OrthologSource, SessionProvider};
use crate::term::{GoAspect, GoGroup, GoTermId};
use crate::{OrthoError, OrthoResult};

#[derive(Debug)]
struct TermEntry {
    aspect: GoAspect,
    /// All superterms including the term itself
    ancestors: GoGroup,
}

/// The in-memory genome database
#[derive(Debug)]
pub struct FlatFileDb {
    terms: HashMap<GoTermId, TermEntry>,
    annotations: HashMap<EntryNr, GoGroup>,
    orthologs: HashMap<(SpeciesCode, SpeciesCode), Vec<OrthologPair>>,
    species: HashSet<SpeciesCode>,
    xrefs: HashMap<EntryNr, String>,
}

impl FlatFileDb {
    /// Loads a database from a directory of tab-separated files
    ///
    /// # Errors
    ///
    /// - [`OrthoError::CannotOpenFile`]: a required file is missing
    /// - [`OrthoError::DataFormat`]: a file does not match its schema, a
    ///   parent refers to an undefined term, or the term hierarchy
    ///   contains a cycle
    pub fn open<P: AsRef<Path>>(dir: P) -> OrthoResult<Self> {
        let dir = dir.as_ref();
        let raw_terms = parse_terms(open_file(&dir.join("terms.tsv"))?)?;
        let terms = resolve_ancestors(raw_terms)?;
        let annotations = parse_annotations(open_file(&dir.join("annotations.tsv"))?)?;
        let (orthologs, species) = parse_orthologs(open_file(&dir.join("orthologs.tsv"))?)?;
        let xrefs = parse_xrefs(open_file(&dir.join("xrefs.tsv"))?)?;

        debug!(
            terms = terms.len(),
            genes = annotations.len(),
            species = species.len(),
            "loaded flat-file database"
        );
        Ok(Self {
            terms,
            annotations,
            orthologs,
            species,
            xrefs,
        })
    }
}

impl SessionProvider for FlatFileDb {
    type Session<'a>
        = FlatFileSession<'a>
    where
        Self: 'a;

    fn open_session(&self) -> OrthoResult<FlatFileSession<'_>> {
        Ok(FlatFileSession { db: self })
    }
}

/// A read-only view on a [`FlatFileDb`]
///
/// Sessions are cheap to open; each aggregation task holds its own.
pub struct FlatFileSession<'a> {
    db: &'a FlatFileDb,
}

impl OrthologSource for FlatFileSession<'_> {
    fn orthologs(
        &self,
        query: SpeciesCode,
        model: SpeciesCode,
    ) -> OrthoResult<Vec<OrthologPair>> {
        for code in [query, model] {
            if !self.db.species.contains(&code) {
                return Err(OrthoError::Collaborator(format!(
                    "species {code} is not part of the database"
                )));
            }
        }
        Ok(self
            .db
            .orthologs
            .get(&(query, model))
            .cloned()
            .unwrap_or_default())
    }
}

impl OntologySource for FlatFileSession<'_> {
    fn annotations_of(&self, gene: EntryNr) -> OrthoResult<GoGroup> {
        Ok(self
            .db
            .annotations
            .get(&gene)
            .cloned()
            .unwrap_or_default())
    }

    fn ancestors_including_self(&self, term: GoTermId) -> OrthoResult<GoGroup> {
        self.term(term).map(|entry| entry.ancestors.clone())
    }

    fn aspect_of(&self, term: GoTermId) -> OrthoResult<GoAspect> {
        self.term(term).map(|entry| entry.aspect)
    }
}

impl GeneNaming for FlatFileSession<'_> {
    fn display_name(&self, gene: EntryNr) -> OrthoResult<Option<String>> {
        Ok(self.db.xrefs.get(&gene).cloned())
    }
}

impl FlatFileSession<'_> {
    fn term(&self, term: GoTermId) -> OrthoResult<&TermEntry> {
        self.db
            .terms
            .get(&term)
            .ok_or_else(|| OrthoError::Collaborator(format!("unknown GO term {term}")))
    }
}

fn open_file(path: &Path) -> OrthoResult<BufReader<File>> {
    let filename = path.display().to_string();
    Ok(BufReader::new(
        File::open(path).map_err(|_| OrthoError::CannotOpenFile(filename))?,
    ))
}

/// Checks the header row and returns the data lines
fn data_lines<R: BufRead>(reader: R, expected: &str) -> OrthoResult<Vec<String>> {
    let mut lines = reader.lines();
    match lines.next() {
        Some(Ok(header)) if header.trim_end() == expected => {}
        _ => {
            return Err(OrthoError::DataFormat(format!(
                "expected header: {expected}"
            )))
        }
    }
    let mut rows = Vec::new();
    for line in lines {
        let line = line.map_err(|e| OrthoError::DataFormat(e.to_string()))?;
        if !line.is_empty() {
            rows.push(line);
        }
    }
    Ok(rows)
}

fn parse_terms<R: BufRead>(reader: R) -> OrthoResult<HashMap<GoTermId, (GoAspect, GoGroup)>> {
    let mut terms = HashMap::new();
    for line in data_lines(reader, "term\taspect\tparents")? {
        let mut cols = line.split('\t');
        let (Some(term), Some(aspect), Some(parents)) =
            (cols.next(), cols.next(), cols.next())
        else {
            return Err(OrthoError::DataFormat(line.to_string()));
        };

        let term = GoTermId::try_from(term)?;
        let aspect = GoAspect::try_from(aspect)?;
        let mut parent_group = GoGroup::new();
        for parent in parents.split(',').filter(|p| !p.is_empty()) {
            parent_group.insert(GoTermId::try_from(parent)?);
        }
        terms.insert(term, (aspect, parent_group));
    }
    Ok(terms)
}

fn parse_annotations<R: BufRead>(reader: R) -> OrthoResult<HashMap<EntryNr, GoGroup>> {
    let mut annotations: HashMap<EntryNr, GoGroup> = HashMap::new();
    for line in data_lines(reader, "entry_nr\tterm")? {
        let mut cols = line.split('\t');
        let (Some(gene), Some(term)) = (cols.next(), cols.next()) else {
            return Err(OrthoError::DataFormat(line.to_string()));
        };
        annotations
            .entry(EntryNr::try_from(gene)?)
            .or_default()
            .insert(GoTermId::try_from(term)?);
    }
    Ok(annotations)
}

type OrthologTable = HashMap<(SpeciesCode, SpeciesCode), Vec<OrthologPair>>;

fn parse_orthologs<R: BufRead>(
    reader: R,
) -> OrthoResult<(OrthologTable, HashSet<SpeciesCode>)> {
    let mut orthologs: OrthologTable = HashMap::new();
    let mut species = HashSet::new();
    for line in data_lines(reader, "species1\tspecies2\tentry_nr1\tentry_nr2")? {
        let mut cols = line.split('\t');
        let (Some(species1), Some(species2), Some(gene1), Some(gene2)) =
            (cols.next(), cols.next(), cols.next(), cols.next())
        else {
            return Err(OrthoError::DataFormat(line.to_string()));
        };

        let species1 = SpeciesCode::try_from(species1)?;
        let species2 = SpeciesCode::try_from(species2)?;
        species.insert(species1);
        species.insert(species2);
        orthologs
            .entry((species1, species2))
            .or_default()
            .push(OrthologPair::new(
                EntryNr::try_from(gene1)?,
                EntryNr::try_from(gene2)?,
            ));
    }
    Ok((orthologs, species))
}

fn parse_xrefs<R: BufRead>(reader: R) -> OrthoResult<HashMap<EntryNr, String>> {
    let mut xrefs = HashMap::new();
    for line in data_lines(reader, "entry_nr\tlabel")? {
        let mut cols = line.split('\t');
        let (Some(gene), Some(label)) = (cols.next(), cols.next()) else {
            return Err(OrthoError::DataFormat(line.to_string()));
        };
        if !label.is_empty() {
            xrefs.insert(EntryNr::try_from(gene)?, label.to_string());
        }
    }
    Ok(xrefs)
}

/// Resolves every term's ancestor closure from its direct parents
///
/// Walks the hierarchy once per term and memoizes the result, so shared
/// ancestors are only expanded once.
fn resolve_ancestors(
    raw: HashMap<GoTermId, (GoAspect, GoGroup)>,
) -> OrthoResult<HashMap<GoTermId, TermEntry>> {
    let mut resolved: HashMap<GoTermId, GoGroup> = HashMap::new();
    let mut in_progress = HashSet::new();
    for term in raw.keys() {
        ancestors_of(*term, &raw, &mut resolved, &mut in_progress)?;
    }

    Ok(raw
        .into_iter()
        .map(|(term, (aspect, _))| {
            let ancestors = resolved
                .remove(&term)
                .expect("every term was resolved above");
            (term, TermEntry { aspect, ancestors })
        })
        .collect())
}

fn ancestors_of(
    term: GoTermId,
    raw: &HashMap<GoTermId, (GoAspect, GoGroup)>,
    resolved: &mut HashMap<GoTermId, GoGroup>,
    in_progress: &mut HashSet<GoTermId>,
) -> OrthoResult<GoGroup> {
    if let Some(done) = resolved.get(&term) {
        return Ok(done.clone());
    }
    if !in_progress.insert(term) {
        return Err(OrthoError::DataFormat(format!(
            "term hierarchy contains a cycle through {term}"
        )));
    }

    let Some((_, parents)) = raw.get(&term) else {
        return Err(OrthoError::DataFormat(format!(
            "parent {term} is not defined as a term"
        )));
    };

    let mut ancestors = GoGroup::new();
    ancestors.insert(term);
    for parent in parents {
        ancestors = &ancestors | &ancestors_of(parent, raw, resolved, in_progress)?;
    }

    in_progress.remove(&term);
    resolved.insert(term, ancestors.clone());
    Ok(ancestors)
}
