//! Rank candidate model organism species by how well their orthologs
//! recapitulate a query species' annotated biology.
//!
//! `orthosim` compares the Gene Ontology annotations of orthologous gene
//! pairs between a query species and each candidate species. Every pair is
//! scored with an information-content weighted similarity over the two
//! genes' annotation closures, pairs below a similarity threshold are
//! discarded and the remaining pairs are pivoted into per-GO-term summary
//! and detail tables. Candidate species are processed in parallel and the
//! merged tables are sorted so that the best-scoring species per
//! biological process comes first.
//!
//! # Examples
//!
//! ```no_run
//! use orthosim::aggregate::PipelineConfig;
//! use orthosim::annotations::SpeciesCode;
//! use orthosim::db::FlatFileDb;
//! use orthosim::driver::build;
//! use orthosim::ic::InformationContent;
//!
//! # fn main() -> orthosim::OrthoResult<()> {
//! let ic = InformationContent::from_file("go_ic.tsv.gz")?;
//! let db = FlatFileDb::open("tests/data")?;
//! let query = SpeciesCode::try_from("HUMAN")?;
//! let models = vec![
//!     SpeciesCode::try_from("MOUSE")?,
//!     SpeciesCode::try_from("YEAST")?,
//! ];
//!
//! let (summary, detail) = build(&db, &ic, &PipelineConfig::default(), query, &models)?;
//! println!("{} summary rows, {} detail rows", summary.len(), detail.len());
//! # Ok(())
//! # }
//! ```

use std::num::ParseIntError;

use thiserror::Error;

pub mod aggregate;
pub mod annotations;
pub mod db;
pub mod driver;
pub mod ic;
pub mod output;
pub mod similarity;
pub mod sources;
pub mod term;

pub use annotations::{EntryNr, OrthologPair, SpeciesCode};
pub use ic::InformationContent;
pub use similarity::{OrthologOverlap, OverlapScorer};
pub use term::{GoAspect, GoGroup, GoTermId};

/// Terms with an information content below this value carry no signal
/// and are excluded from overlap and union sets.
pub const DEFAULT_INF_THRESHOLD: f64 = 5.0;

/// Ortholog pairs with a similarity below this value are discarded.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.05;

/// Upper bound on how many ortholog pairs may mention a GO term before
/// the term is considered too generic to be informative.
pub const DEFAULT_MAX_TERM_OCCURRENCE: usize = 5000;

/// Error variants of `orthosim`
#[derive(Error, Debug)]
pub enum OrthoError {
    /// A source file is not present or cannot be opened
    #[error("cannot open file: {0}")]
    CannotOpenFile(String),
    /// A tabular input does not match its required schema
    #[error("malformed input table: {0}")]
    DataFormat(String),
    /// The ortholog, ontology or gene-naming source failed or returned
    /// corrupt data
    #[error("data source failure: {0}")]
    Collaborator(String),
    /// The aggregation of one candidate species failed
    ///
    /// Wraps the underlying error and names the offending species so a
    /// failed build can be traced back to its input.
    #[error("aggregation for candidate species {species} failed")]
    SpeciesAggregation {
        /// The candidate species whose task failed
        species: SpeciesCode,
        /// The error that aborted the task
        #[source]
        source: Box<OrthoError>,
    },
    /// A species code is empty, too long or not ASCII
    #[error("invalid species code: {0}")]
    InvalidSpeciesCode(String),
    /// An integer column could not be parsed
    #[error("unable to parse integer")]
    ParseIntError,
    /// Reading an input or writing an output failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Writing or flushing a tab-separated table failed
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl From<ParseIntError> for OrthoError {
    fn from(_: ParseIntError) -> Self {
        OrthoError::ParseIntError
    }
}

/// The `Result` type of `orthosim`
pub type OrthoResult<T> = Result<T, OrthoError>;
