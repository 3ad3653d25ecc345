//! Writers for the combined result tables
//!
//! Two formats are supported: a tab-separated text table that joins the
//! summary and detail information into one human-readable file, and a
//! compact binary format holding the summary, detail and information
//! content tables verbatim.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::aggregate::{DetailRow, SummaryRow};
use crate::annotations::{GeneRole, SpeciesCode};
use crate::ic::InformationContent;
use crate::term::GoTermId;
use crate::OrthoResult;

/// Bytes reserved for a gene label in the binary detail table
const LABEL_LEN: usize = 50;

/// Magic bytes at the start of the binary format
const MAGIC: &[u8; 4] = b"OSIM";

/// Version of the binary format
const FORMAT_VERSION: u8 = 1;

/// Writes the combined table as tab-separated text
///
/// One row per summary entry with the contributing gene labels joined by
/// `;`. Columns: `GOnr`, `Species`, `QuerySpeciesGenes`,
/// `ModelSpeciesGenes`, `NrOrthologs`, `FuncSim_Mean`, `FuncSim_Std`,
/// `Score`. Floating point columns carry 4 decimal places.
///
/// # Errors
///
/// [`crate::OrthoError::Csv`] when writing fails
pub fn write_tsv<W: Write>(
    writer: W,
    summary: &[SummaryRow],
    detail: &[DetailRow],
) -> OrthoResult<()> {
    let mut genes: HashMap<(GoTermId, SpeciesCode, GeneRole), Vec<&str>> = HashMap::new();
    for row in detail {
        genes
            .entry((row.term, row.species, row.role))
            .or_default()
            .push(row.label.as_str());
    }

    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    out.write_record([
        "GOnr",
        "Species",
        "QuerySpeciesGenes",
        "ModelSpeciesGenes",
        "NrOrthologs",
        "FuncSim_Mean",
        "FuncSim_Std",
        "Score",
    ])?;

    for row in summary {
        let labels = |role: GeneRole| {
            genes
                .get(&(row.term, row.species, role))
                .map(|l| l.join(";"))
                .unwrap_or_default()
        };
        out.write_record([
            row.term.as_u32().to_string(),
            row.species.to_string(),
            labels(GeneRole::Query),
            labels(GeneRole::Model),
            row.n_orthologs.to_string(),
            format!("{:.4}", row.mean_similarity),
            format!("{:.4}", row.stdev_similarity),
            format!("{:.4}", row.score),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Writes the combined table to a tab-separated file
///
/// # Errors
///
/// See [`write_tsv`]
pub fn write_tsv_file<P: AsRef<Path>>(
    path: P,
    summary: &[SummaryRow],
    detail: &[DetailRow],
) -> OrthoResult<()> {
    write_tsv(BufWriter::new(File::create(path)?), summary, detail)
}

/// Writes the summary, detail and information content tables in the
/// binary columnar format
///
/// All integers are big-endian; species codes and labels are fixed-width
/// and zero-padded. The layout is:
///
/// | Byte offset | Number of bytes | Description |
/// | --- | --- | --- |
/// | 0 | 4 | Magic bytes `OSIM` |
/// | 4 | 1 | Format version, currently 1 |
/// | 5 | 4 | Number of summary rows as `u32` |
/// | 9 | n × 37 | Summary rows: term `u32`, species 5 bytes, ortholog count `u32`, mean `f64`, stdev `f64`, score `f64` |
/// | … | 4 | Number of detail rows as `u32` |
/// | … | n × 64 | Detail rows: term `u32`, species 5 bytes, role `u8`, entry number `u32`, label 50 bytes |
/// | … | 4 | Number of information content entries as `u32` |
/// | … | n × 12 | Entries: term `u32`, information content `f64`, ascending by term |
///
/// # Errors
///
/// [`crate::OrthoError::Io`] when writing fails
pub fn write_binary<W: Write>(
    mut writer: W,
    summary: &[SummaryRow],
    detail: &[DetailRow],
    ic: &InformationContent,
) -> OrthoResult<()> {
    writer.write_all(MAGIC)?;
    writer.write_all(&[FORMAT_VERSION])?;

    writer.write_all(&row_count(summary.len())?.to_be_bytes())?;
    for row in summary {
        writer.write_all(&row.term.as_u32().to_be_bytes())?;
        writer.write_all(&row.species.as_fixed_bytes())?;
        writer.write_all(&row.n_orthologs.to_be_bytes())?;
        writer.write_all(&row.mean_similarity.to_be_bytes())?;
        writer.write_all(&row.stdev_similarity.to_be_bytes())?;
        writer.write_all(&row.score.to_be_bytes())?;
    }

    writer.write_all(&row_count(detail.len())?.to_be_bytes())?;
    for row in detail {
        writer.write_all(&row.term.as_u32().to_be_bytes())?;
        writer.write_all(&row.species.as_fixed_bytes())?;
        writer.write_all(&[row.role.as_u8()])?;
        writer.write_all(&row.entry_nr.as_u32().to_be_bytes())?;
        writer.write_all(&fixed_label(&row.label))?;
    }

    let mut entries: Vec<(GoTermId, f64)> = ic.iter().collect();
    entries.sort_by_key(|(term, _)| *term);
    writer.write_all(&row_count(entries.len())?.to_be_bytes())?;
    for (term, value) in entries {
        writer.write_all(&term.as_u32().to_be_bytes())?;
        writer.write_all(&value.to_be_bytes())?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the binary tables to a file
///
/// # Errors
///
/// See [`write_binary`]
pub fn write_binary_file<P: AsRef<Path>>(
    path: P,
    summary: &[SummaryRow],
    detail: &[DetailRow],
    ic: &InformationContent,
) -> OrthoResult<()> {
    write_binary(BufWriter::new(File::create(path)?), summary, detail, ic)
}

fn row_count(len: usize) -> OrthoResult<u32> {
    u32::try_from(len).map_err(|_| {
        crate::OrthoError::DataFormat("table exceeds the binary format row limit".to_string())
    })
}

/// A label as fixed-width, zero-padded bytes, truncated to fit
fn fixed_label(label: &str) -> [u8; LABEL_LEN] {
    let mut out = [0u8; LABEL_LEN];
    let bytes = label.as_bytes();
    let len = bytes.len().min(LABEL_LEN);
    out[..len].copy_from_slice(&bytes[..len]);
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::annotations::EntryNr;

    fn sample_rows() -> (Vec<SummaryRow>, Vec<DetailRow>) {
        let mouse = SpeciesCode::try_from("MOUSE").unwrap();
        let summary = vec![SummaryRow {
            term: 8150u32.into(),
            species: mouse,
            n_orthologs: 2,
            mean_similarity: 0.25,
            stdev_similarity: 0.05,
            score: 0.5,
        }];
        let detail = vec![
            DetailRow {
                term: 8150u32.into(),
                species: mouse,
                role: GeneRole::Query,
                entry_nr: EntryNr::from(1u32),
                label: "TP53".to_string(),
            },
            DetailRow {
                term: 8150u32.into(),
                species: mouse,
                role: GeneRole::Query,
                entry_nr: EntryNr::from(2u32),
                label: "BRCA1".to_string(),
            },
            DetailRow {
                term: 8150u32.into(),
                species: mouse,
                role: GeneRole::Model,
                entry_nr: EntryNr::from(3u32),
                label: "Trp53".to_string(),
            },
        ];
        (summary, detail)
    }

    #[test]
    fn tsv_layout_and_rounding() {
        let (summary, detail) = sample_rows();
        let mut buffer = Vec::new();
        write_tsv(&mut buffer, &summary, &detail).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "GOnr\tSpecies\tQuerySpeciesGenes\tModelSpeciesGenes\tNrOrthologs\tFuncSim_Mean\tFuncSim_Std\tScore"
        );
        assert_eq!(
            lines.next().unwrap(),
            "8150\tMOUSE\tTP53;BRCA1\tTrp53\t2\t0.2500\t0.0500\t0.5000"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn tsv_without_detail_leaves_gene_columns_empty() {
        let (summary, _) = sample_rows();
        let mut buffer = Vec::new();
        write_tsv(&mut buffer, &summary, &[]).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "8150\tMOUSE\t\t\t2\t0.2500\t0.0500\t0.5000");
    }

    #[test]
    fn binary_layout() {
        let (summary, detail) = sample_rows();
        let ic: InformationContent = [(8150u32.into(), 6.5), (16265u32.into(), 9.0)]
            .into_iter()
            .collect();

        let mut buffer = Vec::new();
        write_binary(&mut buffer, &summary, &detail, &ic).unwrap();

        assert_eq!(&buffer[0..4], b"OSIM");
        assert_eq!(buffer[4], 1);
        // one summary row
        assert_eq!(&buffer[5..9], &1u32.to_be_bytes());
        let row = &buffer[9..9 + 37];
        assert_eq!(&row[0..4], &8150u32.to_be_bytes());
        assert_eq!(&row[4..9], b"MOUSE");
        assert_eq!(&row[9..13], &2u32.to_be_bytes());
        assert_eq!(&row[13..21], &0.25f64.to_be_bytes());
        assert_eq!(&row[29..37], &0.5f64.to_be_bytes());

        // three detail rows follow the summary section
        let detail_offset = 9 + 37;
        assert_eq!(
            &buffer[detail_offset..detail_offset + 4],
            &3u32.to_be_bytes()
        );
        let first = &buffer[detail_offset + 4..detail_offset + 4 + 64];
        assert_eq!(&first[0..4], &8150u32.to_be_bytes());
        assert_eq!(first[9], 0); // query role
        assert_eq!(&first[14..18], b"TP53");

        // ic section is sorted by term id
        let ic_offset = detail_offset + 4 + 3 * 64;
        assert_eq!(&buffer[ic_offset..ic_offset + 4], &2u32.to_be_bytes());
        assert_eq!(
            &buffer[ic_offset + 4..ic_offset + 8],
            &8150u32.to_be_bytes()
        );
        assert_eq!(buffer.len(), ic_offset + 4 + 2 * 12);
    }

    #[test]
    fn long_labels_are_truncated() {
        let label = "X".repeat(80);
        let fixed = fixed_label(&label);
        assert_eq!(fixed.len(), LABEL_LEN);
        assert!(fixed.iter().all(|b| *b == b'X'));
    }

    #[test]
    fn files_are_written() {
        let (summary, detail) = sample_rows();
        let ic = InformationContent::default();
        let dir = tempfile::tempdir().unwrap();

        let tsv = dir.path().join("out.tsv");
        write_tsv_file(&tsv, &summary, &detail).unwrap();
        assert!(tsv.exists());

        let bin = dir.path().join("out.osim");
        write_binary_file(&bin, &summary, &detail, &ic).unwrap();
        assert!(bin.exists());
    }
}
