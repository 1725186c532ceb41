use std::fmt;

use bio::alignment::pairwise::{self, MatchParams, Scoring, banded};
use bio::alignment::{Alignment, AlignmentOperation};

use super::RefineFailure;
use crate::sv_candidate::SVType;

/// Gap symbol used in alignment rows
pub const GAP: u8 = b'-';

pub struct AlignmentWeights {
    pub match_: i32,
    pub mismatch: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

/// Scores used for all consensus to SV haplotype alignments
pub const CONSENSUS_ALIGNMENT_WEIGHTS: AlignmentWeights = AlignmentWeights {
    match_: 5,
    mismatch: -4,
    gap_open: -4,
    gap_extend: -4,
};

/// Alignments with a dynamic programming matrix above this size switch to the banded aligner
const MAX_FULL_ALIGNMENT_CELLS: usize = 25_000_000;

const BANDED_KMER_SIZE: usize = 12;
const BANDED_WINDOW_SIZE: usize = 20;

/// Two row character alignment of the SV consensus (row 0) to the SV reference haplotype (row 1)
///
/// Each column has at least one non-gap symbol.
///
#[derive(Clone, PartialEq)]
pub struct PairwiseAlignment {
    rows: [Vec<u8>; 2],
}

impl PairwiseAlignment {
    pub fn new(consensus_row: Vec<u8>, ref_row: Vec<u8>) -> Self {
        assert_eq!(consensus_row.len(), ref_row.len());
        Self {
            rows: [consensus_row, ref_row],
        }
    }

    pub fn consensus_row(&self) -> &[u8] {
        &self.rows[0]
    }

    pub fn ref_row(&self) -> &[u8] {
        &self.rows[1]
    }

    pub fn column_count(&self) -> usize {
        self.rows[0].len()
    }

    /// Return the alignment with its two rows exchanged
    pub fn transposed(self) -> Self {
        let [row0, row1] = self.rows;
        Self { rows: [row1, row0] }
    }
}

impl fmt::Debug for PairwiseAlignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", String::from_utf8_lossy(&self.rows[0]))?;
        write!(f, "{}", String::from_utf8_lossy(&self.rows[1]))
    }
}

fn get_glocal_scoring(weights: &AlignmentWeights) -> Scoring<MatchParams> {
    Scoring::from_scores(
        weights.gap_open,
        weights.gap_extend,
        weights.match_,
        weights.mismatch,
    )
    .yclip(0)
}

/// Align all of `pattern` to any substring of `text`
///
/// Large problems are handed to a k-mer seeded banded aligner.
///
fn glocal_align(pattern: &[u8], text: &[u8], weights: &AlignmentWeights) -> Alignment {
    let scoring = get_glocal_scoring(weights);
    let cells = (pattern.len() + 1).saturating_mul(text.len() + 1);
    if cells <= MAX_FULL_ALIGNMENT_CELLS {
        let mut aligner =
            pairwise::Aligner::with_capacity_and_scoring(pattern.len(), text.len(), scoring);
        aligner.custom(pattern, text)
    } else {
        let mut aligner =
            banded::Aligner::with_scoring(scoring, BANDED_KMER_SIZE, BANDED_WINDOW_SIZE);
        aligner.custom(pattern, text)
    }
}

/// Expand a rust bio alignment into gapped rows for pattern `x` and text `y`
///
/// Clipped sequence on either end of either input is written out against gap symbols, so that
/// every base of both inputs is present in its row.
///
/// Return None if the alignment has no aligned base pairs.
///
fn get_alignment_rows(x: &[u8], y: &[u8], aln: &Alignment) -> Option<(Vec<u8>, Vec<u8>)> {
    use AlignmentOperation::*;

    if !aln
        .operations
        .iter()
        .any(|op| matches!(op, Match | Subst))
    {
        return None;
    }

    let mut x_row = Vec::new();
    let mut y_row = Vec::new();

    fn push_x_only(x_row: &mut Vec<u8>, y_row: &mut Vec<u8>, bases: &[u8]) {
        x_row.extend_from_slice(bases);
        y_row.extend(std::iter::repeat_n(GAP, bases.len()));
    }

    fn push_y_only(x_row: &mut Vec<u8>, y_row: &mut Vec<u8>, bases: &[u8]) {
        x_row.extend(std::iter::repeat_n(GAP, bases.len()));
        y_row.extend_from_slice(bases);
    }

    push_x_only(&mut x_row, &mut y_row, x.get(..aln.xstart)?);
    push_y_only(&mut x_row, &mut y_row, y.get(..aln.ystart)?);

    let mut xi = aln.xstart;
    let mut yi = aln.ystart;
    for op in aln.operations.iter() {
        match op {
            Match | Subst => {
                x_row.push(*x.get(xi)?);
                y_row.push(*y.get(yi)?);
                xi += 1;
                yi += 1;
            }
            Ins => {
                x_row.push(*x.get(xi)?);
                y_row.push(GAP);
                xi += 1;
            }
            Del => {
                x_row.push(GAP);
                y_row.push(*y.get(yi)?);
                yi += 1;
            }
            Xclip(_) | Yclip(_) => {}
        }
    }

    push_x_only(&mut x_row, &mut y_row, x.get(xi..)?);
    push_y_only(&mut x_row, &mut y_row, y.get(yi..)?);

    Some((x_row, y_row))
}

/// Align the SV consensus to the expected SV reference haplotype
///
/// For all types except insertions, the full consensus is aligned to any segment of the reference
/// haplotype. For insertions the reference haplotype is the shorter sequence, so it is aligned to
/// any segment of the consensus, and the rows are transposed afterward so that row 0 is always
/// the consensus.
///
pub fn align_consensus_to_sv_ref(
    consensus: &[u8],
    sv_ref: &[u8],
    sv_type: SVType,
) -> Result<PairwiseAlignment, RefineFailure> {
    if consensus.is_empty() || sv_ref.is_empty() {
        return Err(RefineFailure::AlignmentFailed);
    }

    let weights = &CONSENSUS_ALIGNMENT_WEIGHTS;
    if sv_type == SVType::Insertion {
        let aln = glocal_align(sv_ref, consensus, weights);
        let (ref_row, consensus_row) =
            get_alignment_rows(sv_ref, consensus, &aln).ok_or(RefineFailure::AlignmentFailed)?;
        Ok(PairwiseAlignment::new(ref_row, consensus_row).transposed())
    } else {
        let aln = glocal_align(consensus, sv_ref, weights);
        let (consensus_row, ref_row) =
            get_alignment_rows(consensus, sv_ref, &aln).ok_or(RefineFailure::AlignmentFailed)?;
        Ok(PairwiseAlignment::new(consensus_row, ref_row))
    }
}
