use super::consensus_alignment::{GAP, PairwiseAlignment};
use super::homology::{find_homology, percent_identity};
use super::{RefineFailure, RefineSVSettings};
use crate::sv_candidate::SVType;

/// Breakpoint found in a consensus alignment, in alignment-local sequence coordinates
///
/// The consensus range [c_start, c_end) and reference range [r_start, r_end) each run from the
/// last base before the breakpoint gap to the first base after it, in 1-based coordinates of the
/// ungapped consensus and reference haplotype sequences.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlignDescriptor {
    pub c_start: i64,
    pub c_end: i64,
    pub r_start: i64,
    pub r_end: i64,
    pub hom_left: i64,
    pub hom_right: i64,
    pub perc_id: f64,
}

impl AlignDescriptor {
    fn consensus_gap_size(&self) -> i64 {
        self.c_end - self.c_start
    }

    fn ref_gap_size(&self) -> i64 {
        self.r_end - self.r_start
    }
}

struct GapStart {
    column: usize,
    consensus_index: i64,
    ref_index: i64,
}

/// Locate the breakpoint gap in the consensus alignment and check that it represents a clean SV
/// breakpoint
///
/// Only internal gaps are considered, so alignment columns before either row has started do not
/// qualify, and a gap still open at the end of the alignment is never used. Among internal gaps,
/// the largest on the reference side is selected, or the largest on the consensus side for
/// insertions. Ties keep the first gap.
///
pub fn find_split(
    settings: &RefineSVSettings,
    aln: &PairwiseAlignment,
    sv_type: SVType,
) -> Result<AlignDescriptor, RefineFailure> {
    let is_insertion = sv_type == SVType::Insertion;

    let mut ad = AlignDescriptor::default();
    let mut split_columns = None;

    let mut consensus_index = 0;
    let mut ref_index = 0;
    let mut gap_start: Option<GapStart> = None;
    let columns = aln.consensus_row().iter().zip(aln.ref_row()).enumerate();
    for (column, (&c, &r)) in columns {
        if c != GAP {
            consensus_index += 1;
        }
        if r != GAP {
            ref_index += 1;
        }

        if (c == GAP || r == GAP) && consensus_index > 0 && ref_index > 0 {
            if gap_start.is_none() {
                gap_start = Some(GapStart {
                    column,
                    consensus_index: if c != GAP {
                        consensus_index - 1
                    } else {
                        consensus_index
                    },
                    ref_index: if r != GAP { ref_index - 1 } else { ref_index },
                });
            }
        } else if let Some(gap) = gap_start.take() {
            let consensus_gap_size = consensus_index - gap.consensus_index;
            let ref_gap_size = ref_index - gap.ref_index;
            let is_better_gap = if is_insertion {
                consensus_gap_size > ad.consensus_gap_size()
            } else {
                ref_gap_size > ad.ref_gap_size()
            };
            if is_better_gap {
                ad.c_start = gap.consensus_index;
                ad.c_end = consensus_index;
                ad.r_start = gap.ref_index;
                ad.r_end = ref_index;
                split_columns = Some((gap.column, column - 1));
            }
        }
    }

    let Some((gap_start_column, gap_end_column)) = split_columns else {
        return Err(RefineFailure::NoInternalGap);
    };
    if ad.r_end <= ad.r_start {
        return Err(RefineFailure::NoInternalGap);
    }

    // The breakpoint should appear as a large gap on one sequence against at most a short
    // indel on the other
    let (short_gap_size, long_gap_size) = if is_insertion {
        (ad.ref_gap_size(), ad.consensus_gap_size())
    } else {
        (ad.consensus_gap_size(), ad.ref_gap_size())
    };
    if short_gap_size >= settings.max_consensus_indel_size
        || long_gap_size <= settings.min_sv_gap_size
    {
        return Err(RefineFailure::InvalidGapShape);
    }

    ad.perc_id = percent_identity(aln, gap_start_column, gap_end_column);
    if ad.perc_id < settings.flank_quality {
        return Err(RefineFailure::LowFlankIdentity);
    }

    (ad.hom_left, ad.hom_right) = find_homology(aln, gap_start_column, gap_end_column);

    // Both flanks need enough sequence outside of the homology range
    let min_flank_size = settings.min_flank_size;
    let consensus_len = consensus_index;
    let ref_len = ref_index;
    if ad.hom_left + min_flank_size > ad.c_start
        || consensus_len < ad.c_end + ad.hom_right + min_flank_size
    {
        return Err(RefineFailure::ShortFlank);
    }
    if ad.hom_left + min_flank_size > ad.r_start
        || ref_len < ad.r_end + ad.hom_right + min_flank_size
    {
        return Err(RefineFailure::ShortFlank);
    }

    Ok(ad)
}
