//! Breakend orientation rules shared by split-read evidence collection and consensus refinement
//!

use bio::alphabets::dna;

use crate::sv_candidate::{BreakendSide, ConnectionType, SVType};

/// Return true if reads observed at `side` of an SV must be reverse-complemented to match the
/// orientation of the SV consensus
///
fn is_reverse_oriented(side: BreakendSide, ct: ConnectionType, sv_type: SVType) -> bool {
    use ConnectionType::*;
    let is_end = side.is_end();
    match sv_type {
        SVType::Deletion | SVType::Insertion | SVType::Duplication => false,
        SVType::Inversion => match ct {
            ThreeToThree => is_end,
            _ => !is_end,
        },
        SVType::Translocation => match ct {
            ThreeToThree => is_end,
            FiveToFive => !is_end,
            ThreeToFive | FiveToThree => false,
        },
    }
}

/// Reverse-complement `seq` in place when reads from `side` of the SV need to be flipped into
/// the SV consensus orientation
///
pub fn adjust_orientation(
    seq: &mut Vec<u8>,
    side: BreakendSide,
    ct: ConnectionType,
    sv_type: SVType,
) {
    if is_reverse_oriented(side, ct, sv_type) {
        *seq = dna::revcomp(seq.as_slice());
    }
}

/// Check whether a soft-clip observed on one side of a read is consistent with the breakend
/// geometry of the SV
///
/// # Arguments
/// * `side` - the breakend the read was found at
/// * `is_leading_clip` - true if the clip is at the start of the read alignment
///
pub fn valid_soft_clip_orientation(
    side: BreakendSide,
    is_leading_clip: bool,
    ct: ConnectionType,
    sv_type: SVType,
) -> bool {
    use ConnectionType::*;

    // Left side anchored at the start breakend, right side anchored at the end breakend
    let deletion_like = || is_leading_clip == side.is_end();

    // Right side anchored at the start breakend, left side anchored at the end breakend
    let duplication_like = || is_leading_clip != side.is_end();

    match sv_type {
        SVType::Deletion | SVType::Insertion => deletion_like(),
        SVType::Duplication => duplication_like(),
        SVType::Inversion => is_leading_clip == (ct != ThreeToThree),
        SVType::Translocation => match ct {
            ThreeToThree => !is_leading_clip,
            FiveToFive => is_leading_clip,
            ThreeToFive => deletion_like(),
            FiveToThree => duplication_like(),
        },
    }
}
