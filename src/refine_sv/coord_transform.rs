//! Map breakpoints found in the SV reference haplotype alignment back to genome coordinates
//!
//! Each transform inverts the flank layout used to build the haplotype in `ref_window`.
//!

use super::RefineFailure;
use super::find_split::AlignDescriptor;
use crate::sv_candidate::{ConnectionType, SVCandidate, SVType};

/// Check that the breakpoint found in the haplotype alignment crosses the junction between the
/// two reference flanks, where `annealed` is the length of the haplotype before the junction
fn check_annealed_junction(ad: &AlignDescriptor, annealed: i64) -> Result<(), RefineFailure> {
    if ad.r_start >= annealed || ad.r_end < annealed {
        Err(RefineFailure::BreakpointOutsideJunction)
    } else {
        Ok(())
    }
}

fn start_flank_size(sv: &SVCandidate) -> i64 {
    sv.sv_start_end - sv.sv_start_beg
}

fn end_flank_size(sv: &SVCandidate) -> i64 {
    sv.sv_end_end - sv.sv_end_beg
}

/// Start flank followed by end flank, both in genome orientation
fn get_deletion_like_coords(
    sv: &SVCandidate,
    ad: &AlignDescriptor,
) -> Result<(i64, i64), RefineFailure> {
    let annealed = start_flank_size(sv);
    check_annealed_junction(ad, annealed)?;
    Ok((sv.sv_start_beg + ad.r_start, sv.sv_end_beg + (ad.r_end - annealed)))
}

/// End flank followed by start flank, both in genome orientation
fn get_duplication_like_coords(
    sv: &SVCandidate,
    ad: &AlignDescriptor,
) -> Result<(i64, i64), RefineFailure> {
    let annealed = end_flank_size(sv);
    check_annealed_junction(ad, annealed)?;
    Ok((sv.sv_start_beg + (ad.r_end - annealed), sv.sv_end_beg + ad.r_start))
}

/// Start flank followed by the reverse complemented end flank
fn get_three_to_three_coords(
    sv: &SVCandidate,
    sv_ref_len: i64,
    ad: &AlignDescriptor,
) -> Result<(i64, i64), RefineFailure> {
    let annealed = start_flank_size(sv);
    check_annealed_junction(ad, annealed)?;
    Ok((
        sv.sv_start_beg + ad.r_start,
        sv.sv_end_beg + (sv_ref_len - ad.r_end) + 1,
    ))
}

/// Reverse complemented start flank followed by the end flank
fn get_five_to_five_coords(
    sv: &SVCandidate,
    ad: &AlignDescriptor,
) -> Result<(i64, i64), RefineFailure> {
    let annealed = start_flank_size(sv);
    check_annealed_junction(ad, annealed)?;
    Ok((
        sv.sv_start_beg + (annealed - ad.r_start) + 1,
        sv.sv_end_beg + (ad.r_end - annealed),
    ))
}

/// Translate a breakpoint from the SV haplotype alignment into refined (sv_start, sv_end)
/// genome coordinates
///
/// Except for insertions, the breakpoint must cross the flank junction implied by the candidate
/// flank coordinates.
///
pub fn get_breakpoint_genome_coords(
    sv: &SVCandidate,
    sv_ref_len: usize,
    ad: &AlignDescriptor,
) -> Result<(i64, i64), RefineFailure> {
    use ConnectionType::*;

    let sv_ref_len = sv_ref_len as i64;
    match sv.sv_type {
        SVType::Deletion => get_deletion_like_coords(sv, ad),
        SVType::Duplication => get_duplication_like_coords(sv, ad),
        SVType::Inversion => match sv.connection_type {
            ThreeToThree => get_three_to_three_coords(sv, sv_ref_len, ad),
            _ => get_five_to_five_coords(sv, ad),
        },
        SVType::Translocation => match sv.connection_type {
            ThreeToThree => get_three_to_three_coords(sv, sv_ref_len, ad),
            FiveToFive => get_five_to_five_coords(sv, ad),
            ThreeToFive => get_deletion_like_coords(sv, ad),
            FiveToThree => get_duplication_like_coords(sv, ad),
        },
        SVType::Insertion => Ok((sv.sv_start_beg + ad.r_start, sv.sv_start_beg + ad.r_end)),
    }
}

/// Translate a breakpoint into genome coordinates assuming the consensus was assembled to end at
/// the candidate start position
///
/// This mapping does not check the breakpoint against the candidate flank junction.
///
pub fn get_breakpoint_consensus_anchored_coords(
    sv: &SVCandidate,
    ad: &AlignDescriptor,
) -> (i64, i64) {
    let ref_start = std::cmp::max(0, sv.sv_start - sv.consensus.len() as i64);
    (ref_start + ad.r_start - 1, ref_start + ad.r_end - 1)
}
