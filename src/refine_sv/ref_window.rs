//! Construction of the expected SV haplotype from the reference
//!
//! The layout of each window must stay in lock-step with the offset arithmetic in
//! `coord_transform`, which maps breakpoints found in the window back to the genome.
//!

use bio::alphabets::dna;

use super::RefineFailure;
use crate::genome_ref::GenomeRef;
use crate::sv_candidate::{BreakendSide, ConnectionType, SVCandidate, SVType};

/// Get the upper-case reference sequence for [begin, end)
///
fn get_flank(chrom_seq: &[u8], begin: i64, end: i64) -> Result<Vec<u8>, RefineFailure> {
    if begin < 0 || end <= begin || end > chrom_seq.len() as i64 {
        return Err(RefineFailure::InvalidRefWindow);
    }
    Ok(chrom_seq[begin as usize..end as usize].to_ascii_uppercase())
}

fn get_start_flank(chrom_seq: &[u8], sv: &SVCandidate) -> Result<Vec<u8>, RefineFailure> {
    get_flank(chrom_seq, sv.sv_start_beg, sv.sv_start_end)
}

fn get_end_flank(chrom_seq: &[u8], sv: &SVCandidate) -> Result<Vec<u8>, RefineFailure> {
    get_flank(chrom_seq, sv.sv_end_beg, sv.sv_end_end)
}

fn concat(a: Vec<u8>, b: &[u8]) -> Vec<u8> {
    let mut x = a;
    x.extend_from_slice(b);
    x
}

/// Build the part of the expected SV haplotype found on one chromosome
///
/// For all SV types except translocations both flanks are taken from `chrom_seq` and
/// `chrom_side` is ignored.
///
/// For translocations, `chrom_side` selects which breakend chromosome `chrom_seq` belongs to.
/// The start-side window is assembled around `partner_seq`, the end-side window produced by a
/// previous call to this method.
///
pub fn get_sv_ref_seq(
    chrom_seq: &[u8],
    sv: &SVCandidate,
    chrom_side: BreakendSide,
    partner_seq: &[u8],
) -> Result<Vec<u8>, RefineFailure> {
    use ConnectionType::*;

    let seq = match sv.sv_type {
        SVType::Deletion => concat(
            get_start_flank(chrom_seq, sv)?,
            &get_end_flank(chrom_seq, sv)?,
        ),
        SVType::Insertion => get_flank(chrom_seq, sv.sv_start_beg, sv.sv_end_end)?,
        SVType::Duplication => concat(
            get_end_flank(chrom_seq, sv)?,
            &get_start_flank(chrom_seq, sv)?,
        ),
        SVType::Inversion => match sv.connection_type {
            ThreeToThree => concat(
                get_start_flank(chrom_seq, sv)?,
                &dna::revcomp(get_end_flank(chrom_seq, sv)?),
            ),
            _ => concat(
                dna::revcomp(get_start_flank(chrom_seq, sv)?),
                &get_end_flank(chrom_seq, sv)?,
            ),
        },
        SVType::Translocation => match chrom_side {
            BreakendSide::Start => match sv.connection_type {
                ThreeToThree | ThreeToFive => concat(get_start_flank(chrom_seq, sv)?, partner_seq),
                FiveToFive => concat(dna::revcomp(get_start_flank(chrom_seq, sv)?), partner_seq),
                FiveToThree => concat(partner_seq.to_vec(), &get_start_flank(chrom_seq, sv)?),
            },
            BreakendSide::End => match sv.connection_type {
                ThreeToThree => dna::revcomp(get_end_flank(chrom_seq, sv)?),
                _ => get_end_flank(chrom_seq, sv)?,
            },
        },
    };
    Ok(seq)
}

/// Build the full expected SV haplotype that the candidate consensus is aligned against
///
pub fn get_sv_ref_window(
    genome_ref: &GenomeRef,
    sv: &SVCandidate,
) -> Result<Vec<u8>, RefineFailure> {
    let start_chrom_seq = genome_ref
        .get_chrom_seq(&sv.chrom)
        .ok_or(RefineFailure::UnknownChrom)?;

    if sv.sv_type == SVType::Translocation {
        let end_chrom_seq = genome_ref
            .get_chrom_seq(sv.get_chrom2())
            .ok_or(RefineFailure::UnknownChrom)?;
        let end_seq = get_sv_ref_seq(end_chrom_seq, sv, BreakendSide::End, &[])?;
        get_sv_ref_seq(start_chrom_seq, sv, BreakendSide::Start, &end_seq)
    } else {
        get_sv_ref_seq(start_chrom_seq, sv, BreakendSide::Start, &[])
    }
}
