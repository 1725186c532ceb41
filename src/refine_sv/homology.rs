//! Flank quality and breakpoint homology measures for a consensus alignment
//!

use super::consensus_alignment::{GAP, PairwiseAlignment};

/// Number of mismatches tolerated in a homology run before a single-base slip is attempted
const MAX_HOMOLOGY_MISMATCH: usize = 1;

/// Fraction of matching columns in the alignment flanks, outside of the breakpoint gap columns
/// [gap_start, gap_end]
///
/// Columns before both rows have started are skipped. A run of gap columns within the flanks
/// counts one mismatch per column, but only when the run is closed by an aligned column, so
/// trailing unaligned sequence is never penalized.
///
/// Returns 0 if there are no qualifying columns.
///
pub fn percent_identity(aln: &PairwiseAlignment, gap_start: usize, gap_end: usize) -> f64 {
    let mut consensus_seen = false;
    let mut ref_seen = false;
    let mut open_gap_mismatch = None;
    let mut matches = 0usize;
    let mut mismatches = 0usize;

    let columns = aln.consensus_row().iter().zip(aln.ref_row()).enumerate();
    for (column, (&c, &r)) in columns {
        if column >= gap_start && column <= gap_end {
            continue;
        }
        if c != GAP {
            consensus_seen = true;
        }
        if r != GAP {
            ref_seen = true;
        }

        if c == GAP || r == GAP {
            if consensus_seen && ref_seen {
                *open_gap_mismatch.get_or_insert(0) += 1;
            }
        } else {
            if let Some(x) = open_gap_mismatch.take() {
                mismatches += x;
            }
            if c == r {
                matches += 1;
            } else {
                mismatches += 1;
            }
        }
    }

    let total = matches + mismatches;
    if total == 0 {
        0.0
    } else {
        matches as f64 / total as f64
    }
}

/// Length of the matching run found by `is_match` stepping away from the breakpoint
///
/// `is_match(i, offset)` compares the two sequences at step `i`, where `offset` shifts one of the
/// two sequences by a single base after a slip has been accepted.
///
fn get_homology_run(steps: usize, is_match: impl Fn(usize, usize) -> bool) -> i64 {
    let mut run = 0;
    let mut mismatch = 0;
    let mut offset = 0;
    for i in 0..steps {
        if !is_match(i, offset) {
            mismatch += 1;
        }
        if mismatch > MAX_HOMOLOGY_MISMATCH {
            if offset == 0 {
                offset = 1;
                if is_match(i, offset) {
                    mismatch -= 1;
                    run += 1;
                    continue;
                }
            }
            break;
        }
        run += 1;
    }
    run
}

fn symbols_match(a: Option<&u8>, b: Option<&u8>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Find the left and right homology lengths around the breakpoint gap columns
/// [gap_start, gap_end]
///
/// The row with the gap symbol at `gap_start` is the gapped row. The sequence on each side of
/// the gap is compared to the gap-spanning sequence of the other row on the opposite side, which
/// is the sequence that could equally be placed on either side of the breakpoint.
///
/// Returns (hom_left, hom_right).
///
pub fn find_homology(aln: &PairwiseAlignment, gap_start: usize, gap_end: usize) -> (i64, i64) {
    let consensus_row = aln.consensus_row();
    let ref_row = aln.ref_row();

    let (gapped_row, spanning_row) = if ref_row.get(gap_start) == Some(&GAP) {
        (ref_row, consensus_row)
    } else if consensus_row.get(gap_start) == Some(&GAP) {
        (consensus_row, ref_row)
    } else {
        return (0, 0);
    };

    let hom_left = get_homology_run(gap_start, |i, offset| {
        let spanning_pos = (gap_end - i).checked_sub(offset);
        symbols_match(
            gapped_row.get(gap_start - i - 1),
            spanning_pos.and_then(|x| spanning_row.get(x)),
        )
    });

    let right_steps = aln.column_count().saturating_sub(gap_end + 1);
    let hom_right = get_homology_run(right_steps, |i, offset| {
        symbols_match(
            spanning_row.get(gap_start + i + offset),
            gapped_row.get(gap_end + i + 1),
        )
    });

    (hom_left, hom_right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine_sv::consensus_alignment::test_utils::get_test_alignment;
    use approx::assert_ulps_eq;

    #[test]
    fn test_percent_identity() {
        // Trailing gap is not counted
        let aln = get_test_alignment("ACGT----ACGTTT", "ACCTGGGGACGT--");
        assert_ulps_eq!(percent_identity(&aln, 4, 7), 7.0 / 8.0);

        // Internal gap closed by aligned sequence is counted
        let aln = get_test_alignment("ACGT----ACG-TTA", "ACCTGGGGACGATTA");
        assert_ulps_eq!(percent_identity(&aln, 4, 7), 9.0 / 11.0);

        // No flank columns
        let aln = get_test_alignment("A-", "-A");
        assert_ulps_eq!(percent_identity(&aln, 0, 1), 0.0);
    }

    #[test]
    fn test_percent_identity_translation_invariance() {
        let consensus_row = "ACGT----ACG-TTA";
        let ref_row = "ACCTGGGGACGATTA";
        let aln = get_test_alignment(consensus_row, ref_row);
        let expected = percent_identity(&aln, 4, 7);

        let shift = 3;
        let shifted_aln =
            get_test_alignment(&format!("---{consensus_row}"), &format!("GGA{ref_row}"));
        assert_ulps_eq!(
            percent_identity(&shifted_aln, 4 + shift, 7 + shift),
            expected
        );

        let shifted_aln =
            get_test_alignment(&format!("TTC{consensus_row}"), &format!("---{ref_row}"));
        assert_ulps_eq!(
            percent_identity(&shifted_aln, 4 + shift, 7 + shift),
            expected
        );
    }

    #[test]
    fn test_find_homology_no_homology() {
        let aln = get_test_alignment("AAAA----GGGGTTTT", "AAAACCCCGGGGTTTT");
        assert_eq!(find_homology(&aln, 4, 7), (1, 1));
    }

    #[test]
    fn test_find_homology_repeat() {
        // Deleting one copy of a tandem repeat unit leaves the breakpoint ambiguous across at
        // least the full unit on each side
        let aln = get_test_alignment("TTTTCAGT----CAGTAAAA", "TTTTCAGTCAGTCAGTAAAA");
        assert_eq!(find_homology(&aln, 8, 11), (6, 6));
    }

    #[test]
    fn test_find_homology_palindrome_symmetry() {
        // Left and right flanks are reverse complements of each other, and the deleted segment
        // is its own reverse complement
        let left = "TGGAAAGTTC";
        let deleted = "GAATTCCGGAATTC";
        let right = "GAACTTTCCA";

        let gap = "-".repeat(deleted.len());
        let aln = get_test_alignment(
            &format!("{left}{gap}{right}"),
            &format!("{left}{deleted}{right}"),
        );
        let gap_start = left.len();
        let gap_end = gap_start + deleted.len() - 1;
        let (hom_left, hom_right) = find_homology(&aln, gap_start, gap_end);
        assert_eq!(hom_left, hom_right);
        assert_eq!(hom_left, 5);
    }

    #[test]
    fn test_find_homology_ref_gap() {
        // Insertion shaped alignment, with the gap in the reference row
        let aln = get_test_alignment("AAAACCCCGGGGTTTT", "AAAA----GGGGTTTT");
        assert_eq!(find_homology(&aln, 4, 7), (1, 1));

        // No gap at the given column
        assert_eq!(find_homology(&aln, 0, 3), (0, 0));
    }
}
