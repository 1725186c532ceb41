//! Utilities for reading bam-format alignment records
//!

use rust_htslib::{bam, htslib};

/// Return true if the alignment record should be skipped for all evidence gathering
///
/// Unmapped, secondary, qc-failed and duplicate records are filtered out.
///
pub fn filter_out_alignment_record(record: &bam::Record) -> bool {
    static FLAG_FILTER: u32 =
        htslib::BAM_FUNMAP | htslib::BAM_FSECONDARY | htslib::BAM_FQCFAIL | htslib::BAM_FDUP;

    ((record.flags() as u32) & FLAG_FILTER) != 0
}

#[cfg(test)]
pub mod test_utils {
    use rust_htslib::bam::{
        HeaderView,
        header::{self, Header},
    };

    /// Single chromosome header for building test alignment records
    pub fn get_test_header() -> HeaderView {
        let mut _header = Header::new();
        _header.push_record(
            header::HeaderRecord::new(b"SQ")
                .push_tag(b"SN", "chr1")
                .push_tag(b"LN", 10000000),
        );
        HeaderView::from_header(&_header)
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::get_test_header;
    use super::*;

    #[test]
    fn test_filter_out_alignment_record() {
        let header = get_test_header();

        let sam_line = b"qname\t0\tchr1\t2\t60\t10M\t*\t0\t0\tACGCCGTATC\tDDDDDEEEEE";
        let rec = bam::Record::from_sam(&header, sam_line).unwrap();
        assert!(!filter_out_alignment_record(&rec));

        // Supplementary records are kept
        let sam_line = b"qname\t2048\tchr1\t2\t60\t10M\t*\t0\t0\tACGCCGTATC\tDDDDDEEEEE";
        let rec = bam::Record::from_sam(&header, sam_line).unwrap();
        assert!(!filter_out_alignment_record(&rec));

        for flag in [4, 256, 512, 1024] {
            let sam_line =
                format!("qname\t{flag}\tchr1\t2\t60\t10M\t*\t0\t0\tACGCCGTATC\tDDDDDEEEEE");
            let rec = bam::Record::from_sam(&header, sam_line.as_bytes()).unwrap();
            assert!(filter_out_alignment_record(&rec));
        }
    }
}
