//! Soft-clipped read evidence at SV candidate breakends
//!

use std::sync::mpsc::channel;
use std::time::Instant;

use camino::Utf8Path;
use log::info;
use rust_htslib::bam::{self, Read, record::Cigar};
use unwrap::unwrap;

use crate::bam_utils::filter_out_alignment_record;
use crate::cli;
use crate::refine_sv::orientation::{adjust_orientation, valid_soft_clip_orientation};
use crate::run_stats::SoftClipStats;
use crate::sv_candidate::{BreakendSide, SVCandidate};
use crate::worker_thread_data::BamReaderWorkerThreadDataSet;

/// Reads shorter than this are never used as soft-clip evidence
const MIN_SOFT_CLIP_READ_LEN: usize = 35;

pub struct SoftClipScanSettings {
    /// Minimum mean base quality of the clipped read segment
    pub min_clip_quality: u8,

    /// Maximum distance from the clip split point to the breakend
    pub window: i64,
}

impl SoftClipScanSettings {
    pub fn new(settings: &cli::RefineSettings) -> Self {
        Self {
            min_clip_quality: settings.min_clip_quality,
            window: settings.soft_clip_window,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct SoftClipInfo {
    pub clip_size: usize,

    /// Zero-indexed reference position where the aligned portion of the read meets the clip
    pub split_point: i64,

    /// True if the clip is at the start of the read alignment
    pub is_leading: bool,
}

/// Check whether the alignment record has a single, long, high-quality soft-clip that can be used
/// as breakpoint evidence
///
/// The clip must be longer than `10*log10(read_length)`, and the mean base quality of the
/// clipped segment must be at least `min_clip_quality`.
///
pub fn get_valid_soft_clip(record: &bam::Record, min_clip_quality: u8) -> Option<SoftClipInfo> {
    let read_len = record.seq_len();
    if read_len < MIN_SOFT_CLIP_READ_LEN {
        return None;
    }

    let cigar = record.cigar();
    let mut clips = cigar.iter().filter_map(|c| match c {
        Cigar::SoftClip(len) => Some(*len as usize),
        _ => None,
    });
    let clip_size = clips.next()?;
    if clips.next().is_some() {
        return None;
    }

    let min_clip_size = (10.0 * (read_len as f64).log10()) as usize;
    if clip_size <= min_clip_size {
        return None;
    }

    // An insertion only counts toward the aligned length if it is followed by a match
    let mut aligned_len = 0;
    let mut last_insertion_len = 0;
    let mut clip_offset = None;
    for c in cigar.iter() {
        match c {
            Cigar::Match(len) | Cigar::Equal(len) | Cigar::Diff(len) => {
                aligned_len += *len as usize + last_insertion_len;
                last_insertion_len = 0;
            }
            Cigar::Ins(len) => {
                last_insertion_len = *len as usize;
            }
            Cigar::SoftClip(_) => {
                clip_offset = Some(aligned_len);
            }
            _ => {}
        }
    }
    let clip_offset = clip_offset?;

    let clip_qual = record.qual().get(clip_offset..clip_offset + clip_size)?;
    let mean_qual = clip_qual.iter().map(|&q| q as usize).sum::<usize>() / clip_size;
    if mean_qual < min_clip_quality as usize {
        return None;
    }

    Some(SoftClipInfo {
        clip_size,
        split_point: record.pos() + clip_offset as i64,
        is_leading: clip_offset == 0,
    })
}

/// Soft-clipped read counted as support for one breakend of an SV candidate
pub struct SupportingRead {
    pub qname: String,
    pub side: BreakendSide,
    pub clip_size: usize,

    /// Read sequence in the orientation of the SV consensus
    pub seq: Vec<u8>,
}

/// Test whether the record supports the given breakend of `sv`, and return the supporting read
/// if so
///
fn get_breakend_supporting_read(
    settings: &SoftClipScanSettings,
    sv: &SVCandidate,
    side: BreakendSide,
    record: &bam::Record,
) -> Option<SupportingRead> {
    let clip = get_valid_soft_clip(record, settings.min_clip_quality)?;

    let breakend_pos = sv.get_breakend_pos(side);
    if (clip.split_point - breakend_pos).abs() > settings.window {
        return None;
    }

    if !valid_soft_clip_orientation(side, clip.is_leading, sv.connection_type, sv.sv_type) {
        return None;
    }

    let mut seq = record.seq().as_bytes();
    adjust_orientation(&mut seq, side, sv.connection_type, sv.sv_type);
    Some(SupportingRead {
        qname: String::from_utf8_lossy(record.qname()).to_string(),
        side,
        clip_size: clip.clip_size,
        seq,
    })
}

/// Find all soft-clipped reads supporting one breakend of `sv`
fn get_breakend_supporting_reads(
    bam_reader: &mut bam::IndexedReader,
    settings: &SoftClipScanSettings,
    sv: &SVCandidate,
    side: BreakendSide,
) -> Vec<SupportingRead> {
    let chrom = sv.get_breakend_chrom(side);
    let Some(tid) = bam_reader.header().tid(chrom.as_bytes()) else {
        return Vec::new();
    };

    let breakend_pos = sv.get_breakend_pos(side);
    let begin = std::cmp::max(0, breakend_pos - settings.window);
    let end = breakend_pos + settings.window + 1;
    unwrap!(
        bam_reader.fetch(bam::FetchDefinition::Region(tid as i32, begin, end)),
        "Failed to fetch alignment region {chrom}:{begin}-{end}"
    );

    let mut reads = Vec::new();
    let mut record = bam::Record::new();
    while let Some(r) = bam_reader.read(&mut record) {
        unwrap!(r, "Failed to parse alignment record");

        if filter_out_alignment_record(&record) {
            continue;
        }

        if let Some(read) = get_breakend_supporting_read(settings, sv, side, &record) {
            reads.push(read);
        }
    }
    reads
}

type ScanWorkerReturnType = (usize, Vec<SupportingRead>);

fn scan_sv_candidate_wrapper(
    tx: std::sync::mpsc::Sender<ScanWorkerReturnType>,
    worker_thread_dataset: BamReaderWorkerThreadDataSet,
    settings: &SoftClipScanSettings,
    sv_index: usize,
    sv: &SVCandidate,
) {
    let worker_id = rayon::current_thread_index().unwrap();
    let mut worker_thread_data = worker_thread_dataset[worker_id].lock().unwrap();
    let bam_reader = &mut worker_thread_data.bam_reader;

    let mut reads = Vec::new();
    for side in [BreakendSide::Start, BreakendSide::End] {
        reads.extend(get_breakend_supporting_reads(bam_reader, settings, sv, side));
    }
    tx.send((sv_index, reads)).unwrap();
}

/// Count soft-clipped read support at both breakends of every SV candidate
///
/// Each candidate's `soft_clip_support` counts are set, and the supporting reads for each
/// candidate are returned in candidate order.
///
pub fn scan_soft_clip_support(
    worker_thread_dataset: BamReaderWorkerThreadDataSet,
    settings: &SoftClipScanSettings,
    svs: &mut [SVCandidate],
) -> (Vec<Vec<SupportingRead>>, SoftClipStats) {
    info!("Scanning soft-clipped read support for {} SV candidates", svs.len());

    let start_time = Instant::now();

    let worker_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_thread_dataset.len())
        .build()
        .unwrap();

    let (tx, rx) = channel();
    {
        let svs = &*svs;
        worker_pool.scope(move |scope| {
            for (sv_index, sv) in svs.iter().enumerate() {
                let tx = tx.clone();
                let worker_thread_dataset = worker_thread_dataset.clone();
                scope.spawn(move |_| {
                    scan_sv_candidate_wrapper(tx, worker_thread_dataset, settings, sv_index, sv);
                });
            }
        });
    }

    let mut results = rx.into_iter().collect::<Vec<_>>();
    results.sort_by_key(|(sv_index, _)| *sv_index);

    let mut stats = SoftClipStats::default();
    let mut sv_reads = Vec::new();
    for (sv, (_, reads)) in svs.iter_mut().zip(results) {
        sv.soft_clip_support.start = reads.iter().filter(|x| !x.side.is_end()).count();
        sv.soft_clip_support.end = reads.len() - sv.soft_clip_support.start;
        if !reads.is_empty() {
            stats.supported_candidate_count += 1;
        }
        stats.start_support_read_count += sv.soft_clip_support.start;
        stats.end_support_read_count += sv.soft_clip_support.end;
        sv_reads.push(reads);
    }
    stats.total_scan_time_secs = start_time.elapsed().as_secs_f64();

    info!(
        "Finished soft-clipped read scan. Found support for {} of {} SV candidates",
        stats.supported_candidate_count,
        svs.len()
    );

    (sv_reads, stats)
}

/// Write supporting reads for all SV candidates to a fasta file
///
/// Each read is labeled with its SV candidate id and breakend side, and the clip size is given in
/// the record description.
///
pub fn write_supporting_reads(
    filename: &Utf8Path,
    svs: &[SVCandidate],
    sv_reads: &[Vec<SupportingRead>],
) {
    info!("Writing soft-clipped supporting reads to file: '{filename}'");

    let mut writer = unwrap!(
        bio::io::fasta::Writer::to_file(filename),
        "Unable to create supporting read fasta file: '{filename}'"
    );
    for (sv, reads) in svs.iter().zip(sv_reads) {
        for read in reads {
            let id = format!("{}:{}:{}", sv.id, read.side, read.qname);
            let desc = format!("clip_size={}", read.clip_size);
            unwrap!(
                writer.write(&id, Some(&desc), &read.seq),
                "Unable to write to supporting read fasta file: '{filename}'"
            );
        }
    }
    unwrap!(
        writer.flush(),
        "Unable to write to supporting read fasta file: '{filename}'"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bam_utils::test_utils::get_test_header;
    use crate::sv_candidate::test_utils::get_test_sv;
    use crate::sv_candidate::{ConnectionType, SVType};
    use crate::worker_thread_data::get_bam_reader_worker_thread_data;
    use camino::Utf8PathBuf;

    fn get_test_record(cigar: &str, qual: &str) -> bam::Record {
        let header = get_test_header();
        let seq = "ACGT".repeat(qual.len() / 4 + 1);
        let sam_line = format!(
            "qname\t0\tchr1\t101\t60\t{cigar}\t*\t0\t0\t{}\t{qual}",
            &seq[..qual.len()]
        );
        bam::Record::from_sam(&header, sam_line.as_bytes()).unwrap()
    }

    #[test]
    fn test_valid_trailing_soft_clip() {
        let rec = get_test_record("20M20S", &"I".repeat(40));
        assert_eq!(
            get_valid_soft_clip(&rec, 20),
            Some(SoftClipInfo {
                clip_size: 20,
                split_point: 120,
                is_leading: false,
            })
        );
    }

    #[test]
    fn test_valid_leading_soft_clip() {
        let rec = get_test_record("20S20M", &"I".repeat(40));
        assert_eq!(
            get_valid_soft_clip(&rec, 20),
            Some(SoftClipInfo {
                clip_size: 20,
                split_point: 100,
                is_leading: true,
            })
        );
    }

    #[test]
    fn test_short_soft_clip() {
        // An 8 base clip on a 40 base read is under the length-scaled noise floor of 16
        let rec = get_test_record("8S32M", &"I".repeat(40));
        assert_eq!(get_valid_soft_clip(&rec, 0), None);

        let rec = get_test_record("16S24M", &"I".repeat(40));
        assert_eq!(get_valid_soft_clip(&rec, 0), None);

        let rec = get_test_record("17S23M", &"I".repeat(40));
        assert!(get_valid_soft_clip(&rec, 0).is_some());
    }

    #[test]
    fn test_soft_clip_read_filters() {
        // Short read
        let rec = get_test_record("17M17S", &"I".repeat(34));
        assert_eq!(get_valid_soft_clip(&rec, 20), None);

        // Two soft-clips
        let rec = get_test_record("20S20M20S", &"I".repeat(60));
        assert_eq!(get_valid_soft_clip(&rec, 20), None);

        // No soft-clip
        let rec = get_test_record("40M", &"I".repeat(40));
        assert_eq!(get_valid_soft_clip(&rec, 20), None);
    }

    #[test]
    fn test_soft_clip_quality() {
        let qual = "I".repeat(20) + &"#".repeat(20);
        let rec = get_test_record("20M20S", &qual);
        assert_eq!(get_valid_soft_clip(&rec, 20), None);
        assert!(get_valid_soft_clip(&rec, 2).is_some());

        // Only the clipped bases contribute to the mean quality
        let qual = "#".repeat(20) + &"I".repeat(20);
        let rec = get_test_record("20M20S", &qual);
        assert!(get_valid_soft_clip(&rec, 40).is_some());
    }

    #[test]
    fn test_soft_clip_insertion() {
        // The insertion followed by a match is counted in the aligned length
        let rec = get_test_record("10M2I10M18S", &"I".repeat(40));
        let clip = get_valid_soft_clip(&rec, 20).unwrap();
        assert_eq!(clip.split_point, 122);
        assert_eq!(clip.clip_size, 18);
    }

    #[test]
    fn test_breakend_supporting_read() {
        let settings = SoftClipScanSettings {
            min_clip_quality: 20,
            window: 10,
        };
        let mut sv = get_test_sv(SVType::Deletion, ConnectionType::ThreeToFive);
        sv.sv_start = 115;
        sv.sv_end = 300;

        // Trailing clip supports the start of a deletion
        let rec = get_test_record("20M20S", &"I".repeat(40));
        let read = get_breakend_supporting_read(&settings, &sv, BreakendSide::Start, &rec).unwrap();
        assert_eq!(read.qname, "qname");
        assert_eq!(read.clip_size, 20);
        assert_eq!(read.seq, rec.seq().as_bytes());

        // Wrong clip side for the deletion end
        sv.sv_end = 120;
        assert!(get_breakend_supporting_read(&settings, &sv, BreakendSide::End, &rec).is_none());

        // Split point outside of the breakend window
        sv.sv_start = 140;
        assert!(get_breakend_supporting_read(&settings, &sv, BreakendSide::Start, &rec).is_none());
    }

    #[test]
    fn test_breakend_supporting_read_orientation() {
        let settings = SoftClipScanSettings {
            min_clip_quality: 20,
            window: 10,
        };
        let mut sv = get_test_sv(SVType::Inversion, ConnectionType::FiveToFive);
        sv.sv_start = 100;
        sv.sv_end = 500;

        // Leading clip at the start of a 5' to 5' inversion is reverse complemented
        let rec = get_test_record("20S20M", &"I".repeat(40));
        let read = get_breakend_supporting_read(&settings, &sv, BreakendSide::Start, &rec).unwrap();
        assert_eq!(
            read.seq,
            bio::alphabets::dna::revcomp(rec.seq().as_bytes().as_slice())
        );
    }

    fn get_test_sam_line(qname: &str, flag: u16, pos: i64, cigar: &str, qual: &str) -> String {
        let seq = "ACGT".repeat(qual.len() / 4 + 1);
        format!(
            "{qname}\t{flag}\tchr1\t{pos}\t60\t{cigar}\t*\t0\t0\t{}\t{qual}",
            &seq[..qual.len()]
        )
    }

    /// Write the sam lines to a new indexed bam file in `dir`, and return the bam filename
    fn write_test_bam(dir: &Utf8Path, sam_lines: &[String]) -> Utf8PathBuf {
        let header = get_test_header();
        let filename = dir.join("test.bam");
        {
            let mut writer = bam::Writer::from_path(
                &filename,
                &bam::Header::from_template(&header),
                bam::Format::Bam,
            )
            .unwrap();
            for sam_line in sam_lines {
                let record = bam::Record::from_sam(&header, sam_line.as_bytes()).unwrap();
                writer.write(&record).unwrap();
            }
        }
        bam::index::build(&filename, None, bam::index::Type::Bai, 1).unwrap();
        filename
    }

    fn get_test_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_scan_soft_clip_support() {
        let (_dir, dir_path) = get_test_dir();

        let qual = "I".repeat(40);
        let low_clip_qual = "I".repeat(20) + &"#".repeat(20);
        let sam_lines = [
            // Trailing clips with split points at 120
            get_test_sam_line("start1", 0, 101, "20M20S", &qual),
            get_test_sam_line("start1", 1024, 101, "20M20S", &qual),
            get_test_sam_line("start_lowq", 0, 101, "20M20S", &low_clip_qual),
            get_test_sam_line("start2", 0, 106, "15M25S", &qual),
            // Split point at 300 on the wrong side of the read for the deletion end
            get_test_sam_line("end_wrong_side", 0, 281, "20M20S", &qual),
            // Leading clip with split point at 300
            get_test_sam_line("end1", 0, 301, "20S20M", &qual),
        ];
        let bam_filename = write_test_bam(&dir_path, &sam_lines);

        let ref_filename = dir_path.join("ref.fa");
        std::fs::write(&ref_filename, ">chr1\nACGT\n").unwrap();

        let mut sv1 = get_test_sv(SVType::Deletion, ConnectionType::ThreeToFive);
        sv1.id = "del1".to_string();
        sv1.sv_start = 120;
        sv1.sv_end = 300;

        let mut sv2 = get_test_sv(SVType::Deletion, ConnectionType::ThreeToFive);
        sv2.id = "del2".to_string();
        sv2.sv_start = 5000;
        sv2.sv_end = 6000;

        let mut svs = vec![sv1, sv2];
        let worker_thread_dataset =
            get_bam_reader_worker_thread_data(2, &bam_filename, &ref_filename);
        let settings = SoftClipScanSettings {
            min_clip_quality: 20,
            window: 10,
        };
        let (sv_reads, stats) = scan_soft_clip_support(worker_thread_dataset, &settings, &mut svs);

        assert_eq!(svs[0].soft_clip_support.start, 2);
        assert_eq!(svs[0].soft_clip_support.end, 1);
        assert_eq!(svs[1].soft_clip_support.start, 0);
        assert_eq!(svs[1].soft_clip_support.end, 0);

        assert_eq!(stats.supported_candidate_count, 1);
        assert_eq!(stats.start_support_read_count, 2);
        assert_eq!(stats.end_support_read_count, 1);

        assert_eq!(sv_reads.len(), 2);
        let qnames = sv_reads[0]
            .iter()
            .map(|x| x.qname.as_str())
            .collect::<Vec<_>>();
        assert_eq!(qnames, ["start1", "start2", "end1"]);
        assert!(sv_reads[1].is_empty());
    }

    #[test]
    fn test_write_supporting_reads() {
        let (_dir, dir_path) = get_test_dir();

        let mut sv1 = get_test_sv(SVType::Deletion, ConnectionType::ThreeToFive);
        sv1.id = "del1".to_string();
        let mut sv2 = get_test_sv(SVType::Deletion, ConnectionType::ThreeToFive);
        sv2.id = "del2".to_string();
        let svs = [sv1, sv2];

        let sv_reads = vec![
            vec![
                SupportingRead {
                    qname: "read1".to_string(),
                    side: BreakendSide::Start,
                    clip_size: 20,
                    seq: b"ACGTACGTAC".to_vec(),
                },
                SupportingRead {
                    qname: "read2".to_string(),
                    side: BreakendSide::End,
                    clip_size: 35,
                    seq: b"TTTTGGGG".to_vec(),
                },
            ],
            Vec::new(),
        ];

        let filename = dir_path.join("reads.fasta");
        write_supporting_reads(&filename, &svs, &sv_reads);

        let reader = bio::io::fasta::Reader::from_file(&filename).unwrap();
        let records = reader.records().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].id(), "del1:Start:read1");
        assert_eq!(records[0].desc(), Some("clip_size=20"));
        assert_eq!(records[0].seq(), b"ACGTACGTAC");

        assert_eq!(records[1].id(), "del1:End:read2");
        assert_eq!(records[1].desc(), Some("clip_size=35"));
        assert_eq!(records[1].seq(), b"TTTTGGGG");
    }
}
