use std::sync::{Arc, Mutex};

use camino::Utf8Path;
use rust_htslib::bam;
use unwrap::unwrap;

/// For worker threads making indexed bam reads, this provides a persistent worker specific reader
/// for the alignment file
pub struct BamReaderWorkerThreadData {
    pub bam_reader: bam::IndexedReader,
}

impl BamReaderWorkerThreadData {
    pub fn new(bam_filename: &Utf8Path, ref_filename: &Utf8Path) -> Self {
        let mut bam_reader = unwrap!(
            bam::IndexedReader::from_path(bam_filename),
            "Unable to open indexed alignment file: '{bam_filename}'"
        );

        // Required for cram input
        unwrap!(
            bam_reader.set_reference(ref_filename),
            "Unable to set reference for alignment file: '{bam_filename}'"
        );
        Self { bam_reader }
    }
}

pub type BamReaderWorkerThreadDataSet = Arc<Vec<Mutex<BamReaderWorkerThreadData>>>;

/// Create one alignment file reader per worker thread
pub fn get_bam_reader_worker_thread_data(
    thread_count: usize,
    bam_filename: &Utf8Path,
    ref_filename: &Utf8Path,
) -> BamReaderWorkerThreadDataSet {
    let worker_thread_data = (0..thread_count)
        .map(|_| Mutex::new(BamReaderWorkerThreadData::new(bam_filename, ref_filename)))
        .collect::<Vec<_>>();
    Arc::new(worker_thread_data)
}
