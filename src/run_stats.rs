//! Track stats for the whole refine run
//!

use std::collections::BTreeMap;
use std::fs::File;

use camino::Utf8Path;
use log::info;
use serde::Serialize;
use unwrap::unwrap;

use crate::refine::RUN_STATS_FILENAME;
use crate::refine_sv::RefineFailure;

#[derive(Default, Serialize)]
pub struct SoftClipStats {
    /// Candidates with at least one soft-clipped supporting read at either breakend
    pub supported_candidate_count: usize,

    pub start_support_read_count: usize,
    pub end_support_read_count: usize,

    pub total_scan_time_secs: f64,
}

#[derive(Default, Serialize)]
pub struct RefineStats {
    pub candidate_count: usize,

    /// Candidates refined to a base-pair precise breakpoint
    pub precise_count: usize,

    /// Count of candidates left unrefined, by reason
    pub failure_counts: BTreeMap<RefineFailure, usize>,

    pub total_refinement_time_secs: f64,
}

#[derive(Serialize)]
pub struct RefineRunStats {
    pub soft_clip_stats: Option<SoftClipStats>,
    pub refine_stats: RefineStats,
}

/// Write run_stats structure out in json format
pub fn write_refine_run_stats(output_dir: &Utf8Path, run_stats: &RefineRunStats) {
    let filename = output_dir.join(RUN_STATS_FILENAME);

    info!("Writing run statistics to file: '{filename}'");

    let f = unwrap!(
        File::create(&filename),
        "Unable to create run statistics json file: '{filename}'"
    );

    unwrap!(
        serde_json::to_writer_pretty(&f, &run_stats),
        "Unable to write run statistics to json file: '{filename}'"
    );
}
