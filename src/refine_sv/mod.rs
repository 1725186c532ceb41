mod consensus_alignment;
mod coord_transform;
mod find_split;
mod homology;
pub mod orientation;
mod ref_window;

use std::collections::BTreeMap;
use std::sync::mpsc::channel;
use std::time::Instant;

use log::info;
use serde::Serialize;

use self::consensus_alignment::align_consensus_to_sv_ref;
use self::coord_transform::{
    get_breakpoint_consensus_anchored_coords, get_breakpoint_genome_coords,
};
use self::find_split::find_split;
use self::ref_window::get_sv_ref_window;
use crate::cli::{self, SequencingTechnology};
use crate::genome_ref::GenomeRef;
use crate::log_utils::debug_msg;
use crate::run_stats::RefineStats;
use crate::sv_candidate::SVCandidate;

/// Reasons an SV candidate breakpoint could not be refined to base-pair precision
///
/// None of these are errors, the candidate is just retained at its input coordinates.
///
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum RefineFailure {
    /// A candidate chromosome is missing from the reference
    UnknownChrom,

    /// Flank coordinates are unordered or extend past the end of the chromosome
    InvalidRefWindow,

    ConsensusTooShort,

    ConsensusTooLong,

    AlignmentFailed,

    /// No gap found in the alignment after both sequences have started
    NoInternalGap,

    /// The breakpoint gap is not a large gap against a short indel
    InvalidGapShape,

    LowFlankIdentity,

    /// Not enough sequence remains on one side of the breakpoint after accounting for homology
    ShortFlank,

    /// The refined breakpoint does not cross the junction between the candidate flanks
    BreakpointOutsideJunction,
}

pub struct RefineSVSettings {
    /// Minimum percent identity of the alignment flanks around the breakpoint
    pub flank_quality: f64,

    /// Minimum number of unambiguous aligned bases required on each side of the breakpoint
    pub min_flank_size: i64,

    pub technology: SequencingTechnology,

    /// The breakpoint gap must be smaller than this on its short side
    pub max_consensus_indel_size: i64,

    /// The breakpoint gap must be larger than this on its long side
    pub min_sv_gap_size: i64,

    /// Candidates with a longer consensus sequence are not refined
    pub max_consensus_size: usize,
}

impl RefineSVSettings {
    pub fn new(settings: &cli::RefineSettings) -> Self {
        Self {
            flank_quality: settings.flank_quality,
            min_flank_size: settings.min_flank_size as i64,
            technology: settings.technology,
            max_consensus_indel_size: settings.max_consensus_indel_size as i64,
            min_sv_gap_size: settings.min_sv_gap_size as i64,
            max_consensus_size: settings.max_consensus_size,
        }
    }
}

impl Default for RefineSVSettings {
    fn default() -> Self {
        use cli::defaults::*;
        Self {
            flank_quality: FLANK_QUALITY,
            min_flank_size: MIN_FLANK_SIZE as i64,
            technology: SequencingTechnology::Illumina,
            max_consensus_indel_size: MAX_CONSENSUS_INDEL_SIZE as i64,
            min_sv_gap_size: MIN_SV_GAP_SIZE as i64,
            max_consensus_size: MAX_CONSENSUS_SIZE,
        }
    }
}

/// Align the SV candidate consensus sequence to the expected SV haplotype in `sv_ref`, and use
/// the alignment to find the precise breakpoint location
///
/// On success, the breakpoint coordinates, alignment quality, insertion length and homology of
/// `sv` are updated and it is marked precise. On failure `sv` is not modified.
///
pub fn align_consensus(
    settings: &RefineSVSettings,
    sv: &mut SVCandidate,
    sv_ref: &[u8],
    debug: bool,
) -> Result<(), RefineFailure> {
    let consensus = sv.consensus.as_bytes().to_ascii_uppercase();
    if (consensus.len() as i64) < 2 * settings.min_flank_size {
        return Err(RefineFailure::ConsensusTooShort);
    }
    if consensus.len() > settings.max_consensus_size {
        return Err(RefineFailure::ConsensusTooLong);
    }

    let aln = align_consensus_to_sv_ref(&consensus, sv_ref, sv.sv_type)?;
    debug_msg!(debug, "Consensus alignment for {}:\n{:?}", sv.id, aln);

    let ad = find_split(settings, &aln, sv.sv_type)?;
    debug_msg!(debug, "Breakpoint for {}: {:?}", sv.id, ad);

    let (sv_start, sv_end) = match settings.technology {
        SequencingTechnology::Illumina => get_breakpoint_genome_coords(sv, sv_ref.len(), &ad)?,
        SequencingTechnology::Pacbio => get_breakpoint_consensus_anchored_coords(sv, &ad),
    };

    sv.precise = true;
    sv.sv_start = sv_start;
    sv.sv_end = sv_end;
    sv.sr_align_quality = ad.perc_id;
    sv.ins_len = ad.c_end - ad.c_start - 1;
    sv.hom_left = ad.hom_left;
    sv.hom_right = ad.hom_right;
    Ok(())
}

/// Build the expected SV haplotype from the reference and refine the candidate breakpoint
/// against it
///
pub fn refine_sv_candidate(
    settings: &RefineSVSettings,
    genome_ref: &GenomeRef,
    sv: &mut SVCandidate,
    debug: bool,
) -> Result<(), RefineFailure> {
    let sv_ref = get_sv_ref_window(genome_ref, sv)?;
    align_consensus(settings, sv, &sv_ref, debug)
}

type RefineWorkerReturnType = (usize, SVCandidate, Result<(), RefineFailure>);

fn refine_sv_candidate_wrapper(
    tx: std::sync::mpsc::Sender<RefineWorkerReturnType>,
    settings: &RefineSVSettings,
    genome_ref: &GenomeRef,
    sv_index: usize,
    mut sv: SVCandidate,
    debug: bool,
) {
    let result = refine_sv_candidate(settings, genome_ref, &mut sv, debug);
    if let Err(failure) = &result {
        debug_msg!(debug, "Unable to refine {:?}: {failure}", sv);
    }
    tx.send((sv_index, sv, result)).unwrap();
}

/// Refine all SV candidates
///
/// SV candidate refinement is distributed over a threadpool. Candidates are returned in input
/// order.
///
/// # Arguments
/// * `target_sv_id` - if defined, only refine the candidate with this id and turn on debug
///   output for it
///
pub fn refine_sv_candidates(
    thread_count: usize,
    settings: &RefineSVSettings,
    genome_ref: &GenomeRef,
    svs: Vec<SVCandidate>,
    target_sv_id: Option<&str>,
) -> (Vec<SVCandidate>, RefineStats) {
    info!("Refining {} SV candidates", svs.len());

    let start_time = Instant::now();

    let svs = svs
        .into_iter()
        .filter(|sv| target_sv_id.is_none_or(|x| x == sv.id))
        .collect::<Vec<_>>();
    let debug = target_sv_id.is_some();

    let worker_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .unwrap();

    let (tx, rx) = channel();
    worker_pool.scope(move |scope| {
        for (sv_index, sv) in svs.into_iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                refine_sv_candidate_wrapper(tx, settings, genome_ref, sv_index, sv, debug);
            });
        }
    });

    let mut results = rx.into_iter().collect::<Vec<_>>();
    results.sort_by_key(|(sv_index, _, _)| *sv_index);

    let mut refine_stats = RefineStats {
        candidate_count: results.len(),
        ..Default::default()
    };
    let mut failure_counts = BTreeMap::new();
    let mut refined_svs = Vec::new();
    for (_, sv, result) in results {
        match result {
            Ok(()) => {
                refine_stats.precise_count += 1;
            }
            Err(failure) => {
                *failure_counts.entry(failure).or_insert(0) += 1;
            }
        }
        refined_svs.push(sv);
    }
    refine_stats.failure_counts = failure_counts;
    refine_stats.total_refinement_time_secs = start_time.elapsed().as_secs_f64();

    info!(
        "Finished refining SV candidates. Refined {} of {} candidates to a precise breakpoint",
        refine_stats.precise_count, refine_stats.candidate_count
    );

    (refined_svs, refine_stats)
}
