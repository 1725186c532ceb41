use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, ValueEnum};
use const_format::concatcp;
use serde::{Deserialize, Serialize};
use simple_error::{SimpleResult, bail};
use unwrap::unwrap;

use super::defaults::{
    FLANK_QUALITY, MAX_CONSENSUS_INDEL_SIZE, MAX_CONSENSUS_SIZE, MIN_CLIP_QUALITY, MIN_FLANK_SIZE,
    MIN_SV_GAP_SIZE, SOFT_CLIP_WINDOW,
};
use super::utils::{check_input_filename, check_optional_input_filename};
use crate::refine::SETTINGS_FILENAME;

/// Sequencing technology used to create the SV consensus sequences
///
/// This selects how breakpoints found in the consensus alignment are mapped back to the genome.
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SequencingTechnology {
    /// Breakpoints are mapped through the candidate flank coordinates
    #[default]
    Illumina,

    /// Breakpoints are mapped relative to a consensus assembled to end at the candidate start
    Pacbio,
}

#[derive(Args, Deserialize, Serialize)]
pub struct RefineSettings {
    /// Directory for all refine command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_refine_output"))]
    pub output_dir: Utf8PathBuf,

    /// Genome reference in FASTA format
    #[arg(long = "ref", value_name = "FILE")]
    pub ref_filename: Utf8PathBuf,

    /// SV candidates with assembled consensus sequences, in JSON format
    #[arg(long = "candidates", value_name = "FILE")]
    pub candidates_filename: Utf8PathBuf,

    /// Alignment file in BAM or CRAM format used to count soft-clipped read support at each
    /// candidate breakend. The file must be indexed.
    ///
    #[arg(long = "bam", value_name = "FILE")]
    pub bam_filename: Option<Utf8PathBuf>,

    /// Sequencing technology of the reads used to assemble candidate consensus sequences
    #[arg(long, value_enum, default_value_t = SequencingTechnology::Illumina)]
    pub technology: SequencingTechnology,

    /// Minimum percent identity of the consensus alignment outside of the breakpoint gap
    #[arg(long, default_value_t = FLANK_QUALITY)]
    pub flank_quality: f64,

    /// Minimum number of aligned consensus bases required on each side of the breakpoint, after
    /// excluding breakpoint homology
    ///
    #[arg(long, default_value_t = MIN_FLANK_SIZE)]
    pub min_flank_size: u32,

    /// Minimum mean base quality of a soft-clipped read segment for the read to be counted as
    /// breakend support
    ///
    #[arg(long, default_value_t = MIN_CLIP_QUALITY)]
    pub min_clip_quality: u8,

    /// The short side of the breakpoint alignment gap must be smaller than this size
    #[arg(hide = true, long, default_value_t = MAX_CONSENSUS_INDEL_SIZE)]
    pub max_consensus_indel_size: u32,

    /// The long side of the breakpoint alignment gap must be larger than this size
    #[arg(hide = true, long, default_value_t = MIN_SV_GAP_SIZE)]
    pub min_sv_gap_size: u32,

    /// Candidates with a consensus sequence longer than this are not refined
    #[arg(hide = true, long, default_value_t = MAX_CONSENSUS_SIZE)]
    pub max_consensus_size: usize,

    /// Soft-clipped reads are counted as breakend support when their clip position is within
    /// this distance of the breakend
    ///
    #[arg(hide = true, long, default_value_t = SOFT_CLIP_WINDOW)]
    pub soft_clip_window: i64,

    /// Refine only the candidate with the given id, and turn on refinement debug output for it
    #[arg(hide = true, long)]
    pub target_sv_id: Option<String>,
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_refine_settings(settings: RefineSettings) -> SimpleResult<RefineSettings> {
    check_input_filename(&settings.ref_filename, "reference")?;
    check_input_filename(&settings.candidates_filename, "SV candidate")?;
    check_optional_input_filename(settings.bam_filename.as_deref(), "alignment")?;

    if !(settings.flank_quality > 0.0 && settings.flank_quality <= 1.0) {
        bail!(
            "--flank-quality argument must be in (0,1], found: {}",
            settings.flank_quality
        );
    }

    if settings.min_flank_size == 0 {
        bail!("--min-flank-size argument must be greater than 0");
    }

    if settings.min_sv_gap_size < settings.max_consensus_indel_size {
        bail!(
            "--min-sv-gap-size ({}) must not be smaller than --max-consensus-indel-size ({})",
            settings.min_sv_gap_size,
            settings.max_consensus_indel_size
        );
    }

    if settings.soft_clip_window < 0 {
        bail!("--soft-clip-window argument must not be negative");
    }

    Ok(settings)
}

/// Write refine settings out in json format
pub fn write_refine_settings(output_dir: &Utf8Path, settings: &RefineSettings) {
    use log::info;

    let filename = output_dir.join(SETTINGS_FILENAME);

    info!("Writing refine settings to file: '{filename}'");

    let f = unwrap!(
        std::fs::File::create(&filename),
        "Unable to create refine settings json file: '{filename}'"
    );

    unwrap!(
        serde_json::to_writer_pretty(&f, &settings),
        "Unable to write refine settings to json file: '{filename}'"
    );
}
