use log::info;

use crate::cli;
use crate::genome_ref::get_genome_ref_from_fasta;
use crate::refine_sv::{RefineSVSettings, refine_sv_candidates};
use crate::run_stats::{RefineRunStats, write_refine_run_stats};
use crate::soft_clip::{SoftClipScanSettings, scan_soft_clip_support, write_supporting_reads};
use crate::sv_candidate::{read_sv_candidates, write_sv_candidates};
use crate::worker_thread_data::get_bam_reader_worker_thread_data;

pub const REFINED_SV_FILENAME: &str = "refined.sv.json";
pub const RUN_STATS_FILENAME: &str = "run.stats.json";
pub const SETTINGS_FILENAME: &str = "refine.settings.json";
pub const SUPPORTING_READS_FILENAME: &str = "soft_clip.supporting_reads.fasta";

pub fn run_refine(shared_settings: &cli::SharedSettings, settings: &cli::RefineSettings) {
    cli::write_refine_settings(&settings.output_dir, settings);

    let genome_ref = get_genome_ref_from_fasta(&settings.ref_filename);
    let mut svs = read_sv_candidates(&settings.candidates_filename);

    // Breakend evidence is gathered at the input candidate positions, before refinement
    let soft_clip_stats = settings.bam_filename.as_ref().map(|bam_filename| {
        let bam_reader_worker_thread_dataset = get_bam_reader_worker_thread_data(
            shared_settings.thread_count,
            bam_filename,
            &settings.ref_filename,
        );
        let scan_settings = SoftClipScanSettings::new(settings);
        let (sv_reads, soft_clip_stats) =
            scan_soft_clip_support(bam_reader_worker_thread_dataset, &scan_settings, &mut svs);

        let filename = settings.output_dir.join(SUPPORTING_READS_FILENAME);
        write_supporting_reads(&filename, &svs, &sv_reads);
        soft_clip_stats
    });

    let refine_settings = RefineSVSettings::new(settings);
    let (refined_svs, refine_stats) = refine_sv_candidates(
        shared_settings.thread_count,
        &refine_settings,
        &genome_ref,
        svs,
        settings.target_sv_id.as_deref(),
    );

    write_sv_candidates(
        &settings.output_dir.join(REFINED_SV_FILENAME),
        &refined_svs,
    );

    info!(
        "Total refinement time: {:.2}s",
        refine_stats.total_refinement_time_secs
    );

    let run_stats = RefineRunStats {
        soft_clip_stats,
        refine_stats,
    };
    write_refine_run_stats(&settings.output_dir, &run_stats);
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use clap::Parser;

    #[test]
    fn test_run_refine() {
        let dir = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        let ref_filename = dir.join("ref.fa");
        std::fs::write(&ref_filename, ">chr1\nAAAACCCCGGGGTTTT\n").unwrap();

        let candidates_filename = dir.join("svs.json");
        let candidates = r#"[
            {
                "id": "del1",
                "sv_type": "DEL",
                "chrom": "chr1",
                "sv_start": 6,
                "sv_end": 10,
                "sv_start_beg": 0,
                "sv_start_end": 8,
                "sv_end_beg": 8,
                "sv_end_end": 16,
                "connection_type": 2,
                "consensus": "aaaaggggtttt"
            }
        ]"#;
        std::fs::write(&candidates_filename, candidates).unwrap();

        let output_dir = dir.join("out");
        std::fs::create_dir(&output_dir).unwrap();

        let settings = cli::Settings::parse_from([
            "splitrefine",
            "--threads",
            "2",
            "refine",
            "--output-dir",
            output_dir.as_str(),
            "--ref",
            ref_filename.as_str(),
            "--candidates",
            candidates_filename.as_str(),
            "--min-flank-size",
            "3",
            "--flank-quality",
            "0.9",
            "--max-consensus-indel-size",
            "3",
            "--min-sv-gap-size",
            "3",
        ]);
        let settings = cli::validate_and_fix_settings(settings);
        let cli::Commands::Refine(refine_settings) = &settings.command;
        run_refine(&settings.shared, refine_settings);

        let svs = read_sv_candidates(&output_dir.join(REFINED_SV_FILENAME));
        assert_eq!(svs.len(), 1);
        assert!(svs[0].precise);
        assert_eq!((svs[0].sv_start, svs[0].sv_end), (4, 9));

        assert!(output_dir.join(SETTINGS_FILENAME).exists());
        assert!(!output_dir.join(SUPPORTING_READS_FILENAME).exists());

        let json = std::fs::read_to_string(output_dir.join(RUN_STATS_FILENAME)).unwrap();
        let run_stats: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(run_stats["refine_stats"]["precise_count"], 1);
    }
}
