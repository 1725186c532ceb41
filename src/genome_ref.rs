use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

use bio::io::fasta;
use camino::Utf8Path;
use log::info;
use unwrap::unwrap;

/// In-memory reference genome
///
/// Sequences are stored upper-case, so that all reference windows cut from them can be compared
/// directly against consensus sequences.
///
#[derive(Default)]
pub struct GenomeRef {
    /// A map from chrom name to chrom sequence
    pub chroms: HashMap<String, Vec<u8>>,
}

impl GenomeRef {
    pub fn get_chrom_seq(&self, chrom: &str) -> Option<&[u8]> {
        self.chroms.get(chrom).map(|x| x.as_slice())
    }

    pub fn total_size(&self) -> usize {
        self.chroms.values().map(|x| x.len()).sum()
    }
}

/// Read all fasta records from `reader` into a GenomeRef
///
pub fn get_genome_ref_from_fasta_reader<R: Read>(reader: R) -> GenomeRef {
    let reader = fasta::Reader::new(reader);

    let mut genome_ref = GenomeRef::default();
    for result in reader.records() {
        let record = unwrap!(result, "Error during reference fasta record parsing");
        genome_ref
            .chroms
            .insert(record.id().to_string(), record.seq().to_ascii_uppercase());
    }
    genome_ref
}

/// Read fasta file into GenomeRef data structure
///
pub fn get_genome_ref_from_fasta(filename: &Utf8Path) -> GenomeRef {
    info!("Reading reference genome from file '{filename}'");

    let file = unwrap!(
        File::open(filename),
        "Unable to open reference fasta file: '{filename}'"
    );

    let genome_ref = get_genome_ref_from_fasta_reader(file);
    info!(
        "Read {} reference sequences totaling {} bases",
        genome_ref.chroms.len(),
        genome_ref.total_size()
    );
    genome_ref
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom, Write};

    #[test]
    fn test_get_genome_ref_from_fasta_reader() {
        let mut file = tempfile::tempfile().unwrap();

        writeln!(file, ">chr1 test description").unwrap();
        writeln!(file, "ACGTacgt").unwrap();
        writeln!(file, "NNAC").unwrap();
        writeln!(file, ">chr2").unwrap();
        writeln!(file, "ttttGGGG").unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let genome_ref = get_genome_ref_from_fasta_reader(file);

        assert_eq!(genome_ref.chroms.len(), 2);
        assert_eq!(genome_ref.get_chrom_seq("chr1"), Some(&b"ACGTACGTNNAC"[..]));
        assert_eq!(genome_ref.get_chrom_seq("chr2"), Some(&b"TTTTGGGG"[..]));
        assert_eq!(genome_ref.get_chrom_seq("chr3"), None);
        assert_eq!(genome_ref.total_size(), 20);
    }
}
