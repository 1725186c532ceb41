use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};

use camino::Utf8Path;
use log::info;
use serde::{Deserialize, Serialize};
use unwrap::unwrap;

/// Structural variant classes handled by breakpoint refinement
///
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, strum::Display, strum::EnumCount,
    strum::EnumIter,
)]
pub enum SVType {
    #[serde(rename = "DEL")]
    #[strum(serialize = "DEL")]
    Deletion,

    #[serde(rename = "INS")]
    #[strum(serialize = "INS")]
    Insertion,

    #[serde(rename = "DUP")]
    #[strum(serialize = "DUP")]
    Duplication,

    #[serde(rename = "INV")]
    #[strum(serialize = "INV")]
    Inversion,

    #[serde(rename = "BND")]
    #[strum(serialize = "BND")]
    Translocation,
}

/// Orientation in which the two ends of a candidate breakpoint are joined
///
/// The integer code of each variant is the value used in candidate input files:
///
/// | code | variant        | junction                                             |
/// |------|----------------|------------------------------------------------------|
/// | 0    | `ThreeToThree` | 3' end of the start side joined to the 3' end of the end side (inversion left junction) |
/// | 1    | `FiveToFive`   | 5' end joined to 5' end (inversion right junction)   |
/// | 2    | `ThreeToFive`  | 3' end of the start side joined to the 5' end of the end side (deletion-like) |
/// | 3    | `FiveToThree`  | 5' end of the start side joined to the 3' end of the end side (duplication-like) |
///
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, strum::EnumIter, strum::FromRepr,
)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ConnectionType {
    ThreeToThree = 0,
    FiveToFive = 1,
    ThreeToFive = 2,
    FiveToThree = 3,
}

impl TryFrom<u8> for ConnectionType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_repr(code).ok_or_else(|| format!("Unknown connection type code: {code}"))
    }
}

impl From<ConnectionType> for u8 {
    fn from(ct: ConnectionType) -> u8 {
        ct as u8
    }
}

/// Which of the two breakends of a candidate is being considered
///
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumIter)]
pub enum BreakendSide {
    Start,
    End,
}

impl BreakendSide {
    pub fn is_end(&self) -> bool {
        *self == BreakendSide::End
    }
}

/// Soft-clipped read counts supporting each breakend of a candidate
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SoftClipSupport {
    pub start: usize,
    pub end: usize,
}

/// One structural variant candidate under breakpoint refinement
///
/// All positions are offsets into the chromosome sequence buffers. The two flank ranges,
/// [sv_start_beg, sv_start_end) and [sv_end_beg, sv_end_end), bound the reference sequence used to
/// build the expected SV haplotype.
///
/// After a successful refinement `sv_start` and `sv_end` hold the positions immediately before and
/// after the breakpoint, so that for a deletion the removed sequence length is
/// `sv_end - sv_start - 1`.
///
#[derive(Clone, Deserialize, PartialEq, Serialize)]
pub struct SVCandidate {
    pub id: String,
    pub sv_type: SVType,
    pub chrom: String,

    /// Chromosome of the end breakend, only needed for translocations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrom2: Option<String>,

    pub sv_start: i64,
    pub sv_end: i64,
    pub sv_start_beg: i64,
    pub sv_start_end: i64,
    pub sv_end_beg: i64,
    pub sv_end_end: i64,
    pub connection_type: ConnectionType,

    /// Locally assembled sequence spanning the candidate breakpoint
    pub consensus: String,

    #[serde(default)]
    pub precise: bool,

    /// Flank percent identity of the consensus alignment supporting a precise breakpoint
    #[serde(default)]
    pub sr_align_quality: f64,

    #[serde(default)]
    pub ins_len: i64,

    #[serde(default)]
    pub hom_left: i64,

    #[serde(default)]
    pub hom_right: i64,

    #[serde(default)]
    pub soft_clip_support: SoftClipSupport,
}

impl SVCandidate {
    /// Chromosome of the end breakend
    pub fn get_chrom2(&self) -> &str {
        self.chrom2.as_deref().unwrap_or(&self.chrom)
    }

    pub fn get_breakend_chrom(&self, side: BreakendSide) -> &str {
        match side {
            BreakendSide::Start => &self.chrom,
            BreakendSide::End => self.get_chrom2(),
        }
    }

    pub fn get_breakend_pos(&self, side: BreakendSide) -> i64 {
        match side {
            BreakendSide::Start => self.sv_start,
            BreakendSide::End => self.sv_end,
        }
    }
}

impl fmt::Debug for SVCandidate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "SVCandidate: {} {} {}:{} {}:{} ct: {:?} flanks: [{}-{}) [{}-{}) consensus_len: {} precise: {}",
            self.id,
            self.sv_type,
            self.chrom,
            self.sv_start,
            self.get_chrom2(),
            self.sv_end,
            self.connection_type,
            self.sv_start_beg,
            self.sv_start_end,
            self.sv_end_beg,
            self.sv_end_end,
            self.consensus.len(),
            self.precise,
        )
    }
}

/// Read SV candidates from a json file
///
pub fn read_sv_candidates(filename: &Utf8Path) -> Vec<SVCandidate> {
    info!("Reading SV candidates from file: '{filename}'");

    let file = unwrap!(
        File::open(filename),
        "Unable to open SV candidate json file: '{filename}'"
    );
    let reader = BufReader::new(file);
    unwrap!(
        serde_json::from_reader(reader),
        "Unable to parse SV candidates from json file: '{filename}'"
    )
}

/// Write SV candidates to a json file
///
pub fn write_sv_candidates(filename: &Utf8Path, svs: &[SVCandidate]) {
    info!("Writing {} SV candidates to file: '{filename}'", svs.len());

    let file = unwrap!(
        File::create(filename),
        "Unable to create SV candidate json file: '{filename}'"
    );
    let writer = BufWriter::new(file);
    unwrap!(
        serde_json::to_writer_pretty(writer, svs),
        "Unable to write SV candidates to json file: '{filename}'"
    );
}
