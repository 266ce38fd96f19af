use std::fmt;

/// A 4-byte ASCII box type tag, e.g. `ftyp` or `moov`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, serde::Serialize)]
pub struct FourCc(#[serde(serialize_with = "serialize_fourcc")] pub [u8; 4]);

fn serialize_fourcc<S: serde::Serializer>(tag: &[u8; 4], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&FourCc(*tag).to_string())
}

impl FourCc {
    pub const fn new(tag: &[u8; 4]) -> Self {
        FourCc(*tag)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Lossy ASCII rendering, replacing non-printable bytes with `.`.
    pub fn as_str_lossy(&self) -> String {
        self.0
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

impl From<[u8; 4]> for FourCc {
    fn from(b: [u8; 4]) -> Self {
        FourCc(b)
    }
}

/// Declares a `const FourCc` for each of `$name => $tag`, plus a matching
/// `is_container`-style lookup is left to the call sites that need one.
macro_rules! fourcc_consts {
    ($($name:ident => $tag:expr),+ $(,)?) => {
        $(pub const $name: FourCc = FourCc::new($tag);)+
    };
}

pub mod tag {
    use super::FourCc;

    fourcc_consts! {
        FTYP => b"ftyp", STYP => b"styp", MOOV => b"moov", MOOF => b"moof",
        TRAF => b"traf", MVEX => b"mvex", TRAK => b"trak", MDIA => b"mdia",
        MINF => b"minf", DINF => b"dinf", STBL => b"stbl", SINF => b"sinf",
        SCHI => b"schi", MVHD => b"mvhd", MFHD => b"mfhd", TFDT => b"tfdt",
        TRUN => b"trun", TFHD => b"tfhd", MEHD => b"mehd", TREX => b"trex",
        TKHD => b"tkhd", MDAT => b"mdat", FREE => b"free", SKIP => b"skip",
        MDHD => b"mdhd", HDLR => b"hdlr", VMHD => b"vmhd", DREF => b"dref",
        STSD => b"stsd", STSZ => b"stsz", STZ2 => b"stz2", STTS => b"stts",
        STSS => b"stss", STSC => b"stsc", STCO => b"stco", CO64 => b"co64",
        STDP => b"stdp", SMHD => b"smhd", SIDX => b"sidx", SAIZ => b"saiz",
        SAIO => b"saio", BTRT => b"btrt", DAC3 => b"dac3", TENC => b"tenc",
        PSSH => b"pssh", SENC => b"senc", FRMA => b"frma", SCHM => b"schm",
        SBGP => b"sbgp", SGPD => b"sgpd", UUID => b"uuid", ABST => b"abst",
        ASRT => b"asrt", AFRT => b"afrt",
        URL_ => b"url ", URN_ => b"urn ", AVCC => b"avcC", HVCC => b"hvcC",
        PASP => b"pasp",
    }
}
