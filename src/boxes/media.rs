//! Boxes nested under `mdia`/`minf`/`dinf`: the media header, handler
//! reference, the video/sound header variants, and the data-reference
//! table with its `url `/`urn ` entries.

use crate::combinator::{prefixed_array, write_prefixed_array};
use crate::error::{Error, Result};
use crate::fourcc::FourCc;
use crate::primitive::{BitReader, BitWriter, Reader, Writer};

/// `mdhd`: the language code is packed as 1 reserved bit plus three 5-bit
/// letters offset by `0x60` (ISO 639-2/T, per `ISO6392TLanguageCode` in
/// the reference implementation this schema is distilled from).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MediaHeaderBox {
    pub version: u8,
    pub flags: u32,
    pub creation_time: u64,
    pub modification_time: u64,
    pub timescale: u32,
    pub duration: u64,
    pub language: [u8; 3],
}

impl MediaHeaderBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let creation_time = r.version_sized(version, "creation_time")?;
        let modification_time = r.version_sized(version, "modification_time")?;
        let timescale = r.u32("timescale")?;
        let duration = r.version_sized(version, "duration")?;
        let lang_bytes = r.bytes_exact::<2>("language")?;
        let mut br = BitReader::new(&lang_bytes);
        br.skip(1, "language_pad")?;
        let mut language = [0u8; 3];
        for l in language.iter_mut() {
            *l = br.bits(5, "language_letter")? as u8 + 0x60;
        }
        r.bytes(2, "pre_defined")?;
        Ok(MediaHeaderBox {
            version,
            flags,
            creation_time,
            modification_time,
            timescale,
            duration,
            language,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.version_sized(self.version, self.creation_time);
        w.version_sized(self.version, self.modification_time);
        w.u32(self.timescale);
        w.version_sized(self.version, self.duration);
        let mut bw = BitWriter::new();
        bw.write_zeros(1);
        for l in self.language {
            bw.write_bits((l - 0x60) as u64, 5);
        }
        w.bytes(&bw.finish());
        w.zeros(2);
    }
}

/// `hdlr`: names the track's media handler (`vide`, `soun`, `hint`, ...).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HandlerReferenceBox {
    pub version: u8,
    pub flags: u32,
    pub handler_type: FourCc,
    pub name: String,
}

impl HandlerReferenceBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        r.bytes(4, "pre_defined")?;
        let handler_type = FourCc(r.bytes_exact::<4>("handler_type")?);
        r.bytes(12, "reserved")?;
        let name = r.cstring_utf8("name")?;
        Ok(HandlerReferenceBox {
            version,
            flags,
            handler_type,
            name,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.zeros(4);
        w.bytes(self.handler_type.as_bytes());
        w.zeros(12);
        w.cstring_utf8(&self.name);
    }
}

/// `vmhd`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VideoMediaHeaderBox {
    pub version: u8,
    pub flags: u32,
    pub graphics_mode: u16,
    pub opcolor: [u16; 3],
}

impl Default for VideoMediaHeaderBox {
    fn default() -> Self {
        VideoMediaHeaderBox {
            version: 0,
            flags: 1,
            graphics_mode: 0,
            opcolor: [0, 0, 0],
        }
    }
}

impl VideoMediaHeaderBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let graphics_mode = r.u16("graphics_mode")?;
        let opcolor = [r.u16("opcolor")?, r.u16("opcolor")?, r.u16("opcolor")?];
        Ok(VideoMediaHeaderBox {
            version,
            flags,
            graphics_mode,
            opcolor,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.u16(self.graphics_mode);
        for c in self.opcolor {
            w.u16(c);
        }
    }
}

/// `smhd`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SoundMediaHeaderBox {
    pub version: u8,
    pub flags: u32,
    pub balance: i16,
}

impl SoundMediaHeaderBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let balance = r.i16("balance")?;
        r.bytes(2, "reserved")?;
        Ok(SoundMediaHeaderBox { version, flags, balance })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.i16(self.balance);
        w.zeros(2);
    }
}

/// One entry in a `dref` table: either a self-contained reference (no
/// location string) or a location pointing away from this file.
///
/// Each entry is itself framed like a box (`u32` length covering the
/// whole entry, then its own 4-byte type), so it is parsed with the same
/// length-then-type shape as the top-level codec rather than a plain
/// `prefixed_array` element.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum DataEntry {
    Url {
        version: u8,
        location: Option<String>,
    },
    Urn {
        version: u8,
        name: Option<String>,
        location: Option<String>,
    },
}

impl DataEntry {
    fn self_contained(&self) -> bool {
        match self {
            DataEntry::Url { location, .. } => location.is_none(),
            DataEntry::Urn { name, location, .. } => name.is_none() && location.is_none(),
        }
    }

    pub fn parse(r: &mut Reader) -> Result<Self> {
        let total_len = r.u32("length")? as usize;
        let tag = r.bytes_exact::<4>("type")?;
        let body_len = total_len
            .checked_sub(8)
            .ok_or(Error::LengthOverrun { excess: 0 })?;
        let mut br = r.sub_reader(body_len, "data_entry_body")?;
        let version = br.u8("version")?;
        let flags = br.u24("flags")?;
        let self_contained = flags & 1 != 0;
        let entry = match &tag {
            b"url " => {
                let location = if self_contained {
                    None
                } else {
                    Some(br.cstring_utf8("location")?)
                };
                DataEntry::Url { version, location }
            }
            b"urn " => {
                let (name, location) = if self_contained {
                    (None, None)
                } else {
                    (Some(br.cstring_utf8("name")?), Some(br.cstring_utf8("location")?))
                };
                DataEntry::Urn {
                    version,
                    name,
                    location,
                }
            }
            other => {
                return Err(Error::BoxNotFound {
                    tag: FourCc(*other).to_string(),
                })
            }
        };
        br.expect_exhausted()?;
        Ok(entry)
    }

    pub fn encode(&self, w: &mut Writer) {
        let mut body = Writer::new();
        let flags = if self.self_contained() { 1u32 } else { 0 };
        match self {
            DataEntry::Url { version, location } => {
                body.full_box_header(*version, flags);
                if let Some(loc) = location {
                    body.cstring_utf8(loc);
                }
            }
            DataEntry::Urn { version, name, location } => {
                body.full_box_header(*version, flags);
                if let Some(name) = name {
                    body.cstring_utf8(name);
                }
                if let Some(loc) = location {
                    body.cstring_utf8(loc);
                }
            }
        }
        let body = body.into_vec();
        let tag: &[u8; 4] = match self {
            DataEntry::Url { .. } => b"url ",
            DataEntry::Urn { .. } => b"urn ",
        };
        w.u32(8 + body.len() as u32);
        w.bytes(tag);
        w.bytes(&body);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DataReferenceBox {
    pub version: u8,
    pub flags: u32,
    pub entries: Vec<DataEntry>,
}

impl DataReferenceBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let entries = prefixed_array(r, "entry_count", DataEntry::parse)?;
        Ok(DataReferenceBox { version, flags, entries })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        write_prefixed_array(w, &self.entries, |w, e| e.encode(w));
    }
}
