//! Movie-level boxes that live directly under `moov`: the movie header,
//! and the fragmentation-related `mehd`/`trex` pair.

use crate::error::Result;
use crate::primitive::{Reader, Writer};

/// The identity transformation matrix `construct`'s original spells out
/// as `UNITY_MATRIX`; `mvhd` and `tkhd` both default to it.
pub const UNITY_MATRIX: [i32; 9] = [0x10000, 0, 0, 0, 0x10000, 0, 0, 0, 0x40000000];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MovieHeaderBox {
    pub version: u8,
    pub flags: u32,
    pub creation_time: u64,
    pub modification_time: u64,
    pub timescale: u32,
    pub duration: u64,
    pub rate: i32,
    pub volume: i16,
    pub matrix: [i32; 9],
    pub next_track_id: u32,
}

impl Default for MovieHeaderBox {
    fn default() -> Self {
        MovieHeaderBox {
            version: 0,
            flags: 0,
            creation_time: 0,
            modification_time: 0,
            timescale: 10_000_000,
            duration: 0,
            rate: 0x0001_0000,
            volume: 0x0100,
            matrix: UNITY_MATRIX,
            next_track_id: 0xFFFF_FFFF,
        }
    }
}

impl MovieHeaderBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let creation_time = r.version_sized(version, "creation_time")?;
        let modification_time = r.version_sized(version, "modification_time")?;
        let timescale = r.u32("timescale")?;
        let duration = r.version_sized(version, "duration")?;
        let rate = r.i32("rate")?;
        let volume = r.i16("volume")?;
        r.bytes(2, "reserved")?;
        r.bytes(8, "reserved")?;
        let mut matrix = [0i32; 9];
        for m in matrix.iter_mut() {
            *m = r.i32("matrix")?;
        }
        r.bytes(24, "pre_defined")?;
        let next_track_id = r.u32("next_track_ID")?;
        Ok(MovieHeaderBox {
            version,
            flags,
            creation_time,
            modification_time,
            timescale,
            duration,
            rate,
            volume,
            matrix,
            next_track_id,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.version_sized(self.version, self.creation_time);
        w.version_sized(self.version, self.modification_time);
        w.u32(self.timescale);
        w.version_sized(self.version, self.duration);
        w.i32(self.rate);
        w.i16(self.volume);
        w.zeros(2);
        w.zeros(8);
        for m in self.matrix {
            w.i32(m);
        }
        w.zeros(24);
        w.u32(self.next_track_id);
    }
}

/// `mehd`: the fragmented-movie counterpart to `mvhd.duration`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MovieExtendsHeaderBox {
    pub version: u8,
    pub flags: u32,
    pub fragment_duration: u64,
}

impl MovieExtendsHeaderBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let fragment_duration = r.version_sized(version, "fragment_duration")?;
        Ok(MovieExtendsHeaderBox {
            version,
            flags,
            fragment_duration,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.version_sized(self.version, self.fragment_duration);
    }
}

/// `trex`: per-track defaults a fragment's `tfhd`/`trun` can omit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TrackExtendsBox {
    pub version: u8,
    pub flags: u32,
    pub track_id: u32,
    pub default_sample_description_index: u32,
    pub default_sample_duration: u32,
    pub default_sample_size: u32,
    pub default_sample_flags: u32,
}

impl TrackExtendsBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        Ok(TrackExtendsBox {
            version,
            flags,
            track_id: r.u32("track_ID")?,
            default_sample_description_index: r.u32("default_sample_description_index")?,
            default_sample_duration: r.u32("default_sample_duration")?,
            default_sample_size: r.u32("default_sample_size")?,
            default_sample_flags: r.u32("default_sample_flags")?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.u32(self.track_id);
        w.u32(self.default_sample_description_index);
        w.u32(self.default_sample_duration);
        w.u32(self.default_sample_size);
        w.u32(self.default_sample_flags);
    }
}
