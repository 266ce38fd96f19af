//! `tkhd`, the per-track header nested directly under `trak`.

use crate::boxes::movie::UNITY_MATRIX;
use crate::error::Result;
use crate::primitive::{Reader, Writer};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TrackHeaderBox {
    pub version: u8,
    pub flags: u32,
    pub creation_time: u64,
    pub modification_time: u64,
    pub track_id: u32,
    pub duration: u64,
    pub layer: i16,
    pub alternate_group: i16,
    pub volume: i16,
    pub matrix: [i32; 9],
    pub width: u32,
    pub height: u32,
}

impl Default for TrackHeaderBox {
    fn default() -> Self {
        TrackHeaderBox {
            version: 0,
            flags: 1,
            creation_time: 0,
            modification_time: 0,
            track_id: 1,
            duration: 0,
            layer: 0,
            alternate_group: 0,
            volume: 0,
            matrix: UNITY_MATRIX,
            width: 0,
            height: 0,
        }
    }
}

impl TrackHeaderBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let creation_time = r.version_sized(version, "creation_time")?;
        let modification_time = r.version_sized(version, "modification_time")?;
        let track_id = r.u32("track_ID")?;
        r.bytes(4, "reserved")?;
        let duration = r.version_sized(version, "duration")?;
        r.bytes(8, "reserved")?;
        let layer = r.i16("layer")?;
        let alternate_group = r.i16("alternate_group")?;
        let volume = r.i16("volume")?;
        r.bytes(2, "reserved")?;
        let mut matrix = [0i32; 9];
        for m in matrix.iter_mut() {
            *m = r.i32("matrix")?;
        }
        let width = r.u32("width")?;
        let height = r.u32("height")?;
        Ok(TrackHeaderBox {
            version,
            flags,
            creation_time,
            modification_time,
            track_id,
            duration,
            layer,
            alternate_group,
            volume,
            matrix,
            width,
            height,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.version_sized(self.version, self.creation_time);
        w.version_sized(self.version, self.modification_time);
        w.u32(self.track_id);
        w.zeros(4);
        w.version_sized(self.version, self.duration);
        w.zeros(8);
        w.i16(self.layer);
        w.i16(self.alternate_group);
        w.i16(self.volume);
        w.zeros(2);
        for m in self.matrix {
            w.i32(m);
        }
        w.u32(self.width);
        w.u32(self.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips() {
        let b = TrackHeaderBox::default();
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(TrackHeaderBox::parse(&mut r).unwrap(), b);
        assert!(r.is_empty());
    }

    #[test]
    fn version_1_widens_times() {
        let mut b = TrackHeaderBox::default();
        b.version = 1;
        b.duration = 0xFFFF_FFFF_0000;
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(TrackHeaderBox::parse(&mut r).unwrap(), b);
    }
}
