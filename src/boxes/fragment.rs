//! Fragmented-movie boxes: `mfhd`/`tfhd`/`trun`/`tfdt` under `moof`/`traf`,
//! the segment index (`sidx`), and the two sample-auxiliary-information
//! tables (`saiz`/`saio`) CENC layers on top of them.

use crate::combinator::prefixed_array;
use crate::error::Result;
use crate::fourcc::FourCc;
use crate::primitive::{BitReader, BitWriter, Reader, Writer};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MovieFragmentHeaderBox {
    pub version: u8,
    pub flags: u32,
    pub sequence_number: u32,
}

impl MovieFragmentHeaderBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        Ok(MovieFragmentHeaderBox {
            version,
            flags,
            sequence_number: r.u32("sequence_number")?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.u32(self.sequence_number);
    }
}

/// The packed 32-bit sample-flags field shared by `tfhd.default_sample_flags`
/// and `trun`'s per-sample / first-sample flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SampleFlags {
    pub is_leading: u8,
    pub sample_depends_on: u8,
    pub sample_is_depended_on: u8,
    pub sample_has_redundancy: u8,
    pub sample_padding_value: u8,
    pub sample_is_non_sync_sample: bool,
    pub sample_degradation_priority: u16,
}

impl SampleFlags {
    pub fn from_u32(v: u32) -> Self {
        let bytes = v.to_be_bytes();
        let mut br = BitReader::new(&bytes);
        br.skip(4, "reserved").ok();
        let is_leading = br.bits(2, "is_leading").unwrap_or(0) as u8;
        let sample_depends_on = br.bits(2, "sample_depends_on").unwrap_or(0) as u8;
        let sample_is_depended_on = br.bits(2, "sample_is_depended_on").unwrap_or(0) as u8;
        let sample_has_redundancy = br.bits(2, "sample_has_redundancy").unwrap_or(0) as u8;
        let sample_padding_value = br.bits(3, "sample_padding_value").unwrap_or(0) as u8;
        let sample_is_non_sync_sample = br.bit("sample_is_non_sync_sample").unwrap_or(false);
        let sample_degradation_priority = br.bits(16, "sample_degradation_priority").unwrap_or(0) as u16;
        SampleFlags {
            is_leading,
            sample_depends_on,
            sample_is_depended_on,
            sample_has_redundancy,
            sample_padding_value,
            sample_is_non_sync_sample,
            sample_degradation_priority,
        }
    }

    pub fn to_u32(self) -> u32 {
        let mut bw = BitWriter::new();
        bw.write_zeros(4);
        bw.write_bits(self.is_leading as u64, 2);
        bw.write_bits(self.sample_depends_on as u64, 2);
        bw.write_bits(self.sample_is_depended_on as u64, 2);
        bw.write_bits(self.sample_has_redundancy as u64, 2);
        bw.write_bits(self.sample_padding_value as u64, 3);
        bw.write_bool(self.sample_is_non_sync_sample);
        bw.write_bits(self.sample_degradation_priority as u64, 16);
        let bytes = bw.finish();
        u32::from_be_bytes(bytes.try_into().unwrap())
    }
}

const TFHD_BASE_DATA_OFFSET_PRESENT: u32 = 0x0000_01;
const TFHD_SAMPLE_DESCRIPTION_INDEX_PRESENT: u32 = 0x0000_02;
const TFHD_DEFAULT_SAMPLE_DURATION_PRESENT: u32 = 0x0000_08;
const TFHD_DEFAULT_SAMPLE_SIZE_PRESENT: u32 = 0x0000_10;
const TFHD_DEFAULT_SAMPLE_FLAGS_PRESENT: u32 = 0x0000_20;
const TFHD_DURATION_IS_EMPTY: u32 = 0x01_0000;
const TFHD_DEFAULT_BASE_IS_MOOF: u32 = 0x02_0000;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TrackFragmentHeaderBox {
    pub version: u8,
    pub flags: u32,
    pub track_id: u32,
    pub base_data_offset: Option<u64>,
    pub sample_description_index: Option<u32>,
    pub default_sample_duration: Option<u32>,
    pub default_sample_size: Option<u32>,
    pub default_sample_flags: Option<SampleFlags>,
}

impl TrackFragmentHeaderBox {
    pub fn duration_is_empty(&self) -> bool {
        self.flags & TFHD_DURATION_IS_EMPTY != 0
    }

    pub fn default_base_is_moof(&self) -> bool {
        self.flags & TFHD_DEFAULT_BASE_IS_MOOF != 0
    }

    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let track_id = r.u32("track_ID")?;
        let base_data_offset = (flags & TFHD_BASE_DATA_OFFSET_PRESENT != 0)
            .then(|| r.u64("base_data_offset"))
            .transpose()?;
        let sample_description_index = (flags & TFHD_SAMPLE_DESCRIPTION_INDEX_PRESENT != 0)
            .then(|| r.u32("sample_description_index"))
            .transpose()?;
        let default_sample_duration = (flags & TFHD_DEFAULT_SAMPLE_DURATION_PRESENT != 0)
            .then(|| r.u32("default_sample_duration"))
            .transpose()?;
        let default_sample_size = (flags & TFHD_DEFAULT_SAMPLE_SIZE_PRESENT != 0)
            .then(|| r.u32("default_sample_size"))
            .transpose()?;
        let default_sample_flags = (flags & TFHD_DEFAULT_SAMPLE_FLAGS_PRESENT != 0)
            .then(|| r.u32("default_sample_flags"))
            .transpose()?
            .map(SampleFlags::from_u32);
        Ok(TrackFragmentHeaderBox {
            version,
            flags,
            track_id,
            base_data_offset,
            sample_description_index,
            default_sample_duration,
            default_sample_size,
            default_sample_flags,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.u32(self.track_id);
        if let Some(v) = self.base_data_offset {
            w.u64(v);
        }
        if let Some(v) = self.sample_description_index {
            w.u32(v);
        }
        if let Some(v) = self.default_sample_duration {
            w.u32(v);
        }
        if let Some(v) = self.default_sample_size {
            w.u32(v);
        }
        if let Some(v) = self.default_sample_flags {
            w.u32(v.to_u32());
        }
    }
}

const TRUN_DATA_OFFSET_PRESENT: u32 = 0x0000_01;
const TRUN_FIRST_SAMPLE_FLAGS_PRESENT: u32 = 0x0000_04;
const TRUN_SAMPLE_DURATION_PRESENT: u32 = 0x00_0100;
const TRUN_SAMPLE_SIZE_PRESENT: u32 = 0x00_0200;
const TRUN_SAMPLE_FLAGS_PRESENT: u32 = 0x00_0400;
const TRUN_SAMPLE_COMPOSITION_TIME_OFFSETS_PRESENT: u32 = 0x00_0800;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TrunSampleEntry {
    pub sample_duration: Option<u32>,
    pub sample_size: Option<u32>,
    pub sample_flags: Option<SampleFlags>,
    pub sample_composition_time_offset: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TrackRunBox {
    pub version: u8,
    pub flags: u32,
    pub data_offset: Option<i32>,
    pub first_sample_flags: Option<SampleFlags>,
    pub samples: Vec<TrunSampleEntry>,
}

impl TrackRunBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let sample_count = r.u32("sample_count")?;
        let data_offset = (flags & TRUN_DATA_OFFSET_PRESENT != 0)
            .then(|| r.i32("data_offset"))
            .transpose()?;
        let first_sample_flags = (flags & TRUN_FIRST_SAMPLE_FLAGS_PRESENT != 0)
            .then(|| r.u32("first_sample_flags"))
            .transpose()?
            .map(SampleFlags::from_u32);
        let mut samples = Vec::with_capacity(sample_count as usize);
        for _ in 0..sample_count {
            let sample_duration = (flags & TRUN_SAMPLE_DURATION_PRESENT != 0)
                .then(|| r.u32("sample_duration"))
                .transpose()?;
            let sample_size = (flags & TRUN_SAMPLE_SIZE_PRESENT != 0)
                .then(|| r.u32("sample_size"))
                .transpose()?;
            let sample_flags = (flags & TRUN_SAMPLE_FLAGS_PRESENT != 0)
                .then(|| r.u32("sample_flags"))
                .transpose()?
                .map(SampleFlags::from_u32);
            let sample_composition_time_offset = if flags & TRUN_SAMPLE_COMPOSITION_TIME_OFFSETS_PRESENT != 0 {
                Some(if version == 1 {
                    r.i32("sample_composition_time_offset")?
                } else {
                    r.u32("sample_composition_time_offset")? as i32
                })
            } else {
                None
            };
            samples.push(TrunSampleEntry {
                sample_duration,
                sample_size,
                sample_flags,
                sample_composition_time_offset,
            });
        }
        Ok(TrackRunBox {
            version,
            flags,
            data_offset,
            first_sample_flags,
            samples,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.u32(self.samples.len() as u32);
        if let Some(v) = self.data_offset {
            w.i32(v);
        }
        if let Some(v) = self.first_sample_flags {
            w.u32(v.to_u32());
        }
        for s in &self.samples {
            if let Some(v) = s.sample_duration {
                w.u32(v);
            }
            if let Some(v) = s.sample_size {
                w.u32(v);
            }
            if let Some(v) = s.sample_flags {
                w.u32(v.to_u32());
            }
            if let Some(v) = s.sample_composition_time_offset {
                if self.version == 1 {
                    w.i32(v);
                } else {
                    w.u32(v as u32);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TrackFragmentBaseMediaDecodeTimeBox {
    pub version: u8,
    pub flags: u32,
    pub base_media_decode_time: u64,
}

impl TrackFragmentBaseMediaDecodeTimeBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let base_media_decode_time = r.version_sized(version, "baseMediaDecodeTime")?;
        Ok(TrackFragmentBaseMediaDecodeTimeBox {
            version,
            flags,
            base_media_decode_time,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.version_sized(self.version, self.base_media_decode_time);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SegmentIndexReference {
    pub reference_type: u8,
    pub referenced_size: u32,
    pub subsegment_duration: u32,
    pub starts_with_sap: bool,
    pub sap_type: u8,
    pub sap_delta_time: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SegmentIndexBox {
    pub version: u8,
    pub flags: u32,
    pub reference_id: u32,
    pub timescale: u32,
    pub earliest_presentation_time: u64,
    pub first_offset: u64,
    pub references: Vec<SegmentIndexReference>,
}

impl SegmentIndexBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let reference_id = r.u32("reference_ID")?;
        let timescale = r.u32("timescale")?;
        let earliest_presentation_time = r.version_sized(version, "earliest_presentation_time")?;
        let first_offset = r.version_sized(version, "first_offset")?;
        r.bytes(2, "reserved")?;
        let reference_count = r.u16("reference_count")?;
        let references = (0..reference_count)
            .map(|_| {
                let first = r.u32("reference_type_and_size")?;
                let reference_type = (first >> 31) as u8;
                let referenced_size = first & 0x7FFF_FFFF;
                let subsegment_duration = r.u32("subsegment_duration")?;
                let third = r.u32("sap_fields")?;
                let starts_with_sap = (third >> 31) != 0;
                let sap_type = ((third >> 28) & 0x7) as u8;
                let sap_delta_time = third & 0x0FFF_FFFF;
                Ok(SegmentIndexReference {
                    reference_type,
                    referenced_size,
                    subsegment_duration,
                    starts_with_sap,
                    sap_type,
                    sap_delta_time,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SegmentIndexBox {
            version,
            flags,
            reference_id,
            timescale,
            earliest_presentation_time,
            first_offset,
            references,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.u32(self.reference_id);
        w.u32(self.timescale);
        w.version_sized(self.version, self.earliest_presentation_time);
        w.version_sized(self.version, self.first_offset);
        w.zeros(2);
        w.u16(self.references.len() as u16);
        for r_ in &self.references {
            w.u32(((r_.reference_type as u32) << 31) | r_.referenced_size);
            w.u32(r_.subsegment_duration);
            w.u32(((r_.starts_with_sap as u32) << 31) | ((r_.sap_type as u32) << 28) | r_.sap_delta_time);
        }
    }
}

const AUX_INFO_HAS_TYPE: u32 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SampleAuxiliaryInfoSizesBox {
    pub version: u8,
    pub flags: u32,
    pub aux_info_type: Option<(FourCc, u32)>,
    pub default_sample_info_size: u8,
    pub sample_count: u32,
    pub sample_info_sizes: Option<Vec<u8>>,
}

impl SampleAuxiliaryInfoSizesBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let aux_info_type = (flags & AUX_INFO_HAS_TYPE != 0)
            .then(|| -> Result<(FourCc, u32)> {
                Ok((FourCc(r.bytes_exact::<4>("aux_info_type")?), r.u32("aux_info_type_parameter")?))
            })
            .transpose()?;
        let default_sample_info_size = r.u8("default_sample_info_size")?;
        let sample_count = r.u32("sample_count")?;
        let sample_info_sizes = if default_sample_info_size == 0 {
            Some((0..sample_count).map(|_| r.u8("sample_info_size")).collect::<Result<_>>()?)
        } else {
            None
        };
        Ok(SampleAuxiliaryInfoSizesBox {
            version,
            flags,
            aux_info_type,
            default_sample_info_size,
            sample_count,
            sample_info_sizes,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        if let Some((ty, param)) = &self.aux_info_type {
            w.bytes(ty.as_bytes());
            w.u32(*param);
        }
        w.u8(self.default_sample_info_size);
        w.u32(self.sample_count);
        if let Some(sizes) = &self.sample_info_sizes {
            for s in sizes {
                w.u8(*s);
            }
        }
    }
}

/// `saio`. Offsets are sized from this box's own `version`, not an
/// outer box's — a bug in the reference implementation this schema is
/// distilled from reads a sibling field instead, which this
/// implementation deliberately does not reproduce.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SampleAuxiliaryInfoOffsetsBox {
    pub version: u8,
    pub flags: u32,
    pub aux_info_type: Option<(FourCc, u32)>,
    pub offsets: Vec<u64>,
}

impl SampleAuxiliaryInfoOffsetsBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let aux_info_type = (flags & AUX_INFO_HAS_TYPE != 0)
            .then(|| -> Result<(FourCc, u32)> {
                Ok((FourCc(r.bytes_exact::<4>("aux_info_type")?), r.u32("aux_info_type_parameter")?))
            })
            .transpose()?;
        let entry_count = r.u32("entry_count")?;
        let offsets = (0..entry_count)
            .map(|_| r.version_sized(version, "offset"))
            .collect::<Result<Vec<_>>>()?;
        Ok(SampleAuxiliaryInfoOffsetsBox {
            version,
            flags,
            aux_info_type,
            offsets,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        if let Some((ty, param)) = &self.aux_info_type {
            w.bytes(ty.as_bytes());
            w.u32(*param);
        }
        w.u32(self.offsets.len() as u32);
        for o in &self.offsets {
            w.version_sized(self.version, *o);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SampleToGroupEntry {
    pub sample_count: u32,
    pub group_description_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SampleToGroupBox {
    pub version: u8,
    pub flags: u32,
    pub grouping_type: FourCc,
    pub grouping_type_parameter: Option<u32>,
    pub entries: Vec<SampleToGroupEntry>,
}

impl SampleToGroupBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let grouping_type = FourCc(r.bytes_exact::<4>("grouping_type")?);
        let grouping_type_parameter = (version == 1).then(|| r.u32("grouping_type_parameter")).transpose()?;
        let entries = prefixed_array(r, "entry_count", |r| {
            Ok(SampleToGroupEntry {
                sample_count: r.u32("sample_count")?,
                group_description_index: r.u32("group_description_index")?,
            })
        })?;
        Ok(SampleToGroupBox {
            version,
            flags,
            grouping_type,
            grouping_type_parameter,
            entries,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.bytes(self.grouping_type.as_bytes());
        if let Some(p) = self.grouping_type_parameter {
            w.u32(p);
        }
        w.u32(self.entries.len() as u32);
        for e in &self.entries {
            w.u32(e.sample_count);
            w.u32(e.group_description_index);
        }
    }
}

/// `sgpd`. Per-entry descriptions are opaque: their internal layout is
/// keyed by `grouping_type`, a universe this crate does not interpret.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SampleGroupDescriptionBox {
    pub version: u8,
    pub flags: u32,
    pub grouping_type: FourCc,
    pub default_length: Option<u32>,
    pub default_sample_description_index: Option<u32>,
    pub entries: Vec<Vec<u8>>,
}

impl SampleGroupDescriptionBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let grouping_type = FourCc(r.bytes_exact::<4>("grouping_type")?);
        let default_length = (version >= 1).then(|| r.u32("default_length")).transpose()?;
        let default_sample_description_index = (version >= 2)
            .then(|| r.u32("default_sample_description_index"))
            .transpose()?;
        let entry_count = r.u32("entry_count")?;
        let entries = (0..entry_count)
            .map(|_| {
                let len = match default_length {
                    Some(0) | None => r.u32("description_length")? as usize,
                    Some(n) => n as usize,
                };
                r.bytes(len, "sample_group_entry")
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SampleGroupDescriptionBox {
            version,
            flags,
            grouping_type,
            default_length,
            default_sample_description_index,
            entries,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.bytes(self.grouping_type.as_bytes());
        if let Some(l) = self.default_length {
            w.u32(l);
        }
        if let Some(i) = self.default_sample_description_index {
            w.u32(i);
        }
        w.u32(self.entries.len() as u32);
        for e in &self.entries {
            if matches!(self.default_length, Some(0) | None) {
                w.u32(e.len() as u32);
            }
            w.bytes(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_flags_round_trip_through_u32() {
        let f = SampleFlags {
            is_leading: 2,
            sample_depends_on: 1,
            sample_is_depended_on: 0,
            sample_has_redundancy: 3,
            sample_padding_value: 5,
            sample_is_non_sync_sample: true,
            sample_degradation_priority: 0x1234,
        };
        assert_eq!(SampleFlags::from_u32(f.to_u32()), f);
    }

    #[test]
    fn tfhd_only_carries_flagged_fields() {
        let b = TrackFragmentHeaderBox {
            version: 0,
            flags: TFHD_DEFAULT_BASE_IS_MOOF | TFHD_DEFAULT_SAMPLE_DURATION_PRESENT,
            track_id: 1,
            base_data_offset: None,
            sample_description_index: None,
            default_sample_duration: Some(1024),
            default_sample_size: None,
            default_sample_flags: None,
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        assert_eq!(bytes.len(), 4 + 4 + 4);
        let mut r = Reader::new(&bytes);
        assert_eq!(TrackFragmentHeaderBox::parse(&mut r).unwrap(), b);
    }

    #[test]
    fn trun_v1_signed_composition_offsets_round_trip() {
        let b = TrackRunBox {
            version: 1,
            flags: TRUN_SAMPLE_DURATION_PRESENT | TRUN_SAMPLE_COMPOSITION_TIME_OFFSETS_PRESENT,
            data_offset: None,
            first_sample_flags: None,
            samples: vec![
                TrunSampleEntry {
                    sample_duration: Some(512),
                    sample_size: None,
                    sample_flags: None,
                    sample_composition_time_offset: Some(-200),
                },
                TrunSampleEntry {
                    sample_duration: Some(512),
                    sample_size: None,
                    sample_flags: None,
                    sample_composition_time_offset: Some(300),
                },
            ],
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(TrackRunBox::parse(&mut r).unwrap(), b);
    }

    #[test]
    fn sidx_reference_bit_layout_round_trips() {
        let b = SegmentIndexBox {
            version: 0,
            flags: 0,
            reference_id: 1,
            timescale: 90000,
            earliest_presentation_time: 0,
            first_offset: 0,
            references: vec![SegmentIndexReference {
                reference_type: 0,
                referenced_size: 5000,
                subsegment_duration: 90000,
                starts_with_sap: true,
                sap_type: 1,
                sap_delta_time: 0,
            }],
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(SegmentIndexBox::parse(&mut r).unwrap(), b);
    }

    #[test]
    fn saio_uses_own_version_for_offset_width() {
        let b = SampleAuxiliaryInfoOffsetsBox {
            version: 1,
            flags: 0,
            aux_info_type: None,
            offsets: vec![0x1_0000_0000],
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(SampleAuxiliaryInfoOffsetsBox::parse(&mut r).unwrap(), b);
    }
}
