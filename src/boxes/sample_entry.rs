//! `stsd` and the sample-entry family: the fixed-size visual/audio
//! header every codec sample entry starts with, followed by ordinary
//! child boxes (`avcC`, `hvcC`, `pasp`, `dac3`, `btrt`, ...) parsed
//! through the same top-level box codec as everything else.

use crate::error::{Error, Result};
use crate::fourcc::FourCc;
use crate::primitive::{Reader, Writer};
use crate::tree::{encode_box_list, parse_box_list, ParseCtx, ParsedBox};

const VISUAL_FORMATS: &[&[u8; 4]] = &[b"avc1", b"avc3", b"hvc1", b"hev1", b"mp4v", b"encv", b"vp09", b"av01"];
const AUDIO_FORMATS: &[&[u8; 4]] = &[b"mp4a", b"ac-3", b"ec-3", b"enca", b"samr", b"sawb", b"alac", b"opus"];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VisualSampleEntryFields {
    pub width: u16,
    pub height: u16,
    pub horizresolution: u32,
    pub vertresolution: u32,
    pub frame_count: u16,
    pub compressorname: [u8; 32],
    pub depth: u16,
}

impl Default for VisualSampleEntryFields {
    fn default() -> Self {
        VisualSampleEntryFields {
            width: 0,
            height: 0,
            horizresolution: 0x0048_0000,
            vertresolution: 0x0048_0000,
            frame_count: 1,
            compressorname: [0; 32],
            depth: 0x0018,
        }
    }
}

impl VisualSampleEntryFields {
    fn parse(r: &mut Reader) -> Result<Self> {
        r.bytes(2, "pre_defined")?;
        r.bytes(2, "reserved")?;
        r.bytes(12, "pre_defined")?;
        let width = r.u16("width")?;
        let height = r.u16("height")?;
        let horizresolution = r.u32("horizresolution")?;
        let vertresolution = r.u32("vertresolution")?;
        r.bytes(4, "reserved")?;
        let frame_count = r.u16("frame_count")?;
        let compressorname = r.bytes_exact::<32>("compressorname")?;
        let depth = r.u16("depth")?;
        r.bytes(2, "pre_defined")?;
        Ok(VisualSampleEntryFields {
            width,
            height,
            horizresolution,
            vertresolution,
            frame_count,
            compressorname,
            depth,
        })
    }

    fn encode(&self, w: &mut Writer) {
        w.zeros(2);
        w.zeros(2);
        w.zeros(12);
        w.u16(self.width);
        w.u16(self.height);
        w.u32(self.horizresolution);
        w.u32(self.vertresolution);
        w.zeros(4);
        w.u16(self.frame_count);
        w.bytes(&self.compressorname);
        w.u16(self.depth);
        w.zeros(2);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AudioSampleEntryFields {
    pub channelcount: u16,
    pub samplesize: u16,
    pub samplerate: u32,
}

impl Default for AudioSampleEntryFields {
    fn default() -> Self {
        AudioSampleEntryFields {
            channelcount: 2,
            samplesize: 16,
            samplerate: 0,
        }
    }
}

impl AudioSampleEntryFields {
    fn parse(r: &mut Reader) -> Result<Self> {
        r.bytes(8, "reserved")?;
        let channelcount = r.u16("channelcount")?;
        let samplesize = r.u16("samplesize")?;
        r.bytes(2, "pre_defined")?;
        r.bytes(2, "reserved")?;
        let samplerate = r.u32("samplerate")?;
        Ok(AudioSampleEntryFields {
            channelcount,
            samplesize,
            samplerate,
        })
    }

    fn encode(&self, w: &mut Writer) {
        w.zeros(8);
        w.u16(self.channelcount);
        w.u16(self.samplesize);
        w.zeros(2);
        w.zeros(2);
        w.u32(self.samplerate);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum SampleEntryKind {
    Visual(VisualSampleEntryFields),
    Audio(AudioSampleEntryFields),
    Generic,
}

/// One row of `stsd`. `format` is the box type carried by the entry
/// itself (`avc1`, `mp4a`, `hvc1`, ...), not a field inside its body.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SampleEntry {
    pub format: FourCc,
    pub data_reference_index: u16,
    pub kind: SampleEntryKind,
    pub children: Vec<ParsedBox>,
}

impl SampleEntry {
    pub fn parse(r: &mut Reader, ctx: &mut ParseCtx) -> Result<Self> {
        let total_len = r.u32("length")? as usize;
        let format = FourCc(r.bytes_exact::<4>("format")?);
        let body_len = total_len
            .checked_sub(8)
            .ok_or(Error::LengthOverrun { excess: 0 })?;
        let mut br = r.sub_reader(body_len, "sample_entry_body")?;
        br.bytes(6, "reserved")?;
        let data_reference_index = br.u16("data_reference_index")?;
        let kind = if VISUAL_FORMATS.contains(&format.as_bytes()) {
            SampleEntryKind::Visual(VisualSampleEntryFields::parse(&mut br)?)
        } else if AUDIO_FORMATS.contains(&format.as_bytes()) {
            SampleEntryKind::Audio(AudioSampleEntryFields::parse(&mut br)?)
        } else {
            SampleEntryKind::Generic
        };
        let children = parse_box_list(&mut br, ctx)?;
        Ok(SampleEntry {
            format,
            data_reference_index,
            kind,
            children,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        let mut body = Writer::new();
        body.zeros(6);
        body.u16(self.data_reference_index);
        match &self.kind {
            SampleEntryKind::Visual(v) => v.encode(&mut body),
            SampleEntryKind::Audio(a) => a.encode(&mut body),
            SampleEntryKind::Generic => {}
        }
        encode_box_list(&mut body, &self.children);
        let body = body.into_vec();
        w.u32(8 + body.len() as u32);
        w.bytes(self.format.as_bytes());
        w.bytes(&body);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SampleDescriptionBox {
    pub version: u8,
    pub flags: u32,
    pub entries: Vec<SampleEntry>,
}

impl SampleDescriptionBox {
    pub fn parse(r: &mut Reader, ctx: &mut ParseCtx) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let count = r.u32("entry_count")?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(SampleEntry::parse(r, ctx)?);
        }
        Ok(SampleDescriptionBox { version, flags, entries })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.u32(self.entries.len() as u32);
        for e in &self.entries {
            e.encode(w);
        }
    }
}

/// `pasp`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PixelAspectRatioBox {
    pub h_spacing: u32,
    pub v_spacing: u32,
}

impl PixelAspectRatioBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        Ok(PixelAspectRatioBox {
            h_spacing: r.u32("hSpacing")?,
            v_spacing: r.u32("vSpacing")?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u32(self.h_spacing);
        w.u32(self.v_spacing);
    }
}

/// `btrt`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BitRateBox {
    pub buffer_size_db: u32,
    pub max_bitrate: u32,
    pub avg_bitrate: u32,
}

impl BitRateBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        Ok(BitRateBox {
            buffer_size_db: r.u32("bufferSizeDB")?,
            max_bitrate: r.u32("maxBitrate")?,
            avg_bitrate: r.u32("avgBitrate")?,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u32(self.buffer_size_db);
        w.u32(self.max_bitrate);
        w.u32(self.avg_bitrate);
    }
}

/// `dac3`: a 3-byte bit-packed AC-3 descriptor.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Ac3SpecificBox {
    pub fscod: u8,
    pub bsid: u8,
    pub bsmod: u8,
    pub acmod: u8,
    pub lfeon: bool,
    pub bit_rate_code: u8,
}

impl Ac3SpecificBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let bytes = r.bytes_exact::<3>("ac3_descriptor")?;
        let mut br = crate::primitive::BitReader::new(&bytes);
        let fscod = br.bits(2, "fscod")? as u8;
        let bsid = br.bits(5, "bsid")? as u8;
        let bsmod = br.bits(3, "bsmod")? as u8;
        let acmod = br.bits(3, "acmod")? as u8;
        let lfeon = br.bit("lfeon")?;
        let bit_rate_code = br.bits(5, "bit_rate_code")? as u8;
        br.skip(5, "reserved")?;
        Ok(Ac3SpecificBox {
            fscod,
            bsid,
            bsmod,
            acmod,
            lfeon,
            bit_rate_code,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        let mut bw = crate::primitive::BitWriter::new();
        bw.write_bits(self.fscod as u64, 2);
        bw.write_bits(self.bsid as u64, 5);
        bw.write_bits(self.bsmod as u64, 3);
        bw.write_bits(self.acmod as u64, 3);
        bw.write_bool(self.lfeon);
        bw.write_bits(self.bit_rate_code as u64, 5);
        bw.write_zeros(5);
        w.bytes(&bw.finish());
    }
}

fn read_length_prefixed(r: &mut Reader, field: &'static str) -> Result<Vec<u8>> {
    let len = r.u16(field)? as usize;
    r.bytes(len, field)
}

fn write_length_prefixed(w: &mut Writer, data: &[u8]) {
    w.u16(data.len() as u16);
    w.bytes(data);
}

/// `avcC`: AVC decoder configuration, parameter sets stored as opaque
/// NAL-unit blobs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AvcConfigurationBox {
    pub configuration_version: u8,
    pub avc_profile_indication: u8,
    pub profile_compatibility: u8,
    pub avc_level_indication: u8,
    pub length_size_minus_one: u8,
    pub sps: Vec<Vec<u8>>,
    pub pps: Vec<Vec<u8>>,
    pub high_profile_ext: Option<AvcHighProfileExt>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AvcHighProfileExt {
    pub chroma_format: u8,
    pub bit_depth_luma_minus8: u8,
    pub bit_depth_chroma_minus8: u8,
    pub sps_ext: Vec<Vec<u8>>,
}

impl AvcConfigurationBox {
    const HIGH_PROFILES: [u8; 4] = [100, 110, 122, 144];

    pub fn parse(r: &mut Reader) -> Result<Self> {
        let configuration_version = r.const_u8("configurationVersion", 1)?;
        let avc_profile_indication = r.u8("AVCProfileIndication")?;
        let profile_compatibility = r.u8("profile_compatibility")?;
        let avc_level_indication = r.u8("AVCLevelIndication")?;
        let length_size_minus_one = r.u8("length_size_minus_one_byte")? & 0x03;
        let num_sps = r.u8("num_sps_byte")? & 0x1F;
        let sps = (0..num_sps).map(|_| read_length_prefixed(r, "sps")).collect::<Result<_>>()?;
        let num_pps = r.u8("num_pps")?;
        let pps = (0..num_pps).map(|_| read_length_prefixed(r, "pps")).collect::<Result<_>>()?;
        let high_profile_ext = if Self::HIGH_PROFILES.contains(&avc_profile_indication) && !r.is_empty() {
            let chroma_format = r.u8("chroma_format_byte")? & 0x03;
            let bit_depth_luma_minus8 = r.u8("bit_depth_luma_byte")? & 0x07;
            let bit_depth_chroma_minus8 = r.u8("bit_depth_chroma_byte")? & 0x07;
            let num_sps_ext = r.u8("num_sps_ext")?;
            let sps_ext = (0..num_sps_ext)
                .map(|_| read_length_prefixed(r, "sps_ext"))
                .collect::<Result<_>>()?;
            Some(AvcHighProfileExt {
                chroma_format,
                bit_depth_luma_minus8,
                bit_depth_chroma_minus8,
                sps_ext,
            })
        } else {
            None
        };
        Ok(AvcConfigurationBox {
            configuration_version,
            avc_profile_indication,
            profile_compatibility,
            avc_level_indication,
            length_size_minus_one,
            sps,
            pps,
            high_profile_ext,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u8(self.configuration_version);
        w.u8(self.avc_profile_indication);
        w.u8(self.profile_compatibility);
        w.u8(self.avc_level_indication);
        w.u8(0xFC | self.length_size_minus_one);
        w.u8(0xE0 | self.sps.len() as u8);
        for s in &self.sps {
            write_length_prefixed(w, s);
        }
        w.u8(self.pps.len() as u8);
        for p in &self.pps {
            write_length_prefixed(w, p);
        }
        if let Some(ext) = &self.high_profile_ext {
            w.u8(0xFC | ext.chroma_format);
            w.u8(0xF8 | ext.bit_depth_luma_minus8);
            w.u8(0xF8 | ext.bit_depth_chroma_minus8);
            w.u8(ext.sps_ext.len() as u8);
            for s in &ext.sps_ext {
                write_length_prefixed(w, s);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HvcNalArray {
    pub array_completeness: bool,
    pub nal_unit_type: u8,
    pub nalus: Vec<Vec<u8>>,
}

/// `hvcC`: HEVC decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HevcConfigurationBox {
    pub configuration_version: u8,
    pub general_profile_space: u8,
    pub general_tier_flag: bool,
    pub general_profile_idc: u8,
    pub general_profile_compatibility_flags: u32,
    pub general_constraint_indicator_flags: u64,
    pub general_level_idc: u8,
    pub min_spatial_segmentation_idc: u16,
    pub parallelism_type: u8,
    pub chroma_format_idc: u8,
    pub bit_depth_luma_minus8: u8,
    pub bit_depth_chroma_minus8: u8,
    pub avg_frame_rate: u16,
    pub constant_frame_rate: u8,
    pub num_temporal_layers: u8,
    pub temporal_id_nested: bool,
    pub length_size_minus_one: u8,
    pub arrays: Vec<HvcNalArray>,
}

impl HevcConfigurationBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let configuration_version = r.const_u8("configurationVersion", 1)?;
        let b = r.bytes_exact::<1>("profile_byte")?[0];
        let general_profile_space = (b >> 6) & 0x03;
        let general_tier_flag = (b >> 5) & 0x01 != 0;
        let general_profile_idc = b & 0x1F;
        let general_profile_compatibility_flags = r.u32("general_profile_compatibility_flags")?;
        let constraint_bytes = r.bytes_exact::<6>("general_constraint_indicator_flags")?;
        let general_constraint_indicator_flags = constraint_bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
        let general_level_idc = r.u8("general_level_idc")?;
        let min_spatial_segmentation_idc = r.u16("min_spatial_segmentation_idc_field")? & 0x0FFF;
        let parallelism_type = r.u8("parallelism_type_byte")? & 0x03;
        let chroma_format_idc = r.u8("chroma_format_idc_byte")? & 0x03;
        let bit_depth_luma_minus8 = r.u8("bit_depth_luma_byte")? & 0x07;
        let bit_depth_chroma_minus8 = r.u8("bit_depth_chroma_byte")? & 0x07;
        let avg_frame_rate = r.u16("avg_frame_rate")?;
        let flags_byte = r.u8("flags_byte")?;
        let constant_frame_rate = (flags_byte >> 6) & 0x03;
        let num_temporal_layers = (flags_byte >> 3) & 0x07;
        let temporal_id_nested = (flags_byte >> 2) & 0x01 != 0;
        let length_size_minus_one = flags_byte & 0x03;
        let num_of_arrays = r.u8("numOfArrays")?;
        let mut arrays = Vec::with_capacity(num_of_arrays as usize);
        for _ in 0..num_of_arrays {
            let ab = r.u8("array_byte")?;
            let array_completeness = (ab >> 7) & 0x01 != 0;
            let nal_unit_type = ab & 0x3F;
            let num_nalus = r.u16("numNalus")?;
            let nalus = (0..num_nalus)
                .map(|_| read_length_prefixed(r, "nalu"))
                .collect::<Result<_>>()?;
            arrays.push(HvcNalArray {
                array_completeness,
                nal_unit_type,
                nalus,
            });
        }
        Ok(HevcConfigurationBox {
            configuration_version,
            general_profile_space,
            general_tier_flag,
            general_profile_idc,
            general_profile_compatibility_flags,
            general_constraint_indicator_flags,
            general_level_idc,
            min_spatial_segmentation_idc,
            parallelism_type,
            chroma_format_idc,
            bit_depth_luma_minus8,
            bit_depth_chroma_minus8,
            avg_frame_rate,
            constant_frame_rate,
            num_temporal_layers,
            temporal_id_nested,
            length_size_minus_one,
            arrays,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.u8(self.configuration_version);
        w.u8((self.general_profile_space << 6) | ((self.general_tier_flag as u8) << 5) | self.general_profile_idc);
        w.u32(self.general_profile_compatibility_flags);
        let flags = self.general_constraint_indicator_flags.to_be_bytes();
        w.bytes(&flags[2..8]);
        w.u8(self.general_level_idc);
        w.u16(0xF000 | self.min_spatial_segmentation_idc);
        w.u8(0xFC | self.parallelism_type);
        w.u8(0xFC | self.chroma_format_idc);
        w.u8(0xF8 | self.bit_depth_luma_minus8);
        w.u8(0xF8 | self.bit_depth_chroma_minus8);
        w.u16(self.avg_frame_rate);
        let flags_byte = (self.constant_frame_rate << 6)
            | (self.num_temporal_layers << 3)
            | ((self.temporal_id_nested as u8) << 2)
            | self.length_size_minus_one;
        w.u8(flags_byte);
        w.u8(self.arrays.len() as u8);
        for arr in &self.arrays {
            w.u8(((arr.array_completeness as u8) << 7) | arr.nal_unit_type);
            w.u16(arr.nalus.len() as u16);
            for nalu in &arr.nalus {
                write_length_prefixed(w, nalu);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pasp_round_trips() {
        let b = PixelAspectRatioBox {
            h_spacing: 1,
            v_spacing: 1,
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(PixelAspectRatioBox::parse(&mut r).unwrap(), b);
    }

    #[test]
    fn ac3_descriptor_round_trips() {
        let b = Ac3SpecificBox {
            fscod: 1,
            bsid: 8,
            bsmod: 0,
            acmod: 7,
            lfeon: true,
            bit_rate_code: 14,
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        assert_eq!(bytes.len(), 3);
        let mut r = Reader::new(&bytes);
        assert_eq!(Ac3SpecificBox::parse(&mut r).unwrap(), b);
    }

    #[test]
    fn avcc_round_trips_without_high_profile_ext() {
        let b = AvcConfigurationBox {
            configuration_version: 1,
            avc_profile_indication: 66,
            profile_compatibility: 0xE0,
            avc_level_indication: 30,
            length_size_minus_one: 3,
            sps: vec![vec![0x67, 0x42, 0x00, 0x1E]],
            pps: vec![vec![0x68, 0xCE, 0x3C, 0x80]],
            high_profile_ext: None,
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(AvcConfigurationBox::parse(&mut r).unwrap(), b);
        assert!(r.is_empty());
    }

    #[test]
    fn avcc_rejects_a_configuration_version_other_than_one() {
        let mut w = Writer::new();
        w.u8(2); // configurationVersion, must always be 1
        w.u8(66);
        w.u8(0xE0);
        w.u8(30);
        w.u8(0xFF);
        w.u8(0xE0);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert!(matches!(
            AvcConfigurationBox::parse(&mut r),
            Err(crate::error::Error::ConstMismatch { field: "configurationVersion", .. })
        ));
    }

    #[test]
    fn hvcc_round_trips() {
        let b = HevcConfigurationBox {
            configuration_version: 1,
            general_profile_space: 0,
            general_tier_flag: false,
            general_profile_idc: 1,
            general_profile_compatibility_flags: 0x6000_0000,
            general_constraint_indicator_flags: 0x9000_0000_0000,
            general_level_idc: 93,
            min_spatial_segmentation_idc: 0,
            parallelism_type: 0,
            chroma_format_idc: 1,
            bit_depth_luma_minus8: 0,
            bit_depth_chroma_minus8: 0,
            avg_frame_rate: 0,
            constant_frame_rate: 0,
            num_temporal_layers: 1,
            temporal_id_nested: true,
            length_size_minus_one: 3,
            arrays: vec![HvcNalArray {
                array_completeness: true,
                nal_unit_type: 33,
                nalus: vec![vec![0x42, 0x01, 0x01]],
            }],
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(HevcConfigurationBox::parse(&mut r).unwrap(), b);
        assert!(r.is_empty());
    }
}
