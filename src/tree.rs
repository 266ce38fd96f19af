//! The box tree: [`ParsedBox`]/[`BoxBody`] data model, and the
//! length-then-type dispatcher that turns a byte slice into a tree and
//! back again.
//!
//! Every schema in [`crate::boxes`] only knows how to read and write its
//! own body; carving that body out of the outer length prefix, looking
//! up which schema owns a given 4-byte tag, and recursing into container
//! children all happen here.

use crate::boxes::{encryption, file_type, fragment, hds, media, movie, sample_entry, sample_table, track};
use crate::error::{Error, Result};
use crate::fourcc::FourCc;
use crate::primitive::{Reader, Writer};

/// Recursion and box-count guards applied while parsing untrusted input.
/// `Default` matches the limits this crate parses with unless a caller
/// opts into something else via [`ParsedBox::parse_top_level`].
#[derive(Debug, Clone, Copy)]
pub struct ParseLimits {
    pub max_depth: usize,
    pub max_box_count: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        ParseLimits {
            max_depth: 64,
            max_box_count: 1_000_000,
        }
    }
}

pub struct ParseCtx {
    limits: ParseLimits,
    depth: usize,
    box_count: usize,
}

impl ParseCtx {
    pub fn new(limits: ParseLimits) -> Self {
        ParseCtx {
            limits,
            depth: 0,
            box_count: 0,
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(Error::DepthLimitExceeded {
                limit: self.limits.max_depth,
            });
        }
        self.box_count += 1;
        if self.box_count > self.limits.max_box_count {
            return Err(Error::BoxCountLimitExceeded {
                limit: self.limits.max_box_count,
            });
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }
}

const SENC_UUID: [u8; 16] = [
    0xA2, 0x39, 0x4F, 0x52, 0x5A, 0x9B, 0x4F, 0x14, 0xA2, 0x44, 0x6C, 0x42, 0x7C, 0x64, 0x8D, 0xF4,
];
const PSSH_UUID: [u8; 16] = [
    0xD0, 0x8A, 0x4F, 0x18, 0x10, 0xF3, 0x4A, 0x82, 0xB6, 0xC8, 0x32, 0xD8, 0xAB, 0xA1, 0x83, 0xD3,
];
const TENC_UUID: [u8; 16] = [
    0x89, 0x74, 0xDB, 0xCE, 0x7B, 0xE7, 0x4C, 0x51, 0x84, 0xF9, 0x71, 0x48, 0xF9, 0x88, 0x25, 0x54,
];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum UuidBody {
    SampleEncryption(encryption::SampleEncryptionBox),
    ProtectionSystemHeader(encryption::ProtectionSystemHeaderBox),
    TrackEncryption(encryption::TrackEncryptionBox),
    Unknown(Vec<u8>),
}

impl UuidBody {
    fn parse(extended_type: [u8; 16], r: &mut Reader) -> Result<Self> {
        match extended_type {
            SENC_UUID => Ok(UuidBody::SampleEncryption(encryption::SampleEncryptionBox::parse(r)?)),
            PSSH_UUID => Ok(UuidBody::ProtectionSystemHeader(encryption::ProtectionSystemHeaderBox::parse(r)?)),
            TENC_UUID => Ok(UuidBody::TrackEncryption(encryption::TrackEncryptionBox::parse(r)?)),
            _ => Ok(UuidBody::Unknown(r.greedy_bytes())),
        }
    }

    fn encode(&self, w: &mut Writer) {
        match self {
            UuidBody::SampleEncryption(b) => b.encode(w),
            UuidBody::ProtectionSystemHeader(b) => b.encode(w),
            UuidBody::TrackEncryption(b) => b.encode(w),
            UuidBody::Unknown(data) => w.bytes(data),
        }
    }
}

/// Every schema this crate understands, plus the two fallbacks
/// (`Raw` for unrecognized or intentionally-opaque tags like `mdat`,
/// and `Uuid` for the extended-type dispatch under the `uuid` tag).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum BoxBody {
    Container(Vec<ParsedBox>),
    Raw(Vec<u8>),
    Uuid {
        #[serde(with = "uuid_bytes")]
        extended_type: [u8; 16],
        body: Box<UuidBody>,
    },
    FileType(file_type::FileTypeBox),
    MovieHeader(movie::MovieHeaderBox),
    MovieExtendsHeader(movie::MovieExtendsHeaderBox),
    TrackExtends(movie::TrackExtendsBox),
    TrackHeader(track::TrackHeaderBox),
    MediaHeader(media::MediaHeaderBox),
    HandlerReference(media::HandlerReferenceBox),
    VideoMediaHeader(media::VideoMediaHeaderBox),
    SoundMediaHeader(media::SoundMediaHeaderBox),
    DataReference(media::DataReferenceBox),
    SampleDescription(sample_entry::SampleDescriptionBox),
    SampleSize(sample_table::SampleSizeBox),
    CompactSampleSize(sample_table::CompactSampleSizeBox),
    TimeToSample(sample_table::TimeToSampleBox),
    SyncSample(sample_table::SyncSampleBox),
    SampleToChunk(sample_table::SampleToChunkBox),
    ChunkOffset(sample_table::ChunkOffsetBox),
    ChunkLargeOffset(sample_table::ChunkLargeOffsetBox),
    SampleDegradationPriority(sample_table::SampleDegradationPriorityBox),
    MovieFragmentHeader(fragment::MovieFragmentHeaderBox),
    TrackFragmentHeader(fragment::TrackFragmentHeaderBox),
    TrackRun(fragment::TrackRunBox),
    TrackFragmentBaseMediaDecodeTime(fragment::TrackFragmentBaseMediaDecodeTimeBox),
    SegmentIndex(fragment::SegmentIndexBox),
    SampleAuxiliaryInfoSizes(fragment::SampleAuxiliaryInfoSizesBox),
    SampleAuxiliaryInfoOffsets(fragment::SampleAuxiliaryInfoOffsetsBox),
    BitRate(sample_entry::BitRateBox),
    Ac3Specific(sample_entry::Ac3SpecificBox),
    AvcConfiguration(sample_entry::AvcConfigurationBox),
    HevcConfiguration(sample_entry::HevcConfigurationBox),
    PixelAspectRatio(sample_entry::PixelAspectRatioBox),
    TrackEncryption(encryption::TrackEncryptionBox),
    ProtectionSystemHeader(encryption::ProtectionSystemHeaderBox),
    SampleEncryption(encryption::SampleEncryptionBox),
    OriginalFormat(encryption::OriginalFormatBox),
    SchemeType(encryption::SchemeTypeBox),
    SampleToGroup(fragment::SampleToGroupBox),
    SampleGroupDescription(fragment::SampleGroupDescriptionBox),
    BootstrapInfo(hds::BootstrapInfoBox),
    SegmentRunTable(hds::SegmentRunTableBox),
    FragmentRunTable(hds::FragmentRunTableBox),
}

mod uuid_bytes {
    pub fn serialize<S: serde::Serializer>(bytes: &[u8; 16], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&uuid::Uuid::from_bytes(*bytes).to_string())
    }
}

/// A single box: its 4-byte type tag and decoded body. The on-wire
/// `u32` length prefix is never stored; it is recomputed from the
/// encoded body every time, which is what keeps `encode(parse(x)) ==
/// x` true even when a file was produced by an encoder that padded or
/// miscounted its own lengths.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParsedBox {
    #[serde(rename = "type")]
    pub tag: FourCc,
    #[serde(flatten)]
    pub body: BoxBody,
}

impl ParsedBox {
    /// Parses every box in `data` at the top level (a whole file, or the
    /// body of a container already carved out by a caller), using the
    /// default [`ParseLimits`].
    pub fn parse(data: &[u8]) -> Result<Vec<ParsedBox>> {
        Self::parse_top_level(data, ParseLimits::default())
    }

    pub fn parse_top_level(data: &[u8], limits: ParseLimits) -> Result<Vec<ParsedBox>> {
        let mut ctx = ParseCtx::new(limits);
        let mut r = Reader::new(data);
        parse_box_list(&mut r, &mut ctx)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        encode_one_box(&mut w, self);
        w.into_vec()
    }

    pub fn encode_all(boxes: &[ParsedBox]) -> Vec<u8> {
        let mut w = Writer::new();
        encode_box_list(&mut w, boxes);
        w.into_vec()
    }

    pub fn is_container(&self) -> bool {
        matches!(self.body, BoxBody::Container(_))
    }

    /// Direct children, for box kinds that have them: ordinary
    /// containers and the two sample-entry-bearing shapes (`stsd`
    /// entries carry their own nested boxes, and the HDS `abst` box
    /// nests `asrt`/`afrt` tables the same way). Navigation walks this
    /// method rather than matching on `BoxBody::Container` directly so
    /// it transparently descends into both.
    pub fn children(&self) -> Vec<&ParsedBox> {
        match &self.body {
            BoxBody::Container(children) => children.iter().collect(),
            BoxBody::SampleDescription(sd) => sd.entries.iter().flat_map(|e| e.children.iter()).collect(),
            BoxBody::BootstrapInfo(b) => b.segment_run_tables.iter().chain(b.fragment_run_tables.iter()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Mutable counterpart to [`ParsedBox::children`]: every `Vec<ParsedBox>`
/// a box directly owns, as separate lists (a sample description owns one
/// per entry). Used by [`crate::navigate::find`] to recurse into and
/// delete from nested boxes that aren't plain containers.
pub(crate) fn child_lists_mut(body: &mut BoxBody) -> Vec<&mut Vec<ParsedBox>> {
    match body {
        BoxBody::Container(children) => vec![children],
        BoxBody::SampleDescription(sd) => sd.entries.iter_mut().map(|e| &mut e.children).collect(),
        BoxBody::BootstrapInfo(b) => vec![&mut b.segment_run_tables, &mut b.fragment_run_tables],
        _ => Vec::new(),
    }
}

pub(crate) fn parse_one_box(r: &mut Reader, ctx: &mut ParseCtx) -> Result<ParsedBox> {
    ctx.enter()?;
    let result = (|| {
        let length = r.u32("length")? as usize;
        let tag = FourCc(r.bytes_exact::<4>("type")?);
        log::trace!("parsing box {tag} ({length} bytes)");
        if length == 1 {
            return Err(Error::ExtendedLengthUnsupported);
        }
        let body_len = if length == 0 {
            r.remaining()
        } else {
            length.checked_sub(8).ok_or(Error::LengthOverrun { excess: 0 })?
        };
        let mut br = r.sub_reader(body_len, "box_body")?;
        let body = parse_box_body(tag, &mut br, ctx).map_err(|e| e.in_box(tag))?;
        br.expect_exhausted().map_err(|e| e.in_box(tag))?;
        Ok(ParsedBox { tag, body })
    })();
    ctx.exit();
    result
}

pub(crate) fn parse_box_list(r: &mut Reader, ctx: &mut ParseCtx) -> Result<Vec<ParsedBox>> {
    let mut out = Vec::new();
    while !r.is_empty() {
        out.push(parse_one_box(r, ctx)?);
    }
    Ok(out)
}

pub(crate) fn encode_one_box(w: &mut Writer, b: &ParsedBox) {
    let mut body = Writer::new();
    encode_box_body(&mut body, &b.body);
    let body = body.into_vec();
    w.u32(8 + body.len() as u32);
    w.bytes(b.tag.as_bytes());
    w.bytes(&body);
}

pub(crate) fn encode_box_list(w: &mut Writer, boxes: &[ParsedBox]) {
    for b in boxes {
        encode_one_box(w, b);
    }
}

fn parse_box_body(tag: FourCc, r: &mut Reader, ctx: &mut ParseCtx) -> Result<BoxBody> {
    match tag.as_bytes() {
        b"moov" | b"moof" | b"traf" | b"mvex" | b"trak" | b"mdia" | b"minf" | b"dinf" | b"stbl" | b"sinf"
        | b"schi" => Ok(BoxBody::Container(parse_box_list(r, ctx)?)),
        b"ftyp" | b"styp" => Ok(BoxBody::FileType(file_type::FileTypeBox::parse(r)?)),
        b"mvhd" => Ok(BoxBody::MovieHeader(movie::MovieHeaderBox::parse(r)?)),
        b"mehd" => Ok(BoxBody::MovieExtendsHeader(movie::MovieExtendsHeaderBox::parse(r)?)),
        b"trex" => Ok(BoxBody::TrackExtends(movie::TrackExtendsBox::parse(r)?)),
        b"tkhd" => Ok(BoxBody::TrackHeader(track::TrackHeaderBox::parse(r)?)),
        b"mdhd" => Ok(BoxBody::MediaHeader(media::MediaHeaderBox::parse(r)?)),
        b"hdlr" => Ok(BoxBody::HandlerReference(media::HandlerReferenceBox::parse(r)?)),
        b"vmhd" => Ok(BoxBody::VideoMediaHeader(media::VideoMediaHeaderBox::parse(r)?)),
        b"smhd" => Ok(BoxBody::SoundMediaHeader(media::SoundMediaHeaderBox::parse(r)?)),
        b"dref" => Ok(BoxBody::DataReference(media::DataReferenceBox::parse(r)?)),
        b"stsd" => Ok(BoxBody::SampleDescription(sample_entry::SampleDescriptionBox::parse(r, ctx)?)),
        b"stsz" => Ok(BoxBody::SampleSize(sample_table::SampleSizeBox::parse(r)?)),
        b"stz2" => Ok(BoxBody::CompactSampleSize(sample_table::CompactSampleSizeBox::parse(r)?)),
        b"stts" => Ok(BoxBody::TimeToSample(sample_table::TimeToSampleBox::parse(r)?)),
        b"stss" => Ok(BoxBody::SyncSample(sample_table::SyncSampleBox::parse(r)?)),
        b"stsc" => Ok(BoxBody::SampleToChunk(sample_table::SampleToChunkBox::parse(r)?)),
        b"stco" => Ok(BoxBody::ChunkOffset(sample_table::ChunkOffsetBox::parse(r)?)),
        b"co64" => Ok(BoxBody::ChunkLargeOffset(sample_table::ChunkLargeOffsetBox::parse(r)?)),
        b"stdp" => Ok(BoxBody::SampleDegradationPriority(sample_table::SampleDegradationPriorityBox::parse(r)?)),
        b"mfhd" => Ok(BoxBody::MovieFragmentHeader(fragment::MovieFragmentHeaderBox::parse(r)?)),
        b"tfhd" => Ok(BoxBody::TrackFragmentHeader(fragment::TrackFragmentHeaderBox::parse(r)?)),
        b"trun" => Ok(BoxBody::TrackRun(fragment::TrackRunBox::parse(r)?)),
        b"tfdt" => Ok(BoxBody::TrackFragmentBaseMediaDecodeTime(
            fragment::TrackFragmentBaseMediaDecodeTimeBox::parse(r)?,
        )),
        b"sidx" => Ok(BoxBody::SegmentIndex(fragment::SegmentIndexBox::parse(r)?)),
        b"saiz" => Ok(BoxBody::SampleAuxiliaryInfoSizes(fragment::SampleAuxiliaryInfoSizesBox::parse(r)?)),
        b"saio" => Ok(BoxBody::SampleAuxiliaryInfoOffsets(fragment::SampleAuxiliaryInfoOffsetsBox::parse(r)?)),
        b"btrt" => Ok(BoxBody::BitRate(sample_entry::BitRateBox::parse(r)?)),
        b"dac3" => Ok(BoxBody::Ac3Specific(sample_entry::Ac3SpecificBox::parse(r)?)),
        b"avcC" => Ok(BoxBody::AvcConfiguration(sample_entry::AvcConfigurationBox::parse(r)?)),
        b"hvcC" => Ok(BoxBody::HevcConfiguration(sample_entry::HevcConfigurationBox::parse(r)?)),
        b"pasp" => Ok(BoxBody::PixelAspectRatio(sample_entry::PixelAspectRatioBox::parse(r)?)),
        b"tenc" => Ok(BoxBody::TrackEncryption(encryption::TrackEncryptionBox::parse(r)?)),
        b"pssh" => Ok(BoxBody::ProtectionSystemHeader(encryption::ProtectionSystemHeaderBox::parse(r)?)),
        b"senc" => Ok(BoxBody::SampleEncryption(encryption::SampleEncryptionBox::parse(r)?)),
        b"frma" => Ok(BoxBody::OriginalFormat(encryption::OriginalFormatBox::parse(r)?)),
        b"schm" => Ok(BoxBody::SchemeType(encryption::SchemeTypeBox::parse(r)?)),
        b"sbgp" => Ok(BoxBody::SampleToGroup(fragment::SampleToGroupBox::parse(r)?)),
        b"sgpd" => Ok(BoxBody::SampleGroupDescription(fragment::SampleGroupDescriptionBox::parse(r)?)),
        b"abst" => Ok(BoxBody::BootstrapInfo(hds::BootstrapInfoBox::parse(r, ctx)?)),
        b"asrt" => Ok(BoxBody::SegmentRunTable(hds::SegmentRunTableBox::parse(r)?)),
        b"afrt" => Ok(BoxBody::FragmentRunTable(hds::FragmentRunTableBox::parse(r)?)),
        b"uuid" => {
            let extended_type = r.bytes_exact::<16>("extended_type")?;
            let body = UuidBody::parse(extended_type, r)?;
            Ok(BoxBody::Uuid {
                extended_type,
                body: Box::new(body),
            })
        }
        _ => {
            log::debug!("unrecognized box type {tag}; storing as raw bytes");
            Ok(BoxBody::Raw(r.greedy_bytes()))
        }
    }
}

fn encode_box_body(w: &mut Writer, body: &BoxBody) {
    match body {
        BoxBody::Container(children) => encode_box_list(w, children),
        BoxBody::Raw(data) => w.bytes(data),
        BoxBody::Uuid { extended_type, body } => {
            w.bytes(extended_type);
            body.encode(w);
        }
        BoxBody::FileType(b) => b.encode(w),
        BoxBody::MovieHeader(b) => b.encode(w),
        BoxBody::MovieExtendsHeader(b) => b.encode(w),
        BoxBody::TrackExtends(b) => b.encode(w),
        BoxBody::TrackHeader(b) => b.encode(w),
        BoxBody::MediaHeader(b) => b.encode(w),
        BoxBody::HandlerReference(b) => b.encode(w),
        BoxBody::VideoMediaHeader(b) => b.encode(w),
        BoxBody::SoundMediaHeader(b) => b.encode(w),
        BoxBody::DataReference(b) => b.encode(w),
        BoxBody::SampleDescription(b) => b.encode(w),
        BoxBody::SampleSize(b) => b.encode(w),
        BoxBody::CompactSampleSize(b) => b.encode(w),
        BoxBody::TimeToSample(b) => b.encode(w),
        BoxBody::SyncSample(b) => b.encode(w),
        BoxBody::SampleToChunk(b) => b.encode(w),
        BoxBody::ChunkOffset(b) => b.encode(w),
        BoxBody::ChunkLargeOffset(b) => b.encode(w),
        BoxBody::SampleDegradationPriority(b) => b.encode(w),
        BoxBody::MovieFragmentHeader(b) => b.encode(w),
        BoxBody::TrackFragmentHeader(b) => b.encode(w),
        BoxBody::TrackRun(b) => b.encode(w),
        BoxBody::TrackFragmentBaseMediaDecodeTime(b) => b.encode(w),
        BoxBody::SegmentIndex(b) => b.encode(w),
        BoxBody::SampleAuxiliaryInfoSizes(b) => b.encode(w),
        BoxBody::SampleAuxiliaryInfoOffsets(b) => b.encode(w),
        BoxBody::BitRate(b) => b.encode(w),
        BoxBody::Ac3Specific(b) => b.encode(w),
        BoxBody::AvcConfiguration(b) => b.encode(w),
        BoxBody::HevcConfiguration(b) => b.encode(w),
        BoxBody::PixelAspectRatio(b) => b.encode(w),
        BoxBody::TrackEncryption(b) => b.encode(w),
        BoxBody::ProtectionSystemHeader(b) => b.encode(w),
        BoxBody::SampleEncryption(b) => b.encode(w),
        BoxBody::OriginalFormat(b) => b.encode(w),
        BoxBody::SchemeType(b) => b.encode(w),
        BoxBody::SampleToGroup(b) => b.encode(w),
        BoxBody::SampleGroupDescription(b) => b.encode(w),
        BoxBody::BootstrapInfo(b) => b.encode(w),
        BoxBody::SegmentRunTable(b) => b.encode(w),
        BoxBody::FragmentRunTable(b) => b.encode(w),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ftyp_bytes() -> Vec<u8> {
        let mut w = Writer::new();
        w.bytes(b"isom");
        w.u32(512);
        let body = w.into_vec();
        let mut out = Writer::new();
        out.u32(8 + body.len() as u32);
        out.bytes(b"ftyp");
        out.bytes(&body);
        out.into_vec()
    }

    #[test]
    fn round_trips_a_minimal_ftyp() {
        let bytes = ftyp_bytes();
        let parsed = ParsedBox::parse(&bytes).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].tag, FourCc(*b"ftyp"));
        assert_eq!(ParsedBox::encode_all(&parsed), bytes);
    }

    #[test]
    fn free_box_round_trips_as_raw() {
        let mut w = Writer::new();
        w.u32(16);
        w.bytes(b"free");
        w.bytes(&[0u8; 8]);
        let bytes = w.into_vec();
        let parsed = ParsedBox::parse(&bytes).unwrap();
        assert!(matches!(parsed[0].body, BoxBody::Raw(ref d) if d.len() == 8));
        assert_eq!(ParsedBox::encode_all(&parsed), bytes);
    }

    #[test]
    fn unknown_tag_round_trips_as_raw() {
        let mut w = Writer::new();
        w.u32(12);
        w.bytes(b"zzzz");
        w.bytes(&[1, 2, 3, 4]);
        let bytes = w.into_vec();
        let parsed = ParsedBox::parse(&bytes).unwrap();
        assert!(matches!(parsed[0].body, BoxBody::Raw(_)));
        assert_eq!(ParsedBox::encode_all(&parsed), bytes);
    }

    #[test]
    fn nested_container_round_trips() {
        let ftyp = ftyp_bytes();
        let mut inner = Writer::new();
        inner.bytes(&ftyp);
        let inner = inner.into_vec();
        let mut moov = Writer::new();
        moov.u32(8 + inner.len() as u32);
        moov.bytes(b"moov");
        moov.bytes(&inner);
        let bytes = moov.into_vec();
        let parsed = ParsedBox::parse(&bytes).unwrap();
        assert!(parsed[0].is_container());
        assert_eq!(parsed[0].children().len(), 1);
        assert_eq!(ParsedBox::encode_all(&parsed), bytes);
    }

    #[test]
    fn depth_limit_rejects_deeply_nested_containers() {
        let mut bytes = Vec::new();
        {
            let mut w = Writer::new();
            w.u32(8);
            w.bytes(b"mdat");
            bytes = w.into_vec();
        }
        for _ in 0..5 {
            let mut w = Writer::new();
            w.u32(8 + bytes.len() as u32);
            w.bytes(b"moov");
            w.bytes(&bytes);
            bytes = w.into_vec();
        }
        let limits = ParseLimits { max_depth: 2, max_box_count: 1_000 };
        assert!(matches!(
            ParsedBox::parse_top_level(&bytes, limits),
            Err(Error::DepthLimitExceeded { limit: 2 })
        ));
    }

    #[test]
    fn uuid_box_dispatches_on_extended_type() {
        let mut body = Writer::new();
        body.bytes(&TENC_UUID);
        let tenc = encryption::TrackEncryptionBox {
            version: 0,
            flags: 0,
            default_crypt_byte_block: 0,
            default_skip_byte_block: 0,
            default_is_protected: 1,
            default_per_sample_iv_size: 8,
            default_kid: [0x42; 16],
            default_constant_iv: None,
        };
        tenc.encode(&mut body);
        let body = body.into_vec();
        let mut w = Writer::new();
        w.u32(8 + body.len() as u32);
        w.bytes(b"uuid");
        w.bytes(&body);
        let bytes = w.into_vec();
        let parsed = ParsedBox::parse(&bytes).unwrap();
        match &parsed[0].body {
            BoxBody::Uuid { extended_type, body } => {
                assert_eq!(*extended_type, TENC_UUID);
                assert!(matches!(**body, UuidBody::TrackEncryption(_)));
            }
            other => panic!("expected Uuid body, got {other:?}"),
        }
        assert_eq!(ParsedBox::encode_all(&parsed), bytes);
    }
}
