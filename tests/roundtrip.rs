//! Byte-exact round-trip checks over synthetic box trees built from the
//! public API, rather than fixture files: `encode(parse(encode(x))) ==
//! encode(x)` for one instance of each structural shape this crate
//! handles (plain, full-box, bit-packed, flag-gated, nested, uuid).

use isobmff::boxes::encryption::TrackEncryptionBox;
use isobmff::boxes::file_type::FileTypeBox;
use isobmff::boxes::fragment::{SampleFlags, TrackFragmentHeaderBox, TrackRunBox, TrunSampleEntry};
use isobmff::boxes::media::MediaHeaderBox;
use isobmff::boxes::movie::MovieHeaderBox;
use isobmff::boxes::track::TrackHeaderBox;
use isobmff::{BoxBody, FourCc, ParsedBox};

fn roundtrip(b: ParsedBox) {
    let encoded = b.encode();
    let parsed = ParsedBox::parse(&encoded).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0], b);
    assert_eq!(parsed[0].encode(), encoded);
}

#[test]
fn ftyp_round_trips() {
    roundtrip(ParsedBox {
        tag: FourCc(*b"ftyp"),
        body: BoxBody::FileType(FileTypeBox {
            major_brand: FourCc(*b"isom"),
            minor_version: 512,
            compatible_brands: vec![FourCc(*b"isom"), FourCc(*b"iso2"), FourCc(*b"mp41")],
        }),
    });
}

#[test]
fn mvhd_v0_and_v1_round_trip() {
    let mut b = MovieHeaderBox::default();
    b.duration = 12345;
    roundtrip(ParsedBox {
        tag: FourCc(*b"mvhd"),
        body: BoxBody::MovieHeader(b.clone()),
    });

    b.version = 1;
    b.creation_time = u64::MAX - 1;
    b.duration = u64::MAX - 1;
    roundtrip(ParsedBox {
        tag: FourCc(*b"mvhd"),
        body: BoxBody::MovieHeader(b),
    });
}

#[test]
fn tkhd_default_round_trips() {
    roundtrip(ParsedBox {
        tag: FourCc(*b"tkhd"),
        body: BoxBody::TrackHeader(TrackHeaderBox::default()),
    });
}

#[test]
fn mdhd_language_code_round_trips() {
    let mut b = MediaHeaderBox {
        version: 0,
        flags: 0,
        creation_time: 0,
        modification_time: 0,
        timescale: 1000,
        duration: 0,
        language: *b"eng",
    };
    roundtrip(ParsedBox {
        tag: FourCc(*b"mdhd"),
        body: BoxBody::MediaHeader(b.clone()),
    });
    b.language = *b"und";
    roundtrip(ParsedBox {
        tag: FourCc(*b"mdhd"),
        body: BoxBody::MediaHeader(b),
    });
}

#[test]
fn tfhd_round_trips_with_every_optional_field_present() {
    let b = TrackFragmentHeaderBox {
        version: 0,
        flags: 0x00_0001 | 0x00_0002 | 0x00_0008 | 0x00_0010 | 0x00_0020,
        track_id: 7,
        base_data_offset: Some(1024),
        sample_description_index: Some(2),
        default_sample_duration: Some(3000),
        default_sample_size: Some(512),
        default_sample_flags: Some(SampleFlags {
            is_leading: 0,
            sample_depends_on: 2,
            sample_is_depended_on: 0,
            sample_has_redundancy: 0,
            sample_padding_value: 0,
            sample_is_non_sync_sample: false,
            sample_degradation_priority: 0,
        }),
    };
    roundtrip(ParsedBox {
        tag: FourCc(*b"tfhd"),
        body: BoxBody::TrackFragmentHeader(b),
    });
}

#[test]
fn tfhd_round_trips_with_no_optional_fields() {
    let b = TrackFragmentHeaderBox {
        version: 0,
        flags: 0,
        track_id: 1,
        base_data_offset: None,
        sample_description_index: None,
        default_sample_duration: None,
        default_sample_size: None,
        default_sample_flags: None,
    };
    roundtrip(ParsedBox {
        tag: FourCc(*b"tfhd"),
        body: BoxBody::TrackFragmentHeader(b),
    });
}

#[test]
fn trun_v1_signed_composition_offsets_round_trip() {
    let b = TrackRunBox {
        version: 1,
        flags: 0x00_0001 | 0x00_0004 | 0x00_0100 | 0x00_0200 | 0x00_0400 | 0x00_0800,
        data_offset: Some(-16),
        first_sample_flags: Some(SampleFlags {
            is_leading: 0,
            sample_depends_on: 2,
            sample_is_depended_on: 0,
            sample_has_redundancy: 0,
            sample_padding_value: 0,
            sample_is_non_sync_sample: true,
            sample_degradation_priority: 0,
        }),
        samples: vec![TrunSampleEntry {
            sample_duration: Some(3000),
            sample_size: Some(1400),
            sample_flags: None,
            sample_composition_time_offset: Some(-512),
        }],
    };
    roundtrip(ParsedBox {
        tag: FourCc(*b"trun"),
        body: BoxBody::TrackRun(b),
    });
}

#[test]
fn tenc_default_constant_iv_round_trips() {
    let b = TrackEncryptionBox {
        version: 1,
        flags: 0,
        default_crypt_byte_block: 1,
        default_skip_byte_block: 9,
        default_is_protected: 1,
        default_per_sample_iv_size: 0,
        default_kid: [7u8; 16],
        default_constant_iv: Some(vec![1, 2, 3, 4, 5, 6, 7, 8]),
    };
    roundtrip(ParsedBox {
        tag: FourCc(*b"tenc"),
        body: BoxBody::TrackEncryption(b),
    });
}

#[test]
fn nested_container_round_trips_through_the_full_tree() {
    let mvhd = ParsedBox {
        tag: FourCc(*b"mvhd"),
        body: BoxBody::MovieHeader(MovieHeaderBox::default()),
    };
    let tkhd = ParsedBox {
        tag: FourCc(*b"tkhd"),
        body: BoxBody::TrackHeader(TrackHeaderBox::default()),
    };
    let trak = ParsedBox {
        tag: FourCc(*b"trak"),
        body: BoxBody::Container(vec![tkhd]),
    };
    let moov = ParsedBox {
        tag: FourCc(*b"moov"),
        body: BoxBody::Container(vec![mvhd, trak]),
    };
    let ftyp = ParsedBox {
        tag: FourCc(*b"ftyp"),
        body: BoxBody::FileType(FileTypeBox {
            major_brand: FourCc(*b"isom"),
            minor_version: 0,
            compatible_brands: vec![],
        }),
    };

    let data = ParsedBox::encode_all(&[ftyp.clone(), moov.clone()]);
    let parsed = ParsedBox::parse(&data).unwrap();
    assert_eq!(parsed, vec![ftyp, moov]);
    assert_eq!(ParsedBox::encode_all(&parsed), data);
}

#[test]
fn unknown_tag_round_trips_as_raw_bytes() {
    let b = ParsedBox {
        tag: FourCc(*b"xtra"),
        body: BoxBody::Raw(vec![1, 2, 3, 4, 5]),
    };
    roundtrip(b);
}
