//! Adobe HTTP Dynamic Streaming (F4F/HDS) bootstrap boxes: `abst` and
//! its nested `asrt`/`afrt` run tables. These are a separate family from
//! the ISOBMFF fragmentation boxes (`moof`/`traf`) and describe the
//! same kind of thing, segment and fragment timing, for Adobe's older
//! streaming format.

use crate::combinator::fixed_array;
use crate::error::Result;
use crate::primitive::{Reader, Writer};
use crate::tree::{encode_one_box, parse_one_box, ParseCtx, ParsedBox};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BootstrapInfoBox {
    pub version: u8,
    pub flags: u32,
    pub bootstrap_info_version: u32,
    pub profile: u8,
    pub live: bool,
    pub update: bool,
    pub time_scale: u32,
    pub current_media_time: u64,
    pub smpte_time_code_offset: u64,
    pub movie_identifier: String,
    pub server_entries: Vec<String>,
    pub quality_entries: Vec<String>,
    pub drm_data: String,
    pub metadata: String,
    pub segment_run_tables: Vec<ParsedBox>,
    pub fragment_run_tables: Vec<ParsedBox>,
}

impl BootstrapInfoBox {
    pub fn parse(r: &mut Reader, ctx: &mut ParseCtx) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let bootstrap_info_version = r.u32("bootstrapinfoVersion")?;
        let flag_byte = r.u8("profile_live_update")?;
        let profile = (flag_byte >> 6) & 0x03;
        let live = (flag_byte >> 5) & 0x01 != 0;
        let update = (flag_byte >> 4) & 0x01 != 0;
        let time_scale = r.u32("timeScale")?;
        let current_media_time = r.u64("currentMediaTime")?;
        let smpte_time_code_offset = r.u64("smpteTimeCodeOffset")?;
        let movie_identifier = r.cstring_utf8("movieIdentifier")?;
        let server_entry_count = r.u8("serverEntryCount")?;
        let server_entries = fixed_array(r, server_entry_count as u32, |r| r.cstring_utf8("serverEntry"))?;
        let quality_entry_count = r.u8("qualityEntryCount")?;
        let quality_entries = fixed_array(r, quality_entry_count as u32, |r| r.cstring_utf8("qualityEntry"))?;
        let drm_data = r.cstring_utf8("drmData")?;
        let metadata = r.cstring_utf8("metaData")?;
        let segment_run_table_count = r.u8("segmentRunTableCount")?;
        let mut segment_run_tables = Vec::with_capacity(segment_run_table_count as usize);
        for _ in 0..segment_run_table_count {
            segment_run_tables.push(parse_one_box(r, ctx)?);
        }
        let fragment_run_table_count = r.u8("fragmentRunTableCount")?;
        let mut fragment_run_tables = Vec::with_capacity(fragment_run_table_count as usize);
        for _ in 0..fragment_run_table_count {
            fragment_run_tables.push(parse_one_box(r, ctx)?);
        }
        Ok(BootstrapInfoBox {
            version,
            flags,
            bootstrap_info_version,
            profile,
            live,
            update,
            time_scale,
            current_media_time,
            smpte_time_code_offset,
            movie_identifier,
            server_entries,
            quality_entries,
            drm_data,
            metadata,
            segment_run_tables,
            fragment_run_tables,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.u32(self.bootstrap_info_version);
        w.u8((self.profile << 6) | ((self.live as u8) << 5) | ((self.update as u8) << 4));
        w.u32(self.time_scale);
        w.u64(self.current_media_time);
        w.u64(self.smpte_time_code_offset);
        w.cstring_utf8(&self.movie_identifier);
        w.u8(self.server_entries.len() as u8);
        for e in &self.server_entries {
            w.cstring_utf8(e);
        }
        w.u8(self.quality_entries.len() as u8);
        for e in &self.quality_entries {
            w.cstring_utf8(e);
        }
        w.cstring_utf8(&self.drm_data);
        w.cstring_utf8(&self.metadata);
        w.u8(self.segment_run_tables.len() as u8);
        for b in &self.segment_run_tables {
            encode_one_box(w, b);
        }
        w.u8(self.fragment_run_tables.len() as u8);
        for b in &self.fragment_run_tables {
            encode_one_box(w, b);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SegmentRunEntry {
    pub first_segment: u32,
    pub fragments_per_segment: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SegmentRunTableBox {
    pub version: u8,
    pub flags: u32,
    pub quality_segment_url_modifiers: Vec<String>,
    pub entries: Vec<SegmentRunEntry>,
}

impl SegmentRunTableBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let quality_entry_count = r.u8("qualityEntryCount")?;
        let quality_segment_url_modifiers =
            fixed_array(r, quality_entry_count as u32, |r| r.cstring_utf8("qualitySegmentUrlModifier"))?;
        let entry_count = r.u32("segmentRunEntryCount")?;
        let entries = fixed_array(r, entry_count, |r| {
            Ok(SegmentRunEntry {
                first_segment: r.u32("firstSegment")?,
                fragments_per_segment: r.u32("fragmentsPerSegment")?,
            })
        })?;
        Ok(SegmentRunTableBox {
            version,
            flags,
            quality_segment_url_modifiers,
            entries,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.u8(self.quality_segment_url_modifiers.len() as u8);
        for e in &self.quality_segment_url_modifiers {
            w.cstring_utf8(e);
        }
        w.u32(self.entries.len() as u32);
        for e in &self.entries {
            w.u32(e.first_segment);
            w.u32(e.fragments_per_segment);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FragmentRunEntry {
    pub first_fragment: u32,
    pub first_fragment_timestamp: u64,
    pub fragment_duration: u32,
    pub discontinuity: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FragmentRunTableBox {
    pub version: u8,
    pub flags: u32,
    pub timescale: u32,
    pub quality_entries: Vec<String>,
    pub entries: Vec<FragmentRunEntry>,
}

impl FragmentRunTableBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let timescale = r.u32("timescale")?;
        let quality_entry_count = r.u8("qualityEntryCount")?;
        let quality_entries = fixed_array(r, quality_entry_count as u32, |r| r.cstring_utf8("qualityEntry"))?;
        let entry_count = r.u32("fragmentRunEntryCount")?;
        let entries = fixed_array(r, entry_count, |r| {
            let first_fragment = r.u32("firstFragment")?;
            let first_fragment_timestamp = r.u64("firstFragmentTimestamp")?;
            let fragment_duration = r.u32("fragmentDuration")?;
            let discontinuity = if fragment_duration == 0 {
                Some(r.u8("discontinuity")?)
            } else {
                None
            };
            Ok(FragmentRunEntry {
                first_fragment,
                first_fragment_timestamp,
                fragment_duration,
                discontinuity,
            })
        })?;
        Ok(FragmentRunTableBox {
            version,
            flags,
            timescale,
            quality_entries,
            entries,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.u32(self.timescale);
        w.u8(self.quality_entries.len() as u8);
        for e in &self.quality_entries {
            w.cstring_utf8(e);
        }
        w.u32(self.entries.len() as u32);
        for e in &self.entries {
            w.u32(e.first_fragment);
            w.u64(e.first_fragment_timestamp);
            w.u32(e.fragment_duration);
            if let Some(d) = e.discontinuity {
                w.u8(d);
            }
        }
    }
}
