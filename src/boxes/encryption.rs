//! Common Encryption (CENC) boxes: `tenc`, `pssh`, `senc`, and the
//! `sinf` children `frma`/`schm` that describe which protection scheme
//! wraps a track.

use crate::error::Result;
use crate::fourcc::FourCc;
use crate::primitive::{Reader, Writer};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TrackEncryptionBox {
    pub version: u8,
    pub flags: u32,
    pub default_crypt_byte_block: u8,
    pub default_skip_byte_block: u8,
    pub default_is_protected: u8,
    pub default_per_sample_iv_size: u8,
    pub default_kid: [u8; 16],
    pub default_constant_iv: Option<Vec<u8>>,
}

impl TrackEncryptionBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let block_byte = r.u8("reserved_or_byte_block")?;
        let (default_crypt_byte_block, default_skip_byte_block) = if version >= 1 {
            (block_byte >> 4, block_byte & 0x0F)
        } else {
            (0, 0)
        };
        let default_is_protected = r.u8("default_isProtected")?;
        let default_per_sample_iv_size = r.u8("default_Per_Sample_IV_Size")?;
        let default_kid = r.bytes_exact::<16>("default_KID")?;
        let default_constant_iv = if default_is_protected == 1 && default_per_sample_iv_size == 0 {
            let size = r.u8("default_constant_IV_size")? as usize;
            Some(r.bytes(size, "default_constant_IV")?)
        } else {
            None
        };
        Ok(TrackEncryptionBox {
            version,
            flags,
            default_crypt_byte_block,
            default_skip_byte_block,
            default_is_protected,
            default_per_sample_iv_size,
            default_kid,
            default_constant_iv,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        if self.version >= 1 {
            w.u8((self.default_crypt_byte_block << 4) | self.default_skip_byte_block);
        } else {
            w.zeros(1);
        }
        w.u8(self.default_is_protected);
        w.u8(self.default_per_sample_iv_size);
        w.bytes(&self.default_kid);
        if let Some(iv) = &self.default_constant_iv {
            w.u8(iv.len() as u8);
            w.bytes(iv);
        }
    }
}

/// `pssh`. `version` is derived from whether `key_ids` is present rather
/// than stored independently, matching the reference implementation's
/// `Rebuild` of the field from content at encode time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProtectionSystemHeaderBox {
    pub system_id: [u8; 16],
    pub key_ids: Option<Vec<[u8; 16]>>,
    pub data: Vec<u8>,
}

impl ProtectionSystemHeaderBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, _flags) = r.full_box_header()?;
        let system_id = r.bytes_exact::<16>("SystemID")?;
        let key_ids = if version > 0 {
            let count = r.u32("KID_count")?;
            let mut ids = Vec::with_capacity(count as usize);
            for _ in 0..count {
                ids.push(r.bytes_exact::<16>("KID")?);
            }
            Some(ids)
        } else {
            None
        };
        let data_size = r.u32("DataSize")?;
        let data = r.bytes(data_size as usize, "Data")?;
        Ok(ProtectionSystemHeaderBox { system_id, key_ids, data })
    }

    pub fn encode(&self, w: &mut Writer) {
        let version = if self.key_ids.is_some() { 1 } else { 0 };
        w.full_box_header(version, 0);
        w.bytes(&self.system_id);
        if let Some(ids) = &self.key_ids {
            w.u32(ids.len() as u32);
            for id in ids {
                w.bytes(id);
            }
        }
        w.u32(self.data.len() as u32);
        w.bytes(&self.data);
    }
}

/// `senc`. The per-sample IV width isn't carried in this box: it comes
/// from the sibling `tenc.default_per_sample_iv_size`, which this
/// schema has no access to, so the per-sample records are kept as an
/// opaque blob rather than misinterpreted with a guessed width.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SampleEncryptionBox {
    pub version: u8,
    pub flags: u32,
    pub sample_count: u32,
    pub sample_data: Vec<u8>,
}

impl SampleEncryptionBox {
    pub fn has_subsample_encryption_info(&self) -> bool {
        self.flags & 0x02 != 0
    }

    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let sample_count = r.u32("sample_count")?;
        let sample_data = r.greedy_bytes();
        Ok(SampleEncryptionBox {
            version,
            flags,
            sample_count,
            sample_data,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.u32(self.sample_count);
        w.bytes(&self.sample_data);
    }
}

/// `frma`, a `sinf` child naming the format that was encrypted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OriginalFormatBox {
    pub data_format: FourCc,
}

impl OriginalFormatBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        Ok(OriginalFormatBox {
            data_format: FourCc(r.bytes_exact::<4>("data_format")?),
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.bytes(self.data_format.as_bytes());
    }
}

/// `schm`, a `sinf` child naming the protection scheme (`cenc`, `cbcs`, ...).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SchemeTypeBox {
    pub version: u8,
    pub flags: u32,
    pub scheme_type: FourCc,
    pub scheme_version: u32,
    pub scheme_uri: Option<String>,
}

impl SchemeTypeBox {
    const URI_PRESENT: u32 = 0x0000_01;

    pub fn parse(r: &mut Reader) -> Result<Self> {
        let (version, flags) = r.full_box_header()?;
        let scheme_type = FourCc(r.bytes_exact::<4>("scheme_type")?);
        let scheme_version = r.u32("scheme_version")?;
        let scheme_uri = if flags & Self::URI_PRESENT != 0 {
            Some(String::from_utf8(r.greedy_bytes()).map_err(|_| crate::error::Error::InvalidUtf8 {
                field: "scheme_uri",
            })?)
        } else {
            None
        };
        Ok(SchemeTypeBox {
            version,
            flags,
            scheme_type,
            scheme_version,
            scheme_uri,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.full_box_header(self.version, self.flags);
        w.bytes(self.scheme_type.as_bytes());
        w.u32(self.scheme_version);
        if let Some(uri) = &self.scheme_uri {
            w.bytes(uri.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenc_without_constant_iv_round_trips() {
        let b = TrackEncryptionBox {
            version: 0,
            flags: 0,
            default_crypt_byte_block: 0,
            default_skip_byte_block: 0,
            default_is_protected: 1,
            default_per_sample_iv_size: 8,
            default_kid: [0xAB; 16],
            default_constant_iv: None,
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(TrackEncryptionBox::parse(&mut r).unwrap(), b);
        assert!(r.is_empty());
    }

    #[test]
    fn tenc_with_constant_iv_and_byte_blocks_round_trips() {
        let b = TrackEncryptionBox {
            version: 1,
            flags: 0,
            default_crypt_byte_block: 1,
            default_skip_byte_block: 9,
            default_is_protected: 1,
            default_per_sample_iv_size: 0,
            default_kid: [0x11; 16],
            default_constant_iv: Some(vec![0xAA; 16]),
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(TrackEncryptionBox::parse(&mut r).unwrap(), b);
    }

    #[test]
    fn pssh_version_derived_from_key_ids() {
        let b = ProtectionSystemHeaderBox {
            system_id: [0x01; 16],
            key_ids: Some(vec![[0x02; 16]]),
            data: vec![1, 2, 3],
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        assert_eq!(bytes[0], 1, "version byte should be rebuilt to 1 when key_ids present");
        let mut r = Reader::new(&bytes);
        assert_eq!(ProtectionSystemHeaderBox::parse(&mut r).unwrap(), b);
    }

    #[test]
    fn pssh_without_key_ids_uses_version_zero() {
        let b = ProtectionSystemHeaderBox {
            system_id: [0x01; 16],
            key_ids: None,
            data: vec![],
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        assert_eq!(bytes[0], 0);
        let mut r = Reader::new(&bytes);
        assert_eq!(ProtectionSystemHeaderBox::parse(&mut r).unwrap(), b);
    }

    #[test]
    fn schm_with_uri_round_trips() {
        let b = SchemeTypeBox {
            version: 0,
            flags: 1,
            scheme_type: FourCc(*b"cenc"),
            scheme_version: 0x0001_0000,
            scheme_uri: Some("urn:example:scheme".to_string()),
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(SchemeTypeBox::parse(&mut r).unwrap(), b);
    }
}
