//! `ftyp` / `styp`: brand and compatibility-brand list, identical shape for
//! both the file-level and segment-level variant.

use crate::combinator::greedy_range;
use crate::error::Result;
use crate::fourcc::FourCc;
use crate::primitive::{Reader, Writer};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileTypeBox {
    pub major_brand: FourCc,
    pub minor_version: u32,
    pub compatible_brands: Vec<FourCc>,
}

impl FileTypeBox {
    pub fn parse(r: &mut Reader) -> Result<Self> {
        let major_brand = FourCc(r.bytes_exact::<4>("major_brand")?);
        let minor_version = r.u32("minor_version")?;
        let compatible_brands = greedy_range(r, |r| Ok(FourCc(r.bytes_exact::<4>("compatible_brand")?)))?;
        Ok(FileTypeBox {
            major_brand,
            minor_version,
            compatible_brands,
        })
    }

    pub fn encode(&self, w: &mut Writer) {
        w.bytes(self.major_brand.as_bytes());
        w.u32(self.minor_version);
        for b in &self.compatible_brands {
            w.bytes(b.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_with_no_compatible_brands() {
        let b = FileTypeBox {
            major_brand: FourCc(*b"isom"),
            minor_version: 512,
            compatible_brands: vec![],
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(FileTypeBox::parse(&mut r).unwrap(), b);
    }

    #[test]
    fn round_trips_with_compatible_brands() {
        let b = FileTypeBox {
            major_brand: FourCc(*b"isom"),
            minor_version: 1,
            compatible_brands: vec![FourCc(*b"iso2"), FourCc(*b"avc1"), FourCc(*b"mp41")],
        };
        let mut w = Writer::new();
        b.encode(&mut w);
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        assert_eq!(FileTypeBox::parse(&mut r).unwrap(), b);
    }
}
