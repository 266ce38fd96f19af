//! Tree navigation: depth-first search for the first box of a type,
//! direct-child lookup, an enumerate-with-optional-delete walk, and a
//! `uuid` extended-type search. These mirror the four lookup helpers a
//! box-tree library built on `construct` exposes as a small `BoxUtil`
//! class rather than tree methods, kept here as free functions so
//! [`ParsedBox`] itself stays a plain data type.

use crate::error::Error;
use crate::fourcc::FourCc;
use crate::tree::{child_lists_mut, BoxBody, ParsedBox};

/// Depth-first search for the first box of type `tag`, recursing into
/// containers and into non-container box kinds that nonetheless own
/// nested boxes (sample-entry `children`, HDS `abst`'s run tables), via
/// [`ParsedBox::children`]. Fails with [`Error::BoxNotFound`] rather
/// than returning `Option` because callers generally treat a missing
/// required box as an error, not a branch to handle inline.
pub fn first<'a>(boxes: &'a [ParsedBox], tag: FourCc) -> Result<&'a ParsedBox, Error> {
    fn walk<'a>(boxes: impl IntoIterator<Item = &'a ParsedBox>, tag: FourCc) -> Option<&'a ParsedBox> {
        for b in boxes {
            if b.tag == tag {
                return Some(b);
            }
            if let Some(found) = walk(b.children(), tag) {
                return Some(found);
            }
        }
        None
    }
    walk(boxes, tag).ok_or(Error::BoxNotFound { tag: tag.to_string() })
}

/// Index of the first *direct* child matching `tag`, or `None`.
pub fn index(boxes: &[ParsedBox], tag: FourCc) -> Option<usize> {
    boxes.iter().position(|b| b.tag == tag)
}

/// Depth-first search for every box matching `extended_type` under a
/// `uuid` tag, descending through [`ParsedBox::children`] the same way
/// [`first`] does (so a PIFF `uuid` box nested inside a sample entry or
/// an `abst` run table is still found).
pub fn find_extended<'a>(boxes: &'a [ParsedBox], extended_type: [u8; 16]) -> Vec<&'a ParsedBox> {
    fn walk<'a>(boxes: impl IntoIterator<Item = &'a ParsedBox>, extended_type: [u8; 16], out: &mut Vec<&'a ParsedBox>) {
        for b in boxes {
            if let BoxBody::Uuid { extended_type: et, .. } = &b.body {
                if *et == extended_type {
                    out.push(b);
                }
            }
            walk(b.children(), extended_type, out);
        }
    }
    let mut out = Vec::new();
    walk(boxes, extended_type, &mut out);
    out
}

/// Depth-first enumeration of every box matching `tag`, recursing into
/// containers and the same non-container, box-owning kinds
/// [`ParsedBox::children`] descends into, and, when `delete` is `true`,
/// removing matches from the tree as they're found. Returns the matched
/// boxes (owned, since deleted entries can no longer be borrowed from
/// the tree they were removed from).
pub fn find(boxes: &mut Vec<ParsedBox>, tag: FourCc, delete: bool) -> Vec<ParsedBox> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < boxes.len() {
        let matched = boxes[i].tag == tag;
        if matched && delete {
            out.push(boxes.remove(i));
            continue;
        }
        if matched {
            out.push(boxes[i].clone());
        }
        for list in child_lists_mut(&mut boxes[i].body) {
            out.extend(find(list, tag, delete));
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxes::file_type::FileTypeBox;

    fn leaf(tag: &[u8; 4]) -> ParsedBox {
        ParsedBox {
            tag: FourCc(*tag),
            body: BoxBody::FileType(FileTypeBox {
                major_brand: FourCc(*b"isom"),
                minor_version: 0,
                compatible_brands: vec![],
            }),
        }
    }

    fn container(tag: &[u8; 4], children: Vec<ParsedBox>) -> ParsedBox {
        ParsedBox {
            tag: FourCc(*tag),
            body: BoxBody::Container(children),
        }
    }

    #[test]
    fn first_finds_nested_box() {
        let tree = vec![container(b"moov", vec![leaf(b"mvhd"), container(b"trak", vec![leaf(b"tkhd")])])];
        assert_eq!(first(&tree, FourCc(*b"tkhd")).unwrap().tag, FourCc(*b"tkhd"));
    }

    #[test]
    fn first_errors_when_missing() {
        let tree = vec![leaf(b"ftyp")];
        assert!(matches!(first(&tree, FourCc(*b"moov")), Err(Error::BoxNotFound { .. })));
    }

    #[test]
    fn index_only_matches_direct_children() {
        let tree = vec![leaf(b"ftyp"), container(b"moov", vec![leaf(b"mvhd")])];
        assert_eq!(index(&tree, FourCc(*b"moov")), Some(1));
        assert_eq!(index(&tree, FourCc(*b"mvhd")), None);
    }

    #[test]
    fn find_without_delete_collects_all_matches() {
        let mut tree = vec![container(
            b"moov",
            vec![
                container(b"trak", vec![leaf(b"tkhd")]),
                container(b"trak", vec![leaf(b"tkhd")]),
            ],
        )];
        let matches = find(&mut tree, FourCc(*b"tkhd"), false);
        assert_eq!(matches.len(), 2);
        assert_eq!(first(&tree, FourCc(*b"tkhd")).unwrap().tag, FourCc(*b"tkhd"));
    }

    #[test]
    fn find_with_delete_removes_matches_from_the_tree() {
        let mut tree = vec![container(b"moov", vec![leaf(b"free"), leaf(b"mvhd")])];
        let removed = find(&mut tree, FourCc(*b"free"), true);
        assert_eq!(removed.len(), 1);
        assert_eq!(tree[0].children().len(), 1);
        assert_eq!(tree[0].children()[0].tag, FourCc(*b"mvhd"));
    }

    #[test]
    fn first_and_find_descend_into_sample_entry_children() {
        use crate::boxes::sample_entry::{BitRateBox, SampleDescriptionBox, SampleEntry, SampleEntryKind};

        let btrt = ParsedBox {
            tag: FourCc(*b"btrt"),
            body: BoxBody::BitRate(BitRateBox {
                buffer_size_db: 0,
                max_bitrate: 1,
                avg_bitrate: 1,
            }),
        };
        let entry = SampleEntry {
            format: FourCc(*b"avc1"),
            data_reference_index: 1,
            kind: SampleEntryKind::Generic,
            children: vec![btrt],
        };
        let mut tree = vec![ParsedBox {
            tag: FourCc(*b"stsd"),
            body: BoxBody::SampleDescription(SampleDescriptionBox {
                version: 0,
                flags: 0,
                entries: vec![entry],
            }),
        }];

        assert_eq!(first(&tree, FourCc(*b"btrt")).unwrap().tag, FourCc(*b"btrt"));
        let removed = find(&mut tree, FourCc(*b"btrt"), true);
        assert_eq!(removed.len(), 1);
        assert!(first(&tree, FourCc(*b"btrt")).is_err());
    }
}
