//! Generic higher-order helpers layered on [`crate::primitive`].
//!
//! Rust's type system gives us most of `construct`'s combinator set for
//! free: `Option<T>` is `if_then`, a plain field default is `default`,
//! `match` on a tag is `switch`, and recursive box bodies are just
//! `Box<ParsedBox>` (heap indirection standing in for `LazyBound`). What's
//! left to factor out is the handful of shapes that would otherwise be
//! copy-pasted across every schema: a count-prefixed homogeneous array, a
//! fixed-count array, and a "parse until the region is exhausted" greedy
//! sequence.

use crate::error::Result;
use crate::primitive::{Reader, Writer};

/// `prefixed_array(len_codec, inner)`: a `u32` element count followed by
/// that many homogeneous records.
pub fn prefixed_array<T>(
    r: &mut Reader,
    field: &'static str,
    mut item: impl FnMut(&mut Reader) -> Result<T>,
) -> Result<Vec<T>> {
    let count = r.u32(field)?;
    (0..count).map(|_| item(r)).collect()
}

pub fn write_prefixed_array<T>(w: &mut Writer, items: &[T], mut item: impl FnMut(&mut Writer, &T)) {
    w.u32(items.len() as u32);
    for it in items {
        item(w, it);
    }
}

/// `array(n, inner)`: a fixed count taken from another field of the same
/// structure (e.g. `trun.sample_count`, `sbgp.entry_count`).
pub fn fixed_array<T>(
    r: &mut Reader,
    count: u32,
    mut item: impl FnMut(&mut Reader) -> Result<T>,
) -> Result<Vec<T>> {
    (0..count).map(|_| item(r)).collect()
}

/// `greedy_range(inner)`: repeats `inner` until the bounded region is
/// exhausted.
pub fn greedy_range<T>(
    r: &mut Reader,
    mut item: impl FnMut(&mut Reader) -> Result<T>,
) -> Result<Vec<T>> {
    let mut out = Vec::new();
    while !r.is_empty() {
        out.push(item(r)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_array_round_trips() {
        let mut w = Writer::new();
        write_prefixed_array(&mut w, &[1u32, 2, 3], |w, v| w.u32(*v));
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        let items = prefixed_array(&mut r, "entries", |r| r.u32("entry")).unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn greedy_range_consumes_whole_region() {
        let data = [1u8, 2, 3, 4];
        let mut r = Reader::new(&data);
        let items = greedy_range(&mut r, |r| r.u8("b")).unwrap();
        assert_eq!(items, vec![1, 2, 3, 4]);
        assert!(r.is_empty());
    }
}
