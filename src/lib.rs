//! Bidirectional parser and serializer for ISO Base Media File Format
//! (ISO/IEC 14496-12) boxes: a container format used by MP4, fragmented
//! MP4, CMAF/DASH segments, and Adobe HDS bootstrap files.
//!
//! [`ParsedBox::parse`] turns a byte slice into a tree of [`ParsedBox`]
//! nodes; [`ParsedBox::encode`] turns it back into bytes. Every schema
//! this crate knows about round-trips byte-for-byte, field widths and
//! reserved padding included, so a file can be parsed, inspected or
//! edited through [`navigate`], and re-encoded without drifting from
//! its original layout in unrelated boxes.
//!
//! ```no_run
//! # fn main() -> Result<(), isobmff::error::Error> {
//! let data = std::fs::read("clip.mp4").unwrap();
//! let boxes = isobmff::ParsedBox::parse(&data)?;
//! let ftyp = isobmff::navigate::first(&boxes, isobmff::fourcc::tag::FTYP)?;
//! println!("{ftyp:?}");
//! # Ok(())
//! # }
//! ```

pub mod boxes;
pub mod combinator;
pub mod error;
pub mod fourcc;
pub mod navigate;
pub mod primitive;
pub mod tree;

pub use error::{Error, Result};
pub use fourcc::FourCc;
pub use tree::{BoxBody, ParseLimits, ParsedBox, UuidBody};
