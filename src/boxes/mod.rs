//! One module per schema family, grouped the way the boxes themselves
//! nest in a real file: file-level brands, the `moov` header boxes,
//! per-track headers and media descriptions, the sample tables, sample
//! entries and their codec descriptors, fragmentation, encryption, and
//! the unrelated Adobe HDS bootstrap family.

pub mod encryption;
pub mod file_type;
pub mod fragment;
pub mod hds;
pub mod media;
pub mod movie;
pub mod sample_entry;
pub mod sample_table;
pub mod track;
