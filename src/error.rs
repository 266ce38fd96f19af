use crate::fourcc::FourCc;

/// Errors produced while decoding or encoding a box tree.
///
/// Mirrors the error kinds named in the box-format specification: an
/// exhausted region, a mismatched constant field, a length prefix that
/// the body over- or under-runs, a navigation miss, and invalid UTF-8.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unexpected end of input while reading {field}")]
    UnexpectedEnd { field: &'static str },

    #[error("field {field}: expected {expected:?}, found {found:?}")]
    ConstMismatch {
        field: &'static str,
        expected: Vec<u8>,
        found: Vec<u8>,
    },

    #[error("box body overran its length prefix by {excess} byte(s)")]
    LengthOverrun { excess: u64 },

    #[error("box body left {remaining} unconsumed byte(s) inside a fully-consumed region")]
    LengthUnderrun { remaining: u64 },

    #[error("no box of type {tag} found")]
    BoxNotFound { tag: String },

    #[error("invalid UTF-8 in field {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("unsupported version {version} for field {field}")]
    UnsupportedVersion { field: &'static str, version: u8 },

    #[error("64-bit extended box length (length==1) is not supported")]
    ExtendedLengthUnsupported,

    #[error("while parsing box {tag}: {source}")]
    InBox {
        tag: FourCc,
        #[source]
        source: Box<Error>,
    },

    #[error("recursion depth limit ({limit}) exceeded")]
    DepthLimitExceeded { limit: usize },

    #[error("box count limit ({limit}) exceeded")]
    BoxCountLimitExceeded { limit: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps `self` with the tag of the box that was being parsed when it
    /// occurred, building up the schema-name trail mentioned for
    /// diagnostics without changing the underlying error kind.
    pub fn in_box(self, tag: FourCc) -> Error {
        Error::InBox {
            tag,
            source: Box::new(self),
        }
    }
}
