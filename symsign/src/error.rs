use std::io;

use thiserror::Error;

/// The kind of a [`SymsignError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SymsignErrorKind {
    /// The file does not match any supported container shape.
    #[error("file is not a recognized symbol or binary format")]
    InvalidFormat,
    /// The path does not exist as a regular file, or the file is empty.
    #[error("file is missing or empty")]
    MissingOrEmptyFile,
    /// The format was recognized, but the requested operation does not
    /// support it.
    #[error("format is not supported by this operation")]
    UnsupportedVariant,
    /// The source descriptor document is missing, empty or unparsable.
    #[error("source descriptor is empty or malformed")]
    MalformedDescriptor,
    /// A signature dump was requested without an output path.
    #[error("output file path is empty")]
    EmptyOutputPath,
    /// A signature dump produced no entries.
    #[error("nothing to dump")]
    NothingToDump,
    /// The external source-link patch primitive reported failure.
    #[error("source link patch tool failed")]
    PatchFailed,
    /// Any other internal failure, such as an I/O error mid-read.
    #[error("unexpected failure")]
    Unexpected,
}

/// An error produced by a symsign operation.
///
/// Carries a [`SymsignErrorKind`] plus an optional causing error. The kind
/// decides how batch operations treat the failure, see
/// [`is_recoverable`](Self::is_recoverable).
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct SymsignError {
    kind: SymsignErrorKind,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl SymsignError {
    /// Creates a new error from a known kind and an arbitrary payload.
    pub fn new<E>(kind: SymsignErrorKind, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let source = Some(source.into());
        Self { kind, source }
    }

    /// Returns the corresponding [`SymsignErrorKind`] for this error.
    pub fn kind(&self) -> SymsignErrorKind {
        self.kind
    }

    /// Whether a batch operation may skip the offending path and continue.
    ///
    /// Missing, empty, unrecognized or unsupported inputs reduce the result
    /// set of a batch without aborting it. Everything else aborts.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind,
            SymsignErrorKind::InvalidFormat
                | SymsignErrorKind::MissingOrEmptyFile
                | SymsignErrorKind::UnsupportedVariant
        )
    }
}

impl From<SymsignErrorKind> for SymsignError {
    fn from(kind: SymsignErrorKind) -> Self {
        Self { kind, source: None }
    }
}

impl From<io::Error> for SymsignError {
    fn from(e: io::Error) -> Self {
        Self::new(SymsignErrorKind::Unexpected, e)
    }
}

impl From<pdb::Error> for SymsignError {
    fn from(e: pdb::Error) -> Self {
        Self::new(SymsignErrorKind::InvalidFormat, e)
    }
}

impl From<goblin::error::Error> for SymsignError {
    fn from(e: goblin::error::Error) -> Self {
        Self::new(SymsignErrorKind::InvalidFormat, e)
    }
}

impl From<scroll::Error> for SymsignError {
    fn from(e: scroll::Error) -> Self {
        Self::new(SymsignErrorKind::InvalidFormat, e)
    }
}

impl From<symbolic_ppdb::FormatError> for SymsignError {
    fn from(e: symbolic_ppdb::FormatError) -> Self {
        Self::new(SymsignErrorKind::InvalidFormat, e)
    }
}

impl From<serde_json::Error> for SymsignError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(SymsignErrorKind::MalformedDescriptor, e)
    }
}
