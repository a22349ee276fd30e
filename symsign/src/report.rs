//! Bulk signature dumping and the signature report format.
//!
//! The report is the hand-off point to the symbol-server indexer: one XML
//! element per successfully extracted signature. Paths that cannot produce
//! a signature (missing, empty, unrecognized or unsupported files) are
//! logged and left out; they never fail the batch.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use elementtree::Element;

use crate::error::{SymsignError, SymsignErrorKind};
use crate::signature::{binary_signature, symbol_signature};

/// Which extractor a bulk dump runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureKind {
    /// Symbol-file signatures (GUID + age).
    Symbol,
    /// Executable signatures (timestamp + image size).
    Binary,
}

/// One persisted unit of a signature report.
#[derive(Clone, Debug)]
pub struct SignatureReportEntry {
    /// The input path the signature was extracted from.
    pub path: PathBuf,
    /// The signature value: the GUID core for symbol files, the
    /// timestamp/image-size value for binaries.
    pub sign: String,
    /// The full GUID-plus-age signature, for symbol files only.
    pub full_sign: Option<String>,
}

/// Loads target file paths from a list file, one path per line.
///
/// Blank lines are dropped and duplicate paths collapsed, keeping the first
/// occurrence.
pub fn load_path_list(path: &Path) -> Result<Vec<PathBuf>, SymsignError> {
    let contents = fs::read_to_string(path)?;
    let mut seen = HashSet::new();

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_owned()))
        .map(PathBuf::from)
        .collect())
}

fn extract(path: &Path, kind: SignatureKind) -> Result<SignatureReportEntry, SymsignError> {
    let (sign, full_sign) = match kind {
        SignatureKind::Symbol => {
            let signature = symbol_signature(path)?;
            (
                signature.core().to_owned(),
                Some(signature.full().to_owned()),
            )
        }
        SignatureKind::Binary => (binary_signature(path)?.as_str().to_owned(), None),
    };

    Ok(SignatureReportEntry {
        path: path.to_owned(),
        sign,
        full_sign,
    })
}

/// Runs the selected extractor over all paths and persists the results.
///
/// Recoverable per-path failures are logged to the diagnostic stream and
/// excluded from the report; unexpected failures abort the whole batch.
/// Fails without touching the output when the output path is empty or no
/// path produced a signature. Returns the number of dumped entries.
pub fn dump_signatures(
    output: &Path,
    paths: &[PathBuf],
    kind: SignatureKind,
) -> Result<usize, SymsignError> {
    if output.as_os_str().is_empty() {
        return Err(SymsignErrorKind::EmptyOutputPath.into());
    }

    let mut entries = BTreeMap::new();
    for path in paths {
        match extract(path, kind) {
            Ok(entry) => {
                entries.insert(path.clone(), entry);
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!(path = %path.display(), error = %err, "skipping file");
            }
            Err(err) => return Err(err),
        }
    }

    if entries.is_empty() {
        return Err(SymsignErrorKind::NothingToDump.into());
    }

    write_report(output, entries.values())?;
    Ok(entries.len())
}

fn write_report<'a, I>(output: &Path, entries: I) -> Result<(), SymsignError>
where
    I: IntoIterator<Item = &'a SignatureReportEntry>,
{
    let mut root = Element::new("file-signs");
    for entry in entries {
        let file_name = entry
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let element = root.append_new_child("file-sign-entry");
        element.set_attr("file-path", entry.path.to_string_lossy());
        element.set_attr("file", file_name);
        element.set_attr("sign", entry.sign.as_str());
        if let Some(ref full_sign) = entry.full_sign {
            element.set_attr("full-sign", full_sign.as_str());
        }
    }

    let mut file = fs::File::create(output)?;
    root.to_writer(&mut file)
        .map_err(|e| SymsignError::new(SymsignErrorKind::Unexpected, e))?;
    file.flush()?;

    Ok(())
}
