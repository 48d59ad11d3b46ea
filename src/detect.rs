//! PDF header check for rendered and merged files.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Header information of a PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// PDF version (e.g., "1.4", "2.0")
    pub version: String,
}

/// Read the PDF header of a file.
///
/// Returns [`Error::NotPdf`] if the file is shorter than a header or does
/// not start with `%PDF-x.y`.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let path = path.as_ref();
    let mut header = Vec::with_capacity(16);
    File::open(path)?.take(16).read_to_end(&mut header)?;
    parse_header(&header).ok_or_else(|| Error::NotPdf(path.display().to_string()))
}

/// Parse a PDF header from the first bytes of a file.
pub fn parse_header(data: &[u8]) -> Option<PdfHeader> {
    let rest = data.strip_prefix(PDF_MAGIC)?;
    let version = rest.get(..VERSION_LEN)?;
    match version {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Some(PdfHeader {
                version: String::from_utf8_lossy(version).into_owned(),
            })
        }
        _ => None,
    }
}
