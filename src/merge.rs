//! Merging a course's lecture PDFs into one document.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::{discard, partial_path};

/// Result of a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MergeOutcome {
    /// No input files; nothing was written.
    Empty,

    /// The output file was written.
    Merged { inputs: usize, pages: usize },

    /// Merging failed; any earlier output file was left untouched.
    Failed { error: String },
}

impl MergeOutcome {
    /// Whether the output file was (re)written.
    pub fn is_written(&self) -> bool {
        matches!(self, MergeOutcome::Merged { .. })
    }
}

/// Append the pages of `inputs`, in order, into `output`.
///
/// Never returns an error: failures are logged and reported as
/// [`MergeOutcome::Failed`].
pub fn merge<P: AsRef<Path>>(inputs: &[P], output: &Path) -> MergeOutcome {
    if inputs.is_empty() {
        log::warn!("No files to merge into {}", output.display());
        return MergeOutcome::Empty;
    }

    match merge_files(inputs, output) {
        Ok(pages) => {
            log::info!("Merged: {} ({} pages)", output.display(), pages);
            MergeOutcome::Merged {
                inputs: inputs.len(),
                pages,
            }
        }
        Err(e) => {
            log::error!("Failed to merge PDF {}: {}", output.display(), e);
            MergeOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

fn merge_files<P: AsRef<Path>>(inputs: &[P], output: &Path) -> Result<usize> {
    let mut documents = Vec::with_capacity(inputs.len());
    for input in inputs {
        let path = input.as_ref();
        let doc = LopdfDocument::load(path)
            .map_err(|e| Error::Pdf(format!("{}: {}", path.display(), e)))?;
        documents.push(doc);
    }

    let mut merged = concatenate(documents)?;
    let pages = merged.get_pages().len();

    let partial = partial_path(output);
    if let Err(e) = merged.save(&partial) {
        discard(&partial);
        return Err(Error::Pdf(e.to_string()));
    }
    fs::rename(&partial, output)?;
    Ok(pages)
}

/// Build one document holding every page of `documents` in order.
pub fn concatenate(documents: Vec<LopdfDocument>) -> Result<LopdfDocument> {
    let mut merged = LopdfDocument::with_version("1.5");
    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        // get_pages is keyed by page number, so this keeps reading order.
        for page_id in doc.get_pages().into_values() {
            let mut page = doc.get_dictionary(page_id)?.clone();
            inherit_attributes(&doc, &mut page);
            pages.push((page_id, page));
        }

        for (id, object) in doc.objects {
            match type_name(&object) {
                Some(b"Catalog") | Some(b"Pages") | Some(b"Page") | Some(b"Outlines")
                | Some(b"Outline") => {}
                _ => {
                    merged.objects.insert(id, object);
                }
            }
        }
    }

    if pages.is_empty() {
        return Err(Error::Pdf("input documents have no pages".to_string()));
    }

    let pages_id = (max_id, 0);
    let catalog_id = (max_id + 1, 0);

    let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
    let count = pages.len() as i64;

    for (id, mut page) in pages {
        page.set("Parent", Object::Reference(pages_id));
        merged.objects.insert(id, Object::Dictionary(page));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", Object::Integer(count));
    merged.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    merged.objects.insert(catalog_id, Object::Dictionary(catalog));

    merged.trailer.set("Root", Object::Reference(catalog_id));
    merged.max_id = catalog_id.0;
    merged.renumber_objects();
    merged.compress();

    Ok(merged)
}

/// Copy attributes a page inherits from its page-tree ancestors.
///
/// The ancestors are dropped from the merged document, so the page has to
/// carry them itself.
fn inherit_attributes(doc: &LopdfDocument, page: &mut Dictionary) {
    const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];
    const MAX_DEPTH: usize = 32;

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    for _ in 0..MAX_DEPTH {
        let Some(node) = parent.and_then(|id| doc.get_dictionary(id).ok()) else {
            break;
        };
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
}

/// The `/Type` name of a dictionary or stream object.
fn type_name(object: &Object) -> Option<&[u8]> {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return None,
    };
    dict.get(b"Type").ok().and_then(|t| t.as_name().ok())
}

/// Collect existing files among `paths`, preserving order.
pub fn existing_inputs<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    paths
        .iter()
        .map(|p| p.as_ref().to_path_buf())
        .filter(|p| p.is_file())
        .collect()
}
