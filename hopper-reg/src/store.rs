//  STORE.rs
//    by Lut99
//
//  Created:
//    05 Feb 2025, 09:36:44
//  Last edited:
//    23 May 2025, 11:36:40
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the element store: an immutable, in-memory snapshot of
//!   the work-queue documents, loaded from disk at startup. Its cursor
//!   yields rows in descending priority order, ties broken by document
//!   identifier, which is the order in which work is offered to sites.
//

use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use specifications::constants::{DELETED_MEMBER, ID_MEMBER, REV_MEMBER};
use specifications::workqueue::{DocumentParseError, Row, WorkDocument};
use thiserror::Error;
use tracing::debug;


/***** ERRORS *****/
/// Errors that relate to loading an [`ElementStore`].
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read the snapshot file at all.
    #[error("Failed to read element snapshot '{}'", path.display())]
    SnapshotRead { path: PathBuf, source: std::io::Error },
    /// The snapshot file was not valid JSON.
    #[error("Failed to parse element snapshot '{}' as JSON", path.display())]
    SnapshotParse { path: PathBuf, source: serde_json::Error },
    /// The snapshot file was valid JSON but not an array of documents.
    #[error("Element snapshot '{}' is not a JSON array", path.display())]
    SnapshotShape { path: PathBuf },
    /// A document in the snapshot had no usable identifier.
    #[error("Document {index} in element snapshot '{}' has no {ID_MEMBER:?} member", path.display())]
    DocumentId { path: PathBuf, index: usize },
    /// A document in the snapshot did not carry a parseable work element.
    #[error("Failed to parse document '{id}' in element snapshot '{}'", path.display())]
    Document { path: PathBuf, id: String, source: DocumentParseError },
}





/***** LIBRARY *****/
/// An immutable snapshot of the work-queue documents.
///
/// Rows are fixed in cursor order at load time; every call to [`ElementStore::rows()`] replays
/// the same sequence.
#[derive(Clone, Debug)]
pub struct ElementStore {
    /// The rows, in cursor order.
    rows: Vec<Row>,
}

impl ElementStore {
    /// Loads the snapshot at the given path.
    ///
    /// The file must contain a JSON array of documents. Every document needs an `_id`; documents
    /// marked `_deleted` become tombstone rows, all others must carry a work element.
    ///
    /// # Arguments
    /// - `path`: The path of the snapshot file to load.
    ///
    /// # Returns
    /// A new ElementStore with its rows in cursor order.
    ///
    /// # Errors
    /// This function errors if the file could not be read, was not a JSON array or any document
    /// in it was malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path: &Path = path.as_ref();

        // Get the raw document list in memory
        let raw: String = fs::read_to_string(path).map_err(|source| Error::SnapshotRead { path: path.into(), source })?;
        let docs: Value = serde_json::from_str(&raw).map_err(|source| Error::SnapshotParse { path: path.into(), source })?;
        let docs: Vec<Value> = match docs {
            Value::Array(docs) => docs,
            _ => return Err(Error::SnapshotShape { path: path.into() }),
        };

        // Wrap every document in a row
        let mut rows: Vec<Row> = Vec::with_capacity(docs.len());
        for (index, raw) in docs.into_iter().enumerate() {
            // The identifier & revision live at the document toplevel
            let id: String = match raw.get(ID_MEMBER).and_then(Value::as_str) {
                Some(id) => id.into(),
                None => return Err(Error::DocumentId { path: path.into(), index }),
            };
            let rev: String = raw.get(REV_MEMBER).and_then(Value::as_str).unwrap_or_default().into();

            // Tombstones keep their metadata but carry no document
            if raw.get(DELETED_MEMBER).and_then(Value::as_bool).unwrap_or(false) {
                debug!("Document '{id}' is a tombstone");
                rows.push(Row { id, rev, doc: None });
                continue;
            }

            let doc: WorkDocument = match WorkDocument::from_value(&id, raw) {
                Ok(doc) => doc,
                Err(source) => return Err(Error::Document { path: path.into(), id, source }),
            };
            rows.push(Row { id, rev, doc: Some(doc) });
        }

        // Fix the cursor order: highest priority first, identifier as tiebreaker
        rows.sort_by_key(|row| (Reverse(row.doc.as_ref().map(|doc| doc.element().priority).unwrap_or_default()), row.id.clone()));

        debug!("Loaded {} row(s) from '{}'", rows.len(), path.display());
        Ok(Self { rows })
    }

    /// Returns the cursor over this snapshot: a forward-only, finite sequence of [`Row`]s.
    #[inline]
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ { self.rows.iter().cloned() }

    /// Returns the number of live (non-tombstone) elements in this snapshot.
    #[inline]
    pub fn count(&self) -> usize { self.rows.iter().filter(|row| row.doc.is_some()).count() }

    /// Returns the total number of rows, tombstones included.
    #[inline]
    pub fn len(&self) -> usize { self.rows.len() }

    /// Returns whether the snapshot holds no rows at all.
    #[inline]
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}





/***** TESTS *****/
