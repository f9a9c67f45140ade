//  WORKQUEUE.rs
//    by Lut99
//
//  Created:
//    03 Feb 2025, 10:26:18
//  Last edited:
//    22 May 2025, 10:02:55
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the work-queue data model: the work element with its site
//!   restrictions, the document wrapper that is handed out verbatim, the
//!   row as produced by the element store, and the set of sites with
//!   free slots as supplied by callers.
//

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::ELEMENT_MEMBER;


/***** ERRORS *****/
/// Errors that relate to interpreting stored documents as [`WorkDocument`]s.
#[derive(Debug, Error)]
pub enum DocumentParseError {
    /// The document was not a JSON object to begin with.
    #[error("Document '{id}' is not a JSON object")]
    NotAnObject { id: String },
    /// The document had no element member.
    #[error("Document '{id}' has no {ELEMENT_MEMBER:?} member")]
    MissingElement { id: String },
    /// The element member was there but did not describe a work element.
    #[error("Failed to deserialize the {ELEMENT_MEMBER:?} member of document '{id}'")]
    IllegalElement { id: String, source: serde_json::Error },
}





/***** LIBRARY *****/
/// A unit of schedulable work, as far as site eligibility is concerned.
///
/// This is the typed view on a stored document's element member. Fields not listed here (sizes,
/// bookkeeping, whatever else the producer wrote) survive untouched in the surrounding
/// [`WorkDocument`], which is what gets handed out.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct WorkElement {
    /// The team this element was enqueued for, if any.
    pub team_name: Option<String>,
    /// The name of the workflow (request) that spawned this element.
    pub request_name: String,

    /// Sites where this element must never run.
    pub site_blacklist: HashSet<String>,
    /// If non-empty, the only sites where this element may run.
    pub site_whitelist: HashSet<String>,

    /// Trust the whitelist over any locality information: a whitelisted site is accepted without
    /// further checks.
    pub no_location_update: bool,
    /// Disables the input-data locality check (and with it, the parent-data check).
    pub no_input_update: bool,
    /// Disables the pileup-data locality check.
    pub no_pileup_update: bool,

    /// Input block -> sites that hold it.
    pub inputs: Option<HashMap<String, HashSet<String>>>,
    /// Pileup dataset -> sites that hold it.
    pub pileup_data: Option<HashMap<String, HashSet<String>>>,
    /// Whether parent blocks must be co-located too.
    pub parent_flag: bool,
    /// Parent block -> sites that hold it.
    pub parent_data: Option<HashMap<String, HashSet<String>>>,

    /// Scheduling priority. Only the store's row order looks at this.
    pub priority: i64,
}

impl WorkElement {
    /// Returns whether this element carries a team assignment.
    ///
    /// An empty string counts as unassigned, matching how producers leave the field blank.
    #[inline]
    pub fn team(&self) -> Option<&str> { self.team_name.as_deref().filter(|team| !team.is_empty()) }
}



/// A stored document: the verbatim payload plus the typed [`WorkElement`] view on it.
///
/// Emission always writes the retained payload, so callers get the full document back (`_id`,
/// `_rev` and any members this crate knows nothing about included).
#[derive(Clone, Debug)]
pub struct WorkDocument {
    /// The document exactly as stored.
    raw:     Value,
    /// The parsed element member.
    element: WorkElement,
}

impl WorkDocument {
    /// Constructor for the WorkDocument that parses the element member out of a stored document.
    ///
    /// # Arguments
    /// - `id`: The identifier of the document, used for error reporting only.
    /// - `raw`: The full document [`Value`], retained verbatim for emission.
    ///
    /// # Returns
    /// A new WorkDocument wrapping `raw`.
    ///
    /// # Errors
    /// This function errors if `raw` is not an object, has no element member or that member does
    /// not describe a [`WorkElement`].
    pub fn from_value(id: impl Into<String>, raw: Value) -> Result<Self, DocumentParseError> {
        let id: String = id.into();

        // Dig out the element member
        let element: &Value = match raw.as_object() {
            Some(doc) => match doc.get(ELEMENT_MEMBER) {
                Some(element) => element,
                None => return Err(DocumentParseError::MissingElement { id }),
            },
            None => return Err(DocumentParseError::NotAnObject { id }),
        };

        // Then give it the typed treatment
        let element: WorkElement = match serde_json::from_value(element.clone()) {
            Ok(element) => element,
            Err(source) => return Err(DocumentParseError::IllegalElement { id, source }),
        };
        Ok(Self { raw, element })
    }

    /// Provides access to the typed element view.
    #[inline]
    pub fn element(&self) -> &WorkElement { &self.element }

    /// Provides access to the verbatim payload.
    #[inline]
    pub fn raw(&self) -> &Value { &self.raw }

    /// Renders the verbatim payload as compact JSON bytes, ready for emission.
    #[inline]
    pub fn to_bytes(&self) -> Vec<u8> { self.raw.to_string().into_bytes() }
}



/// A row as yielded by the element store's cursor.
#[derive(Clone, Debug)]
pub struct Row {
    /// The document identifier.
    pub id:  String,
    /// The document revision.
    pub rev: String,
    /// The document itself, or [`None`] for a tombstone.
    pub doc: Option<WorkDocument>,
}



/// The set of sites with free execution slots, as supplied by the caller.
///
/// Keys are site identifiers; the values are opaque free-slot indicators that are never
/// inspected. The map is ordered so that site iteration (and with it, output) is deterministic.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SiteResources(pub BTreeMap<String, Value>);

impl SiteResources {
    /// Iterates over the site identifiers, in ascending order.
    #[inline]
    pub fn sites(&self) -> impl Iterator<Item = &str> { self.0.keys().map(String::as_str) }
}

impl FromStr for SiteResources {
    type Err = serde_json::Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> { serde_json::from_str(s).map(Self) }
}

impl Deref for SiteResources {
    type Target = BTreeMap<String, Value>;

    #[inline]
    fn deref(&self) -> &Self::Target { &self.0 }
}
impl DerefMut for SiteResources {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0 }
}

impl From<BTreeMap<String, Value>> for SiteResources {
    #[inline]
    fn from(value: BTreeMap<String, Value>) -> Self { Self(value) }
}





/***** TESTS *****/
