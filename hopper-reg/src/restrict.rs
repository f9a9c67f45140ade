//  RESTRICT.rs
//    by Lut99
//
//  Created:
//    05 Feb 2025, 10:02:19
//  Last edited:
//    23 May 2025, 11:36:40
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the site-eligibility pass over the work-queue cursor:
//!   given the set of sites with free slots and the request-scoped team
//!   and workflow restrictions, scan the rows and stream back every
//!   element that may run somewhere, as soon as it is found.
//

use std::collections::HashSet;

use specifications::workqueue::{Row, SiteResources, WorkElement};
use tracing::debug;


/***** INTERFACES *****/
/// The consumer side of the pass: something that accepts raw output fragments, in order.
///
/// The pass emits a syntactically valid JSON array through this trait, fragment by fragment, so
/// consumers can forward output long before the scan completes.
pub trait Sink {
    /// Pushes the next fragment.
    ///
    /// # Arguments
    /// - `chunk`: The raw bytes to forward.
    ///
    /// # Returns
    /// Whether the consumer is still listening. Once this returns false the pass stops, since
    /// producing more output serves nobody.
    fn send(&mut self, chunk: &[u8]) -> bool;
}

// In-memory sink, mostly for tests.
impl Sink for Vec<u8> {
    #[inline]
    fn send(&mut self, chunk: &[u8]) -> bool {
        self.extend_from_slice(chunk);
        true
    }
}





/***** LIBRARY *****/
/// Request-scoped restrictions on whose work may be handed out.
#[derive(Clone, Debug, Default)]
pub struct Filters {
    /// If non-empty, only hand out elements enqueued for one of these teams (or for no team at
    /// all).
    pub teams:     HashSet<String>,
    /// If non-empty, only hand out elements belonging to one of these workflows.
    pub workflows: HashSet<String>,
}

impl Filters {
    /// Checks whether the given element passes the team- and workflow membership checks.
    ///
    /// Elements without a team assignment always pass the team check.
    ///
    /// # Arguments
    /// - `element`: The [`WorkElement`] to examine.
    ///
    /// # Returns
    /// True if the element may be considered for any site at all, or false if it must be skipped.
    pub fn admits(&self, element: &WorkElement) -> bool {
        if !self.teams.is_empty() {
            if let Some(team) = element.team() {
                if !self.teams.contains(team) {
                    return false;
                }
            }
        }
        if !self.workflows.is_empty() && !self.workflows.contains(&element.request_name) {
            return false;
        }
        true
    }
}



/// Decides whether one site may run the given element.
///
/// The checks run in fixed order: deny-list, allow-list, the allow-list trust override, then the
/// input-, pileup- and parent-data locality checks (each with its own bypass flag; parent data
/// counts as input data and therefore shares the input bypass).
fn site_eligible(element: &WorkElement, site: &str) -> bool {
    // The deny-list wins over everything, the allow-list included
    if element.site_blacklist.contains(site) {
        return false;
    }
    // A non-empty allow-list is exhaustive
    if !element.site_whitelist.is_empty() && !element.site_whitelist.contains(site) {
        return false;
    }

    // An allow-listed site is accepted outright when the element trusts its list over locality
    if element.no_location_update && element.site_whitelist.contains(site) {
        return true;
    }

    // Every input block must be present at the site
    if !element.no_input_update {
        if let Some(inputs) = &element.inputs {
            if !inputs.values().all(|sites| sites.contains(site)) {
                return false;
            }
        }
    }

    // Same for every pileup dataset
    if !element.no_pileup_update {
        if let Some(pileup) = &element.pileup_data {
            if !pileup.values().all(|sites| sites.contains(site)) {
                return false;
            }
        }
    }

    // And, if the element asks for it, every parent block
    if !element.no_input_update && element.parent_flag {
        if let Some(parents) = &element.parent_data {
            if !parents.values().all(|sites| sites.contains(site)) {
                return false;
            }
        }
    }

    true
}

/// Finds the first site, in ascending identifier order, where the given element may run.
///
/// # Arguments
/// - `element`: The [`WorkElement`] to place.
/// - `resources`: The [`SiteResources`] naming the sites with free slots.
///
/// # Returns
/// The first eligible site, or [`None`] if no site in `resources` may run this element.
pub fn eligible_site<'r>(element: &WorkElement, resources: &'r SiteResources) -> Option<&'r str> {
    resources.sites().find(|site| site_eligible(element, site))
}

/// The streaming pass itself.
///
/// Scans the cursor front to back and emits, as one JSON array, the full document of every row
/// whose element is admitted by `filters` and eligible for at least one site in `resources`. A
/// row is emitted at most once, for the first eligible site encountered; emission order is row
/// order. The pass holds no state across calls and touches nothing but the sink.
///
/// # Arguments
/// - `rows`: The cursor to scan; consumed front to back, never rewound.
/// - `resources`: The [`SiteResources`] naming the sites with free slots. If empty, no rows are
///   consumed and the output is the empty array.
/// - `filters`: The request-scoped team/workflow [`Filters`].
/// - `sink`: The [`Sink`] receiving the output fragments.
pub fn restrict_work(rows: impl IntoIterator<Item = Row>, resources: &SiteResources, filters: &Filters, sink: &mut impl Sink) {
    if !sink.send(b"[") {
        return;
    }

    // Without sites to satisfy there is nothing to scan for
    if !resources.is_empty() {
        let mut first: bool = true;
        for row in rows {
            // Tombstones contribute nothing
            let Some(doc) = row.doc else { continue };

            // Team- and workflow membership are per-row checks; one miss skips the row for all
            // sites
            if !filters.admits(doc.element()) {
                continue;
            }

            // The first eligible site settles the row
            if let Some(site) = eligible_site(doc.element(), resources) {
                debug!("Work element '{}' is eligible for site '{site}'", row.id);
                if !first && !sink.send(b",") {
                    return;
                }
                if !sink.send(&doc.to_bytes()) {
                    return;
                }
                first = false;
            }
        }
    }

    sink.send(b"]");
}





/***** TESTS *****/
