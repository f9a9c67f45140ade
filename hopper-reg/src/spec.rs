//  SPEC.rs
//    by Lut99
//
//  Created:
//    05 Feb 2025, 09:21:07
//  Last edited:
//    23 May 2025, 11:36:40
//  Auto updated?
//    Yes
//
//  Description:
//!   Contains (public) interfaces and structs for the `hopper-reg` crate.
//

use crate::store::ElementStore;


/***** LIBRARY *****/
/// Defines the context for all of the warp paths.
#[derive(Clone, Debug)]
pub struct Context {
    /// The element snapshot served by this registry.
    pub store: ElementStore,
}
