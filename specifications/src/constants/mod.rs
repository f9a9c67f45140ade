//! Constants
//!
//! This file is a collection of constants that may be used throughout the Hopper codebase.
//! Using this file we can change defaults on various parts of the infrastructure without modifying
//! a whole bunch of files and inevitably missing one.

/// The default port on which the registry serves its API.
pub const HOPPER_REG_PORT: u16 = 50250;

/// The canonical name of the registry service.
pub const HOPPER_REG_NAME: &str = "hopper-reg";

/// The member of a stored document under which the work element lives.
pub const ELEMENT_MEMBER: &str = "element";

/// The member of a stored document carrying its identifier.
pub const ID_MEMBER: &str = "_id";
/// The member of a stored document carrying its revision.
pub const REV_MEMBER: &str = "_rev";
/// The member marking a stored document as a tombstone.
pub const DELETED_MEMBER: &str = "_deleted";
