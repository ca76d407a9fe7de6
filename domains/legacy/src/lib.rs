//! Legacy domain: read-only course import from the old CMS database
//!
//! The old site stored courses as generic content nodes with a satellite
//! table of course fields, group-membership rows, taxonomy terms and a
//! URL alias table mapping node IDs to slugs. This crate translates those
//! rows into plain course values for the one-time import flows; it never
//! writes to the legacy database.

pub mod adapter;
pub mod rows;

pub use adapter::{
    LegacyConfig, LegacyCourse, LegacyCourses, LegacyError, PastCourse, COMPLETE_STATUS,
    COURSE_NODE_TYPE,
};
