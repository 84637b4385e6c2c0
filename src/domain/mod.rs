//! Domain types for callscribe.
//!
//! This module contains the plain data passed between stages:
//! - SearchKey: phone/timestamp pair parsed from the search term
//! - ObjectInfo / ObjectRef: remote objects and their naming rules
//! - Report: the JSON result printed once per invocation

pub mod object;
pub mod report;
pub mod search;

// Re-export commonly used types
pub use object::{converted_file_name, converted_object_name, ObjectInfo, ObjectRef};
pub use report::Report;
pub use search::SearchKey;
