//! Shared types and helpers for the Folio agent system.
//!
//! Every crate that decodes JSON received from the network goes through
//! [`from_json_str`] or [`from_json_slice`], which drop unpaired UTF-16
//! surrogate escapes before handing the text to `serde_json`.

pub mod json;

pub use json::{from_json_slice, from_json_str, strip_surrogates};
