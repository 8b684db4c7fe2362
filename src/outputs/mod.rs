//! Output generation.
//!
//! # Submodules
//!
//! - [`rss`]: serializes feed items into an RSS 2.0 document
//!
//! The update-check report needs no module of its own: it is the
//! [`UpdateReport`](crate::models::UpdateReport) model rendered with
//! `serde_json`.

pub mod rss;
