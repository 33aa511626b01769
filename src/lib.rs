//! LingFlow core — the selection-to-annotation pipeline and the
//! review scheduler behind a word-highlighting reading app.
//!
//! The rendering surface, markdown pipeline and routing live in the
//! host shell; this crate owns everything with actual logic in it:
//! selection validation, gesture disambiguation, popover geometry,
//! the annotation session, content-addressed article storage, and
//! the vocabulary store with its review rotation.

pub mod hash;
pub mod select;
pub mod gesture;
pub mod popover;
pub mod explain;
pub mod session;
pub mod store;
pub mod net;
pub mod app;
