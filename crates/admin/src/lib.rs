//! Sundry admin editing glue.
//!
//! This crate holds the admin-side logic that sits between an operator's
//! edits and the item API: the [`item_edit::EditSession`] dirty-tracking
//! and save/delete flows, and the [`fields::image`] form-field state
//! machine. It performs no rendering and no I/O of its own; everything
//! external goes through the [`api::ItemApi`] seam.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod fields;
pub mod item_edit;
pub mod notice;
