//! Form-field state machines.

pub mod image;
