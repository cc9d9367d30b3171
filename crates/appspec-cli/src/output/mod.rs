//! Output formatting modules

pub mod colors;
pub mod human;
pub mod json;
