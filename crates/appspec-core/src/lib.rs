//! appspec-core - Declarative option/argument engine
//!
//! Scripts carry a documentation block (`[OPTIONS]`, `[ARGS]`, ...) after a
//! `__DATA__` marker. This crate compiles that block into option and
//! argument tables, binds live command lines against them, and renders the
//! same tables back out as usage, help and man text.

pub mod app;
pub mod arguments;
pub mod binder;
pub mod compile;
pub mod errors;
pub mod expand;
pub mod getopt;
pub mod options;
pub mod parser;
pub mod render;
pub mod sections;
pub mod types;

pub use app::*;
pub use binder::*;
pub use compile::*;
pub use errors::*;
pub use getopt::*;
pub use render::*;
pub use types::*;
