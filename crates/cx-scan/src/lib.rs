//! Scanner orchestration (C4): file discovery, auto-exclusion,
//! language detection, two-pass entity/dependency extraction, and the
//! incremental-skip + archival lifecycle, on top of `cx-parse` (C1),
//! `cx-extract` (C2/C3) and `cx-store` (C5).

#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

pub mod exclude;
pub mod language_detect;
pub mod scanner;

pub use scanner::Scanner;
