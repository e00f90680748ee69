//! Reader facade.
//!
//! Data flows strictly downward:
//!
//! ```text
//! open:  header → tag directory → geometry
//! rank:  coordinate → pixel location → tile store → pixel value
//! ```
//!
//! - [`Reader`]: single-threaded reader owning the file resource
//! - [`SharedReader`]: mutex-guarded wrapper for use across threads

mod rank_reader;
mod shared;

pub use rank_reader::{open, Reader};
pub use shared::SharedReader;
