//! C entry points for hosts that drive the split stage over JSON.
//!
//! `split_process` and `split_normalize` return a [`SplitResult`] envelope
//! that the host releases with `split_free`.

pub mod ffi;
pub mod marshal;
pub mod result;

pub use result::SplitResult;
