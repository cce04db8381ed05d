use std::os::raw::c_char;

use serde::{Deserialize, Serialize};

use split_core::{Document, SplitOptions};
use split_text::SplitStats;

use crate::marshal::{cstring_to_str, deserialize_json, to_json};
use crate::result::SplitResult;

/// Arguments of [`split_process`].
#[derive(Debug, Deserialize)]
struct ProcessArgs {
    document: Document,
    #[serde(default)]
    options: SplitOptions,
}

/// Payload of a successful [`split_process`].
#[derive(Debug, Serialize)]
struct ProcessOutput<'a> {
    document: &'a Document,
    stats: SplitStats,
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a `SplitResult` that was returned by any `split_*` function.
///
/// Passing a null pointer is a no-op.
///
/// # Safety
///
/// `ptr` must be either null or a valid pointer that was previously returned
/// by one of the `split_*` functions and has not yet been freed.
#[no_mangle]
pub unsafe extern "C" fn split_free(ptr: *mut SplitResult) {
    SplitResult::free(ptr);
}

// ---------------------------------------------------------------------------
// Split
// ---------------------------------------------------------------------------

/// Split a document.
///
/// `args_json` is `{"document": {...}, "options": {...}}`; `options` may be
/// omitted. On success `data` is `{"document": {...}, "stats": {...}}`, the
/// processed document and the run's [`SplitStats`]. A failed run
/// returns only the error message; partially appended tokens are discarded.
///
/// The returned pointer must be freed with `split_free`.
///
/// # Safety
///
/// `args_json` must be a valid, non-null, null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn split_process(args_json: *const c_char) -> *mut SplitResult {
    let json = match cstring_to_str(args_json) {
        Ok(s) => s,
        Err(e) => return SplitResult::failure(&e),
    };

    let ProcessArgs {
        mut document,
        options,
    } = match deserialize_json(&json, "split arguments") {
        Ok(args) => args,
        Err(e) => return SplitResult::failure(&e),
    };

    let stats = match split_text::process(&mut document, &options) {
        Ok(stats) => stats,
        Err(e) => return SplitResult::failure(&e.to_string()),
    };

    match to_json(&ProcessOutput {
        document: &document,
        stats,
    }) {
        Ok(out) => SplitResult::success(&out),
        Err(e) => SplitResult::failure(&e),
    }
}

/// Run the normalizer configured by `options_json` over `text`.
///
/// On success `data` is the normalized text as a JSON string.
///
/// # Safety
///
/// Both pointer arguments must be valid, non-null, null-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn split_normalize(
    options_json: *const c_char,
    text: *const c_char,
) -> *mut SplitResult {
    let options_str = match cstring_to_str(options_json) {
        Ok(s) => s,
        Err(e) => return SplitResult::failure(&e),
    };
    let text = match cstring_to_str(text) {
        Ok(s) => s,
        Err(e) => return SplitResult::failure(&e),
    };

    let options: SplitOptions = match deserialize_json(&options_str, "options") {
        Ok(o) => o,
        Err(e) => return SplitResult::failure(&e),
    };

    let normalized = match split_text::normalize(&options, &text) {
        Ok(n) => n,
        Err(e) => return SplitResult::failure(&e.to_string()),
    };

    match to_json(&normalized) {
        Ok(out) => SplitResult::success(&out),
        Err(e) => SplitResult::failure(&e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
