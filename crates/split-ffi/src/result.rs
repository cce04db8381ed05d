use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// What every `split_*` entry point hands back to the host.
///
/// Exactly one of `data` (JSON text, set when `ok`) and `error` (a
/// human-readable message) is non-null. The host owns the envelope and
/// releases it, strings included, with `split_free`.
#[repr(C)]
pub struct SplitResult {
    pub ok: bool,
    pub data: *mut c_char,
    pub error: *mut c_char,
}

impl SplitResult {
    /// Box an `ok` envelope carrying `json`.
    pub fn success(json: &str) -> *mut Self {
        let data = to_cstring(json, c"<nul byte in json payload>");
        Box::into_raw(Box::new(SplitResult {
            ok: true,
            data: data.into_raw(),
            error: std::ptr::null_mut(),
        }))
    }

    /// Box a failed envelope carrying `message`.
    pub fn failure(message: &str) -> *mut Self {
        let error = to_cstring(message, c"<nul byte in error message>");
        Box::into_raw(Box::new(SplitResult {
            ok: false,
            data: std::ptr::null_mut(),
            error: error.into_raw(),
        }))
    }

    /// Drop an envelope and whichever string it carries.
    ///
    /// # Safety
    ///
    /// `ptr` is null or came from [`SplitResult::success`] or
    /// [`SplitResult::failure`], and is released at most once.
    pub unsafe fn free(ptr: *mut Self) {
        if ptr.is_null() {
            return;
        }
        let envelope = Box::from_raw(ptr);
        for raw in [envelope.data, envelope.error] {
            if !raw.is_null() {
                drop(CString::from_raw(raw));
            }
        }
    }
}

/// `text` as a C string, or `fallback` when it holds a nul byte.
fn to_cstring(text: &str, fallback: &CStr) -> CString {
    CString::new(text).unwrap_or_else(|_| fallback.to_owned())
}
