use std::ffi::CStr;
use std::os::raw::c_char;

use serde::de::DeserializeOwned;

/// JSON text of `value`, with a readable error on failure.
pub fn to_json(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("cannot encode result as JSON: {}", e))
}

/// Decode `json` as `T`. `what` names the argument in the error message.
pub fn deserialize_json<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("failed to parse {} JSON: {}", what, e))
}

/// Copy a host-supplied string argument into Rust.
///
/// # Safety
///
/// `ptr` is null or points to a nul-terminated string that stays valid for
/// the duration of the call.
pub unsafe fn cstring_to_str(ptr: *const c_char) -> Result<String, String> {
    if ptr.is_null() {
        return Err("argument is a null pointer".to_string());
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(str::to_owned)
        .map_err(|e| format!("argument is not UTF-8: {}", e))
}
