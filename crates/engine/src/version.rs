//! Library version

use std::ffi::CStr;

use lmdb_master_sys as ffi;
use serde::{Deserialize, Serialize};

/// Version of the linked engine library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Major version
    pub major: i32,
    /// Minor version
    pub minor: i32,
    /// Patch level
    pub patch: i32,
    /// Full version string, e.g. `"LMDB 0.9.70: (December 19, 2015)"`
    pub text: String,
}

/// Query the linked library's version.
pub fn version() -> Version {
    let (mut major, mut minor, mut patch) = (0, 0, 0);
    // SAFETY: out-pointers to locals; the returned string is static.
    let text = unsafe {
        let raw = ffi::mdb_version(&mut major, &mut minor, &mut patch);
        if raw.is_null() {
            String::new()
        } else {
            CStr::from_ptr(raw).to_string_lossy().into_owned()
        }
    };
    Version {
        major: major as i32,
        minor: minor as i32,
        patch: patch as i32,
        text,
    }
}
