//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, boxed slices exposed as pointer plus
//! length instead of `Vec`, and tagged enums with explicit discriminants.
//! Conversion and release helpers live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::ptr;

use pollab_core::{ApiError, DefaultTransport, Poll, PollOption, RemotePollRepository};

/// Opaque handle to a poll repository. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiPollClient {
    pub(crate) inner: RemotePollRepository<DefaultTransport>,
}

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct FfiPollOption {
    pub id: i64,
    pub text: *mut c_char,
    pub vote_count: u64,
}

/// A poll exposed to C. `expires_at` and `delete_at` are null when absent.
#[repr(C)]
pub struct FfiPoll {
    pub id: i64,
    pub title: *mut c_char,
    pub created_at: *mut c_char,
    pub expires_at: *mut c_char,
    pub delete_at: *mut c_char,
    pub options: *mut FfiPollOption,
    pub options_len: u32,
}

#[repr(C)]
pub struct FfiPollList {
    pub items: *mut FfiPoll,
    pub len: u32,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiPollResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Transport = 1,
    NotFound = 2,
    /// The participant already voted on this poll.
    Conflict = 3,
    Remote = 4,
    Validation = 5,
    Decode = 6,
    Encode = 7,
    Panic = 8,
    NullArg = 9,
    InvalidUtf8 = 10,
}

/// Tag that tells `pollab_free_result` what `FfiPollResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Poll = 1,
    PollList = 2,
}

/// Result envelope for every poll operation.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload (tagged by `data_tag`). On failure `error_code`
/// describes the category, `error_message` is a human-readable C string,
/// `http_status` holds the response status when one was received, and
/// `data` is null.
#[repr(C)]
pub struct FfiPollResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

/// Convert to a C string, dropping interior NUL bytes.
pub(crate) fn c_string(value: String) -> *mut c_char {
    let value = if value.contains('\0') {
        value.replace('\0', "")
    } else {
        value
    };
    CString::new(value).unwrap_or_default().into_raw()
}

fn c_string_opt(value: Option<String>) -> *mut c_char {
    value.map(c_string).unwrap_or(ptr::null_mut())
}

/// Leak a vector as a boxed slice, returning its pointer and length.
fn leak_slice<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let ptr = Box::into_raw(items.into_boxed_slice()) as *mut T;
    (ptr, len)
}

/// Reclaim a slice produced by `leak_slice`.
///
/// # Safety
/// `ptr`/`len` must come from a single `leak_slice` call and not have been
/// reclaimed before.
unsafe fn reclaim_slice<T>(ptr: *mut T, len: u32) -> Box<[T]> {
    unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len as usize)) }
}

impl FfiPoll {
    pub(crate) fn from_core(poll: Poll) -> Self {
        let options: Vec<FfiPollOption> = poll.options.into_iter().map(FfiPollOption::from_core).collect();
        let (options, options_len) = leak_slice(options);
        FfiPoll {
            id: poll.id,
            title: c_string(poll.title),
            created_at: c_string(poll.created_at),
            expires_at: c_string_opt(poll.expires_at),
            delete_at: c_string_opt(poll.delete_at),
            options,
            options_len,
        }
    }

    /// Free the heap fields of an `FfiPoll` (but not the struct itself).
    fn free_fields(&self) {
        for field in [self.title, self.created_at, self.expires_at, self.delete_at] {
            free_c_string(field);
        }
        if !self.options.is_null() {
            let options = unsafe { reclaim_slice(self.options, self.options_len) };
            for option in options.iter() {
                free_c_string(option.text);
            }
        }
    }
}

impl FfiPollOption {
    fn from_core(option: PollOption) -> Self {
        FfiPollOption {
            id: option.id,
            text: c_string(option.text),
            vote_count: option.vote_count,
        }
    }
}

pub(crate) fn free_c_string(value: *mut c_char) {
    if !value.is_null() {
        drop(unsafe { CString::from_raw(value) });
    }
}

impl FfiPollResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiPollResult {
            error_code,
            error_message,
            http_status,
            data_tag,
            data,
        }))
    }

    /// Build a success result carrying a single `FfiPoll`.
    pub(crate) fn ok_poll(poll: Poll) -> *mut Self {
        let data = Box::into_raw(Box::new(FfiPoll::from_core(poll))) as *mut c_void;
        Self::boxed(FfiErrorCode::Ok, ptr::null_mut(), 0, FfiDataTag::Poll, data)
    }

    /// Build a success result carrying an `FfiPollList`.
    pub(crate) fn ok_poll_list(polls: Vec<Poll>) -> *mut Self {
        let items: Vec<FfiPoll> = polls.into_iter().map(FfiPoll::from_core).collect();
        let (items, len) = leak_slice(items);
        let data = Box::into_raw(Box::new(FfiPollList { items, len })) as *mut c_void;
        Self::boxed(FfiErrorCode::Ok, ptr::null_mut(), 0, FfiDataTag::PollList, data)
    }

    pub(crate) fn from_result<T>(result: Result<T, ApiError>, ok: impl FnOnce(T) -> *mut Self) -> *mut Self {
        match result {
            Ok(value) => ok(value),
            Err(err) => Self::from_error(err),
        }
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let error_code = match &err {
            ApiError::Transport(_) => FfiErrorCode::Transport,
            ApiError::NotFound => FfiErrorCode::NotFound,
            ApiError::Conflict { .. } => FfiErrorCode::Conflict,
            ApiError::Remote { .. } => FfiErrorCode::Remote,
            ApiError::Validation(_) => FfiErrorCode::Validation,
            ApiError::Decode(_) => FfiErrorCode::Decode,
            ApiError::Encode(_) => FfiErrorCode::Encode,
        };
        let http_status = err.status().unwrap_or(0);
        Self::boxed(
            error_code,
            c_string(err.to_string()),
            http_status,
            FfiDataTag::None,
            ptr::null_mut(),
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn invalid_utf8(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::InvalidUtf8, format!("argument is not valid UTF-8: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, message: String) -> *mut Self {
        Self::boxed(error_code, c_string(message), 0, FfiDataTag::None, ptr::null_mut())
    }

    /// Release everything owned by a result, including the result itself.
    ///
    /// # Safety
    /// `result` must be a non-null pointer returned by this crate that has
    /// not been freed yet.
    pub(crate) unsafe fn release(result: *mut Self) {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Poll => {
                let poll = unsafe { Box::from_raw(result.data as *mut FfiPoll) };
                poll.free_fields();
            }
            FfiDataTag::PollList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiPollList) };
                if !list.items.is_null() {
                    let items = unsafe { reclaim_slice(list.items, list.len) };
                    for item in items.iter() {
                        item.free_fields();
                    }
                }
            }
            FfiDataTag::None => {}
        }
    }
}
