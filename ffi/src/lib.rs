//! C-ABI wrapper around `pollab-core`.
//!
//! # Overview
//! Exposes the poll repository and the expiration helpers through
//! `extern "C"` functions so a mobile host (Kotlin via JNI, Swift via a
//! bridging header) can drive the client without linking serde or ureq
//! directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Poll operations perform blocking HTTP with retries; hosts call them off
//!   the UI thread.
//! - A single `FfiPollResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `pollab_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::time::Duration;

use pollab_core::expiration;
use pollab_core::{ClientConfig, PollApi, PollRepository, RemotePollRepository, RetryPolicy};

use types::*;

type Guarded = Result<*mut FfiPollResult, *mut FfiPollResult>;

/// Run `body` behind `catch_unwind`, flattening early-return errors.
fn guarded(name: &str, body: impl FnOnce() -> Guarded) -> *mut FfiPollResult {
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(result)) | Ok(Err(result)) => result,
        Err(_) => FfiPollResult::panic(&format!("panic in {name}")),
    }
}

fn client_ref<'a>(client: *const FfiPollClient) -> Result<&'a FfiPollClient, *mut FfiPollResult> {
    if client.is_null() {
        return Err(FfiPollResult::null_arg("client"));
    }
    Ok(unsafe { &*client })
}

fn read_str<'a>(value: *const c_char, name: &str) -> Result<&'a str, *mut FfiPollResult> {
    if value.is_null() {
        return Err(FfiPollResult::null_arg(name));
    }
    unsafe { CStr::from_ptr(value) }
        .to_str()
        .map_err(|_| FfiPollResult::invalid_utf8(name))
}

/// Nullable string argument; null and invalid UTF-8 both read as absent.
fn read_opt_str<'a>(value: *const c_char) -> Option<&'a str> {
    if value.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(value) }.to_str().ok()
}

fn new_client(config: &ClientConfig) -> *mut FfiPollClient {
    let inner = RemotePollRepository::new(PollApi::from_config(config));
    Box::into_raw(Box::new(FfiPollClient { inner }))
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url` with the default retry policy
/// (3 attempts, 2 s apart) and a 30 s request timeout.
///
/// Returns null if `base_url` is null, not UTF-8, or if an internal panic
/// occurs. The caller must free the returned pointer with
/// `pollab_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn pollab_client_new(base_url: *const c_char) -> *mut FfiPollClient {
    catch_unwind(|| match read_opt_str(base_url) {
        Some(url) => new_client(&ClientConfig::new(url)),
        None => ptr::null_mut(),
    })
    .unwrap_or(ptr::null_mut())
}

/// Create a client with an explicit retry policy and timeout.
///
/// `max_attempts` of zero is treated as one attempt. `timeout_ms` of zero
/// selects the default 30 s timeout.
#[unsafe(no_mangle)]
pub extern "C" fn pollab_client_new_with_retry(
    base_url: *const c_char,
    max_attempts: u32,
    retry_delay_ms: u64,
    timeout_ms: u64,
) -> *mut FfiPollClient {
    catch_unwind(|| {
        let Some(url) = read_opt_str(base_url) else {
            return ptr::null_mut();
        };
        new_client(&retry_config(url, max_attempts, retry_delay_ms, timeout_ms))
    })
    .unwrap_or(ptr::null_mut())
}

fn retry_config(url: &str, max_attempts: u32, retry_delay_ms: u64, timeout_ms: u64) -> ClientConfig {
    let mut config = ClientConfig::new(url);
    config.retry = RetryPolicy {
        max_attempts: max_attempts.max(1),
        delay: Duration::from_millis(retry_delay_ms),
    };
    if timeout_ms > 0 {
        config.timeout = Duration::from_millis(timeout_ms);
    }
    config
}

/// Create a client from `POLLAB_API_BASE_URL` and the optional retry and
/// timeout variables.
///
/// Returns null when no base URL is configured or a variable is malformed.
#[unsafe(no_mangle)]
pub extern "C" fn pollab_client_from_env() -> *mut FfiPollClient {
    catch_unwind(|| match ClientConfig::from_env() {
        Ok(config) => new_client(&config),
        Err(_) => ptr::null_mut(),
    })
    .unwrap_or(ptr::null_mut())
}

/// Free a client created by any `pollab_client_*` constructor. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn pollab_client_free(client: *mut FfiPollClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Poll operations
// ---------------------------------------------------------------------------

/// Fetch every poll.
///
/// Returns a result with `data_tag = PollList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn pollab_list_polls(client: *const FfiPollClient) -> *mut FfiPollResult {
    guarded("pollab_list_polls", || {
        let client = client_ref(client)?;
        Ok(FfiPollResult::from_result(
            client.inner.list_polls(),
            FfiPollResult::ok_poll_list,
        ))
    })
}

/// Fetch a single poll by id.
///
/// Returns a result with `data_tag = Poll` on success and `NotFound` when
/// the server does not know the id.
#[unsafe(no_mangle)]
pub extern "C" fn pollab_get_poll(
    client: *const FfiPollClient,
    poll_id: *const c_char,
) -> *mut FfiPollResult {
    guarded("pollab_get_poll", || {
        let client = client_ref(client)?;
        let poll_id = read_str(poll_id, "poll_id")?;
        Ok(FfiPollResult::from_result(
            client.inner.get_poll(poll_id),
            FfiPollResult::ok_poll,
        ))
    })
}

/// Cast a vote for `option_id` on behalf of `participant`.
///
/// Returns the updated poll (`data_tag = Poll`) on success and `Conflict`
/// when the participant already voted on this poll.
#[unsafe(no_mangle)]
pub extern "C" fn pollab_vote(
    client: *const FfiPollClient,
    poll_id: *const c_char,
    option_id: i64,
    participant: *const c_char,
) -> *mut FfiPollResult {
    guarded("pollab_vote", || {
        let client = client_ref(client)?;
        let poll_id = read_str(poll_id, "poll_id")?;
        let participant = read_str(participant, "participant")?;
        Ok(FfiPollResult::from_result(
            client.inner.vote(poll_id, option_id, participant),
            FfiPollResult::ok_poll,
        ))
    })
}

/// Create a poll from a title, `options_len` option strings and a duration.
///
/// A negative `duration_hours` sends no duration; zero is rejected locally
/// as a validation error. Returns the created poll (`data_tag = Poll`).
#[unsafe(no_mangle)]
pub extern "C" fn pollab_create_poll(
    client: *const FfiPollClient,
    title: *const c_char,
    options: *const *const c_char,
    options_len: u32,
    duration_hours: i32,
) -> *mut FfiPollResult {
    guarded("pollab_create_poll", || {
        let client = client_ref(client)?;
        let title = read_str(title, "title")?;
        let option_ptrs: &[*const c_char] = match (options.is_null(), options_len) {
            (_, 0) => &[],
            (true, _) => return Err(FfiPollResult::null_arg("options")),
            (false, len) => unsafe { std::slice::from_raw_parts(options, len as usize) },
        };
        let option_texts = option_ptrs
            .iter()
            .map(|&text| read_str(text, "options").map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;
        let duration_hours = u32::try_from(duration_hours).ok();
        Ok(FfiPollResult::from_result(
            client.inner.create_poll(title, &option_texts, duration_hours),
            FfiPollResult::ok_poll,
        ))
    })
}

// ---------------------------------------------------------------------------
// Expiration helpers
// ---------------------------------------------------------------------------

/// Format the time left until `expires_at` as `"HHh MMm"`.
///
/// Returns null when `expires_at` is null, unparseable, or already in the
/// past. Free the returned string with `pollab_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn pollab_remaining_time(expires_at: *const c_char) -> *mut c_char {
    catch_unwind(|| match expiration::remaining_time(read_opt_str(expires_at)) {
        Some(text) => c_string(text),
        None => ptr::null_mut(),
    })
    .unwrap_or(ptr::null_mut())
}

/// Whether voting is closed. A null or unparseable `expires_at` counts as
/// expired.
#[unsafe(no_mangle)]
pub extern "C" fn pollab_is_expired(expires_at: *const c_char) -> bool {
    catch_unwind(|| expiration::is_expired(read_opt_str(expires_at))).unwrap_or(true)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiPollResult` returned by any poll operation.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn pollab_free_result(result: *mut FfiPollResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiPollResult::release(result) });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn pollab_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
