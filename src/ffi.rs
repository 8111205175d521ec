//! FFI interface for C/C++ hosts
//!
//! Provides C-compatible functions for scraping pages and extracting fields
//! from HTML. Field configurations go in and results come out as JSON.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::extractors::{extract_document, ExtractionResult};
use crate::fields::FieldConfig;
use crate::service::ScraperService;

/// Result struct returned to the host
/// Both pointers are owned by Rust and must be freed via free_extraction_result
#[repr(C)]
pub struct ExtractionResultFFI {
    /// JSON-serialized result (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if extraction failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Create a scraper service with its own page cache.
///
/// `config_toml` may be null for the default configuration.
/// Returns null if the configuration is invalid.
///
/// # Safety
/// - `config_toml` must be null or a valid null-terminated C string
/// - The handle must be released with `scraper_service_free`
#[no_mangle]
pub unsafe extern "C" fn scraper_service_new(config_toml: *const c_char) -> *mut ScraperService {
    let config = if config_toml.is_null() {
        ScraperConfig::default()
    } else {
        let parsed = CStr::from_ptr(config_toml)
            .to_str()
            .map_err(|e| e.to_string())
            .and_then(ScraperConfig::from_toml);
        match parsed {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("rejected scraper config: {}", e);
                return ptr::null_mut();
            }
        }
    };

    match ScraperService::new(&config) {
        Ok(service) => Box::into_raw(Box::new(service)),
        Err(e) => {
            tracing::warn!("failed to create scraper service: {}", e);
            ptr::null_mut()
        }
    }
}

/// Release a service created by `scraper_service_new`
///
/// # Safety
/// - `service` must be null or a handle returned by `scraper_service_new`
/// - Must only be called once per handle
#[no_mangle]
pub unsafe extern "C" fn scraper_service_free(service: *mut ScraperService) {
    if !service.is_null() {
        drop(Box::from_raw(service));
    }
}

/// Fetch `url` (through the service cache) and extract the configured fields.
///
/// # Arguments
/// * `service` - Handle from `scraper_service_new`
/// * `url` - Page URL (null-terminated)
/// * `fields_json` - JSON object of field name to selector string or list of meta names
///
/// # Returns
/// ExtractionResultFFI with either json_ptr set (success) or error_ptr set (failure)
///
/// # Safety
/// - `service` must be a live handle from `scraper_service_new`
/// - `url` and `fields_json` must be valid null-terminated C strings
/// - Caller must free the result via `free_extraction_result`
#[no_mangle]
pub unsafe extern "C" fn scraper_service_extract(
    service: *const ScraperService,
    url: *const c_char,
    fields_json: *const c_char,
) -> ExtractionResultFFI {
    let Some(service) = service.as_ref() else {
        return make_error_result("Service handle is null");
    };
    let url = match c_str(url, "URL") {
        Ok(s) => s,
        Err(result) => return result,
    };
    let fields_str = match c_str(fields_json, "Fields JSON") {
        Ok(s) => s,
        Err(result) => return result,
    };

    let fields = match FieldConfig::from_json(fields_str) {
        Ok(fields) => fields,
        Err(e) => return make_error_result(&e.into_user_message(url)),
    };

    match service.extract(url, &fields) {
        Ok(result) => make_json_result(&result),
        Err(failure) => make_error_result(&failure.to_string()),
    }
}

/// Extract fields from HTML that the host already has.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `fields_json` - JSON-serialized field configuration (null-terminated)
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `fields_json` must be a valid null-terminated C string
/// - Caller must free the result via `free_extraction_result`
#[no_mangle]
pub unsafe extern "C" fn extract_from_html(
    html_ptr: *const c_char,
    html_len: usize,
    fields_json: *const c_char,
) -> ExtractionResultFFI {
    let html = if html_ptr.is_null() || html_len == 0 {
        String::new()
    } else {
        let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
        match std::str::from_utf8(slice) {
            Ok(s) => s.to_string(),
            Err(e) => {
                let err = ScrapeError::Parse(format!("invalid UTF-8 in HTML content: {}", e));
                return make_error_result(&err.into_user_message("<inline html>"));
            }
        }
    };

    let fields_str = match c_str(fields_json, "Fields JSON") {
        Ok(s) => s,
        Err(result) => return result,
    };

    let outcome = FieldConfig::from_json(fields_str)
        .and_then(|fields| extract_document(&html, &fields));
    match outcome {
        Ok(result) => make_json_result(&result),
        Err(e) => make_error_result(&e.into_user_message("<inline html>")),
    }
}

/// Free an ExtractionResultFFI returned by this module
///
/// # Safety
/// - `result` must have been returned by `scraper_service_extract` or `extract_from_html`
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_extraction_result(result: ExtractionResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

// Borrow a C string, or build the error result for the host
unsafe fn c_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, ExtractionResultFFI> {
    if ptr.is_null() {
        return Err(make_error_result(&format!("{} is null", what)));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| make_error_result(&format!("Invalid UTF-8 in {}", what)))
}

fn make_json_result(result: &ExtractionResult) -> ExtractionResultFFI {
    match serde_json::to_string(result) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => ExtractionResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&format!("Failed to serialize result: {}", e)),
    }
}

// Helper to create error result
fn make_error_result(msg: &str) -> ExtractionResultFFI {
    let error_cstr = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    ExtractionResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error_cstr.into_raw(),
    }
}
