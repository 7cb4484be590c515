//! FFI bindings for HaloTree
//!
//! This module provides a C-compatible interface to the HaloTree catalog
//! reader and merger-tree engine. All functions are panic-safe and use
//! thread-local error reporting.
//!
//! # Safety Guarantees
//!
//! - No panic may cross the FFI boundary (enforced by `ffi_guard`)
//! - Strict UTF-8 validation for all string inputs
//! - Null pointer checks on all pointer arguments
//! - ABI stability via `#[repr(C)]` and `extern "C"`
//!
//! # Error Handling
//!
//! Errors are reported through:
//! - Return values: NULL for open, `-1` for signed results, `0` for counts
//!   that are never zero on success
//! - Thread-local error message: `halotree_last_error_message()`
//!
//! # Thread Safety
//!
//! - `halotree_build_forest` requires exclusive access to the handle
//! - All other calls only read and may run concurrently
//! - Each thread has its own error message storage

use anyhow::{Context, Result, anyhow};
use halotree_core::{CatalogFormat, CatalogOptions, MergerTreeCatalog, Tree};
use libc::{c_char, c_double, c_int, size_t};
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::ptr;
use std::slice;

/// `format` value for Rockstar halo lists
pub const HALOTREE_FORMAT_ROCKSTAR: c_int = 0;

/// `format` value for consistent-trees merger histories
pub const HALOTREE_FORMAT_CONSISTENT_TREES: c_int = 1;

/// Internal state holder (not exposed to C)
struct HaloTreeState {
    inner: MergerTreeCatalog,
}

/// Opaque handle to a loaded catalog (C-compatible)
///
/// C code only sees pointers to this type, never the actual struct.
/// The real data is stored in `HaloTreeState`.
#[repr(C)]
pub struct HaloTreeCatalog {
    _private: [u8; 0],
}

thread_local! {
    /// Thread-local storage for error messages
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message for the current thread
///
/// Interior NULs are escaped as "\\0" so that reporting never fails.
fn set_last_error(err: impl std::fmt::Display) {
    LAST_ERROR.with(|cell| {
        let safe_msg = err.to_string().replace('\0', "\\0");
        let c_str = CString::new(safe_msg).unwrap_or_default();
        *cell.borrow_mut() = Some(c_str);
    });
}

/// Clear the last error message for the current thread
fn clear_last_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Panic barrier that catches all panics at the FFI boundary
///
/// Returns `None` on panic after recording the panic message, so callers can
/// fall back to their sentinel value.
fn ffi_guard<F, R>(f: F) -> Option<R>
where
    F: FnOnce() -> R,
{
    // The operation is abandoned on panic, never resumed
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(result) => Some(result),
        Err(e) => {
            let msg = if let Some(s) = e.downcast_ref::<&str>() {
                format!("Panic: {s}")
            } else if let Some(s) = e.downcast_ref::<String>() {
                format!("Panic: {s}")
            } else {
                "Unknown panic".to_string()
            };
            set_last_error(msg);
            None
        }
    }
}

/// Runs `f`, recording its error (with context chain) on failure
fn report<R>(f: impl FnOnce() -> Result<R>) -> Option<R> {
    match f() {
        Ok(value) => {
            clear_last_error();
            Some(value)
        }
        Err(e) => {
            set_last_error(format!("{e:#}"));
            None
        }
    }
}

/// Borrows a UTF-8 string argument
///
/// # Safety
///
/// `ptr` must be NULL or a valid NUL-terminated string.
unsafe fn str_arg<'a>(ptr: *const c_char, name: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(anyhow!("{name} cannot be NULL"));
    }

    // SAFETY: Caller guarantees ptr is a valid C string
    let c_str = unsafe { CStr::from_ptr(ptr) };

    // Strict check, no lossy conversion
    c_str.to_str().map_err(|_| anyhow!("{name} must be valid UTF-8"))
}

/// Borrows the state behind a handle
///
/// # Safety
///
/// `ptr` must be NULL or a live pointer from `halotree_open()`.
unsafe fn state_ref<'a>(ptr: *const HaloTreeCatalog) -> Result<&'a HaloTreeState> {
    // SAFETY: Caller guarantees ptr is NULL or valid
    unsafe { (ptr as *const HaloTreeState).as_ref() }.context("Catalog handle cannot be NULL")
}

fn tree_at(state: &HaloTreeState, tree: size_t) -> Result<&Tree> {
    let forest = state.inner.forest().context("Forest not built; call halotree_build_forest() first")?;
    forest.get(tree).with_context(|| format!("Tree index {tree} out of range (forest has {} trees)", forest.len()))
}

fn format_from_code(format: c_int) -> Result<CatalogFormat> {
    match format {
        HALOTREE_FORMAT_ROCKSTAR => Ok(CatalogFormat::Rockstar),
        HALOTREE_FORMAT_CONSISTENT_TREES => Ok(CatalogFormat::ConsistentTrees),
        other => Err(anyhow!("Unknown catalog format code {other}")),
    }
}

//
// === LIFECYCLE MANAGEMENT ===
//

/// Load a catalog file with every field of its format
///
/// # Arguments
///
/// - `path`: UTF-8 encoded path to the catalog file (must not be NULL)
/// - `format`: `HALOTREE_FORMAT_ROCKSTAR` or `HALOTREE_FORMAT_CONSISTENT_TREES`
///
/// # Returns
///
/// - Non-NULL pointer on success
/// - NULL on failure (check `halotree_last_error_message()`)
///
/// # Example (C)
///
/// ```c
/// HaloTreeCatalog* cat = halotree_open("tree_0_0_0.dat", HALOTREE_FORMAT_CONSISTENT_TREES);
/// if (cat == NULL) {
///     fprintf(stderr, "Error: %s\n", halotree_last_error_message());
///     exit(1);
/// }
/// ```
///
/// # Safety
///
/// - `path` must be a valid, NUL-terminated UTF-8 string
/// - Caller must free the returned pointer with `halotree_free()`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn halotree_open(path: *const c_char, format: c_int) -> *mut HaloTreeCatalog {
    ffi_guard(|| {
        report(|| {
            // SAFETY: Caller guarantees path is NULL or a valid C string
            let path = unsafe { str_arg(path, "Path") }?;
            let format = format_from_code(format)?;

            let options = CatalogOptions { format, columns: Vec::new() };
            let inner = MergerTreeCatalog::open(path, options)?;
            Ok(Box::into_raw(Box::new(HaloTreeState { inner })) as *mut HaloTreeCatalog)
        })
        .unwrap_or(ptr::null_mut())
    })
    .unwrap_or(ptr::null_mut())
}

/// Free a catalog and every tree built from it
///
/// # Safety
///
/// - `ptr` must be NULL or a valid pointer from `halotree_open()`
/// - After this call, `ptr` is invalid and must not be used
#[unsafe(no_mangle)]
pub unsafe extern "C" fn halotree_free(ptr: *mut HaloTreeCatalog) {
    if !ptr.is_null() {
        ffi_guard(|| {
            // SAFETY: Caller guarantees ptr came from halotree_open
            let _ = unsafe { Box::from_raw(ptr as *mut HaloTreeState) };
        });
    }
}

//
// === CATALOG AND FOREST ===
//

/// Number of data rows in the catalog, 0 on error
///
/// # Safety
///
/// `ptr` must be NULL or a valid pointer from `halotree_open()`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn halotree_row_count(ptr: *const HaloTreeCatalog) -> u64 {
    ffi_guard(|| {
        // SAFETY: Caller guarantees ptr is NULL or valid
        report(|| Ok(unsafe { state_ref(ptr) }?.inner.len() as u64)).unwrap_or(0)
    })
    .unwrap_or(0)
}

/// Build every merger tree of the catalog
///
/// Calling it again after a successful build is a no-op.
///
/// # Returns
///
/// - `0` on success
/// - `-1` on failure (check `halotree_last_error_message()`)
///
/// # Thread Safety
///
/// **EXCLUSIVE**: no other call may use the handle concurrently.
///
/// # Safety
///
/// `ptr` must be NULL or a valid pointer from `halotree_open()`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn halotree_build_forest(ptr: *mut HaloTreeCatalog) -> c_int {
    ffi_guard(|| {
        report(|| {
            // SAFETY: Caller guarantees ptr is NULL or valid and unaliased
            let state = unsafe { (ptr as *mut HaloTreeState).as_mut() }.context("Catalog handle cannot be NULL")?;
            state.inner.build_forest()?;
            Ok(0)
        })
        .unwrap_or(-1)
    })
    .unwrap_or(-1)
}

/// Number of trees, 0 on error or before `halotree_build_forest()`
///
/// # Safety
///
/// `ptr` must be NULL or a valid pointer from `halotree_open()`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn halotree_tree_count(ptr: *const HaloTreeCatalog) -> u64 {
    ffi_guard(|| {
        report(|| {
            // SAFETY: Caller guarantees ptr is NULL or valid
            let state = unsafe { state_ref(ptr) }?;
            let forest = state.inner.forest().context("Forest not built; call halotree_build_forest() first")?;
            Ok(forest.len() as u64)
        })
        .unwrap_or(0)
    })
    .unwrap_or(0)
}

//
// === TRAVERSALS ===
//

/// Read a field along a tree's main branch, root first
///
/// # Arguments
///
/// - `tree`: Tree index in file order
/// - `field`: Field name, e.g. `"virial_mass"` (must not be NULL)
/// - `out`: Output buffer; integer fields are widened to double
/// - `cap`: Capacity of `out`, at least 1; longer branches are truncated
///
/// # Returns
///
/// Number of values written; `0` on error, including `cap == 0` (a branch
/// is never empty)
///
/// # Safety
///
/// - `ptr` must be NULL or a valid pointer from `halotree_open()`
/// - `field` must be a valid, NUL-terminated UTF-8 string
/// - `out` must point to at least `cap` writable doubles
#[unsafe(no_mangle)]
pub unsafe extern "C" fn halotree_main_branch(
    ptr: *const HaloTreeCatalog,
    tree: size_t,
    field: *const c_char,
    out: *mut c_double,
    cap: size_t,
) -> size_t {
    ffi_guard(|| {
        report(|| {
            if out.is_null() {
                return Err(anyhow!("Output buffer cannot be NULL"));
            }
            if cap == 0 {
                return Err(anyhow!("Output buffer capacity must be at least 1"));
            }

            // SAFETY: Caller guarantees ptr and field are NULL or valid
            let state = unsafe { state_ref(ptr) }?;
            let name = unsafe { str_arg(field, "Field") }?;

            let catalog = state.inner.catalog();
            let key = state.inner.field(name)?;
            let root = tree_at(state, tree)?.root();

            // SAFETY: Caller guarantees out has room for cap doubles
            let out = unsafe { slice::from_raw_parts_mut(out, cap) };
            let mut written = 0;
            for (slot, node) in out.iter_mut().zip(root.main_branch()) {
                *slot = catalog.value(node.storage_row(), key)?.as_f64();
                written += 1;
            }
            Ok(written)
        })
        .unwrap_or(0)
    })
    .unwrap_or(0)
}

/// Find the halos of a tree whose field is strictly greater than `threshold`
///
/// Matches are reported as catalog rows in breadth-first order. Integer
/// fields are widened to double before the comparison.
///
/// # Returns
///
/// - Total number of matches; only the first `min(total, cap)` rows are
///   written to `out_rows`, so a result above `cap` means truncation
/// - `-1` on failure (check `halotree_last_error_message()`)
///
/// # Safety
///
/// - `ptr` must be NULL or a valid pointer from `halotree_open()`
/// - `field` must be a valid, NUL-terminated UTF-8 string
/// - `out_rows` must point to at least `cap` writable `uint64_t`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn halotree_search_greater(
    ptr: *const HaloTreeCatalog,
    tree: size_t,
    field: *const c_char,
    threshold: c_double,
    out_rows: *mut u64,
    cap: size_t,
) -> i64 {
    ffi_guard(|| {
        report(|| {
            if out_rows.is_null() {
                return Err(anyhow!("Output buffer cannot be NULL"));
            }

            // SAFETY: Caller guarantees ptr and field are NULL or valid
            let state = unsafe { state_ref(ptr) }?;
            let name = unsafe { str_arg(field, "Field") }?;

            let catalog = state.inner.catalog();
            let key = state.inner.field(name)?;
            let root = tree_at(state, tree)?.root();

            // SAFETY: Caller guarantees out_rows has room for cap values
            let out = unsafe { slice::from_raw_parts_mut(out_rows, cap) };
            let mut total = 0;
            for node in root.level_order() {
                if catalog.value(node.storage_row(), key)?.as_f64() > threshold {
                    if let Some(slot) = out.get_mut(total) {
                        *slot = node.storage_row() as u64;
                    }
                    total += 1;
                }
            }
            Ok(i64::try_from(total)?)
        })
        .unwrap_or(-1)
    })
    .unwrap_or(-1)
}

/// Catalog row of the descendant of the halo stored at `row`
///
/// # Returns
///
/// - The parent's row
/// - `-1` if `row` is the tree's root
/// - `-2` on failure, including rows outside the tree
///
/// # Safety
///
/// `ptr` must be NULL or a valid pointer from `halotree_open()`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn halotree_parent_row(ptr: *const HaloTreeCatalog, tree: size_t, row: u64) -> i64 {
    ffi_guard(|| {
        report(|| {
            // SAFETY: Caller guarantees ptr is NULL or valid
            let state = unsafe { state_ref(ptr) }?;
            let tree = tree_at(state, tree)?;

            let node = usize::try_from(row)
                .ok()
                .and_then(|row| tree.node_at_row(row))
                .with_context(|| format!("Row {row} is not part of this tree"))?;

            Ok(node.parent().map_or(-1, |parent| parent.storage_row() as i64))
        })
        .unwrap_or(-2)
    })
    .unwrap_or(-2)
}

//
// === ERROR HANDLING ===
//

/// Last error message for the current thread
///
/// # Returns
///
/// - Pointer to a NUL-terminated message, or NULL if the last call succeeded
///
/// # Lifetime
///
/// The pointer is valid until the next HaloTree call on the same thread.
/// **Do NOT** free it.
#[unsafe(no_mangle)]
pub extern "C" fn halotree_last_error_message() -> *const c_char {
    LAST_ERROR.with(|cell| cell.borrow().as_ref().map_or(ptr::null(), |s| s.as_ptr()))
}

/// Library version
///
/// # Returns
///
/// Pointer to a NUL-terminated version string (e.g., "0.3.0"), valid for
/// the lifetime of the program. **Do NOT** free it.
#[unsafe(no_mangle)]
pub extern "C" fn halotree_version() -> *const c_char {
    // concat! appends the terminator C expects
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

    VERSION.as_ptr() as *const c_char
}

//
// === TESTS ===
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture() -> CString {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../halotree-core/tests/data/tree_0_0_0.dat");
        CString::new(path).unwrap()
    }

    fn last_error() -> String {
        let ptr = halotree_last_error_message();
        assert!(!ptr.is_null(), "expected an error message");
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }

    fn open_fixture() -> *mut HaloTreeCatalog {
        let path = fixture();
        let ptr = unsafe { halotree_open(path.as_ptr(), HALOTREE_FORMAT_CONSISTENT_TREES) };
        assert!(!ptr.is_null(), "Failed to open fixture: {}", last_error());
        ptr
    }

    #[test]
    fn test_ffi_lifecycle() {
        let ptr = open_fixture();
        assert_eq!(unsafe { halotree_row_count(ptr) }, 17);

        assert_eq!(unsafe { halotree_build_forest(ptr) }, 0);
        assert_eq!(unsafe { halotree_tree_count(ptr) }, 3);
        assert!(halotree_last_error_message().is_null());

        // Second build is a no-op
        assert_eq!(unsafe { halotree_build_forest(ptr) }, 0);

        unsafe { halotree_free(ptr) };
    }

    #[test]
    fn test_ffi_main_branch() {
        let ptr = open_fixture();
        assert_eq!(unsafe { halotree_build_forest(ptr) }, 0);

        let field = CString::new("virial_mass").unwrap();
        let mut out = [0.0f64; 8];
        let n = unsafe { halotree_main_branch(ptr, 0, field.as_ptr(), out.as_mut_ptr(), out.len()) };
        assert_eq!(n, 4);
        assert_eq!(&out[..4], &[5.939e13, 5.792e13, 5.718e13, 5.517e13]);

        // Integer fields widen to double
        let field = CString::new("id").unwrap();
        let n = unsafe { halotree_main_branch(ptr, 0, field.as_ptr(), out.as_mut_ptr(), out.len()) };
        assert_eq!(&out[..n], &[16181.0, 11097.0, 5829.0, 2001.0]);

        // Truncated to capacity
        let mut short = [0.0f64; 2];
        let n = unsafe { halotree_main_branch(ptr, 0, field.as_ptr(), short.as_mut_ptr(), short.len()) };
        assert_eq!(n, 2);
        assert_eq!(short, [16181.0, 11097.0]);

        unsafe { halotree_free(ptr) };
    }

    #[test]
    fn test_ffi_search_greater() {
        let ptr = open_fixture();
        assert_eq!(unsafe { halotree_build_forest(ptr) }, 0);

        let field = CString::new("virial_mass").unwrap();
        let mut rows = [0u64; 16];
        let n = unsafe { halotree_search_greater(ptr, 0, field.as_ptr(), 1e9, rows.as_mut_ptr(), rows.len()) };
        assert_eq!(n, 11);
        assert_eq!(rows[0], 0);
        assert_eq!(rows[10], 3);

        // Integer field with a fractional threshold
        let field = CString::new("id").unwrap();
        let n = unsafe { halotree_search_greater(ptr, 1, field.as_ptr(), 5840.5, rows.as_mut_ptr(), rows.len()) };
        assert_eq!(n, 2);
        assert_eq!(&rows[..2], &[12, 13]);

        unsafe { halotree_free(ptr) };
    }

    #[test]
    fn test_ffi_search_reports_total_past_capacity() {
        let ptr = open_fixture();
        assert_eq!(unsafe { halotree_build_forest(ptr) }, 0);

        let field = CString::new("virial_mass").unwrap();
        let mut rows = [u64::MAX; 4];
        let n = unsafe { halotree_search_greater(ptr, 0, field.as_ptr(), 1e9, rows.as_mut_ptr(), 3) };

        // All eleven matches counted, only three written
        assert_eq!(n, 11);
        assert_eq!(&rows[..3], &[0, 1, 5]);
        assert_eq!(rows[3], u64::MAX);

        // Zero capacity counts without writing
        let n = unsafe { halotree_search_greater(ptr, 0, field.as_ptr(), 1e9, rows.as_mut_ptr(), 0) };
        assert_eq!(n, 11);
        assert_eq!(rows[0], 0);

        unsafe { halotree_free(ptr) };
    }

    #[test]
    fn test_ffi_parent_row() {
        let ptr = open_fixture();
        assert_eq!(unsafe { halotree_build_forest(ptr) }, 0);

        assert_eq!(unsafe { halotree_parent_row(ptr, 0, 3) }, 2);
        assert_eq!(unsafe { halotree_parent_row(ptr, 0, 5) }, 0);
        assert_eq!(unsafe { halotree_parent_row(ptr, 0, 0) }, -1);
        assert!(halotree_last_error_message().is_null());

        assert_eq!(unsafe { halotree_parent_row(ptr, 0, 13) }, -2);
        assert!(last_error().contains("Row 13"));

        unsafe { halotree_free(ptr) };
    }

    #[test]
    fn test_ffi_forest_required() {
        let ptr = open_fixture();

        assert_eq!(unsafe { halotree_tree_count(ptr) }, 0);
        assert!(last_error().contains("halotree_build_forest"));

        let field = CString::new("virial_mass").unwrap();
        let mut out = [0.0f64; 4];
        let n = unsafe { halotree_main_branch(ptr, 0, field.as_ptr(), out.as_mut_ptr(), out.len()) };
        assert_eq!(n, 0);

        unsafe { halotree_free(ptr) };
    }

    #[test]
    fn test_ffi_bad_arguments() {
        let ptr = open_fixture();
        assert_eq!(unsafe { halotree_build_forest(ptr) }, 0);
        let mut out = [0.0f64; 4];

        let unknown = CString::new("colour").unwrap();
        let n = unsafe { halotree_main_branch(ptr, 0, unknown.as_ptr(), out.as_mut_ptr(), out.len()) };
        assert_eq!(n, 0);
        assert!(last_error().contains("colour"));

        let field = CString::new("virial_mass").unwrap();
        let n = unsafe { halotree_main_branch(ptr, 7, field.as_ptr(), out.as_mut_ptr(), out.len()) };
        assert_eq!(n, 0);
        assert!(last_error().contains("out of range"));

        let n = unsafe { halotree_main_branch(ptr, 0, field.as_ptr(), ptr::null_mut(), 4) };
        assert_eq!(n, 0);

        let n = unsafe { halotree_main_branch(ptr, 0, field.as_ptr(), out.as_mut_ptr(), 0) };
        assert_eq!(n, 0);
        assert!(last_error().contains("capacity"));
        assert_eq!(out, [0.0; 4]);

        unsafe { halotree_free(ptr) };
    }

    #[test]
    fn test_ffi_null_safety() {
        let ptr = unsafe { halotree_open(ptr::null(), HALOTREE_FORMAT_CONSISTENT_TREES) };
        assert!(ptr.is_null());
        assert!(last_error().contains("NULL"));

        assert_eq!(unsafe { halotree_row_count(ptr::null()) }, 0);
        assert_eq!(unsafe { halotree_build_forest(ptr::null_mut()) }, -1);
        assert_eq!(unsafe { halotree_tree_count(ptr::null()) }, 0);
        assert_eq!(unsafe { halotree_parent_row(ptr::null(), 0, 0) }, -2);

        let mut rows = [0u64; 1];
        let field = CString::new("id").unwrap();
        let n = unsafe { halotree_search_greater(ptr::null(), 0, field.as_ptr(), 0.0, rows.as_mut_ptr(), 1) };
        assert_eq!(n, -1);

        // Freeing NULL is a no-op
        unsafe { halotree_free(ptr::null_mut()) };
    }

    #[test]
    fn test_ffi_unknown_format() {
        let path = fixture();
        let ptr = unsafe { halotree_open(path.as_ptr(), 7) };
        assert!(ptr.is_null());
        assert!(last_error().contains("format code 7"));
    }

    #[test]
    fn test_ffi_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"1.0 1 0.0 -1 1\n").unwrap();
        file.flush().unwrap();

        let path = CString::new(file.path().to_str().unwrap()).unwrap();
        let ptr = unsafe { halotree_open(path.as_ptr(), HALOTREE_FORMAT_CONSISTENT_TREES) };
        assert!(ptr.is_null());

        // Context chain is preserved
        let message = last_error();
        assert!(message.contains("failed to load consistent-trees catalog"));
        assert!(message.contains("missing column"));
    }

    #[test]
    fn test_ffi_invalid_utf8_path() {
        let invalid_bytes = b"tree\xFF\xFE.dat\0";
        let ptr = unsafe { halotree_open(invalid_bytes.as_ptr() as *const c_char, HALOTREE_FORMAT_ROCKSTAR) };
        assert!(ptr.is_null(), "Should reject invalid UTF-8");
        assert!(last_error().contains("UTF-8"));
    }

    #[test]
    fn test_ffi_version() {
        let version = unsafe { CStr::from_ptr(halotree_version()) };
        assert_eq!(version.to_string_lossy(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_ffi_error_thread_local() {
        use std::thread;

        set_last_error("Main thread error");
        assert_eq!(last_error(), "Main thread error");

        let handle = thread::spawn(|| {
            assert!(halotree_last_error_message().is_null(), "New thread should have no error");

            set_last_error("Spawned thread error");
            assert_eq!(last_error(), "Spawned thread error");
        });

        handle.join().unwrap();
        assert_eq!(last_error(), "Main thread error");
    }

    #[test]
    fn test_ffi_guard_catches_panic() {
        let result: Option<()> = ffi_guard(|| panic!("boom"));
        assert!(result.is_none());
        assert_eq!(last_error(), "Panic: boom");
    }
}
