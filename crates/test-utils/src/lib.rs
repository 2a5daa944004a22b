//! Shared test utilities for the unity-sidecar workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Sample sidecar documents
//! - Coordinate generators
//! - Temporary directory helpers
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Asserts that a JSON object has exactly the given keys, in any order.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_json_keys;
///
/// let value = serde_json::json!({"a": 1, "b": 2});
/// assert_json_keys!(value, ["a", "b"]);
/// ```
#[macro_export]
macro_rules! assert_json_keys {
    ($value:expr, [$($key:expr),* $(,)?]) => {{
        let object = $value
            .as_object()
            .unwrap_or_else(|| panic!("expected a JSON object, got {}", $value));
        let mut actual: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
        actual.sort_unstable();
        let mut expected: Vec<&str> = vec![$($key),*];
        expected.sort_unstable();
        assert_eq!(actual, expected, "JSON object keys differ");
    }};
}
