//! Generators for synthetic grid coordinates.
//!
//! These generators create predictable, verifiable coordinate arrays
//! that can be used across the test suite.

/// Evenly spaced values from `start` to `end`, including `end`.
///
/// # Example
///
/// ```
/// use test_utils::axis_values;
///
/// assert_eq!(axis_values(0.0, 2.0, 1.0), vec![0.0, 1.0, 2.0]);
/// ```
pub fn axis_values(start: f64, end: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || end < start {
        return Vec::new();
    }
    let n = ((end - start) / step + 1e-9).floor() as usize + 1;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Builds flattened 3D coordinate arrays from 1D axes.
///
/// Arguments are ordered (y, z, x) and the output is (y, z, x), each of
/// length `nz * ny * nx` laid out z-major, then y, then x. This is the
/// layout radar grids use for their point coordinates.
///
/// # Example
///
/// ```
/// use test_utils::meshgrid;
///
/// let (y, z, x) = meshgrid(&[0.0, 1.0], &[5.0], &[10.0, 20.0, 30.0]);
/// assert_eq!(x.len(), 6);
/// assert_eq!(x[..3], [10.0, 20.0, 30.0]);
/// assert_eq!(y[3], 1.0);
/// assert!(z.iter().all(|&v| v == 5.0));
/// ```
pub fn meshgrid(ys: &[f64], zs: &[f64], xs: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let len = xs.len() * ys.len() * zs.len();
    let mut y = Vec::with_capacity(len);
    let mut z = Vec::with_capacity(len);
    let mut x = Vec::with_capacity(len);

    for &zv in zs {
        for &yv in ys {
            for &xv in xs {
                y.push(yv);
                z.push(zv);
                x.push(xv);
            }
        }
    }
    (y, z, x)
}

/// Replaces every `stride`-th value with NaN.
///
/// Useful for testing that masked points do not affect extents.
pub fn with_nan_every(values: &[f64], stride: usize) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if stride > 0 && i % stride == 0 {
                f64::NAN
            } else {
                v
            }
        })
        .collect()
}
