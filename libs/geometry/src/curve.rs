//! Flattening of cubic Bézier segments into polylines.

/// Evaluates the cubic Bézier curve with control points `p` at parameter `t`.
pub fn cubic_at(p: [(f64, f64); 4], t: f64) -> (f64, f64) {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    (
        a * p[0].0 + b * p[1].0 + c * p[2].0 + d * p[3].0,
        a * p[0].1 + b * p[1].1 + c * p[2].1 + d * p[3].1,
    )
}

/// Approximates a cubic Bézier curve by `segments` straight segments.
///
/// Returns the points after the start point, ending with `p[3]`.
///
/// ```
/// # use geometry::curve::flatten_cubic;
/// let pts = flatten_cubic([(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)], 3);
/// assert_eq!(pts.len(), 3);
/// assert_eq!(pts[2], (1.0, 0.0));
/// ```
pub fn flatten_cubic(p: [(f64, f64); 4], segments: usize) -> Vec<(f64, f64)> {
    let segments = segments.max(1);
    (1..=segments)
        .map(|i| {
            if i == segments {
                p[3]
            } else {
                cubic_at(p, i as f64 / segments as f64)
            }
        })
        .collect()
}
