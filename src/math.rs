//! Scalar numerics shared by the capacity models
//!
//! Everything here is closed-form or locally iterative: quadratic roots for
//! the stress-block equilibrium states, a secant root-finder for
//! capacity/demand intersections, and piecewise-linear curve helpers.

/// Real roots of `a x^2 + b x + c = 0`, smallest first.
///
/// Degenerates gracefully to the linear case when `a` vanishes. Returns
/// `None` when no real root exists.
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a.abs() < 1e-300 {
        if b.abs() < 1e-300 {
            return None;
        }
        let x = -c / b;
        return Some((x, x));
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sq = discriminant.sqrt();
    let r1 = (-b - sq) / (2.0 * a);
    let r2 = (-b + sq) / (2.0 * a);
    Some((r1.min(r2), r1.max(r2)))
}

/// Maximum iterations of the secant solver
pub const ROOT_MAX_ITER: usize = 100;
/// Relative step tolerance of the secant solver
pub const ROOT_TOL: f64 = 1e-9;

/// Root of `f(x) = 0` by the secant method.
///
/// Callers seed the search with the static axial load of the subassembly
/// under analysis. Convergence is declared when the step falls below
/// `ROOT_TOL` relative to the iterate; `None` means the curves do not cross
/// within `ROOT_MAX_ITER` iterations.
pub fn find_root<F: FnMut(f64) -> f64>(mut f: F, seed: f64) -> Option<f64> {
    let mut x0 = seed;
    let mut x1 = if seed.abs() > 1.0 { seed * 1.01 } else { seed + 1.0 };
    let mut f0 = f(x0);
    let mut f1 = f(x1);

    for _ in 0..ROOT_MAX_ITER {
        if (f1 - f0).abs() < 1e-300 {
            return None;
        }
        let x2 = x1 - f1 * (x1 - x0) / (f1 - f0);
        if !x2.is_finite() {
            return None;
        }
        let scale = x2.abs().max(1.0);
        if (x2 - x1).abs() <= ROOT_TOL * scale {
            return Some(x2);
        }
        x0 = x1;
        f0 = f1;
        x1 = x2;
        f1 = f(x2);
    }
    None
}

/// First intersection point of two piecewise-linear curves.
///
/// Both curves are given as breakpoint arrays with monotonically
/// non-decreasing abscissae. Segments are scanned in order and the first
/// crossing inside both segments is returned as `(x, y)`.
pub fn polyline_intersection(
    x_a: &[f64],
    y_a: &[f64],
    x_b: &[f64],
    y_b: &[f64],
) -> Option<(f64, f64)> {
    for i in 0..x_a.len().saturating_sub(1) {
        for j in 0..x_b.len().saturating_sub(1) {
            if let Some(point) = segment_intersection(
                (x_a[i], y_a[i]),
                (x_a[i + 1], y_a[i + 1]),
                (x_b[j], y_b[j]),
                (x_b[j + 1], y_b[j + 1]),
            ) {
                return Some(point);
            }
        }
    }
    None
}

/// Intersection of two closed segments, if any
fn segment_intersection(
    p1: (f64, f64),
    p2: (f64, f64),
    q1: (f64, f64),
    q2: (f64, f64),
) -> Option<(f64, f64)> {
    let d1 = (p2.0 - p1.0, p2.1 - p1.1);
    let d2 = (q2.0 - q1.0, q2.1 - q1.1);
    let denom = d1.0 * d2.1 - d1.1 * d2.0;
    if denom.abs() < 1e-14 {
        // parallel segments carry no isolated crossing
        return None;
    }
    let dq = (q1.0 - p1.0, q1.1 - p1.1);
    let t = (dq.0 * d2.1 - dq.1 * d2.0) / denom;
    let u = (dq.0 * d1.1 - dq.1 * d1.0) / denom;
    let eps = 1e-12;
    if t < -eps || t > 1.0 + eps || u < -eps || u > 1.0 + eps {
        return None;
    }
    Some((p1.0 + t * d1.0, p1.1 + t * d1.1))
}

/// Linear interpolation over a breakpoint curve, held flat past the last
/// point and anchored at the origin before the first.
///
/// Capacity curves start at their yield breakpoint; demand below that is on
/// the elastic ramp from (0, 0).
pub fn interp_capacity(disp: &[f64], value: &[f64], x: f64) -> f64 {
    debug_assert_eq!(disp.len(), value.len());
    if disp.is_empty() {
        return 0.0;
    }
    if x >= disp[disp.len() - 1] {
        return value[value.len() - 1];
    }
    if x <= disp[0] {
        if disp[0] <= 0.0 {
            return value[0];
        }
        return value[0] * x / disp[0];
    }
    for i in 1..disp.len() {
        if x <= disp[i] {
            let span = disp[i] - disp[i - 1];
            if span <= 0.0 {
                return value[i];
            }
            let t = (x - disp[i - 1]) / span;
            return value[i - 1] + t * (value[i] - value[i - 1]);
        }
    }
    value[value.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quadratic_two_roots() {
        let (r1, r2) = quadratic_roots(1.0, -3.0, 2.0).unwrap();
        assert_relative_eq!(r1, 1.0);
        assert_relative_eq!(r2, 2.0);
    }

    #[test]
    fn quadratic_linear_fallback() {
        let (r1, r2) = quadratic_roots(0.0, 2.0, -4.0).unwrap();
        assert_relative_eq!(r1, 2.0);
        assert_relative_eq!(r2, 2.0);
    }

    #[test]
    fn quadratic_no_real_roots() {
        assert!(quadratic_roots(1.0, 0.0, 1.0).is_none());
    }

    #[test]
    fn secant_solves_linear_in_few_steps() {
        // f(x) = 300 - 0.5 x, root at 600
        let root = find_root(|x| 300.0 - 0.5 * x, 100.0).unwrap();
        assert_relative_eq!(root, 600.0, max_relative = 1e-9);
    }

    #[test]
    fn secant_reports_no_crossing() {
        assert!(find_root(|x| 1.0 + x * x * 0.0, 0.0).is_none());
    }

    #[test]
    fn polylines_cross_once() {
        // descending segment against an ascending one
        let (x, y) = polyline_intersection(
            &[0.0, 1.0],
            &[1.0, 0.0],
            &[0.0, 1.0],
            &[0.0, 1.0],
        )
        .unwrap();
        assert_relative_eq!(x, 0.5);
        assert_relative_eq!(y, 0.5);
    }

    #[test]
    fn disjoint_polylines_do_not_cross() {
        assert!(polyline_intersection(&[0.0, 1.0], &[2.0, 2.5], &[0.0, 1.0], &[0.0, 1.0]).is_none());
    }

    #[test]
    fn interpolation_holds_flat_beyond_last_point() {
        let disp = [1.0, 2.0];
        let value = [10.0, 12.0];
        assert_relative_eq!(interp_capacity(&disp, &value, 5.0), 12.0);
        assert_relative_eq!(interp_capacity(&disp, &value, 1.5), 11.0);
        // elastic ramp below the first breakpoint
        assert_relative_eq!(interp_capacity(&disp, &value, 0.5), 5.0);
    }
}
