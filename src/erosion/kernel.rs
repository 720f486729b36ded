//! Terrain-mutating primitives: radial erosion brush and bilinear deposition.
//!
//! Both primitives conserve mass: the total height change equals the
//! requested amount (up to floating-point rounding for the brush, exactly
//! for the bilinear split). The brush footprint is clamped to the grid and
//! its weights renormalized over the covered cells, so writes never leave
//! the valid index range even when the center sits near an edge.

use glam::DVec2;

use crate::field::Heightfield;

/// Visits every covered cell of the radial brush with its normalized share
/// of `amount`.
///
/// Weights are `max(0, radius - d)` where `d` is the Euclidean distance from
/// the cell to the continuous center, taken over the square of cells within
/// `radius` of the anchor cell and clamped to the grid. The weight sum is
/// always positive: the grid cell nearest to the center is covered and lies
/// within `sqrt(2)/2 < 1` of it.
fn visit_brush<F>(width: u32, height: u32, pos: DVec2, amount: f64, radius: u32, mut apply: F)
where
    F: FnMut(u32, u32, f64),
{
    let xi = pos.x.floor() as i64;
    let yi = pos.y.floor() as i64;
    let r = radius as i64;

    let x_min = (xi - r).max(0) as u32;
    let y_min = (yi - r).max(0) as u32;
    let x_max = ((xi + r) as u32).min(width - 1);
    let y_max = ((yi + r) as u32).min(height - 1);

    let mut total = 0.0;
    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let d = DVec2::new(x as f64, y as f64).distance(pos);
            total += (radius as f64 - d).max(0.0);
        }
    }
    debug_assert!(total > 0.0);

    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let d = DVec2::new(x as f64, y as f64).distance(pos);
            let w = (radius as f64 - d).max(0.0);
            if w > 0.0 {
                apply(x, y, amount * w / total);
            }
        }
    }
}

/// Removes `amount` of height around `pos`, spread over the radial brush.
///
/// # Panics
/// Panics in debug builds if `pos` is outside the valid sampling region or
/// `radius` is zero.
pub fn erode(field: &mut Heightfield, pos: DVec2, amount: f64, radius: u32) {
    debug_assert!(field.in_sample_bounds(pos));
    debug_assert!(radius >= 1);
    let (width, height) = (field.width, field.height);
    visit_brush(width, height, pos, amount, radius, |x, y, share| {
        field.set(x, y, field.get(x, y) - share);
    });
}

/// Buffered variant of [`erode`]: records negative height deltas instead of
/// mutating the grid. Used by the batched driver.
pub fn erode_into(
    field: &Heightfield,
    pos: DVec2,
    amount: f64,
    radius: u32,
    deltas: &mut Vec<(usize, f64)>,
) {
    debug_assert!(field.in_sample_bounds(pos));
    debug_assert!(radius >= 1);
    let width = field.width;
    visit_brush(width, field.height, pos, amount, radius, |x, y, share| {
        deltas.push(((y * width + x) as usize, -share));
    });
}

/// Adds `amount` of height at `pos`, split bilinearly among the four
/// surrounding cells. The four weights sum to exactly 1.
///
/// # Panics
/// Panics in debug builds if `pos` is outside the valid sampling region.
pub fn deposit(field: &mut Heightfield, pos: DVec2, amount: f64) {
    debug_assert!(field.in_sample_bounds(pos));
    let xi = pos.x.floor() as u32;
    let yi = pos.y.floor() as u32;
    let u = pos.x - pos.x.floor();
    let v = pos.y - pos.y.floor();

    field.set(xi, yi, field.get(xi, yi) + amount * (1.0 - u) * (1.0 - v));
    field.set(xi + 1, yi, field.get(xi + 1, yi) + amount * u * (1.0 - v));
    field.set(xi, yi + 1, field.get(xi, yi + 1) + amount * (1.0 - u) * v);
    field.set(xi + 1, yi + 1, field.get(xi + 1, yi + 1) + amount * u * v);
}

/// Buffered variant of [`deposit`]: records positive height deltas instead
/// of mutating the grid. Used by the batched driver.
pub fn deposit_into(
    field: &Heightfield,
    pos: DVec2,
    amount: f64,
    deltas: &mut Vec<(usize, f64)>,
) {
    debug_assert!(field.in_sample_bounds(pos));
    let xi = pos.x.floor() as u32;
    let yi = pos.y.floor() as u32;
    let u = pos.x - pos.x.floor();
    let v = pos.y - pos.y.floor();
    let w = field.width;

    deltas.push(((yi * w + xi) as usize, amount * (1.0 - u) * (1.0 - v)));
    deltas.push(((yi * w + xi + 1) as usize, amount * u * (1.0 - v)));
    deltas.push((((yi + 1) * w + xi) as usize, amount * (1.0 - u) * v));
    deltas.push((((yi + 1) * w + xi + 1) as usize, amount * u * v));
}
