use crate::layout::Band;
use crate::space::Point;

/// Resolves a pointer position to the band under it by radial distance alone, ignoring
/// where the markers currently are.
///
/// `scale` converts rendered distances back into layout units. Bands are scanned from the
/// outermost inwards, so overlapping bands always resolve to the outermost match.
pub fn hit_test(pointer: Point, center: Point, scale: f64, bands: &[Band]) -> Option<usize> {
    let scale = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    };
    let distance = pointer.distance_to(center) / scale;
    if !distance.is_finite() {
        return None;
    }

    bands
        .iter()
        .enumerate()
        .rev()
        .find(|(_, band)| band.contains_distance(distance))
        .map(|(i, _)| i)
}
