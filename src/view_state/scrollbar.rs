//! Scrollbar thumb geometry (pure).

/// Smallest thumb drawn, in rows.
pub const MIN_THUMB_LEN: usize = 3;

/// Placement of the scrollbar thumb within the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thumb {
    /// 1-based row of the thumb's first cell within the track.
    pub position: usize,
    /// Thumb length in rows.
    pub length: usize,
}

/// Compute the thumb for a log of `length` lines shown `height` lines at a
/// time, scrolled to `topline`.
///
/// Returns `None` when everything fits, and also when the thumb would fill
/// the whole track (there is nothing to move it along).
///
/// The returned position is always within `1..=height - thumb.length + 1`.
pub fn thumb(length: usize, height: usize, topline: usize) -> Option<Thumb> {
    if length <= height {
        return None;
    }

    let overflow = length - height;
    let thumb_len = MIN_THUMB_LEN.max(height * height / length);
    if thumb_len >= height {
        return None;
    }

    let travel = height - thumb_len;
    let steps = overflow as f64 / travel as f64;
    let topline = topline.min(overflow);
    let position = (1.0 + topline as f64 / steps).round() as usize;

    Some(Thumb {
        position: position.clamp(1, travel + 1),
        length: thumb_len,
    })
}
