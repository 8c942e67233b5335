use eframe::egui::{Color32, Pos2, Rect};

pub(super) fn faded(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

pub(super) fn circle_visible(rect: Rect, center: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(center)
}

/// Whether any part of the segment crosses `rect` grown by `padding`.
pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let rect = rect.expand(padding);
    if !rect.intersects(Rect::from_two_pos(start, end)) {
        return false;
    }
    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    // Clip the parametric segment against each slab.
    let delta = end - start;
    let mut enter = 0.0_f32;
    let mut exit = 1.0_f32;
    for (origin, direction, low, high) in [
        (start.x, delta.x, rect.left(), rect.right()),
        (start.y, delta.y, rect.top(), rect.bottom()),
    ] {
        if direction.abs() <= f32::EPSILON {
            if origin < low || origin > high {
                return false;
            }
            continue;
        }

        let mut near = (low - origin) / direction;
        let mut far = (high - origin) / direction;
        if near > far {
            std::mem::swap(&mut near, &mut far);
        }
        enter = enter.max(near);
        exit = exit.min(far);
        if enter > exit {
            return false;
        }
    }
    true
}
