//! Layout utilities for rect manipulation.
//!
//! Pure functions for computing layout areas. No state mutation.

use ratatui::layout::Rect;

/// Inset a rect horizontally by padding on both sides.
pub fn inset_horizontal(area: Rect, padding: u16) -> Rect {
    if area.width <= padding * 2 {
        return area;
    }
    Rect {
        x: area.x + padding,
        width: area.width - padding * 2,
        ..area
    }
}

/// Rect hugging the bottom-right corner, clamped to the parent.
pub fn bottom_right_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + area.width - width,
        y: area.y + area.height - height,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::{bottom_right_rect, inset_horizontal};
    use ratatui::layout::Rect;

    #[test]
    fn inset_horizontal_shrinks_both_sides() {
        let area = Rect::new(0, 0, 10, 2);
        let inset = inset_horizontal(area, 2);
        assert_eq!(inset, Rect::new(2, 0, 6, 2));
    }

    #[test]
    fn inset_horizontal_leaves_narrow_rects_alone() {
        let area = Rect::new(0, 0, 3, 2);
        assert_eq!(inset_horizontal(area, 2), area);
    }

    #[test]
    fn bottom_right_rect_clamps_to_parent() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(bottom_right_rect(8, 4, area), Rect::new(12, 6, 8, 4));
        assert_eq!(bottom_right_rect(40, 40, area), Rect::new(0, 0, 20, 10));
    }
}
