//! Collision geometry for round entities and rectangular obstacles
//!
//! Everything is in canvas space. Entities are circles; walls are
//! axis-aligned rectangles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, ROOM_MARGIN};

/// Axis-aligned rectangle (top-left corner + extent)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square box enclosing a circle
    pub fn around(center: Vec2, radius: f32) -> Self {
        Self::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict AABB overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Strict point containment
    pub fn contains(&self, p: Vec2) -> bool {
        p.x > self.x && p.x < self.right() && p.y > self.y && p.y < self.bottom()
    }
}

/// True if two circles overlap
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Clamp a circle's center into the room's inset playable area
pub fn clamp_to_room(pos: Vec2, radius: f32) -> Vec2 {
    Vec2::new(
        pos.x.clamp(ROOM_MARGIN + radius, CANVAS_WIDTH - ROOM_MARGIN - radius),
        pos.y.clamp(ROOM_MARGIN + radius, CANVAS_HEIGHT - ROOM_MARGIN - radius),
    )
}

/// True if a point lies outside the canvas
pub fn out_of_canvas(p: Vec2) -> bool {
    p.x < 0.0 || p.x > CANVAS_WIDTH || p.y < 0.0 || p.y > CANVAS_HEIGHT
}

/// Push a circle (treated as its bounding box) out of a wall along the
/// axis with the smaller penetration.
///
/// Single pass: when several walls overlap in one tick a smaller residual
/// overlap can survive until the next tick.
pub fn push_out_of_wall(pos: Vec2, radius: f32, wall: &Rect) -> Vec2 {
    let body = Rect::around(pos, radius);
    if !body.overlaps(wall) {
        return pos;
    }

    // Penetration needed to exit through each side
    let exit_left = body.right() - wall.x;
    let exit_right = wall.right() - body.x;
    let exit_up = body.bottom() - wall.y;
    let exit_down = wall.bottom() - body.y;

    let (dx, x_pos) = if exit_left < exit_right {
        (exit_left, wall.x - radius)
    } else {
        (exit_right, wall.right() + radius)
    };
    let (dy, y_pos) = if exit_up < exit_down {
        (exit_up, wall.y - radius)
    } else {
        (exit_down, wall.bottom() + radius)
    };

    if dx < dy {
        Vec2::new(x_pos, pos.y)
    } else {
        Vec2::new(pos.x, y_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        let c = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
    }

    #[test]
    fn test_clamp_to_room() {
        let p = clamp_to_room(Vec2::new(-100.0, 1000.0), 20.0);
        assert_eq!(p, Vec2::new(70.0, CANVAS_HEIGHT - 70.0));
    }

    #[test]
    fn test_push_out_uses_shallow_axis() {
        let wall = Rect::new(100.0, 100.0, 40.0, 40.0);
        // Slightly into the left face, well inside vertically
        let pushed = push_out_of_wall(Vec2::new(85.0, 120.0), 20.0, &wall);
        assert_eq!(pushed, Vec2::new(80.0, 120.0));

        // Slightly into the bottom face
        let pushed = push_out_of_wall(Vec2::new(118.0, 155.0), 20.0, &wall);
        assert_eq!(pushed, Vec2::new(118.0, 160.0));
    }

    #[test]
    fn test_push_out_leaves_clear_bodies_alone() {
        let wall = Rect::new(100.0, 100.0, 40.0, 40.0);
        let p = Vec2::new(300.0, 300.0);
        assert_eq!(push_out_of_wall(p, 20.0, &wall), p);
    }

    #[test]
    fn test_out_of_canvas() {
        assert!(out_of_canvas(Vec2::new(-1.0, 10.0)));
        assert!(!out_of_canvas(Vec2::new(400.0, 300.0)));
    }
}
