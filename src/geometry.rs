use serde::{Deserialize, Serialize};

/// 轴对齐矩形, 像素坐标 (x, y 为左上角)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle whose centre sits at `(center_x, center_y)`.
    pub fn from_center(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self::new(center_x - width / 2.0, center_y - height / 2.0, width, height)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Moves the rectangle horizontally so its centre lands on `center_x`.
    pub fn set_center_x(&mut self, center_x: f32) {
        self.x = center_x - self.width / 2.0;
    }

    /// Strict overlap test; rectangles that only share an edge do not collide.
    pub fn collides_with(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;

    #[test]
    fn overlapping_rects_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.collides_with(&b));
        assert!(b.collides_with(&a));
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.collides_with(&right));
        assert!(!a.collides_with(&below));
    }

    #[test]
    fn centre_helpers_round_trip() {
        let mut r = Rect::from_center(275.0, 561.0, 40.0, 80.0);
        assert_eq!(r.center_x(), 275.0);
        assert_eq!(r.center_y(), 561.0);
        r.set_center_x(525.0);
        assert_eq!(r.center_x(), 525.0);
        assert_eq!(r.y, 521.0);
    }
}
