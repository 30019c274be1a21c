// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Axis-aligned rectangle helpers shared by physics, rendering and level generation
//!
//! Screen space: x grows to the right, y grows downward.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle described by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub position: DVec2,
    /// Width and height
    pub size: DVec2,
}

impl Rect {
    /// Create a rectangle from its corner and size
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            position: DVec2::new(x, y),
            size: DVec2::new(width, height),
        }
    }

    /// Create a rectangle from vectors
    pub fn from_vectors(position: DVec2, size: DVec2) -> Self {
        Rect { position, size }
    }

    /// Left edge
    pub fn left(&self) -> f64 {
        self.position.x
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.position.x + self.size.x
    }

    /// Top edge
    pub fn top(&self) -> f64 {
        self.position.y
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.y
    }

    /// Centre point
    pub fn center(&self) -> DVec2 {
        self.position + self.size * 0.5
    }

    /// Copy moved by the given offset
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Rect {
            position: self.position + DVec2::new(dx, dy),
            size: self.size,
        }
    }

    /// Copy grown by `margin` on every side
    pub fn inflated(&self, margin: f64) -> Self {
        Rect {
            position: self.position - DVec2::splat(margin),
            size: self.size + DVec2::splat(margin * 2.0),
        }
    }

    /// Strict overlap: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Whether `point` lies inside or on the border
    pub fn contains_point(&self, point: DVec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), DVec2::new(25.0, 40.0));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.inflated(2.5).overlaps(&b));
    }

    #[test]
    fn test_inflated() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).inflated(2.5);
        assert_eq!(r, Rect::new(-2.5, -2.5, 15.0, 15.0));
    }
}
