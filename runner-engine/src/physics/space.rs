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
//! Spatial index of axis-aligned shapes
//!
//! Every collidable entity owns one shape. Shapes are indexed by tag so that
//! [`Space::filter_by_tag`] is a cheap live view instead of a scan.
//!
//! Resolution sweeps the X axis first and the Y axis second; callers rely on
//! that order. A mover only blocks against candidates it overlaps strictly on
//! the perpendicular axis, so standing on a block never stops horizontal
//! movement along its top edge.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use glam::DVec2;

use crate::ecs::components::Tag;
use crate::ecs::Entity;
use crate::math::Rect;

/// Tolerance for edge contact checks
const CONTACT_EPSILON: f64 = 1e-6;

/// Handle of a shape inside a [`Space`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId(u64);

impl ShapeId {
    /// Raw id
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// An indexed rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Current bounds
    pub rect: Rect,
    /// Tags used for filtering
    pub tags: BTreeSet<Tag>,
    /// Entity owning the shape
    pub owner: Option<Entity>,
}

/// Outcome of a resolved move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Shape that stopped the X sweep
    pub blocked_x: Option<ShapeId>,
    /// Shape that stopped the Y sweep
    pub blocked_y: Option<ShapeId>,
    /// Allowed movement
    pub delta: DVec2,
    /// Top-left corner after the move, snapped to the blocking edge on contact
    pub position: DVec2,
}

impl Resolution {
    /// Whether either sweep was blocked
    pub fn colliding(&self) -> bool {
        self.blocked_x.is_some() || self.blocked_y.is_some()
    }
}

/// Collection of shapes with a tag index
#[derive(Debug, Default)]
pub struct Space {
    next_id: u64,
    shapes: BTreeMap<ShapeId, Shape>,
    by_tag: HashMap<Tag, BTreeSet<ShapeId>>,
}

impl Space {
    /// Create an empty space
    pub fn new() -> Self {
        Space::default()
    }

    /// Add a shape and return its handle
    pub fn add(&mut self, rect: Rect, tags: BTreeSet<Tag>, owner: Option<Entity>) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        for tag in &tags {
            self.by_tag.entry(*tag).or_default().insert(id);
        }
        self.shapes.insert(id, Shape { rect, tags, owner });
        id
    }

    /// Remove a shape
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let shape = self.shapes.remove(&id)?;
        for tag in &shape.tags {
            if let Some(ids) = self.by_tag.get_mut(tag) {
                ids.remove(&id);
            }
        }
        Some(shape)
    }

    /// Look up a shape
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    /// Move a shape; returns false for unknown handles
    pub fn set_position(&mut self, id: ShapeId, position: DVec2) -> bool {
        match self.shapes.get_mut(&id) {
            Some(shape) => {
                shape.rect.position = position;
                true
            }
            None => false,
        }
    }

    /// Replace a shape's bounds; returns false for unknown handles
    pub fn set_rect(&mut self, id: ShapeId, rect: Rect) -> bool {
        match self.shapes.get_mut(&id) {
            Some(shape) => {
                shape.rect = rect;
                true
            }
            None => false,
        }
    }

    /// Number of shapes
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the space is empty
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Remove every shape
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.by_tag.clear();
    }

    /// View over every shape
    pub fn all(&self) -> ShapeFilter<'_> {
        ShapeFilter {
            space: self,
            ids: None,
        }
    }

    /// Live view over the shapes carrying `tag`
    pub fn filter_by_tag(&self, tag: Tag) -> ShapeFilter<'_> {
        ShapeFilter {
            space: self,
            ids: Some(self.by_tag.get(&tag)),
        }
    }

    /// Shapes overlapping `rect` grown by `padding` on every side.
    ///
    /// With a positive padding, shapes that only touch `rect` or sit closer
    /// than `padding` are reported too. Results come back in handle order.
    pub fn query_overlap(
        &self,
        rect: Rect,
        padding: f64,
        exclude: Option<ShapeId>,
    ) -> Vec<(ShapeId, &Shape)> {
        let area = rect.inflated(padding);
        self.shapes
            .iter()
            .filter(|(id, _)| Some(**id) != exclude)
            .filter(|(_, shape)| area.overlaps(&shape.rect))
            .map(|(id, shape)| (*id, shape))
            .collect()
    }
}

/// A borrowed subset of a [`Space`]
#[derive(Debug, Clone, Copy)]
pub struct ShapeFilter<'a> {
    space: &'a Space,
    // `None` means every shape; `Some(None)` means a tag nobody carries.
    ids: Option<Option<&'a BTreeSet<ShapeId>>>,
}

impl<'a> ShapeFilter<'a> {
    /// Iterate over the shapes in the view
    pub fn iter(&self) -> Box<dyn Iterator<Item = (ShapeId, &'a Shape)> + 'a> {
        let space = self.space;
        match self.ids {
            None => Box::new(space.shapes.iter().map(|(id, shape)| (*id, shape))),
            Some(None) => Box::new(std::iter::empty()),
            Some(Some(ids)) => Box::new(
                ids.iter()
                    .filter_map(move |id| space.shapes.get(id).map(|shape| (*id, shape))),
            ),
        }
    }

    /// Number of shapes in the view
    pub fn len(&self) -> usize {
        match self.ids {
            None => self.space.len(),
            Some(None) => 0,
            Some(Some(ids)) => ids.len(),
        }
    }

    /// Whether the view is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is part of the view
    pub fn contains(&self, id: ShapeId) -> bool {
        match self.ids {
            None => self.space.shapes.contains_key(&id),
            Some(None) => false,
            Some(Some(ids)) => ids.contains(&id),
        }
    }

    /// Move `rect` by `(dx, dy)` as far as the shapes in this view allow.
    ///
    /// X is swept first, then Y from the X-resolved position. `exclude` is
    /// the mover's own shape. With no candidates the full delta is returned
    /// and nothing collides.
    pub fn resolve(&self, rect: Rect, dx: f64, dy: f64, exclude: Option<ShapeId>) -> Resolution {
        let (x, blocked_x) = self.sweep(rect, dx, exclude, Axis::X);
        let moved = Rect::from_vectors(DVec2::new(x, rect.position.y), rect.size);
        let (y, blocked_y) = self.sweep(moved, dy, exclude, Axis::Y);

        let position = DVec2::new(x, y);
        Resolution {
            blocked_x,
            blocked_y,
            delta: position - rect.position,
            position,
        }
    }

    /// Sweep one axis, returning the new coordinate on that axis and the
    /// nearest blocking shape.
    fn sweep(&self, rect: Rect, delta: f64, exclude: Option<ShapeId>, axis: Axis) -> (f64, Option<ShapeId>) {
        let start = axis.min(&rect);
        if delta == 0.0 {
            return (start, None);
        }

        let mut best = start + delta;
        let mut blocker = None;

        for (id, shape) in self.iter() {
            if Some(id) == exclude || !axis.perpendicular_overlap(&rect, &shape.rect) {
                continue;
            }
            let other = &shape.rect;
            if delta > 0.0 {
                // Only candidates fully ahead of the leading edge can block.
                if axis.min(other) < axis.max(&rect) - CONTACT_EPSILON {
                    continue;
                }
                let limit = axis.min(other) - axis.extent(&rect);
                if limit < best {
                    best = limit.max(start);
                    blocker = Some(id);
                }
            } else {
                if axis.max(other) > axis.min(&rect) + CONTACT_EPSILON {
                    continue;
                }
                let limit = axis.max(other);
                if limit > best {
                    best = limit.min(start);
                    blocker = Some(id);
                }
            }
        }
        (best, blocker)
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn min(self, rect: &Rect) -> f64 {
        match self {
            Axis::X => rect.left(),
            Axis::Y => rect.top(),
        }
    }

    fn max(self, rect: &Rect) -> f64 {
        match self {
            Axis::X => rect.right(),
            Axis::Y => rect.bottom(),
        }
    }

    fn extent(self, rect: &Rect) -> f64 {
        match self {
            Axis::X => rect.size.x,
            Axis::Y => rect.size.y,
        }
    }

    fn perpendicular_overlap(self, a: &Rect, b: &Rect) -> bool {
        match self {
            Axis::X => a.top() < b.bottom() - CONTACT_EPSILON && a.bottom() > b.top() + CONTACT_EPSILON,
            Axis::Y => a.left() < b.right() - CONTACT_EPSILON && a.right() > b.left() + CONTACT_EPSILON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[Tag]) -> BTreeSet<Tag> {
        list.iter().copied().collect()
    }

    fn ground_space() -> (Space, ShapeId) {
        let mut space = Space::new();
        let block = space.add(Rect::new(0.0, 500.0, 200.0, 100.0), tags(&[Tag::Ground]), None);
        (space, block)
    }

    #[test]
    fn test_resolve_without_candidates_returns_full_delta() {
        let space = Space::new();
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let res = space.filter_by_tag(Tag::Ground).resolve(rect, 5.0, -3.0, None);
        assert!(!res.colliding());
        assert_eq!(res.delta, DVec2::new(5.0, -3.0));
        assert_eq!(res.position, DVec2::new(5.0, -3.0));
    }

    #[test]
    fn test_falling_snaps_to_top_edge() {
        let (space, block) = ground_space();
        let rect = Rect::new(50.0, 480.0, 20.0, 15.0);
        let res = space.filter_by_tag(Tag::Ground).resolve(rect, 0.0, 30.0, None);
        assert_eq!(res.blocked_y, Some(block));
        assert_eq!(res.position.y, 485.0);
        assert_eq!(res.position.y + rect.size.y, 500.0);
    }

    #[test]
    fn test_resting_contact_still_collides() {
        let (space, _) = ground_space();
        let rect = Rect::new(50.0, 485.0, 20.0, 15.0);
        let res = space.filter_by_tag(Tag::Ground).resolve(rect, 0.0, 8.0, None);
        assert!(res.colliding());
        assert_eq!(res.delta.y, 0.0);
    }

    #[test]
    fn test_walking_along_top_edge_is_free() {
        let (space, _) = ground_space();
        let rect = Rect::new(50.0, 485.0, 20.0, 15.0);
        let res = space.filter_by_tag(Tag::Ground).resolve(rect, 10.0, 0.0, None);
        assert!(!res.colliding());
        assert_eq!(res.position.x, 60.0);
    }

    #[test]
    fn test_x_resolved_before_y() {
        // A wall to the right; moving diagonally into it stops X but keeps Y.
        let mut space = Space::new();
        let wall = space.add(Rect::new(100.0, 0.0, 50.0, 400.0), tags(&[Tag::Ground]), None);
        let rect = Rect::new(80.0, 100.0, 10.0, 10.0);

        let res = space.filter_by_tag(Tag::Ground).resolve(rect, 25.0, 40.0, None);
        assert_eq!(res.blocked_x, Some(wall));
        assert_eq!(res.blocked_y, None);
        assert_eq!(res.position, DVec2::new(90.0, 140.0));
    }

    #[test]
    fn test_moving_left_blocks_on_right_edge() {
        let (space, block) = ground_space();
        let rect = Rect::new(210.0, 520.0, 10.0, 10.0);
        let res = space.all().resolve(rect, -50.0, 0.0, None);
        assert_eq!(res.blocked_x, Some(block));
        assert_eq!(res.position.x, 200.0);
    }

    #[test]
    fn test_exclude_own_shape() {
        let mut space = Space::new();
        let own = space.add(Rect::new(0.0, 0.0, 10.0, 10.0), tags(&[Tag::Ground]), None);
        let rect = space.get(own).unwrap().rect;
        let res = space.filter_by_tag(Tag::Ground).resolve(rect, 0.0, 5.0, Some(own));
        assert!(!res.colliding());
    }

    #[test]
    fn test_filter_is_live() {
        let mut space = Space::new();
        assert!(space.filter_by_tag(Tag::Enemy).is_empty());

        let enemy = space.add(Rect::new(0.0, 0.0, 1.0, 1.0), tags(&[Tag::Enemy]), None);
        space.add(Rect::new(5.0, 0.0, 1.0, 1.0), tags(&[Tag::Ground]), None);
        assert_eq!(space.filter_by_tag(Tag::Enemy).len(), 1);
        assert!(space.filter_by_tag(Tag::Enemy).contains(enemy));

        space.remove(enemy);
        assert!(space.filter_by_tag(Tag::Enemy).is_empty());
        assert_eq!(space.all().len(), 1);
    }

    #[test]
    fn test_query_overlap_padding() {
        let mut space = Space::new();
        let near = space.add(Rect::new(12.0, 0.0, 10.0, 10.0), tags(&[Tag::Enemy]), None);
        space.add(Rect::new(20.0, 0.0, 10.0, 10.0), tags(&[Tag::Enemy]), None);

        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(space.query_overlap(rect, 0.0, None).is_empty());

        let hits = space.query_overlap(rect, 2.5, None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, near);
    }
}
