//! Collision geometry attached to tiles
//!
//! This module provides the shapes a tile's collision group can hold and the
//! overlap test between them:
//! - `CollisionBox` - Axis-aligned rectangle (x, y, width, height)
//! - `CollisionCircle` - Circle (center, radius)
//! - `CollisionRotatedRect` - Rectangle rotated about its center
//! - `CollisionShape` - Closed set of the above with `overlaps`
//!
//! Every shape lazily caches an integer bounding box, rounded outwards. The
//! cache lives in a `OnceLock`, and only `&mut self` mutators reset it, so a
//! shared shape can never observe stale bounds.
//!
//! Overlap tests treat touching edges as overlapping.

use crate::error::GeometryError;
use glam::Vec2;
use serde::Serialize;
use std::sync::OnceLock;

/// Integer bounding box, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    /// Round float extents outwards: floor the minima, ceil the maxima
    pub fn from_extents(min: Vec2, max: Vec2) -> Self {
        Self {
            min_x: min.x.floor() as i32,
            min_y: min.y.floor() as i32,
            max_x: max.x.ceil() as i32,
            max_y: max.y.ceil() as i32,
        }
    }

    pub fn overlaps(&self, other: &Bounds) -> bool {
        !(self.min_x > other.max_x
            || other.min_x > self.max_x
            || self.min_y > other.max_y
            || other.min_y > self.max_y)
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }
}

fn check_finite(what: &'static str, value: f32) -> Result<f32, GeometryError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GeometryError::NonFinite { what, value })
    }
}

fn check_dimension(what: &'static str, value: f32) -> Result<f32, GeometryError> {
    check_finite(what, value)?;
    if value < 0.0 {
        return Err(GeometryError::NegativeDimension { what, value });
    }
    Ok(value)
}

fn check_point(what: &'static str, point: Vec2) -> Result<Vec2, GeometryError> {
    check_finite(what, point.x)?;
    check_finite(what, point.y)?;
    Ok(point)
}

/// Rotate `v` clockwise by `radians` in a y-down coordinate system
fn rotate(v: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Axis-aligned collision rectangle
#[derive(Debug, Clone, Serialize)]
pub struct CollisionBox {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(skip)]
    bounds: OnceLock<Bounds>,
}

impl CollisionBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Result<Self, GeometryError> {
        Ok(Self {
            x: check_finite("x", x)?,
            y: check_finite("y", y)?,
            width: check_dimension("width", width)?,
            height: check_dimension("height", height)?,
            bounds: OnceLock::new(),
        })
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn corners(&self) -> [Vec2; 4] {
        let (min, max) = (self.min(), self.max());
        [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ]
    }

    pub fn bounds(&self) -> Bounds {
        *self
            .bounds
            .get_or_init(|| Bounds::from_extents(self.min(), self.max()))
    }

    pub fn set_position(&mut self, x: f32, y: f32) -> Result<(), GeometryError> {
        self.x = check_finite("x", x)?;
        self.y = check_finite("y", y)?;
        self.bounds = OnceLock::new();
        Ok(())
    }

    pub fn set_size(&mut self, width: f32, height: f32) -> Result<(), GeometryError> {
        let width = check_dimension("width", width)?;
        let height = check_dimension("height", height)?;
        self.width = width;
        self.height = height;
        self.bounds = OnceLock::new();
        Ok(())
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.x += offset.x;
        self.y += offset.y;
        self.bounds = OnceLock::new();
    }
}

impl PartialEq for CollisionBox {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
    }
}

/// Collision circle
#[derive(Debug, Clone, Serialize)]
pub struct CollisionCircle {
    center: Vec2,
    radius: f32,
    #[serde(skip)]
    bounds: OnceLock<Bounds>,
}

impl CollisionCircle {
    pub fn new(center: Vec2, radius: f32) -> Result<Self, GeometryError> {
        Ok(Self {
            center: check_point("center", center)?,
            radius: check_dimension("radius", radius)?,
            bounds: OnceLock::new(),
        })
    }

    /// Circle inscribed in the rectangle at (x, y). Width and height must match.
    pub fn from_ellipse(x: f32, y: f32, width: f32, height: f32) -> Result<Self, GeometryError> {
        check_dimension("width", width)?;
        check_dimension("height", height)?;
        if width != height {
            return Err(GeometryError::NotCircular { width, height });
        }
        let radius = width / 2.0;
        Self::new(Vec2::new(x + radius, y + radius), radius)
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn bounds(&self) -> Bounds {
        *self.bounds.get_or_init(|| {
            let r = Vec2::splat(self.radius);
            Bounds::from_extents(self.center - r, self.center + r)
        })
    }

    pub fn set_center(&mut self, center: Vec2) -> Result<(), GeometryError> {
        self.center = check_point("center", center)?;
        self.bounds = OnceLock::new();
        Ok(())
    }

    pub fn set_radius(&mut self, radius: f32) -> Result<(), GeometryError> {
        self.radius = check_dimension("radius", radius)?;
        self.bounds = OnceLock::new();
        Ok(())
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.center += offset;
        self.bounds = OnceLock::new();
    }
}

impl PartialEq for CollisionCircle {
    fn eq(&self, other: &Self) -> bool {
        self.center == other.center && self.radius == other.radius
    }
}

/// Corners and edge axes of a rotated rectangle
#[derive(Debug, Clone, Copy)]
struct RectFrame {
    corners: [Vec2; 4],
    axes: [Vec2; 2],
}

/// Rectangle rotated about its center. Rotation is in radians, clockwise,
/// and never zero.
#[derive(Debug, Clone, Serialize)]
pub struct CollisionRotatedRect {
    center: Vec2,
    width: f32,
    height: f32,
    rotation: f32,
    #[serde(skip)]
    bounds: OnceLock<Bounds>,
    #[serde(skip)]
    frame: OnceLock<RectFrame>,
}

impl CollisionRotatedRect {
    pub fn new(center: Vec2, width: f32, height: f32, rotation: f32) -> Result<Self, GeometryError> {
        Ok(Self {
            center: check_point("center", center)?,
            width: check_dimension("width", width)?,
            height: check_dimension("height", height)?,
            rotation: Self::check_rotation(rotation)?,
            bounds: OnceLock::new(),
            frame: OnceLock::new(),
        })
    }

    /// Rectangle whose unrotated top-left corner sits at (x, y) and which is
    /// rotated by `degrees` about that corner, the way map objects rotate.
    pub fn from_top_left(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        degrees: f32,
    ) -> Result<Self, GeometryError> {
        let radians = check_finite("rotation", degrees)?.to_radians();
        let half = Vec2::new(width, height) / 2.0;
        Self::new(Vec2::new(x, y) + rotate(half, radians), width, height, radians)
    }

    fn check_rotation(rotation: f32) -> Result<f32, GeometryError> {
        check_finite("rotation", rotation)?;
        if rotation == 0.0 {
            return Err(GeometryError::ZeroRotation);
        }
        Ok(rotation)
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Rotation in radians
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    fn frame(&self) -> &RectFrame {
        self.frame.get_or_init(|| {
            let (hw, hh) = (self.width / 2.0, self.height / 2.0);
            let corners = [
                Vec2::new(-hw, -hh),
                Vec2::new(hw, -hh),
                Vec2::new(hw, hh),
                Vec2::new(-hw, hh),
            ]
            .map(|corner| self.center + rotate(corner, self.rotation));
            let axes = [corners[0] - corners[1], corners[1] - corners[2]];
            RectFrame { corners, axes }
        })
    }

    /// Corners in clockwise order starting at the rotated top-left
    pub fn corners(&self) -> [Vec2; 4] {
        self.frame().corners
    }

    /// Edge directions used as separating axes
    pub fn axes(&self) -> [Vec2; 2] {
        self.frame().axes
    }

    pub fn bounds(&self) -> Bounds {
        *self.bounds.get_or_init(|| {
            let (min, max) = extents(&self.corners());
            Bounds::from_extents(min, max)
        })
    }

    fn invalidate(&mut self) {
        self.bounds = OnceLock::new();
        self.frame = OnceLock::new();
    }

    pub fn set_center(&mut self, center: Vec2) -> Result<(), GeometryError> {
        self.center = check_point("center", center)?;
        self.invalidate();
        Ok(())
    }

    pub fn set_size(&mut self, width: f32, height: f32) -> Result<(), GeometryError> {
        let width = check_dimension("width", width)?;
        let height = check_dimension("height", height)?;
        self.width = width;
        self.height = height;
        self.invalidate();
        Ok(())
    }

    pub fn set_rotation(&mut self, rotation: f32) -> Result<(), GeometryError> {
        self.rotation = Self::check_rotation(rotation)?;
        self.invalidate();
        Ok(())
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.center += offset;
        self.invalidate();
    }

    /// Move a world point into the rectangle's unrotated frame, centered at origin
    fn to_local(&self, point: Vec2) -> Vec2 {
        rotate(point - self.center, -self.rotation)
    }
}

impl PartialEq for CollisionRotatedRect {
    fn eq(&self, other: &Self) -> bool {
        self.center == other.center
            && self.width == other.width
            && self.height == other.height
            && self.rotation == other.rotation
    }
}

/// A collision shape owned by a tile
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CollisionShape {
    Box(CollisionBox),
    Circle(CollisionCircle),
    RotatedRect(CollisionRotatedRect),
}

impl CollisionShape {
    /// Build the shape a map object rectangle describes: a box when
    /// unrotated, otherwise a rectangle rotated about its top-left corner
    pub fn from_rect(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        degrees: f32,
    ) -> Result<Self, GeometryError> {
        if degrees == 0.0 {
            Ok(CollisionShape::Box(CollisionBox::new(x, y, width, height)?))
        } else {
            Ok(CollisionShape::RotatedRect(CollisionRotatedRect::from_top_left(
                x, y, width, height, degrees,
            )?))
        }
    }

    /// Build the circle a map object ellipse describes. Rotation moves the
    /// center about the top-left corner.
    pub fn from_ellipse(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        degrees: f32,
    ) -> Result<Self, GeometryError> {
        let mut circle = CollisionCircle::from_ellipse(x, y, width, height)?;
        if degrees != 0.0 {
            let radians = check_finite("rotation", degrees)?.to_radians();
            let half = Vec2::splat(circle.radius);
            circle.set_center(Vec2::new(x, y) + rotate(half, radians))?;
        }
        Ok(CollisionShape::Circle(circle))
    }

    /// Dispatch priority: the higher of two shapes owns the narrow-phase test
    pub fn priority(&self) -> u8 {
        match self {
            CollisionShape::Box(_) => 0,
            CollisionShape::Circle(_) => 1,
            CollisionShape::RotatedRect(_) => 10,
        }
    }

    /// Variant name, as used in log and error messages
    pub fn name(&self) -> &'static str {
        match self {
            CollisionShape::Box(_) => "Box",
            CollisionShape::Circle(_) => "Circle",
            CollisionShape::RotatedRect(_) => "RotatedRect",
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            CollisionShape::Box(b) => b.bounds(),
            CollisionShape::Circle(c) => c.bounds(),
            CollisionShape::RotatedRect(r) => r.bounds(),
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        match self {
            CollisionShape::Box(b) => b.translate(offset),
            CollisionShape::Circle(c) => c.translate(offset),
            CollisionShape::RotatedRect(r) => r.translate(offset),
        }
    }

    /// Copy of this shape moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        let mut shape = self.clone();
        shape.translate(offset);
        shape
    }

    /// Whether the two shapes share at least one point.
    ///
    /// Rejects on the cached integer bounds first, then runs the narrow phase
    /// of the higher-priority shape. Symmetric in its arguments.
    pub fn overlaps(&self, other: &CollisionShape) -> bool {
        if !self.bounds().overlaps(&other.bounds()) {
            return false;
        }

        use CollisionShape::*;
        match (self, other) {
            (Box(a), Box(b)) => box_box(a, b),
            (Circle(a), Circle(b)) => circle_circle(a, b),
            (Circle(c), Box(b)) | (Box(b), Circle(c)) => circle_box(c, b),
            (RotatedRect(r), Box(b)) | (Box(b), RotatedRect(r)) => rotated_rect_box(r, b),
            (RotatedRect(r), Circle(c)) | (Circle(c), RotatedRect(r)) => rotated_rect_circle(r, c),
            (RotatedRect(a), RotatedRect(b)) => rotated_rect_rotated_rect(a, b),
        }
    }
}

impl From<CollisionBox> for CollisionShape {
    fn from(shape: CollisionBox) -> Self {
        CollisionShape::Box(shape)
    }
}

impl From<CollisionCircle> for CollisionShape {
    fn from(shape: CollisionCircle) -> Self {
        CollisionShape::Circle(shape)
    }
}

impl From<CollisionRotatedRect> for CollisionShape {
    fn from(shape: CollisionRotatedRect) -> Self {
        CollisionShape::RotatedRect(shape)
    }
}

fn extents(points: &[Vec2]) -> (Vec2, Vec2) {
    points.iter().fold(
        (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
        |(min, max), p| (min.min(*p), max.max(*p)),
    )
}

fn intervals_overlap(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> bool {
    !(a_min > b_max || b_min > a_max)
}

fn box_box(a: &CollisionBox, b: &CollisionBox) -> bool {
    let (a_min, a_max, b_min, b_max) = (a.min(), a.max(), b.min(), b.max());
    intervals_overlap(a_min.x, a_max.x, b_min.x, b_max.x)
        && intervals_overlap(a_min.y, a_max.y, b_min.y, b_max.y)
}

fn circle_circle(a: &CollisionCircle, b: &CollisionCircle) -> bool {
    let reach = a.radius + b.radius;
    a.center.distance_squared(b.center) <= reach * reach
}

fn circle_box(circle: &CollisionCircle, aabb: &CollisionBox) -> bool {
    circle_aligned_box(circle.center, circle.radius, aabb.min(), aabb.max())
}

/// Circle against the axis-aligned box spanning `min..=max`
fn circle_aligned_box(center: Vec2, radius: f32, min: Vec2, max: Vec2) -> bool {
    let within_x = center.x >= min.x && center.x <= max.x;
    let within_y = center.y >= min.y && center.y <= max.y;

    if center.x > min.x && center.x < max.x && center.y > min.y && center.y < max.y {
        return true;
    }
    if within_x {
        return center.y + radius >= min.y && center.y - radius <= max.y;
    }
    if within_y {
        return center.x + radius >= min.x && center.x - radius <= max.x;
    }

    let mid = (min + max) / 2.0;
    let corner = Vec2::new(
        if center.x < mid.x { min.x } else { max.x },
        if center.y < mid.y { min.y } else { max.y },
    );
    center.distance_squared(corner) <= radius * radius
}

fn rotated_rect_circle(rect: &CollisionRotatedRect, circle: &CollisionCircle) -> bool {
    let half = Vec2::new(rect.width, rect.height) / 2.0;
    circle_aligned_box(rect.to_local(circle.center), circle.radius, -half, half)
}

fn project(points: &[Vec2], axis: Vec2) -> (f32, f32) {
    points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), p| {
        let d = p.dot(axis);
        (min.min(d), max.max(d))
    })
}

/// Separating axis test: false as soon as one axis separates the point sets
fn separated_on_any(axes: &[Vec2], a: &[Vec2], b: &[Vec2]) -> bool {
    axes.iter().any(|axis| {
        let (a_min, a_max) = project(a, *axis);
        let (b_min, b_max) = project(b, *axis);
        !intervals_overlap(a_min, a_max, b_min, b_max)
    })
}

fn rotated_rect_box(rect: &CollisionRotatedRect, aabb: &CollisionBox) -> bool {
    let corners = rect.corners();
    let (min, max) = extents(&corners);
    if !intervals_overlap(min.x, max.x, aabb.x, aabb.x + aabb.width)
        || !intervals_overlap(min.y, max.y, aabb.y, aabb.y + aabb.height)
    {
        return false;
    }
    !separated_on_any(&rect.axes(), &corners, &aabb.corners())
}

fn rotated_rect_rotated_rect(a: &CollisionRotatedRect, b: &CollisionRotatedRect) -> bool {
    let (a_axes, b_axes) = (a.axes(), b.axes());
    let axes = [a_axes[0], a_axes[1], b_axes[0], b_axes[1]];
    !separated_on_any(&axes, &a.corners(), &b.corners())
}
