//! Struct and functions for working with `Vertex`s from which `Polygon`s are composed.

use crate::float_types::Real;
use nalgebra::{Point3, Vector2, Vector3, Vector4};

/// A vertex of a polygon, holding position, shading normal, texture
/// coordinates and color.
///
/// The shading `normal` is kept unit length and always equal to the normalized
/// `shared_normal`. The `shared_normal` itself is an un-normalized accumulator:
/// welding adds the normals of every merged occurrence into it, so coincident
/// corners end up sharing an averaged normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub pos: Point3<Real>,
    /// Unit shading normal; `shared_normal.normalize()` at all times.
    pub normal: Vector3<Real>,
    /// Accumulated, un-normalized normal shared across welded copies.
    pub shared_normal: Vector3<Real>,
    pub uv: Vector2<Real>,
    /// RGBA, each channel in `[0, 1]`.
    pub color: Vector4<Real>,
}

impl Vertex {
    /// Create a new [`Vertex`].
    ///
    /// * `pos`    – position in the working coordinate frame
    /// * `normal` – (optionally non-unit) normal; it seeds `shared_normal`
    ///   verbatim while the stored shading `normal` is its normalization.
    #[inline]
    pub fn new(
        mut pos: Point3<Real>,
        mut normal: Vector3<Real>,
        uv: Vector2<Real>,
        color: Vector4<Real>,
    ) -> Self {
        // Sanitise position
        for c in pos.coords.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }

        // Sanitise normal
        for c in normal.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }

        Vertex {
            pos,
            normal: normalize_or_zero(normal),
            shared_normal: normal,
            uv,
            color,
        }
    }

    /// Flip vertex normal in place.
    ///
    /// # Example
    /// ```rust
    /// # use nalgebra::{Point3, Vector2, Vector3, Vector4};
    /// # use cleave::vertex::Vertex;
    /// let mut v = Vertex::new(
    ///     Point3::new(1.0, 2.0, 3.0),
    ///     Vector3::x(),
    ///     Vector2::zeros(),
    ///     Vector4::new(1.0, 1.0, 1.0, 1.0),
    /// );
    /// v.flip();
    /// assert_eq!(v.pos, Point3::new(1.0, 2.0, 3.0), "position remains the same");
    /// assert_eq!(v.normal, -Vector3::x(), "the normal is negated");
    /// ```
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.shared_normal = -self.shared_normal;
    }

    /// Fold another occurrence's unit normal into the shared accumulator and
    /// refresh the shading normal.
    pub fn add_shared_normal(&mut self, normal: Vector3<Real>) {
        self.shared_normal += normal;
        self.normal = normalize_or_zero(self.shared_normal);
    }

    /// Replace the accumulated normal outright.
    pub fn set_normal(&mut self, normal: Vector3<Real>) {
        self.shared_normal = normal;
        self.normal = normalize_or_zero(normal);
    }

    /// Euclidean distance between vertex positions.
    pub fn distance_to(&self, other: &Vertex) -> Real {
        (self.pos - other.pos).norm()
    }

    /// Compute the linear interpolation between `self` (`t = 0`) and `other`
    /// (`t = 1`).
    ///
    /// Position, normal and uv are lerped; the color is blended at the
    /// midpoint regardless of `t`. Used to synthesize the vertex where a
    /// polygon edge crosses a splitting plane.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        let pos = self.pos + (other.pos - self.pos) * t;
        let normal = self.normal + (other.normal - self.normal) * t;
        let uv = self.uv + (other.uv - self.uv) * t;
        let color = (self.color + other.color) * 0.5;
        Vertex::new(pos, normal, uv, color)
    }
}

#[inline]
fn normalize_or_zero(v: Vector3<Real>) -> Vector3<Real> {
    if v.norm_squared() > 0.0 { v.normalize() } else { v }
}
