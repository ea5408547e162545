// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Feature geometry and its stable fallback hash.

use alloc::vec::Vec;

use kurbo::Point;

/// Feature geometry. Coordinates are `x = longitude`, `y = latitude`.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// A single position.
    Point(Point),
    /// An open path.
    LineString(Vec<Point>),
    /// An outer ring followed by holes.
    Polygon(Vec<Vec<Point>>),
    /// Several positions.
    MultiPoint(Vec<Point>),
    /// Several paths.
    MultiLineString(Vec<Vec<Point>>),
    /// Several polygons.
    MultiPolygon(Vec<Vec<Vec<Point>>>),
}

// FNV-1a offset basis and prime, used here as a plain polynomial hash.
const HASH_SEED: u64 = 0xcbf2_9ce4_8422_2325;
const HASH_PRIME: u64 = 0x0000_0100_0000_01b3;

impl Geometry {
    /// Returns the `GeoJSON` type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::LineString(_) => "LineString",
            Self::Polygon(_) => "Polygon",
            Self::MultiPoint(_) => "MultiPoint",
            Self::MultiLineString(_) => "MultiLineString",
            Self::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Returns the first coordinate, if any.
    #[must_use]
    pub fn first_point(&self) -> Option<Point> {
        match self {
            Self::Point(p) => Some(*p),
            Self::LineString(points) | Self::MultiPoint(points) => points.first().copied(),
            Self::Polygon(rings) | Self::MultiLineString(rings) => {
                rings.iter().flatten().next().copied()
            }
            Self::MultiPolygon(polygons) => polygons.iter().flatten().flatten().next().copied(),
        }
    }

    /// Stable, order-sensitive polynomial hash of the geometry.
    ///
    /// Identical geometry always hashes the same; the hash is not
    /// collision-free and not cryptographic. Nesting lengths are folded in, so
    /// regrouping the same coordinates changes the hash.
    #[must_use]
    pub fn stable_hash(&self) -> u64 {
        let mut hash = HASH_SEED;
        let mut fold = |word: u64| {
            hash = hash.wrapping_mul(HASH_PRIME).wrapping_add(word);
        };
        let tag = match self {
            Self::Point(_) => 1,
            Self::LineString(_) => 2,
            Self::Polygon(_) => 3,
            Self::MultiPoint(_) => 4,
            Self::MultiLineString(_) => 5,
            Self::MultiPolygon(_) => 6,
        };
        fold(tag);
        match self {
            Self::Point(p) => fold_point(&mut fold, *p),
            Self::LineString(points) | Self::MultiPoint(points) => fold_path(&mut fold, points),
            Self::Polygon(rings) | Self::MultiLineString(rings) => {
                fold(rings.len() as u64);
                for ring in rings {
                    fold_path(&mut fold, ring);
                }
            }
            Self::MultiPolygon(polygons) => {
                fold(polygons.len() as u64);
                for rings in polygons {
                    fold(rings.len() as u64);
                    for ring in rings {
                        fold_path(&mut fold, ring);
                    }
                }
            }
        }
        hash
    }
}

fn fold_path(fold: &mut impl FnMut(u64), points: &[Point]) {
    fold(points.len() as u64);
    for p in points {
        fold_point(fold, *p);
    }
}

fn fold_point(fold: &mut impl FnMut(u64), p: Point) {
    fold(coordinate_bits(p.x));
    fold(coordinate_bits(p.y));
}

/// `-0.0` and `0.0` describe the same position.
fn coordinate_bits(v: f64) -> u64 {
    if v == 0.0 { 0 } else { v.to_bits() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn line(coords: &[(f64, f64)]) -> Geometry {
        Geometry::LineString(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn identical_geometry_hashes_identically() {
        let a = line(&[(77.59, 12.97), (77.6, 12.98)]);
        let b = line(&[(77.59, 12.97), (77.6, 12.98)]);
        assert_eq!(a.stable_hash(), b.stable_hash());
    }

    #[test]
    fn hash_is_order_sensitive() {
        let a = line(&[(1.0, 2.0), (3.0, 4.0)]);
        let b = line(&[(3.0, 4.0), (1.0, 2.0)]);
        assert_ne!(a.stable_hash(), b.stable_hash());
    }

    #[test]
    fn hash_depends_on_type_and_nesting() {
        let p = Point::new(1.0, 2.0);
        let q = Point::new(3.0, 4.0);
        let as_line = Geometry::LineString(vec![p, q]);
        let as_multipoint = Geometry::MultiPoint(vec![p, q]);
        assert_ne!(as_line.stable_hash(), as_multipoint.stable_hash());

        let one_ring = Geometry::MultiLineString(vec![vec![p, q]]);
        let two_rings = Geometry::MultiLineString(vec![vec![p], vec![q]]);
        assert_ne!(one_ring.stable_hash(), two_rings.stable_hash());
    }

    #[test]
    fn negative_zero_is_zero() {
        let a = Geometry::Point(Point::new(0.0, 5.0));
        let b = Geometry::Point(Point::new(-0.0, 5.0));
        assert_eq!(a.stable_hash(), b.stable_hash());
    }

    #[test]
    fn first_point_digs_through_nesting() {
        let poly = Geometry::MultiPolygon(vec![vec![], vec![vec![Point::new(9.0, 8.0)]]]);
        assert_eq!(poly.first_point(), Some(Point::new(9.0, 8.0)));
        assert_eq!(Geometry::LineString(vec![]).first_point(), None);
    }
}
