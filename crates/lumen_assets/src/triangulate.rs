//! Polygon triangulation for source faces.
//!
//! Triangles pass straight through, convex quads are cut along their shorter diagonal and
//! everything else is ear-clipped in the polygon's best-fit plane. An n-gon always produces
//! exactly `n - 2` triangles, falling back to a fan when the outline is too degenerate to clip.

use glam::{Vec2, Vec3};

/// Triangulates one polygon, appending corner indices local to `positions` (0..n) to `out`.
/// Returns the number of triangles written. Winding follows the input outline.
pub fn triangulate_polygon(positions: &[Vec3], out: &mut Vec<u32>) -> u32 {
    let n = positions.len();
    match n {
        0..=2 => 0,
        3 => {
            out.extend_from_slice(&[0, 1, 2]);
            1
        }
        4 => {
            let points = project_to_plane(positions);
            if points.as_ref().is_some_and(|p| is_convex(p)) {
                triangulate_convex_quad(positions, out)
            } else if let Some(points) = points {
                ear_clip(&points, out)
            } else {
                fan(n, out)
            }
        }
        _ => match project_to_plane(positions) {
            Some(points) => ear_clip(&points, out),
            None => fan(n, out),
        },
    }
}

fn triangulate_convex_quad(p: &[Vec3], out: &mut Vec<u32>) -> u32 {
    let d02 = p[0].distance_squared(p[2]);
    let d13 = p[1].distance_squared(p[3]);
    if d02 <= d13 {
        out.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
    } else {
        out.extend_from_slice(&[0, 1, 3, 1, 2, 3]);
    }
    2
}

fn fan(n: usize, out: &mut Vec<u32>) -> u32 {
    for i in 1..(n as u32 - 1) {
        out.extend_from_slice(&[0, i, i + 1]);
    }
    n as u32 - 2
}

/// Newell's method: robust plane normal for non-planar or concave outlines.
fn newell_normal(positions: &[Vec3]) -> Vec3 {
    let mut normal = Vec3::ZERO;
    for (i, a) in positions.iter().enumerate() {
        let b = positions[(i + 1) % positions.len()];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Projects the outline into 2D, oriented so it winds counter-clockwise.
/// Returns `None` when the polygon has no usable plane (all points collinear or coincident).
fn project_to_plane(positions: &[Vec3]) -> Option<Vec<Vec2>> {
    let normal = newell_normal(positions).try_normalize()?;
    let (u, v) = normal.any_orthonormal_pair();

    let mut points: Vec<Vec2> = positions.iter().map(|p| Vec2::new(p.dot(u), p.dot(v))).collect();

    if signed_area(&points) < 0.0 {
        for p in &mut points {
            p.y = -p.y;
        }
    }
    Some(points)
}

fn signed_area(points: &[Vec2]) -> f32 {
    let mut area = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        area += a.perp_dot(b);
    }
    area * 0.5
}

fn is_convex(points: &[Vec2]) -> bool {
    let n = points.len();
    (0..n).all(|i| {
        let prev = points[(i + n - 1) % n];
        let cur = points[i];
        let next = points[(i + 1) % n];
        (cur - prev).perp_dot(next - cur) > 0.0
    })
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    // Strictly inside: points on an edge or sharing a corner do not block an ear.
    (b - a).perp_dot(p - a) > 0.0 && (c - b).perp_dot(p - b) > 0.0 && (a - c).perp_dot(p - c) > 0.0
}

/// Ear clipping over a counter-clockwise outline.
fn ear_clip(points: &[Vec2], out: &mut Vec<u32>) -> u32 {
    let mut remaining: Vec<u32> = (0..points.len() as u32).collect();
    let mut written = 0;

    while remaining.len() > 3 {
        let count = remaining.len();
        let ear = (0..count).find(|&i| {
            let prev = remaining[(i + count - 1) % count];
            let cur = remaining[i];
            let next = remaining[(i + 1) % count];
            let (a, b, c) = (
                points[prev as usize],
                points[cur as usize],
                points[next as usize],
            );

            if (b - a).perp_dot(c - b) <= 0.0 {
                return false; // reflex or flat corner
            }

            remaining
                .iter()
                .filter(|&&k| k != prev && k != cur && k != next)
                .all(|&k| !point_in_triangle(points[k as usize], a, b, c))
        });

        match ear {
            Some(i) => {
                let prev = remaining[(i + count - 1) % count];
                let next = remaining[(i + 1) % count];
                out.extend_from_slice(&[prev, remaining[i], next]);
                remaining.remove(i);
                written += 1;
            }
            None => {
                // Self-intersecting or collapsed outline: finish with a fan over what is left.
                for k in 1..remaining.len() - 1 {
                    out.extend_from_slice(&[remaining[0], remaining[k], remaining[k + 1]]);
                    written += 1;
                }
                return written;
            }
        }
    }

    out.extend_from_slice(&remaining);
    written + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(positions: &[Vec3]) -> Vec<u32> {
        let mut out = Vec::new();
        let count = triangulate_polygon(positions, &mut out);
        assert_eq!(out.len(), count as usize * 3);
        out
    }

    #[test]
    fn test_triangle_passes_through() {
        let tri = [Vec3::ZERO, Vec3::X, Vec3::Y];
        assert_eq!(run(&tri), vec![0, 1, 2]);
    }

    #[test]
    fn test_degenerate_faces_produce_nothing() {
        assert!(run(&[]).is_empty());
        assert!(run(&[Vec3::ZERO, Vec3::X]).is_empty());
    }

    #[test]
    fn test_quad_splits_on_shorter_diagonal() {
        // Long along 0-2, short along 1-3.
        let quad = [
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
        ];
        assert_eq!(run(&quad), vec![0, 1, 3, 1, 2, 3]);

        let square = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        assert_eq!(run(&square), vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_concave_polygon_avoids_reflex_corner() {
        // Arrow head: corner 2 is reflex, so no triangle may span 1-3 across it.
        let arrow = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(0.5, 1.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        ];
        let out = run(&arrow);
        assert_eq!(out.len(), 6);
        for tri in out.chunks(3) {
            assert!(!(tri.contains(&1) && tri.contains(&3)), "diagonal 1-3 leaves the outline");
        }
    }

    #[test]
    fn test_ngon_yields_n_minus_two_triangles_in_any_plane() {
        // Regular hexagon in the XZ plane, wound clockwise when seen from +Y.
        let hexagon: Vec<Vec3> = (0..6)
            .map(|i| {
                let a = -(i as f32) * std::f32::consts::TAU / 6.0;
                Vec3::new(a.cos(), 3.0, a.sin())
            })
            .collect();
        let out = run(&hexagon);
        assert_eq!(out.len(), 4 * 3);
        assert!(out.iter().all(|&i| i < 6));
    }

    #[test]
    fn test_collinear_outline_falls_back_to_fan() {
        let line: Vec<Vec3> = (0..5).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        assert_eq!(run(&line), vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
    }
}
