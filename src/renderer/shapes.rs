//! Tessellation of snapshot shapes into triangle lists

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;
use crate::render::{Color, Shape};

/// Segments used for a full circle
const CIRCLE_SEGMENTS: u32 = 32;

/// Append the triangles for one shape
pub fn tessellate(shape: &Shape, out: &mut Vec<Vertex>) {
    match shape {
        Shape::Circle {
            center,
            radius,
            color,
        } => circle(*center, *radius, *color, CIRCLE_SEGMENTS, out),
        Shape::Ring {
            center,
            radius,
            thickness,
            color,
        } => ring(
            *center,
            (radius - thickness * 0.5).max(0.0),
            radius + thickness * 0.5,
            *color,
            CIRCLE_SEGMENTS,
            out,
        ),
        Shape::Rect { min, max, color } => rect(*min, *max, *color, out),
        Shape::Polygon { points, color } => polygon(points, *color, out),
        Shape::Trail {
            points,
            width,
            color,
        } => trail(points, *width, *color, out),
    }
}

/// Tessellate a whole frame
pub fn tessellate_all(shapes: &[Shape]) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(shapes.len() * 96);
    for shape in shapes {
        tessellate(shape, &mut out);
    }
    out
}

fn on_circle(center: Vec2, radius: f32, theta: f32) -> Vec2 {
    center + Vec2::from_angle(theta) * radius
}

/// Filled circle as a triangle fan
pub fn circle(center: Vec2, radius: f32, color: Color, segments: u32, out: &mut Vec<Vertex>) {
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        // Triangle from center to edge
        out.push(Vertex::at(center, color));
        out.push(Vertex::at(on_circle(center, radius, theta1), color));
        out.push(Vertex::at(on_circle(center, radius, theta2), color));
    }
}

/// Ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: Color,
    segments: u32,
    out: &mut Vec<Vertex>,
) {
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        let inner1 = on_circle(center, inner_radius, theta1);
        let outer1 = on_circle(center, outer_radius, theta1);
        let inner2 = on_circle(center, inner_radius, theta2);
        let outer2 = on_circle(center, outer_radius, theta2);

        // Two triangles per segment
        out.push(Vertex::at(inner1, color));
        out.push(Vertex::at(outer1, color));
        out.push(Vertex::at(inner2, color));

        out.push(Vertex::at(inner2, color));
        out.push(Vertex::at(outer1, color));
        out.push(Vertex::at(outer2, color));
    }
}

/// Axis-aligned rectangle
pub fn rect(min: Vec2, max: Vec2, color: Color, out: &mut Vec<Vertex>) {
    let tl = min;
    let tr = Vec2::new(max.x, min.y);
    let bl = Vec2::new(min.x, max.y);
    let br = max;

    out.extend_from_slice(&[
        Vertex::at(tl, color),
        Vertex::at(bl, color),
        Vertex::at(tr, color),
        Vertex::at(tr, color),
        Vertex::at(bl, color),
        Vertex::at(br, color),
    ]);
}

/// Convex polygon as a fan around its centroid
pub fn polygon(points: &[Vec2], color: Color, out: &mut Vec<Vertex>) {
    if points.len() < 3 {
        return;
    }
    let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;
    for (i, &p) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        out.push(Vertex::at(centroid, color));
        out.push(Vertex::at(p, color));
        out.push(Vertex::at(next, color));
    }
}

/// Polyline that tapers and fades from head (first point) to tail
pub fn trail(points: &[Vec2], width: f32, color: Color, out: &mut Vec<Vertex>) {
    if points.len() < 2 {
        return;
    }

    let len = points.len() as f32;
    let [r, g, b, a] = color;

    for (i, pair) in points.windows(2).enumerate() {
        let (p1, p2) = (pair[0], pair[1]);

        // Fade alpha and size along trail
        let t1 = i as f32 / len;
        let t2 = (i + 1) as f32 / len;
        let color1 = [r, g, b, a * (1.0 - t1)];
        let color2 = [r, g, b, a * (1.0 - t2)];
        let width1 = width * (1.0 - t1 * 0.7);
        let width2 = width * (1.0 - t2 * 0.7);

        // Perpendicular for width
        let dir = (p2 - p1).normalize_or_zero();
        let perp = dir.perp();

        let v1a = p1 + perp * width1;
        let v1b = p1 - perp * width1;
        let v2a = p2 + perp * width2;
        let v2b = p2 - perp * width2;

        out.push(Vertex::at(v1a, color1));
        out.push(Vertex::at(v1b, color1));
        out.push(Vertex::at(v2a, color2));

        out.push(Vertex::at(v2a, color2));
        out.push(Vertex::at(v1b, color1));
        out.push(Vertex::at(v2b, color2));
    }
}
