//! Vector algebra and geometric queries

mod geometry;
mod vector;

pub use geometry::{
    QuadraticRoots, SegmentDistance, intercept_times, line_circle_intersect,
    line_line_intersection_2d, line_line_intersection_vec2, point_to_line_distance,
    point_to_line_distance_vec2, point_to_segment_distance, point_to_segment_distance_vec2,
    ray_sphere_intersect, rotate_2d, rotate_2d_vec2, rotate_3d, rotate_3d_quat,
    segment_circle_intersect, segment_segment_intersection_2d, solve_quadratic,
};
pub use vector::{LexOrd, VectorExt};
