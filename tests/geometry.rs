use bustrack_rs::error::GeometryError;
use bustrack_rs::pipeline::geometry::{
    distance_along_path, great_circle_distance, nearest_stop, path_length, point_at_distance,
    point_at_fraction,
};
use bustrack_rs::types::route::{GeoPoint, Stop};

fn p(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint::new(lat, lng)
}

fn zigzag() -> Vec<GeoPoint> {
    vec![
        p(17.3850, 78.4867),
        p(17.3900, 78.4900),
        p(17.3950, 78.4880),
        p(17.4010, 78.4950),
        p(17.4060, 78.5010),
    ]
}

#[test]
fn one_degree_of_longitude_at_equator() {
    let d = great_circle_distance(p(0.0, 0.0), p(0.0, 1.0));
    assert!((d - 111_195.0).abs() < 50.0, "got {d}");
}

#[test]
fn distance_is_symmetric_and_zero_for_equal_points() {
    let a = p(17.385, 78.4867);
    let b = p(17.44, 78.35);
    assert_eq!(great_circle_distance(a, b), great_circle_distance(b, a));
    assert_eq!(great_circle_distance(a, a), 0.0);
    assert!(great_circle_distance(a, b) > 0.0);
}

#[test]
fn distance_satisfies_triangle_inequality() {
    let a = p(17.385, 78.4867);
    let b = p(17.44, 78.35);
    let c = p(17.30, 78.55);
    let direct = great_circle_distance(a, c);
    let detour = great_circle_distance(a, b) + great_circle_distance(b, c);
    assert!(direct <= detour + 1e-6);
}

#[test]
fn antipodal_points_are_half_the_circumference_apart() {
    let d = great_circle_distance(p(0.0, 0.0), p(0.0, 180.0));
    assert!(d.is_finite());
    assert!((d - std::f64::consts::PI * 6_371_000.0).abs() < 1.0);
}

#[test]
fn path_length_of_short_paths_is_zero() {
    assert_eq!(path_length(&[]), 0.0);
    assert_eq!(path_length(&[p(1.0, 2.0)]), 0.0);
}

#[test]
fn path_length_is_zero_only_for_identical_points() {
    assert_eq!(path_length(&[p(1.0, 2.0), p(1.0, 2.0), p(1.0, 2.0)]), 0.0);
    assert!(path_length(&zigzag()) > 0.0);
}

#[test]
fn path_length_sums_segments() {
    let path = [p(0.0, 0.0), p(0.0, 1.0), p(0.0, 2.0)];
    let expected = great_circle_distance(path[0], path[1]) + great_circle_distance(path[1], path[2]);
    assert_eq!(path_length(&path), expected);
}

#[test]
fn midpoint_of_equator_segment() {
    let path = [p(0.0, 0.0), p(0.0, 1.0)];
    let mid = point_at_fraction(&path, 0.5).expect("point");
    assert!(mid.lat.abs() < 1e-9);
    assert!((mid.lng - 0.5).abs() < 1e-9);
}

#[test]
fn fraction_zero_is_first_point() {
    let path = zigzag();
    assert_eq!(point_at_fraction(&path, 0.0).expect("point"), path[0]);
}

#[test]
fn fraction_near_one_approaches_last_point() {
    let path = zigzag();
    let last = *path.last().expect("last");
    let near_end = point_at_fraction(&path, 0.999_999).expect("point");
    assert!(great_circle_distance(near_end, last) < 1.0);
}

#[test]
fn fraction_wraps_modulo_one() {
    let path = zigzag();
    assert_eq!(
        point_at_fraction(&path, 1.25).expect("point"),
        point_at_fraction(&path, 0.25).expect("point")
    );
    assert_eq!(
        point_at_fraction(&path, -0.25).expect("point"),
        point_at_fraction(&path, 0.75).expect("point")
    );
    assert_eq!(point_at_fraction(&path, 1.0).expect("point"), path[0]);
}

#[test]
fn degenerate_paths_return_their_point() {
    let single = [p(17.0, 78.0)];
    assert_eq!(point_at_fraction(&single, 0.6).expect("point"), single[0]);

    let coincident = [p(17.0, 78.0), p(17.0, 78.0)];
    assert_eq!(point_at_fraction(&coincident, 0.3).expect("point"), coincident[0]);
}

#[test]
fn empty_path_is_rejected() {
    assert_eq!(point_at_fraction(&[], 0.5), Err(GeometryError::EmptyPath));
    assert_eq!(point_at_distance(&[], 10.0), Err(GeometryError::EmptyPath));
    assert_eq!(distance_along_path(&[], p(0.0, 0.0)), Err(GeometryError::EmptyPath));
}

#[test]
fn point_at_distance_clamps_to_path_ends() {
    let path = zigzag();
    let total = path_length(&path);
    assert_eq!(point_at_distance(&path, total * 2.0).expect("point"), path[4]);
    assert_eq!(point_at_distance(&path, -500.0).expect("point"), path[0]);
}

#[test]
fn point_at_distance_matches_fraction() {
    let path = zigzag();
    let total = path_length(&path);
    let by_distance = point_at_distance(&path, total * 0.4).expect("point");
    let by_fraction = point_at_fraction(&path, 0.4).expect("point");
    assert!(great_circle_distance(by_distance, by_fraction) < 1e-6);
}

#[test]
fn distance_along_path_at_each_vertex_is_cumulative_length() {
    let path = zigzag();
    let mut cumulative = 0.0;
    for (i, vertex) in path.iter().enumerate() {
        if i > 0 {
            cumulative += great_circle_distance(path[i - 1], path[i]);
        }
        assert_eq!(distance_along_path(&path, *vertex).expect("distance"), cumulative);
    }
}

#[test]
fn distance_along_path_snaps_to_nearest_vertex() {
    let path = [p(0.0, 0.0), p(0.0, 1.0), p(0.0, 2.0)];
    // closer to the middle vertex than to either end
    let d = distance_along_path(&path, p(0.01, 0.9)).expect("distance");
    assert_eq!(d, great_circle_distance(path[0], path[1]));
}

#[test]
fn distance_along_path_prefers_first_of_repeated_vertices() {
    let path = [p(0.0, 0.0), p(0.0, 1.0), p(0.0, 0.0)];
    assert_eq!(distance_along_path(&path, p(0.0, 0.0)).expect("distance"), 0.0);
}

#[test]
fn nearest_stop_picks_closest() {
    let stops = vec![Stop::new("A", 0.0, 1.0), Stop::new("B", 0.0, 0.001)];
    let stop = nearest_stop(p(0.0, 0.0), &stops).expect("stop");
    assert_eq!(stop.name, "B");
}

#[test]
fn nearest_stop_ties_go_to_first() {
    let stops = vec![Stop::new("East", 0.0, 0.01), Stop::new("West", 0.0, -0.01)];
    let stop = nearest_stop(p(0.0, 0.0), &stops).expect("stop");
    assert_eq!(stop.name, "East");
}

#[test]
fn nearest_stop_requires_stops() {
    assert_eq!(nearest_stop(p(0.0, 0.0), &[]), Err(GeometryError::EmptyStops));
}
