//! Envelope and fit properties across the geometry pipeline.

use zonic_geom::{buildable_envelope, rect_fit, rot_fit, Parcel, ParcelEdge, Side};

fn rect_parcel(w: f64, d: f64) -> Parcel {
    Parcel {
        id: "p1".into(),
        edges: vec![
            ParcelEdge {
                side: Some(Side::Front),
                points: vec![(0.0, 0.0), (w, 0.0)],
            },
            ParcelEdge {
                side: Some(Side::InteriorSide),
                points: vec![(w, 0.0), (w, d)],
            },
            ParcelEdge {
                side: Some(Side::Rear),
                points: vec![(w, d), (0.0, d)],
            },
            ParcelEdge {
                side: Some(Side::ExteriorSide),
                points: vec![(0.0, d), (0.0, 0.0)],
            },
        ],
        centroid: Some((w / 2.0, d / 2.0)),
        linear_unit: "m".into(),
    }
}

#[test]
fn envelope_area_never_exceeds_parcel_area() {
    let p = rect_parcel(35.0, 80.0);
    for d in [0.0, 3.0, 10.0, 25.0] {
        let env = buildable_envelope(&p, &vec![Some(d); 4]).unwrap();
        assert!(env.area() <= p.area());
    }
}

#[test]
fn envelope_area_monotone_under_growing_setbacks() {
    let p = rect_parcel(50.0, 50.0);
    let mut last = f64::INFINITY;
    for d in 0..20 {
        let env = buildable_envelope(&p, &vec![Some(d as f64); 4]).unwrap();
        let area = env.area();
        assert!(area <= last);
        last = area;
    }
}

#[test]
fn relaxed_envelope_at_least_as_large_as_strict() {
    // two-valued setbacks split into a relaxed (minimum) and strict
    // (maximum) envelope
    let p = rect_parcel(40.0, 60.0);
    let bands: [(f64, f64); 4] = [(5.0, 10.0), (3.0, 6.0), (8.0, 15.0), (3.0, 6.0)];
    let relaxed: Vec<Option<f64>> = bands.iter().map(|&(lo, _)| Some(lo)).collect();
    let strict: Vec<Option<f64>> = bands.iter().map(|&(_, hi)| Some(hi)).collect();
    let relaxed_area = buildable_envelope(&p, &relaxed).unwrap().area();
    let strict_area = buildable_envelope(&p, &strict).unwrap().area();
    assert!(relaxed_area >= strict_area);
}

#[test]
fn orientation_swap_replaces_quarter_rotation() {
    // a 40 x 60 building in a 30 x 70 envelope fits only in the swapped
    // orientation; the in-test swap covers it without any rotation loop
    let env = buildable_envelope(&rect_parcel(30.0, 70.0), &[None, None, None, None]).unwrap();
    assert!(rect_fit(&env, 40.0, 60.0));
    assert!(rect_fit(&env, 60.0, 40.0));
    assert!(!rect_fit(&env, 40.0, 75.0));
}

#[test]
fn fit_is_swap_invariant() {
    let env = buildable_envelope(&rect_parcel(33.0, 47.0), &[None, None, None, None]).unwrap();
    for (w, d) in [(10.0, 45.0), (33.0, 47.0), (34.0, 20.0), (47.0, 33.0)] {
        assert_eq!(rect_fit(&env, w, d), rect_fit(&env, d, w));
    }
}

#[test]
fn rotation_search_stops_inside_ninety_degrees() {
    // a long sliver that fits only diagonally
    let p = rect_parcel(40.0, 40.0);
    let none = vec![None; 4];
    assert!(!rect_fit(
        &buildable_envelope(&p, &none).unwrap(),
        50.0,
        2.0
    ));
    assert!(rot_fit(&p, &none, 50.0, 2.0, 15.0));
    // rotation-direction invariance: the swapped dimensions agree
    assert!(rot_fit(&p, &none, 2.0, 50.0, 15.0));
}

#[test]
fn setbacks_can_close_the_envelope_entirely() {
    let p = rect_parcel(20.0, 20.0);
    let env = buildable_envelope(&p, &vec![Some(15.0); 4]).unwrap();
    assert!(env.is_empty());
    assert!(!rect_fit(&env, 1.0, 1.0));
    assert!(!rot_fit(&p, &vec![Some(15.0); 4], 1.0, 1.0, 15.0));
}
