use super::*;

fn approx(a: Vec2, b: Vec2) -> bool {
    (a - b).abs().max_element() < 1e-5
}

#[test]
fn tri_uv_recovers_corner_weights() {
    let (st0, st1, st2) = (Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0));
    assert!(approx(resolve_tri_uv(st0, st0, st1, st2), Vec2::new(1.0, 0.0)));
    assert!(approx(resolve_tri_uv(st1, st0, st1, st2), Vec2::new(0.0, 1.0)));
    assert!(approx(resolve_tri_uv(st2, st0, st1, st2), Vec2::new(0.0, 0.0)));

    let p = Vec2::new(0.25, 0.25);
    let uv = resolve_tri_uv(p, st0, st1, st2);
    let back = st0 * uv.x + st1 * uv.y + st2 * (1.0 - uv.x - uv.y);
    assert!(approx(back, p));
}

#[test]
fn tri_uv_degenerate_is_zero() {
    let st0 = Vec2::new(0.5, 0.5);
    let uv = resolve_tri_uv(Vec2::new(0.2, 0.7), st0, st0, Vec2::new(1.0, 1.0));
    assert_eq!(uv, Vec2::ZERO);
}

#[test]
fn quad_uv_inverts_bilinear_map() {
    let st = [
        Vec2::new(0.1, 0.1),
        Vec2::new(0.9, 0.2),
        Vec2::new(0.8, 0.9),
        Vec2::new(0.2, 0.7),
    ];
    for (u, v) in [(0.5f32, 0.5f32), (0.2, 0.7), (0.9, 0.1), (0.0, 0.0)] {
        let p = st[0] * ((1.0 - u) * (1.0 - v))
            + st[1] * (u * (1.0 - v))
            + st[2] * (u * v)
            + st[3] * ((1.0 - u) * v);
        let uv = resolve_quad_uv(p, st[0], st[1], st[2], st[3]);
        assert!(approx(uv, Vec2::new(u, v)), "{uv:?} != ({u}, {v})");
    }
}

#[test]
fn quad_uv_on_unit_square_is_identity() {
    let st = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
    let p = Vec2::new(0.3, 0.6);
    assert!(approx(resolve_quad_uv(p, st[0], st[1], st[2], st[3]), p));
}

#[test]
fn face_normals_follow_winding() {
    let n = normal_tri(Vec3::ZERO, Vec3::X, Vec3::Y);
    assert!((n - Vec3::Z).length() < 1e-6);
    let n = normal_quad(Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y);
    assert!((n - Vec3::Z).length() < 1e-6);
}

#[test]
fn blends_reproduce_corners() {
    let q = [Vec3::ZERO, Vec3::X, Vec3::ONE, Vec3::Y];
    assert_eq!(interp_bilinear_quad(q, 0.0, 0.0), q[0]);
    assert_eq!(interp_bilinear_quad(q, 1.0, 1.0), q[2]);
    let t = [Vec3::X, Vec3::Y, Vec3::Z];
    assert_eq!(interp_barycentric_tri(t, 1.0, 0.0), Vec3::X);
    assert_eq!(interp_barycentric_tri(t, 0.0, 0.0), Vec3::Z);
}

#[test]
fn short_normals_roundtrip_axis() {
    let n = decode_short_normal(encode_short_normal(Vec3::new(0.0, 0.0, 2.0)));
    assert!((n - Vec3::Z).length() < 1e-4);
}

#[test]
fn inversion_matches_glam_and_falls_back_to_adjugate() {
    let m = Mat3::from_cols(
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 4.0, 0.0),
        Vec3::new(1.0, 0.0, 1.0),
    );
    let inv = invert_or_adjugate(m);
    assert!((inv * m).abs_diff_eq(Mat3::IDENTITY, 1e-6));

    let singular = Mat3::from_cols(Vec3::X, Vec3::X, Vec3::Z);
    let adj = invert_or_adjugate(singular);
    assert!(adj.is_finite());
    assert!((adj * singular).abs_diff_eq(Mat3::ZERO, 1e-6));
}

#[test]
fn unit_float_to_u8_clamps_and_rounds() {
    assert_eq!(unit_float_to_u8(-1.0), 0);
    assert_eq!(unit_float_to_u8(0.0), 0);
    assert_eq!(unit_float_to_u8(0.5), 128);
    assert_eq!(unit_float_to_u8(0.999), 255);
    assert_eq!(unit_float_to_u8(7.0), 255);
}
