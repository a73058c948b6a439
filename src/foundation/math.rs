use glam::{Mat3, Vec2, Vec3};

/// Scale applied to the `i16` vertex normal encoding.
pub(crate) const NORMAL_SHORT_SCALE: f32 = 32767.0;

fn is_zero(v: f64) -> bool {
    v > -f64::EPSILON && v < f64::EPSILON
}

/// Finds `(u, v)` with `st = u*st0 + v*st1 + (1-u-v)*st2`.
///
/// Returns zero when the triangle has no UV area.
pub(crate) fn resolve_tri_uv(st: Vec2, st0: Vec2, st1: Vec2, st2: Vec2) -> Vec2 {
    let a = f64::from(st0.x - st2.x);
    let b = f64::from(st1.x - st2.x);
    let c = f64::from(st0.y - st2.y);
    let d = f64::from(st1.y - st2.y);
    let det = a * d - c * b;

    if is_zero(det) {
        return Vec2::ZERO;
    }

    let x0 = f64::from(st.x - st2.x);
    let x1 = f64::from(st.y - st2.y);
    Vec2::new(
        ((d * x0 - b * x1) / det) as f32,
        ((-c * x0 + a * x1) / det) as f32,
    )
}

/// Inverse bilinear mapping: finds `(u, v)` with
/// `st = (1-u)(1-v)*st0 + u(1-v)*st1 + uv*st2 + (1-u)v*st3`.
pub(crate) fn resolve_quad_uv(st: Vec2, st0: Vec2, st1: Vec2, st2: Vec2, st3: Vec2) -> Vec2 {
    let p = st.as_dvec2();
    let (p0, p1, p2, p3) = (st0.as_dvec2(), st1.as_dvec2(), st2.as_dvec2(), st3.as_dvec2());

    let signed_area = p0.perp_dot(p1) + p1.perp_dot(p2) + p2.perp_dot(p3) + p3.perp_dot(p0);

    let a = (p0 - p).perp_dot(p0 - p3);
    let b = 0.5 * ((p0 - p).perp_dot(p1 - p2) + (p1 - p).perp_dot(p0 - p3));
    let c = (p1 - p).perp_dot(p1 - p2);
    let denom = a - 2.0 * b + c;

    let mut u = 0.0f64;
    if is_zero(denom) {
        let den = a - c;
        if !is_zero(den) {
            u = a / den;
        }
    } else {
        let desc_sq = b * b - a * c;
        let desc = desc_sq.max(0.0).sqrt();
        let s = if signed_area > 0.0 { -1.0 } else { 1.0 };
        u = ((a - b) + s * desc) / denom;
    }
    // The f32 round trip matches what is stored and reused below.
    let u = f64::from(u as f32);

    let denom_s = (1.0 - u) * (p0.x - p3.x) + u * (p1.x - p2.x);
    let denom_t = (1.0 - u) * (p0.y - p3.y) + u * (p1.y - p2.y);
    let (axis, denom) = if denom_s.abs() < denom_t.abs() {
        (1, denom_t)
    } else {
        (0, denom_s)
    };

    let mut v = 0.0f64;
    if !is_zero(denom) {
        v = ((1.0 - u) * (p0[axis] - p[axis]) + u * (p1[axis] - p[axis])) / denom;
    }

    Vec2::new(u as f32, v as f32)
}

pub(crate) fn normal_tri(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    (p0 - p1).cross(p1 - p2).normalize_or_zero()
}

pub(crate) fn normal_quad(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Vec3 {
    (p0 - p2).cross(p1 - p3).normalize_or_zero()
}

/// Bilinear blend of four corners ordered around the quad.
pub(crate) fn interp_bilinear_quad(data: [Vec3; 4], u: f32, v: f32) -> Vec3 {
    data[0] * ((1.0 - u) * (1.0 - v))
        + data[1] * (u * (1.0 - v))
        + data[2] * (u * v)
        + data[3] * ((1.0 - u) * v)
}

pub(crate) fn interp_barycentric_tri(data: [Vec3; 3], u: f32, v: f32) -> Vec3 {
    data[0] * u + data[1] * v + data[2] * (1.0 - u - v)
}

pub(crate) fn decode_short_normal(no: [i16; 3]) -> Vec3 {
    Vec3::new(
        f32::from(no[0]) / NORMAL_SHORT_SCALE,
        f32::from(no[1]) / NORMAL_SHORT_SCALE,
        f32::from(no[2]) / NORMAL_SHORT_SCALE,
    )
}

pub(crate) fn encode_short_normal(n: Vec3) -> [i16; 3] {
    let n = n.normalize_or_zero() * NORMAL_SHORT_SCALE;
    [n.x.round() as i16, n.y.round() as i16, n.z.round() as i16]
}

/// Inverse of `m`, or its adjugate when `m` is exactly singular.
pub(crate) fn invert_or_adjugate(m: Mat3) -> Mat3 {
    let (c0, c1, c2) = (m.x_axis, m.y_axis, m.z_axis);
    let adjugate = Mat3::from_cols(c1.cross(c2), c2.cross(c0), c0.cross(c1)).transpose();
    let det = m.determinant();
    if det == 0.0 {
        return adjugate;
    }
    adjugate * (1.0 / det)
}

/// Unit float to byte with clamping and round-to-nearest.
pub(crate) fn unit_float_to_u8(v: f32) -> u8 {
    if v <= 0.0 {
        0
    } else if v > 1.0 - 0.5 / 255.0 {
        255
    } else {
        (255.0 * v + 0.5) as u8
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
