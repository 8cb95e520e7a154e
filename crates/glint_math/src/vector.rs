//! Vector helpers shared by the shading code.

use crate::DVec3;

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: DVec3, n: DVec3) -> DVec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with relative index `etai_over_etat`.
#[inline]
pub fn refract(uv: DVec3, n: DVec3, etai_over_etat: f64) -> DVec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// True if every component is within 1e-8 of zero.
#[inline]
pub fn near_zero(v: DVec3) -> bool {
    const S: f64 = 1e-8;
    v.abs().cmplt(DVec3::splat(S)).all()
}
