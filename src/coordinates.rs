//! Solar reference frame and sky geometry
//!
//! Distances are in kpc, densities in GeV/cm^3 and angles in radians.

/// Galactocentric distance of the Sun [kpc]
pub const R_SUN: f64 = 8.33;
/// Local dark matter density [GeV/cm^3]
pub const RHO_SUN: f64 = 0.3;

/// Galactocentric radius of the point at geocentric distance `s` along a line of sight
/// making the angle `angle` with the direction of the Galactic center
///
/// This is the law of cosines `sqrt(R_SUN^2 + s^2 - 2 s R_SUN cos(angle))`,
/// written as a sum of squares so that it cannot go negative through rounding
/// when the line of sight passes close to the center.
pub fn galactocentric_radius(s: f64, angle: f64) -> f64 {
    let (sin, cos) = angle.sin_cos();
    (s - R_SUN * cos).hypot(R_SUN * sin)
}

/// Angle between the Galactic center and the direction of galactic coordinates `(l, b)`
pub fn angular_separation(l: f64, b: f64) -> f64 {
    (l.cos() * b.cos()).acos()
}

/// Solid angle [sr] of a longitude-latitude cell of size `delta_l` x `delta_b` centered at latitude `b`
pub fn aperture(b: f64, delta_l: f64, delta_b: f64) -> f64 {
    delta_l * ((b + 0.5 * delta_b).sin() - (b - 0.5 * delta_b).sin())
}
