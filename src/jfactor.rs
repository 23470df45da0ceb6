//! Line of sight J-factors
//!
//! The J-factor along the line of sight at the angle `theta` from the Galactic center is
//!
//! `J(theta) = 1/R_SUN * int_0^inf (rho(r(s, theta)) / RHO_SUN)^n ds`
//!
//! with `n=2` for annihilation and `n=1` for decay.

use std::{f64::consts::TAU, fmt, str::FromStr, time::Instant};

use strum_macros::EnumIter;

use crate::{
    coordinates::{galactocentric_radius, RHO_SUN, R_SUN},
    error::{Error, Result},
    profile::DensityProfile,
    quadrature::{self, QuadOptions, Quadrature},
};

/// Dark matter signal type
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum FactorType {
    #[default]
    Annihilation,
    Decay,
}
impl FactorType {
    /// Line of sight integrand for the density `rho` [GeV/cm^3]
    pub fn integrand(&self, rho: f64) -> f64 {
        let ratio = rho / RHO_SUN;
        match self {
            FactorType::Annihilation => ratio * ratio / R_SUN,
            FactorType::Decay => ratio / R_SUN,
        }
    }
}
impl fmt::Display for FactorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactorType::Annihilation => write!(f, "annihilation"),
            FactorType::Decay => write!(f, "decay"),
        }
    }
}
impl FromStr for FactorType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "annihilation" => Ok(FactorType::Annihilation),
            "decay" => Ok(FactorType::Decay),
            _ => Err(Error::invalid(format!(
                r#"unknown factor type {s:?}, expected "annihilation" or "decay""#
            ))),
        }
    }
}

/// J-factor estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JFactor {
    pub value: f64,
    /// Absolute error estimate of the quadrature
    pub error: f64,
    pub intervals: usize,
    pub evaluations: usize,
}
impl JFactor {
    pub fn into_tuple(self) -> (f64, f64) {
        (self.value, self.error)
    }
}
impl From<Quadrature> for JFactor {
    fn from(q: Quadrature) -> Self {
        Self {
            value: q.value,
            error: q.error,
            intervals: q.intervals,
            evaluations: q.evaluations,
        }
    }
}
impl fmt::Display for JFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6e} +/- {:.1e}", self.value, self.error)
    }
}

/// J-factor of `profile` along the line of sight at `theta` [rad] from the Galactic center
///
/// A line of sight through the center of a cuspy profile diverges and is
/// reported as [Error::DomainSingularity].
pub fn j_factor<P>(profile: &P, theta: f64, factor: FactorType, options: &QuadOptions) -> Result<JFactor>
where
    P: DensityProfile + ?Sized,
{
    if !theta.is_finite() {
        return Err(Error::invalid(format!(
            "{}: line of sight angle must be finite, found {theta}",
            profile.label()
        )));
    }
    // full turns leave a rounding residue in sin(theta)
    let (sin, cos) = theta.rem_euclid(TAU).sin_cos();
    if profile.family().is_cuspy() && sin == 0. && cos > 0. {
        return Err(Error::DomainSingularity {
            profile: profile.label(),
            radius: 0.,
        });
    }
    let now = Instant::now();
    let quad = quadrature::integrate(
        |s| factor.integrand(profile.law(galactocentric_radius(s, theta))),
        0.,
        f64::INFINITY,
        options,
    )
    .map_err(|source| Error::NumericalIntegration {
        profile: profile.label(),
        theta,
        factor,
        source,
    })?;
    log::debug!(
        "{} {factor} J-factor at theta={theta}: {:e} ({} intervals, {}us)",
        profile.label(),
        quad.value,
        quad.intervals,
        now.elapsed().as_micros()
    );
    Ok(quad.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        profile::{Family, Isothermal, Nfw, Profile},
        quadrature::QuadratureError,
    };
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
    use strum::IntoEnumIterator;

    fn assert_close(j: JFactor, exact: f64) {
        println!("{j} (exact: {exact:.6e})");
        let delta = (j.value - exact).abs();
        assert!(delta <= j.error.max(1e-12 * exact), "{delta:e} > {:e}", j.error);
        assert!(delta <= 1e-7 * exact);
    }

    // int_{R_SUN}^inf rho_nfw(r) dr
    fn nfw_anti_center(nfw: &Nfw) -> f64 {
        let x0 = R_SUN / nfw.r_s();
        nfw.rho_s() * nfw.r_s() * (((1. + x0) / x0).ln() - 1. / (1. + x0)) / (R_SUN * RHO_SUN)
    }

    // int_0^inf rho_iso(r(s, theta)) ds
    fn isothermal_decay(iso: &Isothermal, theta: f64) -> f64 {
        let a = R_SUN * theta.cos();
        let c = iso.r_s().hypot(R_SUN * theta.sin());
        iso.rho_s() * iso.r_s().powi(2) / c * (FRAC_PI_2 + (a / c).atan()) / (R_SUN * RHO_SUN)
    }

    #[test]
    fn nfw_anti_center_decay() {
        let nfw = Nfw::default();
        let j = j_factor(&nfw, PI, FactorType::Decay, &QuadOptions::default()).unwrap();
        assert_close(j, nfw_anti_center(&nfw));
    }

    #[test]
    fn isothermal_decay_regression() {
        let iso = Isothermal::default();
        for theta in [0., FRAC_PI_4, FRAC_PI_2, 3.] {
            let j = j_factor(&iso, theta, FactorType::Decay, &QuadOptions::default()).unwrap();
            assert_close(j, isothermal_decay(&iso, theta));
        }
    }

    #[test]
    fn isothermal_anti_center_annihilation() {
        let iso = Isothermal::default();
        let x0 = R_SUN / iso.r_s();
        let exact = iso.rho_s().powi(2)
            * iso.r_s()
            * (FRAC_PI_4 - x0 / (2. * (1. + x0 * x0)) - 0.5 * x0.atan())
            / (R_SUN * RHO_SUN * RHO_SUN);
        let j = j_factor(&iso, PI, FactorType::Annihilation, &QuadOptions::default()).unwrap();
        assert_close(j, exact);
    }

    #[test]
    fn nfw_center_diverges() {
        for factor in FactorType::iter() {
            assert!(matches!(
                Nfw::default().j_factor(0., factor, &QuadOptions::default()),
                Err(Error::DomainSingularity { radius, .. }) if radius == 0.
            ));
        }
    }

    #[test]
    fn cusp_behind_full_turns() {
        let opts = QuadOptions::default();
        for profile in [Profile::new(Family::Nfw), Profile::new(Family::Moore)] {
            for theta in [2. * PI, -2. * PI, 4. * PI] {
                assert!(
                    matches!(
                        profile.j_factor(theta, FactorType::Annihilation, &opts),
                        Err(Error::DomainSingularity { .. })
                    ),
                    "{profile} at theta={theta}"
                );
            }
        }
        // a full turn from the anti-center is still the anti-center
        let nfw = Nfw::default();
        let j = j_factor(&nfw, 3. * PI, FactorType::Decay, &opts).unwrap();
        assert_close(j, nfw_anti_center(&nfw));
    }

    #[test]
    fn cored_centers_converge() {
        // the Einasto density has an infinite slope at r=0 and needs a deeper subdivision
        let opts = QuadOptions::default().limit(1000);
        for family in [Family::Einasto, Family::Isothermal, Family::Burkert] {
            for factor in FactorType::iter() {
                let j = Profile::new(family).j_factor(0., factor, &opts).unwrap();
                assert!(j.value > 0. && j.value.is_finite(), "{family} {factor}: {j}");
            }
        }
    }

    #[test]
    fn annihilation_falls_off_the_center() {
        let opts = QuadOptions::default();
        for family in Family::iter() {
            let profile = Profile::new(family);
            let inner = profile.j_factor(0.2, FactorType::Annihilation, &opts).unwrap();
            let outer = profile.j_factor(1.5, FactorType::Annihilation, &opts).unwrap();
            assert!(inner.value > outer.value, "{profile}: {inner} <= {outer}");
        }
    }

    #[test]
    fn unknown_factor_type() {
        assert!(matches!(
            "foo".parse::<FactorType>(),
            Err(Error::InvalidArgument(_))
        ));
        for factor in FactorType::iter() {
            assert_eq!(factor.to_string().parse::<FactorType>().unwrap(), factor);
        }
    }

    #[test]
    fn non_finite_angle() {
        let err = j_factor(
            &Nfw::default(),
            f64::NAN,
            FactorType::Decay,
            &QuadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn non_convergence_is_reported() {
        let err = j_factor(
            &Nfw::default(),
            0.01,
            FactorType::Annihilation,
            &QuadOptions::default().epsabs(1e-15).epsrel(1e-15).limit(2),
        )
        .unwrap_err();
        match err {
            Error::NumericalIntegration {
                theta,
                factor,
                source: QuadratureError::SubdivisionLimit { value, .. },
                ..
            } => {
                assert_eq!(theta, 0.01);
                assert_eq!(factor, FactorType::Annihilation);
                assert!(value > 0.);
            }
            e => panic!("unexpected error: {e}"),
        }
    }
}
