//! Dark matter halo density profiles
//!
//! Every family implements [DensityProfile] by providing its closed-form law in
//! galactocentric radius; the geocentric conversion, the argument checks and the
//! J-factor integrals are shared by all of them.

use std::{fmt, str::FromStr};

use strum_macros::EnumIter;

use crate::{
    coordinates::galactocentric_radius,
    error::{Error, Result},
    jfactor::{self, FactorType, JFactor},
    map::{self, AngularGrid, FactorMap},
    quadrature::QuadOptions,
};

mod families;
pub use families::{Burkert, Einasto, Isothermal, Moore, Nfw};

/// Density profile families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Family {
    Nfw,
    Einasto,
    Isothermal,
    Burkert,
    Moore,
}
impl Family {
    /// Profiles with a density diverging at the Galactic center
    pub fn is_cuspy(&self) -> bool {
        matches!(self, Family::Nfw | Family::Moore)
    }
}
impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Nfw => write!(f, "NFW"),
            Family::Einasto => write!(f, "Einasto"),
            Family::Isothermal => write!(f, "Isothermal"),
            Family::Burkert => write!(f, "Burkert"),
            Family::Moore => write!(f, "Moore"),
        }
    }
}
impl FromStr for Family {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nfw" => Ok(Family::Nfw),
            "einasto" => Ok(Family::Einasto),
            "isothermal" | "iso" => Ok(Family::Isothermal),
            "burkert" => Ok(Family::Burkert),
            "moore" => Ok(Family::Moore),
            _ => Err(Error::invalid(format!(
                "unknown profile {s:?}, expected one of nfw, einasto, isothermal, burkert or moore"
            ))),
        }
    }
}

/// Spherical dark matter density profile
pub trait DensityProfile: Send + Sync {
    fn family(&self) -> Family;
    /// Scale radius [kpc]
    fn r_s(&self) -> f64;
    /// Scale density [GeV/cm^3]
    fn rho_s(&self) -> f64;
    /// Closed-form density law at the galactocentric radius `r`
    ///
    /// No argument checks: cuspy profiles return `inf` at `r=0`.
    fn law(&self, r: f64) -> f64;

    /// Profile name and parameters
    fn label(&self) -> String {
        format!(
            "{}(r_s={} kpc, rho_s={} GeV/cm^3)",
            self.family(),
            self.r_s(),
            self.rho_s()
        )
    }
    /// Density [GeV/cm^3] at the galactocentric radius `r` [kpc]
    fn density(&self, r: f64) -> Result<f64> {
        if !r.is_finite() || r < 0. {
            return Err(Error::invalid(format!(
                "{}: radius must be finite and positive, found {r}",
                self.label()
            )));
        }
        if r == 0. && self.family().is_cuspy() {
            return Err(Error::DomainSingularity {
                profile: self.label(),
                radius: r,
            });
        }
        Ok(self.law(r))
    }
    /// Density [GeV/cm^3] at the geocentric distance `s` [kpc] along the line of sight
    /// at `angle` [rad] from the Galactic center
    fn geocentric_density(&self, s: f64, angle: f64) -> Result<f64> {
        if !angle.is_finite() {
            return Err(Error::invalid(format!(
                "{}: line of sight angle must be finite, found {angle}",
                self.label()
            )));
        }
        if !s.is_finite() || s < 0. {
            return Err(Error::invalid(format!(
                "{}: geocentric distance must be finite and positive, found {s}",
                self.label()
            )));
        }
        self.density(galactocentric_radius(s, angle))
    }
    /// Densities at the galactocentric radii `radii`
    fn densities(&self, radii: &[f64]) -> Result<Vec<f64>> {
        radii.iter().map(|&r| self.density(r)).collect()
    }
    /// J-factor along the line of sight at `theta` [rad] from the Galactic center
    fn j_factor(&self, theta: f64, factor: FactorType, options: &QuadOptions) -> Result<JFactor> {
        jfactor::j_factor(self, theta, factor, options)
    }
    /// Aperture weighted J-factors of the cells of `grid`
    fn j_factor_map(
        &self,
        grid: &AngularGrid,
        factor: FactorType,
        options: &QuadOptions,
    ) -> FactorMap {
        map::j_factor_map(self, grid, factor, options)
    }
}

/// Any of the density profile families
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Profile {
    Nfw(Nfw),
    Einasto(Einasto),
    Isothermal(Isothermal),
    Burkert(Burkert),
    Moore(Moore),
}
impl Profile {
    /// Profile with the default parameters of `family`
    pub fn new(family: Family) -> Self {
        match family {
            Family::Nfw => Nfw::default().into(),
            Family::Einasto => Einasto::default().into(),
            Family::Isothermal => Isothermal::default().into(),
            Family::Burkert => Burkert::default().into(),
            Family::Moore => Moore::default().into(),
        }
    }
    /// Profile of `family` with some of the default parameters replaced
    ///
    /// `alpha` is only accepted for the Einasto profile.
    pub fn with_overrides(
        family: Family,
        r_s: Option<f64>,
        rho_s: Option<f64>,
        alpha: Option<f64>,
    ) -> Result<Self> {
        let defaults = Self::new(family);
        let r_s = r_s.unwrap_or(defaults.r_s());
        let rho_s = rho_s.unwrap_or(defaults.rho_s());
        if alpha.is_some() && family != Family::Einasto {
            return Err(Error::invalid(format!(
                "the shape parameter alpha does not apply to the {family} profile"
            )));
        }
        Ok(match family {
            Family::Nfw => Nfw::new(r_s, rho_s)?.into(),
            Family::Einasto => {
                Einasto::new(r_s, rho_s, alpha.unwrap_or(Einasto::default().alpha()))?.into()
            }
            Family::Isothermal => Isothermal::new(r_s, rho_s)?.into(),
            Family::Burkert => Burkert::new(r_s, rho_s)?.into(),
            Family::Moore => Moore::new(r_s, rho_s)?.into(),
        })
    }
    fn inner(&self) -> &dyn DensityProfile {
        match self {
            Profile::Nfw(p) => p,
            Profile::Einasto(p) => p,
            Profile::Isothermal(p) => p,
            Profile::Burkert(p) => p,
            Profile::Moore(p) => p,
        }
    }
}
impl DensityProfile for Profile {
    fn family(&self) -> Family {
        self.inner().family()
    }
    fn r_s(&self) -> f64 {
        self.inner().r_s()
    }
    fn rho_s(&self) -> f64 {
        self.inner().rho_s()
    }
    fn law(&self, r: f64) -> f64 {
        self.inner().law(r)
    }
    fn label(&self) -> String {
        self.inner().label()
    }
}
impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
impl From<Nfw> for Profile {
    fn from(p: Nfw) -> Self {
        Profile::Nfw(p)
    }
}
impl From<Einasto> for Profile {
    fn from(p: Einasto) -> Self {
        Profile::Einasto(p)
    }
}
impl From<Isothermal> for Profile {
    fn from(p: Isothermal) -> Self {
        Profile::Isothermal(p)
    }
}
impl From<Burkert> for Profile {
    fn from(p: Burkert) -> Self {
        Profile::Burkert(p)
    }
}
impl From<Moore> for Profile {
    fn from(p: Moore) -> Self {
        Profile::Moore(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::R_SUN;
    use rand::Rng;
    use strum::IntoEnumIterator;

    #[test]
    fn strictly_positive() {
        let mut rng = rand::thread_rng();
        for family in Family::iter() {
            let profile = Profile::new(family);
            for _ in 0..1000 {
                let r: f64 = rng.gen_range(1e-3..1e3);
                let rho = profile.density(r).unwrap();
                assert!(rho > 0., "{profile} at r={r}: {rho}");
            }
        }
    }

    #[test]
    fn non_increasing() {
        let mut rng = rand::thread_rng();
        for family in Family::iter() {
            let profile = Profile::new(family);
            let mut radii: Vec<f64> = (0..500).map(|_| rng.gen_range(1e-3..1e3)).collect();
            radii.sort_by(f64::total_cmp);
            let rho = profile.densities(&radii).unwrap();
            rho.windows(2)
                .zip(radii.windows(2))
                .for_each(|(rho, r)| {
                    assert!(
                        rho[1] <= rho[0],
                        "{profile}: rho({})={} > rho({})={}",
                        r[1],
                        rho[1],
                        r[0],
                        rho[0]
                    )
                });
        }
    }

    #[test]
    fn cusps_are_singular() {
        for family in Family::iter() {
            let result = Profile::new(family).density(0.);
            if family.is_cuspy() {
                assert!(matches!(result, Err(Error::DomainSingularity { .. })));
            } else {
                assert!(result.unwrap().is_finite());
            }
        }
    }

    #[test]
    fn invalid_radius() {
        for family in Family::iter() {
            let profile = Profile::new(family);
            for r in [-1., f64::NAN, f64::INFINITY] {
                assert!(matches!(profile.density(r), Err(Error::InvalidArgument(_))));
            }
            assert!(matches!(
                profile.geocentric_density(1., f64::NAN),
                Err(Error::InvalidArgument(_))
            ));
            assert!(matches!(
                profile.geocentric_density(-1., 0.),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn geocentric_matches_galactocentric() {
        let profile = Profile::new(Family::Burkert);
        let rho = profile.geocentric_density(3., std::f64::consts::PI).unwrap();
        assert!((rho - profile.density(R_SUN + 3.).unwrap()).abs() < 1e-12);
        assert!(matches!(
            Profile::new(Family::Moore).geocentric_density(R_SUN, 0.),
            Err(Error::DomainSingularity { .. })
        ));
    }

    #[test]
    fn family_names() {
        for family in Family::iter() {
            assert_eq!(family.to_string().parse::<Family>().unwrap(), family);
        }
        assert!(matches!(
            "hernquist".parse::<Family>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn overrides() {
        let p = Profile::with_overrides(Family::Einasto, Some(20.), None, Some(0.2)).unwrap();
        assert_eq!(p.r_s(), 20.);
        assert_eq!(p.rho_s(), 0.033);
        assert!(matches!(p, Profile::Einasto(e) if e.alpha() == 0.2));
        assert!(Profile::with_overrides(Family::Nfw, None, None, Some(0.2)).is_err());
        assert!(Profile::with_overrides(Family::Nfw, Some(-1.), None, None).is_err());
    }
}
