use super::{DensityProfile, Family};
use crate::error::{Error, Result};

/// Moore inner logarithmic slope
const MOORE_INNER_SLOPE: f64 = 1.16;
/// Moore outer slope correction, the density falls as `r^-(1.16+1.84)=r^-3`
const MOORE_OUTER_SLOPE: f64 = 1.84;

fn check_scales(family: Family, r_s: f64, rho_s: f64) -> Result<()> {
    if !(r_s.is_finite() && r_s > 0.) {
        return Err(Error::invalid(format!(
            "{family}: scale radius must be finite and positive, found {r_s}"
        )));
    }
    if !(rho_s.is_finite() && rho_s > 0.) {
        return Err(Error::invalid(format!(
            "{family}: scale density must be finite and positive, found {rho_s}"
        )));
    }
    Ok(())
}

/// Navarro-Frenk-White profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nfw {
    r_s: f64,
    rho_s: f64,
}
impl Default for Nfw {
    fn default() -> Self {
        Self {
            r_s: 24.42,
            rho_s: 0.184,
        }
    }
}
impl Nfw {
    pub fn new(r_s: f64, rho_s: f64) -> Result<Self> {
        check_scales(Family::Nfw, r_s, rho_s)?;
        Ok(Self { r_s, rho_s })
    }
}
impl DensityProfile for Nfw {
    fn family(&self) -> Family {
        Family::Nfw
    }
    fn r_s(&self) -> f64 {
        self.r_s
    }
    fn rho_s(&self) -> f64 {
        self.rho_s
    }
    fn law(&self, r: f64) -> f64 {
        let x = r / self.r_s;
        self.rho_s / (x * (1. + x).powi(2))
    }
}

/// Einasto profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Einasto {
    r_s: f64,
    rho_s: f64,
    alpha: f64,
}
impl Default for Einasto {
    fn default() -> Self {
        Self {
            r_s: 28.44,
            rho_s: 0.033,
            alpha: 0.17,
        }
    }
}
impl Einasto {
    pub fn new(r_s: f64, rho_s: f64, alpha: f64) -> Result<Self> {
        check_scales(Family::Einasto, r_s, rho_s)?;
        if !(alpha.is_finite() && alpha > 0.) {
            return Err(Error::invalid(format!(
                "Einasto: alpha must be finite and positive, found {alpha}"
            )));
        }
        Ok(Self { r_s, rho_s, alpha })
    }
    /// Logarithmic slope shape parameter
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}
impl DensityProfile for Einasto {
    fn family(&self) -> Family {
        Family::Einasto
    }
    fn r_s(&self) -> f64 {
        self.r_s
    }
    fn rho_s(&self) -> f64 {
        self.rho_s
    }
    fn law(&self, r: f64) -> f64 {
        let x = r / self.r_s;
        self.rho_s * (-2. / self.alpha * (x.powf(self.alpha) - 1.)).exp()
    }
    fn label(&self) -> String {
        format!(
            "Einasto(r_s={} kpc, rho_s={} GeV/cm^3, alpha={})",
            self.r_s, self.rho_s, self.alpha
        )
    }
}

/// Cored isothermal sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Isothermal {
    r_s: f64,
    rho_s: f64,
}
impl Default for Isothermal {
    fn default() -> Self {
        Self {
            r_s: 4.38,
            rho_s: 1.387,
        }
    }
}
impl Isothermal {
    pub fn new(r_s: f64, rho_s: f64) -> Result<Self> {
        check_scales(Family::Isothermal, r_s, rho_s)?;
        Ok(Self { r_s, rho_s })
    }
}
impl DensityProfile for Isothermal {
    fn family(&self) -> Family {
        Family::Isothermal
    }
    fn r_s(&self) -> f64 {
        self.r_s
    }
    fn rho_s(&self) -> f64 {
        self.rho_s
    }
    fn law(&self, r: f64) -> f64 {
        let x = r / self.r_s;
        self.rho_s / (1. + x * x)
    }
}

/// Burkert profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burkert {
    r_s: f64,
    rho_s: f64,
}
impl Default for Burkert {
    fn default() -> Self {
        Self {
            r_s: 12.67,
            rho_s: 0.712,
        }
    }
}
impl Burkert {
    pub fn new(r_s: f64, rho_s: f64) -> Result<Self> {
        check_scales(Family::Burkert, r_s, rho_s)?;
        Ok(Self { r_s, rho_s })
    }
}
impl DensityProfile for Burkert {
    fn family(&self) -> Family {
        Family::Burkert
    }
    fn r_s(&self) -> f64 {
        self.r_s
    }
    fn rho_s(&self) -> f64 {
        self.rho_s
    }
    fn law(&self, r: f64) -> f64 {
        let x = r / self.r_s;
        self.rho_s / ((1. + x) * (1. + x * x))
    }
}

/// Moore profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moore {
    r_s: f64,
    rho_s: f64,
}
impl Default for Moore {
    fn default() -> Self {
        Self {
            r_s: 30.28,
            rho_s: 0.105,
        }
    }
}
impl Moore {
    pub fn new(r_s: f64, rho_s: f64) -> Result<Self> {
        check_scales(Family::Moore, r_s, rho_s)?;
        Ok(Self { r_s, rho_s })
    }
}
impl DensityProfile for Moore {
    fn family(&self) -> Family {
        Family::Moore
    }
    fn r_s(&self) -> f64 {
        self.r_s
    }
    fn rho_s(&self) -> f64 {
        self.rho_s
    }
    fn law(&self, r: f64) -> f64 {
        let x = r / self.r_s;
        self.rho_s * x.powf(-MOORE_INNER_SLOPE) * (1. + x).powf(-MOORE_OUTER_SLOPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_radius_values() {
        // x = 1 for every family
        let nfw = Nfw::default();
        assert!((nfw.law(nfw.r_s) - 0.184 / 4.).abs() < 1e-15);
        let einasto = Einasto::default();
        assert!((einasto.law(einasto.r_s) - 0.033).abs() < 1e-15);
        let iso = Isothermal::default();
        assert!((iso.law(iso.r_s) - 1.387 / 2.).abs() < 1e-15);
        let burkert = Burkert::default();
        assert!((burkert.law(burkert.r_s) - 0.712 / 4.).abs() < 1e-15);
        let moore = Moore::default();
        assert!((moore.law(moore.r_s) - 0.105 * 2f64.powf(-1.84)).abs() < 1e-15);
    }

    #[test]
    fn cored_centers() {
        assert_eq!(Isothermal::default().law(0.), 1.387);
        assert_eq!(Burkert::default().law(0.), 0.712);
        assert!((Einasto::default().law(0.) - 0.033 * (2. / 0.17f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn outer_slopes() {
        // NFW, Burkert and Moore fall as r^-3, the isothermal sphere as r^-2
        let r = 1e5;
        let cases: [(fn(f64) -> f64, f64); 4] = [
            (|r| Nfw::default().law(r), -3.),
            (|r| Burkert::default().law(r), -3.),
            (|r| Moore::default().law(r), -3.),
            (|r| Isothermal::default().law(r), -2.),
        ];
        for (rho, slope) in cases {
            let measured = (rho(2. * r) / rho(r)).log2();
            assert!((measured - slope).abs() < 1e-3, "{measured} vs {slope}");
        }
    }

    #[test]
    fn invalid_parameters() {
        assert!(Nfw::new(0., 1.).is_err());
        assert!(Burkert::new(1., -1.).is_err());
        assert!(Moore::new(f64::NAN, 1.).is_err());
        assert!(Isothermal::new(1., f64::INFINITY).is_err());
        assert!(Einasto::new(1., 1., 0.).is_err());
        assert!(Einasto::new(1., 1., 0.3).is_ok());
    }
}
