//! # Dark matter J-factors
//!
//! Line of sight integrals of Galactic dark matter halo densities, for a single
//! direction and over longitude-latitude sky grids.
//!
//! Distances are in kpc, densities in GeV/cm^3 and angles in radians.
//!
//! ```no_run
//! use dm_jfactor::{AngularGrid, DensityProfile, FactorType, Nfw, QuadOptions};
//!
//! # fn main() -> dm_jfactor::Result<()> {
//! let nfw = Nfw::default();
//! let j = nfw.j_factor(0.1, FactorType::Annihilation, &QuadOptions::default())?;
//! println!("J(0.1 rad) = {j}");
//!
//! let grid = AngularGrid::regular((-0.5, 0.5), 50, (-0.5, 0.5), 50)?;
//! let map = nfw.j_factor_map(&grid, "decay".parse()?, &QuadOptions::default());
//! println!("{map}");
//! # Ok(())
//! # }
//! ```

pub mod coordinates;
mod error;
pub mod jfactor;
pub mod map;
pub mod profile;
pub mod quadrature;

pub use error::{Error, Result};
pub use jfactor::{j_factor, FactorType, JFactor};
pub use map::{apertures_map, j_factor_map, AngularGrid, Cell, CellError, FactorMap};
pub use profile::{Burkert, DensityProfile, Einasto, Family, Isothermal, Moore, Nfw, Profile};
pub use quadrature::{QuadOptions, Quadrature, QuadratureError};
