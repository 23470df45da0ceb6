use std::{path::PathBuf, time::Instant};

use anyhow::Context;
use dm_jfactor::{AngularGrid, DensityProfile, FactorType, Family, Profile, QuadOptions};
use serde::Serialize;
use strum::IntoEnumIterator;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "jfactor", about = "Dark matter line of sight J-factors")]
struct Opt {
    #[structopt(flatten)]
    halo: HaloOpt,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
struct HaloOpt {
    /// Density profile: nfw, einasto, isothermal, burkert or moore
    #[structopt(short, long, default_value = "nfw")]
    profile: Family,
    /// Scale radius [kpc]
    #[structopt(long)]
    r_s: Option<f64>,
    /// Scale density [GeV/cm^3]
    #[structopt(long)]
    rho_s: Option<f64>,
    /// Einasto shape parameter
    #[structopt(long)]
    alpha: Option<f64>,
}
impl HaloOpt {
    fn profile(&self) -> dm_jfactor::Result<Profile> {
        Profile::with_overrides(self.profile, self.r_s, self.rho_s, self.alpha)
    }
}

#[derive(Debug, StructOpt)]
struct QuadOpt {
    /// Absolute error target of the line of sight integral
    #[structopt(long)]
    epsabs: Option<f64>,
    /// Relative error target of the line of sight integral
    #[structopt(long)]
    epsrel: Option<f64>,
    /// Maximum number of quadrature subintervals
    #[structopt(long)]
    limit: Option<usize>,
}
impl QuadOpt {
    fn options(&self) -> QuadOptions {
        let mut options = QuadOptions::default();
        if let Some(arg) = self.epsabs {
            options = options.epsabs(arg);
        }
        if let Some(arg) = self.epsrel {
            options = options.epsrel(arg);
        }
        if let Some(arg) = self.limit {
            options = options.limit(arg);
        }
        options
    }
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Lists the density profiles with their default parameters
    Profiles,
    /// Tabulates the density on log-spaced galactocentric radii
    Density {
        /// Smallest radius [kpc]
        #[structopt(long, default_value = "0.1")]
        r_min: f64,
        /// Largest radius [kpc]
        #[structopt(long, default_value = "100")]
        r_max: f64,
        /// Number of radii
        #[structopt(short, long, default_value = "10")]
        n: usize,
    },
    /// J-factor along a single line of sight
    Point {
        /// Angle between the line of sight and the Galactic center
        #[structopt(short, long, allow_hyphen_values = true)]
        theta: f64,
        /// Angles are given in degrees
        #[structopt(short, long)]
        degrees: bool,
        /// annihilation or decay
        #[structopt(short, long, default_value = "annihilation")]
        factor: FactorType,
        #[structopt(flatten)]
        quad: QuadOpt,
    },
    /// Aperture weighted J-factor map written to a CSV file
    Map {
        /// Longitude lower bound [rad, deg with --degrees]
        #[structopt(long, default_value = "-0.2", allow_hyphen_values = true)]
        l_min: f64,
        #[structopt(long, default_value = "0.2", allow_hyphen_values = true)]
        l_max: f64,
        /// Number of longitude cells
        #[structopt(long, default_value = "20")]
        n_l: usize,
        /// Latitude lower bound [rad, deg with --degrees], within [-pi/2, pi/2]
        #[structopt(long, default_value = "-0.2", allow_hyphen_values = true)]
        b_min: f64,
        #[structopt(long, default_value = "0.2", allow_hyphen_values = true)]
        b_max: f64,
        /// Number of latitude cells
        #[structopt(long, default_value = "20")]
        n_b: usize,
        /// Grid bounds are given in degrees
        #[structopt(short, long)]
        degrees: bool,
        /// annihilation or decay
        #[structopt(short, long, default_value = "annihilation")]
        factor: FactorType,
        #[structopt(flatten)]
        quad: QuadOpt,
        /// CSV output file
        #[structopt(short, long, default_value = "jfactor_map.csv")]
        output: PathBuf,
    },
}

#[derive(Serialize)]
struct Record {
    row: usize,
    col: usize,
    #[serde(rename = "l [rad]")]
    l: f64,
    #[serde(rename = "b [rad]")]
    b: f64,
    #[serde(rename = "theta [rad]")]
    theta: f64,
    #[serde(rename = "aperture [sr]")]
    aperture: f64,
    #[serde(rename = "J-factor")]
    j_factor: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let profile = opt.halo.profile()?;
    log::info!("{profile}");

    match opt.cmd {
        Command::Profiles => {
            for family in Family::iter() {
                println!(" - {}", Profile::new(family));
            }
        }
        Command::Density { r_min, r_max, n } => {
            anyhow::ensure!(
                n > 1 && 0. < r_min && r_min < r_max,
                "expected at least 2 radii in 0 < r_min < r_max"
            );
            let ratio = (r_max / r_min).powf(1. / (n - 1) as f64);
            let radii: Vec<f64> = (0..n).map(|k| r_min * ratio.powi(k as i32)).collect();
            let densities = profile.densities(&radii)?;
            println!("{:>12} {:>14}", "r [kpc]", "rho [GeV/cm^3]");
            for (r, rho) in radii.iter().zip(densities) {
                println!("{:>12.4} {:>14.6e}", r, rho);
            }
        }
        Command::Point {
            theta,
            degrees,
            factor,
            quad,
        } => {
            let theta = if degrees { theta.to_radians() } else { theta };
            let j = profile
                .j_factor(theta, factor, &quad.options())
                .with_context(|| format!("{factor} J-factor at theta={theta} rad"))?;
            let intervals = j.intervals;
            let (value, error) = j.into_tuple();
            println!(
                "{profile} {factor} J-factor at theta={theta:.6} rad: {value:.6e} +/- {error:.1e} ({intervals} intervals)"
            );
        }
        Command::Map {
            l_min,
            l_max,
            n_l,
            b_min,
            b_max,
            n_b,
            degrees,
            factor,
            quad,
            output,
        } => {
            let to_rad = |x: f64| if degrees { x.to_radians() } else { x };
            let grid = AngularGrid::regular(
                (to_rad(l_min), to_rad(l_max)),
                n_l,
                (to_rad(b_min), to_rad(b_max)),
                n_b,
            )?;
            let now = Instant::now();
            let map = profile.j_factor_map(&grid, factor, &quad.options());
            println!("{profile} {map} in {:.3}s", now.elapsed().as_secs_f64());

            let apertures = grid.apertures();
            let mut wtr = csv::Writer::from_path(&output)
                .with_context(|| format!("failed to create {output:?}"))?;
            for cell in grid.cells() {
                wtr.serialize(Record {
                    row: cell.row,
                    col: cell.col,
                    l: cell.l,
                    b: cell.b,
                    theta: cell.theta(),
                    aperture: apertures[(cell.row, cell.col)],
                    j_factor: map.get(cell.row, cell.col),
                })?;
            }
            wtr.flush()?;
            log::info!("J-factor map written to {output:?}");
        }
    }

    Ok(())
}
