use crate::{jfactor::FactorType, quadrature::QuadratureError};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{profile} density is singular at r={radius} kpc")]
    DomainSingularity { profile: String, radius: f64 },
    #[error("{factor} J-factor of {profile} at theta={theta} rad did not converge")]
    NumericalIntegration {
        profile: String,
        theta: f64,
        factor: FactorType,
        #[source]
        source: QuadratureError,
    },
}
impl Error {
    pub(crate) fn invalid(msg: impl ToString) -> Self {
        Self::InvalidArgument(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
