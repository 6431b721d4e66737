pub mod evaluation_domain;
pub mod fft;
pub mod lagrange;
pub mod polynomial;
pub mod shamir;

pub use evaluation_domain::EvaluationDomain;
pub use polynomial::Polynomial;
pub use shamir::ShamirConfig;
