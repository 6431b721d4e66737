//! Two-party distributed point functions, their aggregation into distributed sums of point
//! functions, and a pseudorandom correlation generator that turns them into batches of
//! BBS+-style signing tuples over the BLS12-381 scalar field.
//!
//! The crate exposes a programmatic interface only: a trusted dealer produces per-party seeds
//! ([`pcg::dealer::gen`]) and each party later expands its seed into 2^N correlated tuples
//! ([`pcg::eval_combined`] and [`pcg::eval_separate`]). Network transport, persistence and the
//! signature scheme consuming the tuples live elsewhere.

pub use constants::{ALLOWED_LAMBDAS, MAX_LOG_DOMAIN, MIN_LOG_DOMAIN, SCALAR_NUM_BYTES};
pub use error::{Error, Result};

pub mod algebra;
pub mod constants;
pub mod dpf;
pub mod dspf;
pub mod error;
pub mod pcg;
pub mod prg;
pub mod utils;
