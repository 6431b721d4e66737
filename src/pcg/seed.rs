use crate::dspf::DspfKey;
use crate::error::Result;
use blstrs::Scalar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The three exponent rows a party holds, one c × t matrix per embedded vector family: `a` for
/// the signing randomness, `e` for the blinding exponent, `s` for the message blinder. Within
/// each row the t entries are pairwise distinct and sorted ascending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExponentRows {
    pub(crate) a: Vec<Vec<u64>>,
    pub(crate) e: Vec<Vec<u64>>,
    pub(crate) s: Vec<Vec<u64>>,
}

/// The matching coefficient rows, one c × t scalar matrix per family.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRows {
    pub(crate) a: Vec<Vec<Scalar>>,
    pub(crate) e: Vec<Vec<Scalar>>,
    pub(crate) s: Vec<Vec<Scalar>>,
}

/// One party's slice of a correlation tensor towards a single counterparty: the `forward` keys
/// are the 0-side of pairs where this party supplied the vector, the `backward` keys the 1-side
/// of the mirrored pairs where the counterparty did. Keeping the two directions apart is what
/// lets the threshold path attribute each partial share to its origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrelationKeys {
    pub(crate) forward: Vec<DspfKey>,
    pub(crate) backward: Vec<DspfKey>,
}

/// The per-party output of the trusted dealer.
///
/// A seed is a secret: it carries this party's Shamir share of the signing key, its own rows of
/// the Module-LPN witness, and — per counterparty — its slices of the VOLE tensor (sk·a) and of
/// the two OLE tensors (a·s and a·e). Only the slices this party consumes are materialized, not
/// the full n × n tensors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PcgSeed {
    pub(crate) index: usize,
    pub(crate) ski: Scalar,
    pub(crate) exponents: ExponentRows,
    pub(crate) coefficients: CoefficientRows,
    pub(crate) vole: BTreeMap<usize, CorrelationKeys>,
    pub(crate) ole_as: BTreeMap<usize, CorrelationKeys>,
    pub(crate) ole_ae: BTreeMap<usize, CorrelationKeys>,
}

impl PcgSeed {
    /// The party index i ∈ [0, n).
    pub fn index(&self) -> usize {
        self.index
    }

    /// This party's Shamir share of the signing key.
    pub fn key_share(&self) -> &Scalar {
        &self.ski
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bcs::from_bytes(bytes)?)
    }
}
