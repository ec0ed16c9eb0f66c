//! # E-Wallet Enumeration
//!
//! The closed set of Indonesian e-wallets creators can receive payouts
//! through. Stored and transmitted as the lowercase token the client
//! sends (`"dana"`, `"ovo"`, `"gopay"`, `"shopeepay"`); displayed with
//! the product spelling.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::validation::FieldProblem;

/// A supported payout e-wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EwalletType {
    Dana,
    Ovo,
    #[serde(rename = "gopay")]
    GoPay,
    #[serde(rename = "shopeepay")]
    ShopeePay,
}

impl EwalletType {
    /// The wire/storage token for this wallet.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dana => "dana",
            Self::Ovo => "ovo",
            Self::GoPay => "gopay",
            Self::ShopeePay => "shopeepay",
        }
    }

    /// The product spelling shown to users.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Dana => "DANA",
            Self::Ovo => "OVO",
            Self::GoPay => "GoPay",
            Self::ShopeePay => "ShopeePay",
        }
    }

    /// All supported wallets, in display order.
    pub fn all() -> [EwalletType; 4] {
        [Self::Dana, Self::Ovo, Self::GoPay, Self::ShopeePay]
    }
}

impl FromStr for EwalletType {
    type Err = FieldProblem;

    /// Parse a wallet token, accepting any casing of either the wire
    /// token or the product spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dana" => Ok(Self::Dana),
            "ovo" => Ok(Self::Ovo),
            "gopay" => Ok(Self::GoPay),
            "shopeepay" => Ok(Self::ShopeePay),
            other => Err(FieldProblem::new(
                "ewallet_type",
                format!("unsupported e-wallet \"{other}\" (expected one of dana, ovo, gopay, shopeepay)"),
            )),
        }
    }
}

impl std::fmt::Display for EwalletType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
