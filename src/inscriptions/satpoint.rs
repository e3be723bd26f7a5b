//! Location of a single sat: `<txid>:<vout>:<offset>`

use std::fmt;
use std::str::FromStr;

use miniscript::bitcoin::{OutPoint, Txid};

use super::InscriptionError;

/// A sat identified by the output holding it and its offset within that output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "String", try_from = "String")
)]
pub struct SatPoint {
    pub outpoint: OutPoint,
    pub offset: u64,
}

impl SatPoint {
    pub fn new(outpoint: OutPoint, offset: u64) -> Self {
        SatPoint { outpoint, offset }
    }
}

impl fmt::Display for SatPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.outpoint.txid, self.outpoint.vout, self.offset
        )
    }
}

impl FromStr for SatPoint {
    type Err = InscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| InscriptionError::InvalidSatPoint(format!("{}: {}", s, reason));

        let mut parts = s.split(':');
        let (Some(txid), Some(vout), Some(offset), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected <txid>:<vout>:<offset>"));
        };

        let txid = Txid::from_str(txid).map_err(|e| invalid(&e.to_string()))?;
        let vout = vout.parse::<u32>().map_err(|e| invalid(&e.to_string()))?;
        let offset = offset.parse::<u64>().map_err(|e| invalid(&e.to_string()))?;
        Ok(SatPoint::new(OutPoint { txid, vout }, offset))
    }
}

impl From<SatPoint> for String {
    fn from(sat_point: SatPoint) -> Self {
        sat_point.to_string()
    }
}

impl TryFrom<String> for SatPoint {
    type Error = InscriptionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

pub fn is_sat_point(s: &str) -> bool {
    s.parse::<SatPoint>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TXID: &str = "6a3f1dd6cd8a3e4f0b1f5a5c2d0e7b9a8c7d6e5f4a3b2c1d0e9f8a7b6c5d4e3f";

    #[test]
    fn test_display_inverts_parse() {
        let s = format!("{}:1:2500", TXID);
        let sat_point: SatPoint = s.parse().unwrap();
        assert_eq!(sat_point.outpoint.vout, 1);
        assert_eq!(sat_point.offset, 2500);
        assert_eq!(sat_point.to_string(), s);
    }

    #[rstest::rstest]
    #[case::outpoint_only(format!("{}:0", TXID))]
    #[case::trailing_field(format!("{}:0:0:0", TXID))]
    #[case::short_txid("abcd:0:0".to_string())]
    #[case::negative_vout(format!("{}:-1:0", TXID))]
    #[case::offset_not_a_number(format!("{}:0:x", TXID))]
    #[case::empty(String::new())]
    fn test_rejects_malformed(#[case] s: String) {
        assert!(!is_sat_point(&s));
        assert!(matches!(
            s.parse::<SatPoint>(),
            Err(InscriptionError::InvalidSatPoint(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_uses_string_form() {
        let sat_point: SatPoint = format!("{}:3:7", TXID).parse().unwrap();
        let json = serde_json::to_string(&sat_point).unwrap();
        assert_eq!(json, format!("\"{}:3:7\"", TXID));
        assert_eq!(serde_json::from_str::<SatPoint>(&json).unwrap(), sat_point);
    }
}
