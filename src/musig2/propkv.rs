//! Proprietary key-value helpers for the BitGo PSBT namespace
//!
//! A PSBT input carries an ordered map of proprietary key-values. MuSig2 data lives
//! under the `BITGO` identifier and is told apart by subtype.

use std::collections::BTreeMap;

use miniscript::bitcoin::hashes::hex::DisplayHex;
pub use miniscript::bitcoin::psbt::raw::ProprietaryKey;

use super::Musig2Error;

/// BitGo proprietary key identifier
pub const BITGO: &[u8] = b"BITGO";

/// Subtypes of the BitGo namespace that carry MuSig2 data
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ProprietaryKeySubtype {
    Musig2ParticipantPubKeys = 0x01,
    Musig2PubNonce = 0x02,
    Musig2PartialSig = 0x03,
}

impl ProprietaryKeySubtype {
    pub fn from(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(ProprietaryKeySubtype::Musig2ParticipantPubKeys),
            0x02 => Some(ProprietaryKeySubtype::Musig2PubNonce),
            0x03 => Some(ProprietaryKeySubtype::Musig2PartialSig),
            _ => None,
        }
    }
}

/// A key-value in the BitGo namespace with the identifier stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitGoKeyValue {
    pub subtype: ProprietaryKeySubtype,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl BitGoKeyValue {
    pub fn new(subtype: ProprietaryKeySubtype, key: Vec<u8>, value: Vec<u8>) -> Self {
        Self {
            subtype,
            key,
            value,
        }
    }

    pub fn from_key_value(key: &ProprietaryKey, value: &[u8]) -> Result<Self, Musig2Error> {
        if !is_bitgo_key(key) {
            return Err(Musig2Error::InvalidIdentifier {
                got: key.prefix.as_slice().to_lower_hex_string(),
            });
        }
        let subtype = ProprietaryKeySubtype::from(key.subtype)
            .ok_or(Musig2Error::UnsupportedSubtype(key.subtype))?;
        Ok(Self::new(subtype, key.key.clone(), value.to_owned()))
    }

    pub fn to_key_value(&self) -> (ProprietaryKey, Vec<u8>) {
        let key = ProprietaryKey {
            prefix: BITGO.to_vec(),
            subtype: self.subtype as u8,
            key: self.key.clone(),
        };
        (key, self.value.clone())
    }

    /// Fail unless this key-value has the expected subtype
    pub(crate) fn expect_subtype(&self, expected: ProprietaryKeySubtype) -> Result<(), Musig2Error> {
        if self.subtype != expected {
            return Err(Musig2Error::InvalidSubtype {
                expected: expected as u8,
                got: self.subtype as u8,
            });
        }
        Ok(())
    }
}

/// Iterate over the BitGo key-values of one subtype, in map order
pub fn find_kv<'a>(
    subtype: ProprietaryKeySubtype,
    map: &'a BTreeMap<ProprietaryKey, Vec<u8>>,
) -> impl Iterator<Item = BitGoKeyValue> + 'a {
    map.iter()
        .filter(move |(k, _)| is_bitgo_key(k) && k.subtype == subtype as u8)
        .map(move |(k, v)| BitGoKeyValue::new(subtype, k.key.clone(), v.clone()))
}

/// Check if a proprietary key is a BitGo key
pub fn is_bitgo_key(key: &ProprietaryKey) -> bool {
    key.prefix.as_slice() == BITGO
}

/// Check if a proprietary key is a BitGo MuSig2 key
pub fn is_musig2_key(key: &ProprietaryKey) -> bool {
    is_bitgo_key(key) && ProprietaryKeySubtype::from(key.subtype).is_some()
}
