//! Locate the signer's key for an input from its taproot BIP32 derivations

use std::collections::BTreeMap;

use miniscript::bitcoin::bip32::{DerivationPath, Fingerprint, KeySource, Xpriv, Xpub};
use miniscript::bitcoin::secp256k1::{Secp256k1, SecretKey, XOnlyPublicKey};
use miniscript::bitcoin::taproot::TapLeafHash;
use miniscript::bitcoin::CompressedPublicKey;

use super::Musig2Error;

pub type TapKeyOrigins = BTreeMap<XOnlyPublicKey, (Vec<TapLeafHash>, KeySource)>;

/// A BIP32 node that may or may not hold its private key
pub trait HierarchicalKey: Sized {
    fn fingerprint(&self) -> Fingerprint;
    fn public_key(&self) -> CompressedPublicKey;
    /// `None` for neutered keys
    fn private_key(&self) -> Option<SecretKey>;
    fn derive_path(&self, path: &DerivationPath) -> Result<Self, Musig2Error>;

    fn x_only_public_key(&self) -> XOnlyPublicKey {
        self.public_key().0.x_only_public_key().0
    }
}

impl HierarchicalKey for Xpriv {
    fn fingerprint(&self) -> Fingerprint {
        Xpriv::fingerprint(self, &Secp256k1::new())
    }

    fn public_key(&self) -> CompressedPublicKey {
        Xpub::from_priv(&Secp256k1::new(), self).to_pub()
    }

    fn private_key(&self) -> Option<SecretKey> {
        Some(self.private_key)
    }

    fn derive_path(&self, path: &DerivationPath) -> Result<Self, Musig2Error> {
        self.derive_priv(&Secp256k1::new(), path)
            .map_err(|e| Musig2Error::KeyDerivation(e.to_string()))
    }
}

impl HierarchicalKey for Xpub {
    fn fingerprint(&self) -> Fingerprint {
        Xpub::fingerprint(self)
    }

    fn public_key(&self) -> CompressedPublicKey {
        self.to_pub()
    }

    fn private_key(&self) -> Option<SecretKey> {
        None
    }

    fn derive_path(&self, path: &DerivationPath) -> Result<Self, Musig2Error> {
        self.derive_pub(&Secp256k1::new(), path)
            .map_err(|e| Musig2Error::KeyDerivation(e.to_string()))
    }
}

/// Derive the one key of `root_key` that an input's tap key origins refer to.
///
/// Origins are first filtered by master fingerprint, then by whether deriving the
/// origin path from `root_key` reproduces the origin's x-only key. Exactly one
/// origin has to survive both filters.
pub fn derive_signer_key<K: HierarchicalKey>(
    tap_key_origins: &TapKeyOrigins,
    root_key: &K,
) -> Result<K, Musig2Error> {
    let fingerprint = root_key.fingerprint();
    let candidates: Vec<_> = tap_key_origins
        .iter()
        .filter(|(_, (_, (origin_fingerprint, _)))| *origin_fingerprint == fingerprint)
        .collect();

    if candidates.is_empty() {
        return Err(Musig2Error::NoMatchingFingerprint {
            fingerprint: fingerprint.to_string(),
        });
    }

    let mut derived = Vec::with_capacity(1);
    for (x_only_key, (_, (_, path))) in candidates {
        let key = root_key.derive_path(path)?;
        if key.x_only_public_key() == *x_only_key {
            derived.push(key);
        }
    }

    if derived.len() > 1 {
        return Err(Musig2Error::AmbiguousDerivation {
            count: derived.len(),
        });
    }
    derived.pop().ok_or(Musig2Error::NoMatchingDerivation)
}
