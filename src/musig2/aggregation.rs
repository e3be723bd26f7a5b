//! BIP-327 key and nonce aggregation for two-party taproot key path spends
//!
//! Participant keys are sorted before aggregation, so every function here is
//! independent of the order in which the two keys are supplied.

use miniscript::bitcoin::hashes::hex::DisplayHex;
use miniscript::bitcoin::hashes::Hash;
use miniscript::bitcoin::key::TapTweak;
use miniscript::bitcoin::secp256k1::{Secp256k1, SecretKey, XOnlyPublicKey};
use miniscript::bitcoin::taproot::{self, TapNodeHash, TapTweakHash};
use miniscript::bitcoin::{CompressedPublicKey, TapSighash};
use musig2::secp::{Point, Scalar};
use musig2::{AggNonce, BinaryEncoding, KeyAggContext, PartialSignature, PubNonce, SecNonce};

use super::Musig2Error;

/// Sort public keys by their 33-byte compressed encoding
pub fn key_sort(pubkeys: &[CompressedPublicKey]) -> Vec<CompressedPublicKey> {
    let mut sorted = pubkeys.to_vec();
    sorted.sort_by_key(|k| k.to_bytes());
    sorted
}

pub(crate) fn to_point(pubkey: &CompressedPublicKey) -> Result<Point, Musig2Error> {
    Point::try_from(&pubkey.to_bytes()[..]).map_err(|e| Musig2Error::InvalidPublicKey(e.to_string()))
}

fn key_agg_context(pubkeys: &[CompressedPublicKey; 2]) -> Result<KeyAggContext, Musig2Error> {
    if pubkeys[0] == pubkeys[1] {
        return Err(Musig2Error::DuplicateParticipantKeys);
    }
    let points = key_sort(pubkeys)
        .iter()
        .map(to_point)
        .collect::<Result<Vec<_>, _>>()?;
    KeyAggContext::new(points).map_err(|e| {
        Musig2Error::SignatureAggregation(format!("Failed to create key agg context: {}", e))
    })
}

fn xonly_from_point(point: Point) -> Result<XOnlyPublicKey, Musig2Error> {
    XOnlyPublicKey::from_slice(&point.serialize_xonly())
        .map_err(|e| Musig2Error::InvalidPublicKey(e.to_string()))
}

/// Aggregate the two participant keys into the taproot internal key
pub fn create_tap_internal_key(
    pubkeys: &[CompressedPublicKey; 2],
) -> Result<XOnlyPublicKey, Musig2Error> {
    let key_agg_ctx = key_agg_context(pubkeys)?;
    xonly_from_point(key_agg_ctx.aggregated_pubkey())
}

/// Tweak the internal key with the script tree root (BIP-341)
pub fn create_tap_output_key(
    tap_internal_key: &XOnlyPublicKey,
    tap_merkle_root: &TapNodeHash,
) -> XOnlyPublicKey {
    let secp = Secp256k1::verification_only();
    let (output_key, _parity) = tap_internal_key.tap_tweak(&secp, Some(*tap_merkle_root));
    output_key.to_inner()
}

/// The TapTweak tagged hash of the internal key and script tree root
pub fn create_tap_tweak(tap_internal_key: &XOnlyPublicKey, tap_merkle_root: &TapNodeHash) -> [u8; 32] {
    TapTweakHash::from_key_and_tweak(*tap_internal_key, Some(*tap_merkle_root)).to_byte_array()
}

pub fn create_aggregate_nonce(pub_nonces: &[PubNonce; 2]) -> AggNonce {
    AggNonce::sum(pub_nonces)
}

/// A signing session bound to one message, one aggregate nonce and one tweak.
///
/// A session must not be reused across inputs: [`Musig2SigningSession::partial_sign`]
/// refuses to sign when the input sighash differs from the bound message.
pub struct Musig2SigningSession {
    key_agg_ctx: KeyAggContext,
    agg_nonce: AggNonce,
    message: [u8; 32],
}

impl Musig2SigningSession {
    pub fn new(
        agg_nonce: AggNonce,
        message: [u8; 32],
        pubkeys: &[CompressedPublicKey; 2],
        tweak: [u8; 32],
    ) -> Result<Self, Musig2Error> {
        let tweak = Scalar::try_from(&tweak[..]).map_err(|e| {
            Musig2Error::SignatureAggregation(format!("Invalid taproot tweak: {}", e))
        })?;
        let key_agg_ctx = key_agg_context(pubkeys)?
            .with_xonly_tweak(tweak)
            .map_err(|e| {
                Musig2Error::SignatureAggregation(format!("Failed to apply taproot tweak: {}", e))
            })?;
        Ok(Self {
            key_agg_ctx,
            agg_nonce,
            message,
        })
    }

    pub fn message(&self) -> [u8; 32] {
        self.message
    }

    pub fn agg_nonce(&self) -> &AggNonce {
        &self.agg_nonce
    }

    /// The tweaked aggregate key, i.e. the key the final signature verifies against
    pub fn aggregated_pubkey(&self) -> Result<XOnlyPublicKey, Musig2Error> {
        xonly_from_point(self.key_agg_ctx.aggregated_pubkey())
    }

    fn check_message(&self, sighash: &TapSighash) -> Result<(), Musig2Error> {
        let expected = sighash.to_byte_array();
        if expected != self.message {
            return Err(Musig2Error::SessionMessageMismatch {
                expected: expected.as_slice().to_lower_hex_string(),
                got: self.message.as_slice().to_lower_hex_string(),
            });
        }
        Ok(())
    }

    /// Produce this signer's partial signature. The secret nonce is consumed.
    pub fn partial_sign(
        &self,
        secret_key: &SecretKey,
        sec_nonce: SecNonce,
        sighash: &TapSighash,
    ) -> Result<PartialSignature, Musig2Error> {
        self.check_message(sighash)?;
        let secret_scalar = Scalar::try_from(&secret_key.secret_bytes()[..])
            .map_err(|e| Musig2Error::Signing(format!("Failed to parse secret key: {}", e)))?;
        musig2::sign_partial(
            &self.key_agg_ctx,
            secret_scalar,
            sec_nonce,
            &self.agg_nonce,
            self.message,
        )
        .map_err(|e| Musig2Error::Signing(e.to_string()))
    }

    /// Check a counterparty's partial signature before it is combined
    pub fn verify_partial_signature(
        &self,
        partial_sig: PartialSignature,
        signer: &CompressedPublicKey,
        signer_pub_nonce: &PubNonce,
    ) -> Result<(), Musig2Error> {
        musig2::verify_partial(
            &self.key_agg_ctx,
            partial_sig,
            &self.agg_nonce,
            to_point(signer)?,
            signer_pub_nonce,
            self.message,
        )
        .map_err(|e| {
            Musig2Error::InvalidPartialSignature(format!(
                "signature of {} does not verify: {}",
                signer.to_bytes().as_slice().to_lower_hex_string(),
                e
            ))
        })
    }

    /// Combine both partial signatures into a BIP-340 signature
    pub fn aggregate_partial_signatures(
        &self,
        partial_sigs: &[PartialSignature; 2],
    ) -> Result<taproot::Signature, Musig2Error> {
        let final_sig: musig2::LiftedSignature = musig2::aggregate_partial_signatures(
            &self.key_agg_ctx,
            &self.agg_nonce,
            partial_sigs.iter().copied(),
            self.message,
        )
        .map_err(|e| {
            Musig2Error::SignatureAggregation(format!("Signature aggregation failed: {}", e))
        })?;

        let sig_bytes: [u8; 64] = final_sig.to_bytes();
        taproot::Signature::from_slice(&sig_bytes)
            .map_err(|e| Musig2Error::SignatureAggregation(format!("Invalid signature: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{compressed_pubkey, secret_key, test_merkle_root};
    use miniscript::bitcoin::secp256k1::Message;

    #[test]
    fn test_tap_internal_key_is_order_independent() {
        let a = compressed_pubkey(1);
        let b = compressed_pubkey(2);
        assert_eq!(
            create_tap_internal_key(&[a, b]).unwrap(),
            create_tap_internal_key(&[b, a]).unwrap()
        );
    }

    #[test]
    fn test_tap_internal_key_rejects_equal_keys() {
        let a = compressed_pubkey(1);
        assert_eq!(
            create_tap_internal_key(&[a, a]),
            Err(Musig2Error::DuplicateParticipantKeys)
        );
    }

    #[test]
    fn test_tap_output_key_matches_musig2_taproot_tweak() {
        let keys = [compressed_pubkey(3), compressed_pubkey(4)];
        let internal = create_tap_internal_key(&keys).unwrap();
        let root = test_merkle_root();

        let output = create_tap_output_key(&internal, &root);
        assert_eq!(output, create_tap_output_key(&internal, &root));

        let points: Vec<Point> = key_sort(&keys).iter().map(|k| to_point(k).unwrap()).collect();
        let ctx = KeyAggContext::new(points)
            .unwrap()
            .with_taproot_tweak(&root.to_byte_array())
            .unwrap();
        let expected: Point = ctx.aggregated_pubkey();
        assert_eq!(output.serialize(), expected.serialize_xonly());
    }

    #[test]
    fn test_aggregate_nonce_is_order_independent() {
        let n1 = SecNonce::generate([1u8; 32], Scalar::one(), Point::generator(), [0u8; 32], b"")
            .public_nonce();
        let n2 = SecNonce::generate([2u8; 32], Scalar::one(), Point::generator(), [0u8; 32], b"")
            .public_nonce();
        assert_eq!(
            create_aggregate_nonce(&[n1.clone(), n2.clone()]),
            create_aggregate_nonce(&[n2, n1])
        );
    }

    fn two_party_session(
        message: [u8; 32],
    ) -> ([SecretKey; 2], [SecNonce; 2], [CompressedPublicKey; 2], Musig2SigningSession) {
        let keys = [secret_key(5), secret_key(6)];
        let pubkeys = [compressed_pubkey(5), compressed_pubkey(6)];
        let internal = create_tap_internal_key(&pubkeys).unwrap();
        let root = test_merkle_root();
        let output = create_tap_output_key(&internal, &root);
        let mut agg_pk = vec![0x02];
        agg_pk.extend_from_slice(&output.serialize());
        let agg_pk = Point::try_from(agg_pk.as_slice()).unwrap();

        let sec_nonces = [0usize, 1].map(|i| {
            let scalar = Scalar::try_from(&keys[i].secret_bytes()[..]).unwrap();
            SecNonce::generate([i as u8; 32], scalar, agg_pk, message, pubkeys[i].to_bytes())
        });
        let agg_nonce = create_aggregate_nonce(&[
            sec_nonces[0].public_nonce(),
            sec_nonces[1].public_nonce(),
        ]);
        let session = Musig2SigningSession::new(
            agg_nonce,
            message,
            &pubkeys,
            create_tap_tweak(&internal, &root),
        )
        .unwrap();
        assert_eq!(session.aggregated_pubkey().unwrap(), output);
        (keys, sec_nonces, pubkeys, session)
    }

    #[test]
    fn test_two_party_session_produces_valid_schnorr_signature() {
        let message = [7u8; 32];
        let sighash = TapSighash::from_byte_array(message);
        let (keys, [nonce_a, nonce_b], pubkeys, session) = two_party_session(message);
        let pub_nonce_a = nonce_a.public_nonce();

        let sig_a = session.partial_sign(&keys[0], nonce_a, &sighash).unwrap();
        let sig_b = session.partial_sign(&keys[1], nonce_b, &sighash).unwrap();
        session
            .verify_partial_signature(sig_a, &pubkeys[0], &pub_nonce_a)
            .unwrap();

        let signature = session.aggregate_partial_signatures(&[sig_a, sig_b]).unwrap();
        let secp = Secp256k1::verification_only();
        secp.verify_schnorr(
            &signature.signature,
            &Message::from_digest(message),
            &session.aggregated_pubkey().unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_partial_sign_rejects_foreign_message() {
        let (keys, [nonce_a, _], _, session) = two_party_session([7u8; 32]);
        let other = TapSighash::from_byte_array([8u8; 32]);
        let err = session.partial_sign(&keys[0], nonce_a, &other).unwrap_err();
        assert!(matches!(err, Musig2Error::SessionMessageMismatch { .. }));
    }
}
