//! First round of the MuSig2 protocol: public nonces for every key path input
//!
//! Each co-signer runs [`set_musig2_nonces`] on its own copy of the PSBT, keeps the
//! returned secret nonces and ships the PSBT to the counterparty. The copies are
//! merged with `Psbt::combine`.

use std::collections::BTreeMap;

use log::{debug, warn};
use miniscript::bitcoin::hashes::Hash;
use miniscript::bitcoin::psbt::Psbt;
use miniscript::bitcoin::secp256k1::{SecretKey, XOnlyPublicKey};
use miniscript::bitcoin::{CompressedPublicKey, TapSighash};
use musig2::secp::{Point, Scalar};
use musig2::SecNonce;

use super::derive::{derive_signer_key, HierarchicalKey};
use super::keyvals::{
    parse_musig2_nonces, parse_musig2_participants, pubkey_hex, validate_nonces,
    validate_participants, Musig2PubNonce,
};
use super::sighash::taproot_key_spend_sighash;
use super::Musig2Error;

/// Secret nonces by input index. Each one may be used for exactly one signature.
pub type Musig2SecretNonces = BTreeMap<usize, SecNonce>;

const SESSION_ID_LEN: usize = 32;

fn check_session_id(session_id: Option<&[u8]>) -> Result<Option<[u8; 32]>, Musig2Error> {
    session_id
        .map(|id| {
            <[u8; SESSION_ID_LEN]>::try_from(id)
                .map_err(|_| Musig2Error::InvalidSessionIdLength(id.len()))
        })
        .transpose()
}

fn random_session_id() -> Result<[u8; 32], Musig2Error> {
    let mut seed = [0u8; SESSION_ID_LEN];
    getrandom::getrandom(&mut seed).map_err(|e| Musig2Error::Entropy(e.to_string()))?;
    Ok(seed)
}

/// Generate a nonce pair bound to the signer key, the output key and the sighash
pub fn generate_nonce(
    session_id: [u8; 32],
    secret_key: &SecretKey,
    tap_output_key: &XOnlyPublicKey,
    sighash: &TapSighash,
    participant_pub_key: &CompressedPublicKey,
) -> Result<SecNonce, Musig2Error> {
    let mut tap_output_key_bytes = vec![0x02];
    tap_output_key_bytes.extend_from_slice(&tap_output_key.serialize());
    let agg_pk = Point::try_from(tap_output_key_bytes.as_slice())
        .map_err(|e| Musig2Error::InvalidPublicKey(e.to_string()))?;
    let secret_scalar = Scalar::try_from(&secret_key.secret_bytes()[..])
        .map_err(|e| Musig2Error::Signing(format!("Failed to parse secret key: {}", e)))?;

    Ok(SecNonce::generate(
        session_id,
        secret_scalar,
        agg_pk,
        sighash.to_byte_array(),
        participant_pub_key.to_bytes(),
    ))
}

/// Build the nonce record for one input without touching the PSBT.
///
/// Returns `Ok(None)` for inputs that are not taproot key path inputs (no
/// `tap_internal_key`).
pub fn create_musig2_nonce<K: HierarchicalKey>(
    psbt: &Psbt,
    input_index: usize,
    root_key: &K,
    session_id: [u8; 32],
) -> Result<Option<(Musig2PubNonce, SecNonce)>, Musig2Error> {
    let input = psbt
        .inputs
        .get(input_index)
        .ok_or(Musig2Error::InputIndexOutOfBounds {
            input_index,
            input_count: psbt.inputs.len(),
        })?;

    let Some(tap_internal_key) = input.tap_internal_key else {
        debug!("input {}: no tapInternalKey, skipping", input_index);
        return Ok(None);
    };
    let tap_merkle_root = input
        .tap_merkle_root
        .ok_or(Musig2Error::MissingTapMerkleRoot { input_index })?;
    if input.tap_key_origins.is_empty() {
        return Err(Musig2Error::MissingTapKeyOrigins { input_index });
    }

    let participants = parse_musig2_participants(input)?.ok_or(Musig2Error::MissingParticipants)?;
    validate_participants(&participants, &tap_internal_key, &tap_merkle_root)?;

    let signer = derive_signer_key(&input.tap_key_origins, root_key)?;
    let participant_pub_key = signer.public_key();
    if !participants.contains(&participant_pub_key) {
        return Err(Musig2Error::ParticipantKeyNotFound(pubkey_hex(
            &participant_pub_key,
        )));
    }

    let existing = parse_musig2_nonces(input)?;
    validate_nonces(&existing, &participants)?;
    if existing
        .iter()
        .any(|n| n.participant_pub_key == participant_pub_key)
    {
        return Err(Musig2Error::DuplicateNonce(pubkey_hex(&participant_pub_key)));
    }

    let sighash = taproot_key_spend_sighash(psbt, input_index)?;
    let secret_key = signer.private_key().ok_or(Musig2Error::MissingPrivateKey)?;
    let sec_nonce = generate_nonce(
        session_id,
        &secret_key,
        &participants.tap_output_key,
        &sighash,
        &participant_pub_key,
    )?;

    let record = Musig2PubNonce {
        participant_pub_key,
        tap_output_key: participants.tap_output_key,
        pub_nonce: sec_nonce.public_nonce(),
    };
    Ok(Some((record, sec_nonce)))
}

/// Add this signer's public nonce to every taproot key path input.
///
/// `session_id` must be 32 bytes when given; without one, each input gets a fresh
/// random seed. No input is modified unless every input succeeds.
pub fn set_musig2_nonces<K: HierarchicalKey>(
    psbt: &mut Psbt,
    root_key: &K,
    session_id: Option<&[u8]>,
) -> Result<Musig2SecretNonces, Musig2Error> {
    if root_key.private_key().is_none() {
        return Err(Musig2Error::MissingPrivateKey);
    }
    let session_id = check_session_id(session_id)?;

    let mut records = Vec::new();
    for input_index in 0..psbt.inputs.len() {
        let seed = match session_id {
            Some(id) => id,
            None => random_session_id()?,
        };
        let created = create_musig2_nonce(psbt, input_index, root_key, seed).map_err(|e| {
            warn!("input {}: cannot create MuSig2 nonce: {}", input_index, e);
            e
        })?;
        if let Some((record, sec_nonce)) = created {
            records.push((input_index, record, sec_nonce));
        }
    }

    let mut sec_nonces = Musig2SecretNonces::new();
    for (input_index, record, sec_nonce) in records {
        let (key, value) = record.to_key_value().to_key_value();
        psbt.inputs[input_index].proprietary.insert(key, value);
        debug!(
            "input {}: added MuSig2 nonce for {}",
            input_index,
            pubkey_hex(&record.participant_pub_key)
        );
        sec_nonces.insert(input_index, sec_nonce);
    }
    Ok(sec_nonces)
}
