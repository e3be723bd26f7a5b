//! Second round of the MuSig2 protocol and signature combination

use log::debug;
use miniscript::bitcoin::hashes::Hash;
use miniscript::bitcoin::psbt::Psbt;
use miniscript::bitcoin::secp256k1::{Secp256k1, Verification};
use miniscript::bitcoin::TapSighash;
use miniscript::psbt::PsbtExt;
use musig2::SecNonce;

use super::aggregation::{create_aggregate_nonce, create_tap_tweak, Musig2SigningSession};
use super::derive::{derive_signer_key, HierarchicalKey};
use super::keyvals::{pubkey_hex, Musig2Input, Musig2PartialSig};
use super::nonces::Musig2SecretNonces;
use super::propkv::is_musig2_key;
use super::sighash::{check_input_index, taproot_key_spend_sighash};
use super::Musig2Error;

/// Validate the input at `input_index` and open a signing session over its sighash.
///
/// Requires both public nonces. The session's tweaked aggregate key is checked
/// against the stored tap output key.
pub fn create_musig2_signing_session(
    psbt: &Psbt,
    input_index: usize,
) -> Result<(Musig2Input, Musig2SigningSession, TapSighash), Musig2Error> {
    check_input_index(psbt, input_index)?;
    let input = &psbt.inputs[input_index];
    let musig2_input = Musig2Input::from_input_validated(input, input_index)?;
    let tap_merkle_root = input
        .tap_merkle_root
        .ok_or(Musig2Error::MissingTapMerkleRoot { input_index })?;

    let [nonce_a, nonce_b] = musig2_input.nonces.as_slice() else {
        return Err(Musig2Error::MissingNonces {
            got: musig2_input.nonces.len(),
        });
    };
    let agg_nonce = create_aggregate_nonce(&[nonce_a.pub_nonce.clone(), nonce_b.pub_nonce.clone()]);

    let participants = &musig2_input.participants;
    let sighash = taproot_key_spend_sighash(psbt, input_index)?;
    let session = Musig2SigningSession::new(
        agg_nonce,
        sighash.to_byte_array(),
        &participants.participant_pub_keys,
        create_tap_tweak(&participants.tap_internal_key, &tap_merkle_root),
    )?;

    let session_key = session.aggregated_pubkey()?;
    if session_key != participants.tap_output_key {
        return Err(Musig2Error::TapOutputKeyMismatch {
            expected: participants.tap_output_key.to_string(),
            got: session_key.to_string(),
        });
    }
    Ok((musig2_input, session, sighash))
}

/// Add this signer's partial signature to one input. `sec_nonce` is consumed.
pub fn sign_musig2_input<K: HierarchicalKey>(
    psbt: &mut Psbt,
    input_index: usize,
    root_key: &K,
    sec_nonce: SecNonce,
) -> Result<(), Musig2Error> {
    let (musig2_input, session, sighash) = create_musig2_signing_session(psbt, input_index)?;
    let participants = &musig2_input.participants;

    let signer = derive_signer_key(&psbt.inputs[input_index].tap_key_origins, root_key)?;
    let participant_pub_key = signer.public_key();
    let own_nonce = musig2_input
        .nonce_for(&participant_pub_key)
        .ok_or_else(|| Musig2Error::ParticipantKeyNotFound(pubkey_hex(&participant_pub_key)))?;
    if own_nonce.pub_nonce != sec_nonce.public_nonce() {
        return Err(Musig2Error::Signing(format!(
            "secret nonce does not match the public nonce of {} on input {}",
            pubkey_hex(&participant_pub_key),
            input_index
        )));
    }
    if musig2_input
        .partial_sigs
        .iter()
        .any(|s| s.participant_pub_key == participant_pub_key)
    {
        return Err(Musig2Error::DuplicatePartialSig(pubkey_hex(
            &participant_pub_key,
        )));
    }

    let secret_key = signer.private_key().ok_or(Musig2Error::MissingPrivateKey)?;
    let partial_sig = session.partial_sign(&secret_key, sec_nonce, &sighash)?;

    let record = Musig2PartialSig::new(
        participant_pub_key,
        participants.tap_output_key,
        partial_sig,
    );
    let (key, value) = record.to_key_value().to_key_value();
    psbt.inputs[input_index].proprietary.insert(key, value);
    debug!(
        "input {}: added MuSig2 partial signature for {}",
        input_index,
        pubkey_hex(&participant_pub_key)
    );
    Ok(())
}

/// Sign every input that has a secret nonce. The PSBT is only updated if all inputs sign.
pub fn sign_musig2_inputs<K: HierarchicalKey>(
    psbt: &mut Psbt,
    root_key: &K,
    sec_nonces: Musig2SecretNonces,
) -> Result<(), Musig2Error> {
    let mut staged = psbt.clone();
    for (input_index, sec_nonce) in sec_nonces {
        sign_musig2_input(&mut staged, input_index, root_key, sec_nonce)?;
    }
    *psbt = staged;
    Ok(())
}

/// Combine both partial signatures of an input into `tap_key_sig` and finalize it.
///
/// The MuSig2 proprietary records are removed; after aggregation the input is an
/// ordinary single-key taproot key path spend. On error the PSBT is unchanged.
pub fn finalize_musig2_input<C: Verification>(
    psbt: &mut Psbt,
    secp: &Secp256k1<C>,
    input_index: usize,
) -> Result<(), Musig2Error> {
    let (musig2_input, session, _) = create_musig2_signing_session(psbt, input_index)?;

    let [sig_a, sig_b] = musig2_input.partial_sigs.as_slice() else {
        return Err(Musig2Error::MissingPartialSignatures {
            got: musig2_input.partial_sigs.len(),
        });
    };

    let mut partial_sigs = Vec::with_capacity(2);
    for sig in [sig_a, sig_b] {
        let nonce = musig2_input
            .nonce_for(&sig.participant_pub_key)
            .ok_or_else(|| Musig2Error::UnknownParticipant(pubkey_hex(&sig.participant_pub_key)))?;
        let partial_sig = sig.normalized_signature()?;
        session.verify_partial_signature(partial_sig, &sig.participant_pub_key, &nonce.pub_nonce)?;
        partial_sigs.push(partial_sig);
    }
    let signature = session.aggregate_partial_signatures(&[partial_sigs[0], partial_sigs[1]])?;

    let mut finalized = psbt.clone();
    let input = &mut finalized.inputs[input_index];
    input.tap_key_sig = Some(signature);
    input.proprietary.retain(|key, _| !is_musig2_key(key));

    finalized.finalize_inp_mut(secp, input_index).map_err(|e| {
        Musig2Error::SignatureAggregation(format!("Finalization failed: {}", e))
    })?;
    *psbt = finalized;
    debug!("input {}: finalized MuSig2 key path spend", input_index);
    Ok(())
}
