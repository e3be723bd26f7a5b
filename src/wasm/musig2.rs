//! WASM bindings for MuSig2 co-signing of taproot key path inputs
//!
//! The secret nonces never leave the wasm instance: [`Musig2Psbt::set_nonces`]
//! keeps them next to the PSBT and [`Musig2Psbt::sign`] consumes them.

use std::str::FromStr;

use crate::error::WasmUtxoError;
use crate::musig2::{
    create_tap_internal_key as create_tap_internal_key_impl,
    create_tap_output_key as create_tap_output_key_impl, finalize_musig2_input,
    set_musig2_nonces, sign_musig2_inputs, Musig2SecretNonces,
};
use miniscript::bitcoin::bip32::Xpriv;
use miniscript::bitcoin::hashes::Hash;
use miniscript::bitcoin::psbt::Psbt;
use miniscript::bitcoin::secp256k1::{Secp256k1, XOnlyPublicKey};
use miniscript::bitcoin::taproot::TapNodeHash;
use miniscript::bitcoin::CompressedPublicKey;
use wasm_bindgen::prelude::*;

fn parse_xpriv(xpriv: &str) -> Result<Xpriv, WasmUtxoError> {
    Xpriv::from_str(xpriv).map_err(|e| WasmUtxoError::new(&format!("Invalid xprv: {}", e)))
}

fn parse_compressed_pubkey(bytes: &[u8]) -> Result<CompressedPublicKey, WasmUtxoError> {
    CompressedPublicKey::from_slice(bytes)
        .map_err(|e| WasmUtxoError::new(&format!("Invalid public key: {}", e)))
}

/// Namespace for stateless MuSig2 key helpers
#[wasm_bindgen]
pub struct Musig2Namespace;

#[wasm_bindgen]
impl Musig2Namespace {
    /// Aggregate two compressed participant keys (33 bytes each) into the x-only
    /// taproot internal key. The argument order does not matter.
    pub fn create_tap_internal_key(
        pubkey_a: &[u8],
        pubkey_b: &[u8],
    ) -> Result<Vec<u8>, WasmUtxoError> {
        let pubkeys = [
            parse_compressed_pubkey(pubkey_a)?,
            parse_compressed_pubkey(pubkey_b)?,
        ];
        Ok(create_tap_internal_key_impl(&pubkeys)?.serialize().to_vec())
    }

    /// Tweak an x-only internal key with a 32 byte script tree root
    pub fn create_tap_output_key(
        tap_internal_key: &[u8],
        tap_merkle_root: &[u8],
    ) -> Result<Vec<u8>, WasmUtxoError> {
        let internal_key = XOnlyPublicKey::from_slice(tap_internal_key)
            .map_err(|e| WasmUtxoError::new(&format!("Invalid x-only public key: {}", e)))?;
        let merkle_root = TapNodeHash::from_slice(tap_merkle_root)
            .map_err(|e| WasmUtxoError::new(&format!("Invalid merkle root: {}", e)))?;
        Ok(create_tap_output_key_impl(&internal_key, &merkle_root)
            .serialize()
            .to_vec())
    }
}

/// A PSBT held by one co-signer together with its unused secret nonces
#[wasm_bindgen]
pub struct Musig2Psbt {
    psbt: Psbt,
    sec_nonces: Musig2SecretNonces,
}

#[wasm_bindgen]
impl Musig2Psbt {
    pub fn from_bytes(bytes: &[u8]) -> Result<Musig2Psbt, WasmUtxoError> {
        let psbt = Psbt::deserialize(bytes)
            .map_err(|e| WasmUtxoError::new(&format!("Failed to deserialize PSBT: {}", e)))?;
        Ok(Musig2Psbt {
            psbt,
            sec_nonces: Musig2SecretNonces::new(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.psbt.serialize()
    }

    /// Merge the counterparty's copy of the PSBT into this one
    pub fn combine(&mut self, other: &[u8]) -> Result<(), WasmUtxoError> {
        let other = Psbt::deserialize(other)
            .map_err(|e| WasmUtxoError::new(&format!("Failed to deserialize PSBT: {}", e)))?;
        self.psbt
            .combine(other)
            .map_err(|e| WasmUtxoError::new(&format!("Failed to combine PSBTs: {}", e)))
    }

    /// Add the public nonces of `xpriv` to all taproot key path inputs
    ///
    /// # Arguments
    /// * `xpriv` - The signer's root key (base58)
    /// * `session_id` - Optional 32 byte seed; random per input when omitted
    pub fn set_nonces(
        &mut self,
        xpriv: &str,
        session_id: Option<Vec<u8>>,
    ) -> Result<(), WasmUtxoError> {
        if !self.sec_nonces.is_empty() {
            return Err(WasmUtxoError::new(
                "Nonces already set; sign before creating new ones",
            ));
        }
        let root_key = parse_xpriv(xpriv)?;
        self.sec_nonces = set_musig2_nonces(&mut self.psbt, &root_key, session_id.as_deref())?;
        Ok(())
    }

    /// Add partial signatures for every input with a stored secret nonce.
    ///
    /// The stored nonces are consumed even if signing fails.
    pub fn sign(&mut self, xpriv: &str) -> Result<(), WasmUtxoError> {
        let root_key = parse_xpriv(xpriv)?;
        let sec_nonces = std::mem::take(&mut self.sec_nonces);
        if sec_nonces.is_empty() {
            return Err(WasmUtxoError::new("No secret nonces; call set_nonces first"));
        }
        sign_musig2_inputs(&mut self.psbt, &root_key, sec_nonces)?;
        Ok(())
    }

    /// Aggregate both partial signatures of an input and finalize it
    pub fn finalize_input(&mut self, input_index: usize) -> Result<(), WasmUtxoError> {
        finalize_musig2_input(&mut self.psbt, &Secp256k1::verification_only(), input_index)?;
        Ok(())
    }
}
