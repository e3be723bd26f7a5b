//! WASM bindings for inscription functionality

use crate::error::WasmUtxoError;
use crate::inscriptions::{
    create_inscription_reveal_data as create_reveal_data_impl, find_output_layout,
    sign_reveal_transaction as sign_reveal_impl, Dimensions, FeeModel, InputScriptType,
    InscriptionInput, LayoutConstraints, TapLeafScript,
};
use miniscript::bitcoin::consensus::{deserialize, serialize};
use miniscript::bitcoin::secp256k1::{SecretKey, XOnlyPublicKey};
use miniscript::bitcoin::Transaction;
use wasm_bindgen::prelude::*;

use super::try_from_js_value::TryFromJsValue;
use super::try_into_js_value::TryIntoJsValue;

/// Namespace for inscription-related functions
#[wasm_bindgen]
pub struct InscriptionsNamespace;

#[wasm_bindgen]
impl InscriptionsNamespace {
    /// Create inscription reveal data including the commit output script and tap leaf script
    ///
    /// # Arguments
    /// * `x_only_pubkey` - The x-only public key (32 bytes)
    /// * `content_type` - MIME type of the inscription (e.g., "text/plain", "image/png")
    /// * `inscription_data` - The inscription data bytes
    ///
    /// # Returns
    /// An object containing:
    /// - `outputScript`: The commit output script (P2TR, network-agnostic)
    /// - `revealTransactionVSize`: Estimated vsize of the reveal transaction
    /// - `tapLeafScript`: Object with `leafVersion`, `script`, and `controlBlock`
    pub fn create_inscription_reveal_data(
        x_only_pubkey: &[u8],
        content_type: &str,
        inscription_data: &[u8],
    ) -> Result<JsValue, WasmUtxoError> {
        if x_only_pubkey.len() != 32 {
            return Err(WasmUtxoError::new(&format!(
                "x_only_pubkey must be 32 bytes, got {}",
                x_only_pubkey.len()
            )));
        }
        let pubkey = XOnlyPublicKey::from_slice(x_only_pubkey)
            .map_err(|e| WasmUtxoError::new(&format!("Invalid x-only public key: {}", e)))?;

        create_reveal_data_impl(&pubkey, content_type, inscription_data)?.try_to_js_value()
    }

    /// Sign a reveal transaction
    ///
    /// # Arguments
    /// * `private_key` - The private key (32 bytes)
    /// * `tap_leaf_script` - The tap leaf script object from `create_inscription_reveal_data`
    /// * `commit_tx` - The serialized commit transaction
    /// * `commit_output_script` - The commit output script (P2TR)
    /// * `recipient_output_script` - Where to send the inscription (output script)
    /// * `output_value_sats` - Value in satoshis for the inscription output
    ///
    /// # Returns
    /// The signed reveal transaction as bytes
    pub fn sign_reveal_transaction(
        private_key: &[u8],
        tap_leaf_script: JsValue,
        commit_tx: &[u8],
        commit_output_script: &[u8],
        recipient_output_script: &[u8],
        output_value_sats: u64,
    ) -> Result<Vec<u8>, WasmUtxoError> {
        if private_key.len() != 32 {
            return Err(WasmUtxoError::new(&format!(
                "private_key must be 32 bytes, got {}",
                private_key.len()
            )));
        }
        let secret_key = SecretKey::from_slice(private_key)
            .map_err(|e| WasmUtxoError::new(&format!("Invalid private key: {}", e)))?;
        let tap_leaf = TapLeafScript::try_from_js_value(&tap_leaf_script)?;
        let commit_tx: Transaction = deserialize(commit_tx)
            .map_err(|e| WasmUtxoError::new(&format!("Invalid commit transaction: {}", e)))?;

        let reveal_tx = sign_reveal_impl(
            &secret_key,
            &tap_leaf,
            &commit_tx,
            commit_output_script,
            recipient_output_script,
            output_value_sats,
        )?;
        Ok(serialize(&reveal_tx))
    }

    /// Find the output layout of a transaction that passes on an inscription
    ///
    /// # Arguments
    /// * `input_value` - Total value of the inputs
    /// * `sat_offset` - Position of the inscribed sat within the inputs
    /// * `input_script_types` - Script type of each input, e.g. "p2sh", "p2trMusig2KeyPath"
    /// * `inscription_recipient_script_length` - Length of the recipient output script
    /// * `change_script_length` - Length of the change output scripts
    /// * `fee_rate_sat_kb` - Fee rate in satoshis per 1000 vbytes
    /// * `constraints` - Optional `{ minChangeOutput, minInscriptionOutput, maxInscriptionOutput }`
    ///
    /// # Returns
    /// `{ firstChangeOutput, inscriptionOutput, secondChangeOutput, feeOutput, padding }`
    /// with bigint amounts
    pub fn find_output_layout(
        input_value: u64,
        sat_offset: u64,
        input_script_types: Vec<String>,
        inscription_recipient_script_length: usize,
        change_script_length: usize,
        fee_rate_sat_kb: u64,
        constraints: JsValue,
    ) -> Result<JsValue, WasmUtxoError> {
        let inputs = input_script_types
            .iter()
            .map(|name| name.parse::<InputScriptType>())
            .try_fold(Dimensions::empty(), |d, script_type| {
                Ok::<_, WasmUtxoError>(d.plus(&Dimensions::from_input(script_type?)))
            })?;
        let fees = FeeModel::from_dimensions(
            &inputs,
            &Dimensions::from_output_script_length(inscription_recipient_script_length),
            &Dimensions::from_output_script_length(change_script_length),
            fee_rate_sat_kb,
        );
        let constraints =
            Option::<LayoutConstraints>::try_from_js_value(&constraints)?.unwrap_or_default();

        let layout = find_output_layout(
            InscriptionInput {
                value: input_value,
                offset: sat_offset,
            },
            &constraints,
            &fees,
        )?;
        layout.try_to_js_value()
    }

    /// Whether `s` has the form `<txid>:<vout>:<offset>`
    pub fn is_sat_point(s: &str) -> bool {
        crate::inscriptions::is_sat_point(s)
    }
}
