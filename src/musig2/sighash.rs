use miniscript::bitcoin::psbt::Psbt;
use miniscript::bitcoin::sighash::{Prevouts, SighashCache, TapSighashType};
use miniscript::bitcoin::{TapSighash, TxOut};

use super::Musig2Error;

/// Collect all prevouts (funding outputs) from PSBT inputs
///
/// Taproot sighashes commit to every spent output, so each input needs
/// either a witness_utxo or a non_witness_utxo.
pub(crate) fn collect_prevouts(psbt: &Psbt) -> Result<Vec<TxOut>, Musig2Error> {
    let tx = &psbt.unsigned_tx;
    psbt.inputs
        .iter()
        .zip(tx.input.iter())
        .enumerate()
        .map(|(input_index, (input, txin))| {
            if let Some(witness_utxo) = &input.witness_utxo {
                return Ok(witness_utxo.clone());
            }
            input
                .non_witness_utxo
                .as_ref()
                .and_then(|prev_tx| prev_tx.output.get(txin.previous_output.vout as usize))
                .cloned()
                .ok_or(Musig2Error::MissingUtxo { input_index })
        })
        .collect()
}

pub(crate) fn check_input_index(psbt: &Psbt, input_index: usize) -> Result<(), Musig2Error> {
    if input_index >= psbt.inputs.len() {
        return Err(Musig2Error::InputIndexOutOfBounds {
            input_index,
            input_count: psbt.inputs.len(),
        });
    }
    Ok(())
}

/// The taproot key path sighash of one input. Only `SIGHASH_DEFAULT` is supported.
pub fn taproot_key_spend_sighash(psbt: &Psbt, input_index: usize) -> Result<TapSighash, Musig2Error> {
    check_input_index(psbt, input_index)?;

    if let Some(sighash_type) = psbt.inputs[input_index].sighash_type {
        let taproot_type = sighash_type
            .taproot_hash_ty()
            .map_err(|e| Musig2Error::UnsupportedSighashType(e.to_string()))?;
        if taproot_type != TapSighashType::Default {
            return Err(Musig2Error::UnsupportedSighashType(taproot_type.to_string()));
        }
    }

    let prevouts = collect_prevouts(psbt)?;
    SighashCache::new(&psbt.unsigned_tx)
        .taproot_key_spend_signature_hash(
            input_index,
            &Prevouts::All(&prevouts),
            TapSighashType::Default,
        )
        .map_err(|e| Musig2Error::Sighash(e.to_string()))
}
