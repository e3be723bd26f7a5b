//! Inscription passing transactions as unsigned PSBTs

use log::debug;
use miniscript::bitcoin::psbt::Psbt;
use miniscript::bitcoin::{
    absolute, transaction, Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut,
    Witness,
};

use super::dimensions::{Dimensions, InputScriptType};
use super::layout::{
    checked_sum, find_output_layout, FeeModel, InscriptionInput, LayoutConstraints, OutputLayout,
};
use super::satpoint::SatPoint;
use super::InscriptionError;

/// A wallet output to spend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unspent {
    pub outpoint: OutPoint,
    pub value: u64,
    pub script_pubkey: ScriptBuf,
    pub script_type: InputScriptType,
    /// Full previous transaction, required by signers of non-segwit inputs
    pub prev_tx: Option<Transaction>,
}

/// Destinations of an inscription passing transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InscriptionOutputs {
    /// Receive the front and the back padding respectively
    pub change_outputs: [ScriptBuf; 2],
    pub inscription_recipient: ScriptBuf,
}

fn unspent_total(unspents: &[Unspent]) -> Result<u64, InscriptionError> {
    let values: Vec<u64> = unspents.iter().map(|u| u.value).collect();
    checked_sum(&values, "unspent values")
}

/// Build an unsigned PSBT that spends `unspents` into the outputs of `layout`.
///
/// Outputs with a zero amount are left out. The unspents must add up to exactly
/// the layout total, so that the fee is what the layout says.
pub fn create_psbt_from_output_layout(
    unspents: &[Unspent],
    outputs: &InscriptionOutputs,
    layout: &OutputLayout,
) -> Result<Psbt, InscriptionError> {
    if unspents.is_empty() {
        return Err(InscriptionError::NoUnspents);
    }
    let input_total = unspent_total(unspents)?;
    let layout_total = layout
        .total()
        .ok_or_else(|| InscriptionError::AmountOverflow("layout total".to_string()))?;
    if input_total != layout_total {
        return Err(InscriptionError::LayoutMismatch {
            input_total,
            layout_total,
        });
    }

    let tx_outputs = [
        (layout.first_change_output, &outputs.change_outputs[0]),
        (layout.inscription_output, &outputs.inscription_recipient),
        (layout.second_change_output, &outputs.change_outputs[1]),
    ]
    .into_iter()
    .filter(|(value, _)| *value > 0)
    .map(|(value, script)| TxOut {
        value: Amount::from_sat(value),
        script_pubkey: script.clone(),
    })
    .collect();

    let tx = Transaction {
        version: transaction::Version::TWO,
        lock_time: absolute::LockTime::ZERO,
        input: unspents
            .iter()
            .map(|u| TxIn {
                previous_output: u.outpoint,
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            })
            .collect(),
        output: tx_outputs,
    };

    let mut psbt =
        Psbt::from_unsigned_tx(tx).map_err(|e| InscriptionError::Psbt(e.to_string()))?;
    for (input, unspent) in psbt.inputs.iter_mut().zip(unspents) {
        if unspent.script_type.is_segwit() {
            input.witness_utxo = Some(TxOut {
                value: Amount::from_sat(unspent.value),
                script_pubkey: unspent.script_pubkey.clone(),
            });
        }
        input.non_witness_utxo = unspent.prev_tx.clone();
    }
    Ok(psbt)
}

/// Find the layout for moving the sat at `sat_point` out of `unspents`.
///
/// The unspents are spent in order, so the inscribed sat sits after the values of
/// all unspents that come before the one holding it. Fees are estimated from the
/// input script types and the output script lengths.
pub fn find_output_layout_for_unspents(
    unspents: &[Unspent],
    sat_point: &SatPoint,
    outputs: &InscriptionOutputs,
    fee_rate_sat_kb: u64,
    constraints: &LayoutConstraints,
) -> Result<OutputLayout, InscriptionError> {
    if unspents.is_empty() {
        return Err(InscriptionError::NoUnspents);
    }
    let index = unspents
        .iter()
        .position(|u| u.outpoint == sat_point.outpoint)
        .ok_or_else(|| InscriptionError::SatPointNotFound(sat_point.to_string()))?;
    let holder = &unspents[index];
    if sat_point.offset >= holder.value {
        return Err(InscriptionError::InvalidSatOffset {
            offset: sat_point.offset,
            value: holder.value,
        });
    }

    let offset = checked_sum(
        &[unspent_total(&unspents[..index])?, sat_point.offset],
        "sat offset",
    )?;
    let value = unspent_total(unspents)?;

    let inputs = unspents.iter().fold(Dimensions::empty(), |d, u| {
        d.plus(&Dimensions::from_input(u.script_type))
    });
    let change_script_length = outputs
        .change_outputs
        .iter()
        .map(|s| s.len())
        .max()
        .unwrap_or_default();
    let fees = FeeModel::from_dimensions(
        &inputs,
        &Dimensions::from_output_script_length(outputs.inscription_recipient.len()),
        &Dimensions::from_output_script_length(change_script_length),
        fee_rate_sat_kb,
    );
    debug!("inscription at {}: input value {}, {:?}", sat_point, value, fees);

    find_output_layout(InscriptionInput { value, offset }, constraints, &fees)
}

/// Unsigned PSBT that moves the inscription at `sat_point` to the recipient
pub fn create_psbt_for_single_inscription_passing_transaction(
    unspents: &[Unspent],
    sat_point: &SatPoint,
    outputs: &InscriptionOutputs,
    fee_rate_sat_kb: u64,
    constraints: &LayoutConstraints,
) -> Result<Psbt, InscriptionError> {
    let layout =
        find_output_layout_for_unspents(unspents, sat_point, outputs, fee_rate_sat_kb, constraints)?;
    create_psbt_from_output_layout(unspents, outputs, &layout)
}
