//! Commit output and reveal transaction for a single inscription
//!
//! The inscription script is the only leaf of a taproot tree. The commit
//! transaction pays to that tree; the reveal transaction spends it through the
//! script path, which publishes the envelope on chain.

use log::debug;
use miniscript::bitcoin::hashes::Hash;
use miniscript::bitcoin::key::UntweakedKeypair;
use miniscript::bitcoin::secp256k1::{Message, Secp256k1, SecretKey, XOnlyPublicKey};
use miniscript::bitcoin::sighash::{Prevouts, SighashCache};
use miniscript::bitcoin::taproot::{
    self, ControlBlock, LeafVersion, TapLeafHash, TaprootBuilder, TaprootSpendInfo,
};
use miniscript::bitcoin::{
    absolute, transaction, Amount, OutPoint, ScriptBuf, Sequence, TapSighashType, Transaction,
    TxIn, TxOut, Txid, Witness,
};

use super::envelope::build_inscription_script;
use super::InscriptionError;

/// Output value of the dummy reveal transaction used for size estimation
const DUMMY_OUTPUT_VALUE: u64 = 10_000;

/// Taproot leaf script data needed for spending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapLeafScript {
    pub leaf_version: u8,
    pub script: Vec<u8>,
    pub control_block: Vec<u8>,
}

/// Prepared data for an inscription reveal transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InscriptionRevealData {
    /// The P2TR output script for the commit transaction (network-agnostic)
    pub output_script: Vec<u8>,
    pub reveal_transaction_vsize: usize,
    pub tap_leaf_script: TapLeafScript,
}

fn inscription_spend_info(
    internal_key: &XOnlyPublicKey,
    script: &ScriptBuf,
) -> Result<TaprootSpendInfo, InscriptionError> {
    TaprootBuilder::new()
        .add_leaf(0, script.clone())
        .map_err(|e| InscriptionError::Taproot(e.to_string()))?
        .finalize(&Secp256k1::verification_only(), *internal_key)
        .map_err(|_| InscriptionError::Taproot("incomplete taproot tree".to_string()))
}

/// The P2TR output script that commits to an inscription
pub fn create_output_script_for_inscription(
    internal_key: &XOnlyPublicKey,
    content_type: &str,
    data: &[u8],
) -> Result<ScriptBuf, InscriptionError> {
    let script = build_inscription_script(internal_key, content_type, data)?;
    let spend_info = inscription_spend_info(internal_key, &script)?;
    Ok(ScriptBuf::new_p2tr_tweaked(spend_info.output_key()))
}

fn reveal_transaction(previous_output: OutPoint, output: TxOut, witness: Witness) -> Transaction {
    Transaction {
        version: transaction::Version::TWO,
        lock_time: absolute::LockTime::ZERO,
        input: vec![TxIn {
            previous_output,
            script_sig: ScriptBuf::new(),
            sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
            witness,
        }],
        output: vec![output],
    }
}

fn script_path_witness(signature: &[u8], script: &ScriptBuf, control_block: &ControlBlock) -> Witness {
    let mut witness = Witness::new();
    witness.push(signature);
    witness.push(script.as_bytes());
    witness.push(control_block.serialize());
    witness
}

/// Virtual size of a reveal transaction paying back to the commit output.
///
/// Measured on a transaction that carries an all-zero signature of the real size.
fn measure_reveal_vsize(
    commit_output_script: &ScriptBuf,
    script: &ScriptBuf,
    control_block: &ControlBlock,
) -> usize {
    let dummy_signature = [0u8; 64];
    let tx = reveal_transaction(
        OutPoint {
            txid: Txid::all_zeros(),
            vout: 0,
        },
        TxOut {
            value: Amount::from_sat(DUMMY_OUTPUT_VALUE),
            script_pubkey: commit_output_script.clone(),
        },
        script_path_witness(&dummy_signature, script, control_block),
    );
    tx.vsize()
}

/// Create inscription reveal data including the commit output script and tap leaf script
pub fn create_inscription_reveal_data(
    internal_key: &XOnlyPublicKey,
    content_type: &str,
    data: &[u8],
) -> Result<InscriptionRevealData, InscriptionError> {
    let script = build_inscription_script(internal_key, content_type, data)?;
    let spend_info = inscription_spend_info(internal_key, &script)?;
    let output_script = ScriptBuf::new_p2tr_tweaked(spend_info.output_key());

    let control_block = spend_info
        .control_block(&(script.clone(), LeafVersion::TapScript))
        .ok_or_else(|| InscriptionError::Taproot("no control block for leaf".to_string()))?;

    let reveal_transaction_vsize = measure_reveal_vsize(&output_script, &script, &control_block);
    debug!(
        "inscription of {} bytes: reveal vsize {}",
        data.len(),
        reveal_transaction_vsize
    );

    Ok(InscriptionRevealData {
        output_script: output_script.to_bytes(),
        reveal_transaction_vsize,
        tap_leaf_script: TapLeafScript {
            leaf_version: LeafVersion::TapScript.to_consensus(),
            script: script.to_bytes(),
            control_block: control_block.serialize(),
        },
    })
}

/// Sign a reveal transaction
///
/// Spends the single output of `commit_tx` that pays to `commit_output_script` and
/// sends `output_value_sats` to `recipient_output_script`. Returns the finalized
/// transaction.
pub fn sign_reveal_transaction(
    private_key: &SecretKey,
    tap_leaf_script: &TapLeafScript,
    commit_tx: &Transaction,
    commit_output_script: &[u8],
    recipient_output_script: &[u8],
    output_value_sats: u64,
) -> Result<Transaction, InscriptionError> {
    let secp = Secp256k1::new();
    let commit_script = ScriptBuf::from_bytes(commit_output_script.to_vec());

    let matching_outputs: Vec<_> = commit_tx
        .output
        .iter()
        .enumerate()
        .filter(|(_, out)| out.script_pubkey == commit_script)
        .collect();
    let (vout, commit_output) = match matching_outputs.as_slice() {
        [] => return Err(InscriptionError::CommitOutputNotFound),
        [single] => *single,
        many => return Err(InscriptionError::MultipleCommitOutputs(many.len())),
    };

    let script = ScriptBuf::from_bytes(tap_leaf_script.script.clone());
    let control_block = ControlBlock::decode(&tap_leaf_script.control_block)
        .map_err(|e| InscriptionError::InvalidControlBlock(e.to_string()))?;

    let mut reveal_tx = reveal_transaction(
        OutPoint {
            txid: commit_tx.compute_txid(),
            vout: vout as u32,
        },
        TxOut {
            value: Amount::from_sat(output_value_sats),
            script_pubkey: ScriptBuf::from_bytes(recipient_output_script.to_vec()),
        },
        Witness::new(),
    );

    let leaf_hash = TapLeafHash::from_script(&script, LeafVersion::TapScript);
    let prevouts = [commit_output.clone()];
    let sighash = SighashCache::new(&reveal_tx)
        .taproot_script_spend_signature_hash(
            0,
            &Prevouts::All(&prevouts),
            leaf_hash,
            TapSighashType::Default,
        )
        .map_err(|e| InscriptionError::Sighash(e.to_string()))?;

    let keypair = UntweakedKeypair::from_secret_key(&secp, private_key);
    let message = Message::from_digest(sighash.to_byte_array());
    let signature = taproot::Signature {
        signature: secp.sign_schnorr_no_aux_rand(&message, &keypair),
        sighash_type: TapSighashType::Default,
    };

    reveal_tx.input[0].witness = script_path_witness(&signature.to_vec(), &script, &control_block);
    Ok(reveal_tx)
}
