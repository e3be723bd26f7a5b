//! Weight estimates for wallet inputs and arbitrary outputs.
//!
//! Input weights are kept as a min/max range because DER encoded ECDSA
//! signatures vary in length. Schnorr signatures are always 64 bytes.

use std::str::FromStr;

use miniscript::bitcoin::VarInt;

use super::InscriptionError;

// DER encoded signature plus sighash byte
const ECDSA_SIG_MIN: usize = 71;
const ECDSA_SIG_MAX: usize = 73;

const SCHNORR_SIG: usize = 64;

const OP_SIZE: usize = 1;
const OP_0_SIZE: usize = OP_SIZE;
const OP_PUSH_SIZE: usize = OP_SIZE;
const OP_CHECKSIG_SIZE: usize = OP_SIZE;
const OP_CHECKSIGVERIFY_SIZE: usize = OP_SIZE;

const SCHNORR_PUBKEY_SIZE: usize = 32;
const P2MS_PUB_SCRIPT_SIZE: usize = 105; // 2-of-3 multisig script with compressed pubkeys
const P2WSH_PUB_SCRIPT_SIZE: usize = 34;
const P2PK_PUB_SCRIPT_SIZE: usize = 35;

const TX_OVERHEAD_SIZE: usize = 10; // version(4) + locktime(4) + varint for ins(1) + varint for outs(1)
const TX_SEGWIT_OVERHEAD_SIZE: usize = 11; // adds marker(1) + flag(1), but witness varint saves 1

fn var_slice_size(length: usize) -> usize {
    VarInt::from(length).size() + length
}

fn vector_size(element_lengths: &[usize]) -> usize {
    VarInt::from(element_lengths.len()).size()
        + element_lengths
            .iter()
            .map(|&len| var_slice_size(len))
            .sum::<usize>()
}

fn compute_input_weight(script_components: &[usize], witness_components: &[usize]) -> usize {
    let script_length: usize = script_components.iter().sum();
    // prevout(32) + index(4) + sequence(4) + scriptSig
    let base_size = 40 + var_slice_size(script_length);
    let witness_size = if witness_components.is_empty() {
        0
    } else {
        vector_size(witness_components)
    };
    4 * base_size + witness_size
}

fn output_weight(script_length: usize) -> usize {
    4 * (8 + var_slice_size(script_length))
}

/// Spend types of BitGo wallet inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputScriptType {
    P2sh,
    P2shP2wsh,
    P2wsh,
    P2trLegacy,
    P2trMusig2KeyPath,
    P2trMusig2ScriptPath,
    P2shP2pk,
}

impl InputScriptType {
    pub fn is_segwit(&self) -> bool {
        !matches!(self, InputScriptType::P2sh | InputScriptType::P2shP2pk)
    }

    /// (scriptSig components, witness components) for a given ECDSA signature size
    fn components(&self, ecdsa_sig: usize) -> (Vec<usize>, Vec<usize>) {
        let p2ms_witness = vec![0, ecdsa_sig, ecdsa_sig, P2MS_PUB_SCRIPT_SIZE];
        match self {
            InputScriptType::P2sh => (
                vec![
                    OP_0_SIZE,
                    OP_PUSH_SIZE + ecdsa_sig,
                    OP_PUSH_SIZE + ecdsa_sig,
                    OP_PUSH_SIZE + 1 + P2MS_PUB_SCRIPT_SIZE, // OP_PUSHDATA1 + redeemScript
                ],
                vec![],
            ),
            InputScriptType::P2shP2wsh => (vec![OP_SIZE + P2WSH_PUB_SCRIPT_SIZE], p2ms_witness),
            InputScriptType::P2wsh => (vec![], p2ms_witness),
            InputScriptType::P2trLegacy | InputScriptType::P2trMusig2ScriptPath => {
                let leaf_script = OP_PUSH_SIZE
                    + SCHNORR_PUBKEY_SIZE
                    + OP_CHECKSIG_SIZE
                    + OP_PUSH_SIZE
                    + SCHNORR_PUBKEY_SIZE
                    + OP_CHECKSIGVERIFY_SIZE;
                // header + internal key + one level of merkle path
                let control_block = 1 + 32 + 32;
                (
                    vec![],
                    vec![SCHNORR_SIG, SCHNORR_SIG, leaf_script, control_block],
                )
            }
            InputScriptType::P2trMusig2KeyPath => (vec![], vec![SCHNORR_SIG]),
            InputScriptType::P2shP2pk => (
                vec![
                    OP_PUSH_SIZE + ecdsa_sig,
                    OP_PUSH_SIZE + P2PK_PUB_SCRIPT_SIZE,
                ],
                vec![],
            ),
        }
    }

    fn weight(&self, ecdsa_sig: usize) -> usize {
        let (script, witness) = self.components(ecdsa_sig);
        compute_input_weight(&script, &witness)
    }
}

impl FromStr for InputScriptType {
    type Err = InscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "p2sh" => Ok(InputScriptType::P2sh),
            "p2shP2wsh" => Ok(InputScriptType::P2shP2wsh),
            "p2wsh" => Ok(InputScriptType::P2wsh),
            "p2trLegacy" => Ok(InputScriptType::P2trLegacy),
            "p2trMusig2KeyPath" => Ok(InputScriptType::P2trMusig2KeyPath),
            "p2trMusig2ScriptPath" => Ok(InputScriptType::P2trMusig2ScriptPath),
            "p2shP2pk" => Ok(InputScriptType::P2shP2pk),
            _ => Err(InscriptionError::UnknownScriptType(s.to_string())),
        }
    }
}

/// Which end of the ECDSA signature range to estimate with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeBound {
    Min,
    #[default]
    Max,
}

/// Accumulated weight of a (partial) transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    input_weight_min: usize,
    input_weight_max: usize,
    output_weight: usize,
    has_segwit: bool,
}

impl Dimensions {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_input(script_type: InputScriptType) -> Self {
        Dimensions {
            input_weight_min: script_type.weight(ECDSA_SIG_MIN),
            input_weight_max: script_type.weight(ECDSA_SIG_MAX),
            output_weight: 0,
            has_segwit: script_type.is_segwit(),
        }
    }

    pub fn from_output_script_length(script_length: usize) -> Self {
        Dimensions {
            output_weight: output_weight(script_length),
            ..Self::default()
        }
    }

    pub fn plus(&self, other: &Dimensions) -> Dimensions {
        Dimensions {
            input_weight_min: self.input_weight_min + other.input_weight_min,
            input_weight_max: self.input_weight_max + other.input_weight_max,
            output_weight: self.output_weight + other.output_weight,
            has_segwit: self.has_segwit || other.has_segwit,
        }
    }

    pub fn times(&self, n: usize) -> Dimensions {
        Dimensions {
            input_weight_min: self.input_weight_min * n,
            input_weight_max: self.input_weight_max * n,
            output_weight: self.output_weight * n,
            has_segwit: self.has_segwit,
        }
    }

    pub fn has_segwit(&self) -> bool {
        self.has_segwit
    }

    fn overhead_weight(&self) -> usize {
        if self.input_weight_max == 0 && self.output_weight == 0 {
            return 0;
        }
        let overhead_size = if self.has_segwit {
            TX_SEGWIT_OVERHEAD_SIZE
        } else {
            TX_OVERHEAD_SIZE
        };
        4 * overhead_size
    }

    pub fn input_weight(&self, bound: SizeBound) -> usize {
        match bound {
            SizeBound::Min => self.input_weight_min,
            SizeBound::Max => self.input_weight_max,
        }
    }

    pub fn output_weight(&self) -> usize {
        self.output_weight
    }

    /// Total weight including the transaction overhead
    pub fn weight(&self, bound: SizeBound) -> usize {
        self.overhead_weight() + self.input_weight(bound) + self.output_weight
    }

    pub fn vsize(&self, bound: SizeBound) -> usize {
        self.weight(bound).div_ceil(4)
    }
}
