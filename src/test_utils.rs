//! Shared fixtures for unit tests

use std::str::FromStr;

use crate::bitcoin::bip32::{DerivationPath, Xpriv, Xpub};
use crate::bitcoin::hashes::{sha256, Hash};
use crate::bitcoin::key::TweakedPublicKey;
use crate::bitcoin::opcodes::all::{OP_CHECKSIG, OP_CHECKSIGVERIFY};
use crate::bitcoin::psbt::Psbt;
use crate::bitcoin::script::Builder;
use crate::bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};
use crate::bitcoin::taproot::{LeafVersion, TapNodeHash};
use crate::bitcoin::{
    absolute, transaction, Amount, CompressedPublicKey, Network, OutPoint, ScriptBuf, Sequence,
    Transaction, TxIn, TxOut, Txid, Witness,
};
use crate::musig2::{
    create_tap_internal_key, create_tap_output_key, Musig2KeyValue, Musig2Participants,
};
use musig2::secp::{Point, Scalar};
use musig2::{PubNonce, SecNonce};

pub const INPUT_VALUE: u64 = 100_000;

pub fn get_xpriv_from_seed(seed: &str) -> Xpriv {
    // hash seed into 32 bytes
    let seed_hash = sha256::Hash::hash(seed.as_bytes()).to_byte_array();
    Xpriv::new_master(Network::Testnet, &seed_hash).expect("could not create xpriv from seed")
}

pub fn secret_key(n: u8) -> SecretKey {
    SecretKey::from_slice(&[n; 32]).expect("valid secret key")
}

pub fn compressed_pubkey(n: u8) -> CompressedPublicKey {
    CompressedPublicKey(PublicKey::from_secret_key(
        &Secp256k1::new(),
        &secret_key(n),
    ))
}

pub fn pub_nonce(n: u8) -> PubNonce {
    SecNonce::generate([n; 32], Scalar::one(), Point::generator(), [0u8; 32], b"").public_nonce()
}

pub fn test_merkle_root() -> TapNodeHash {
    TapNodeHash::from_script(&ScriptBuf::from(vec![0x51]), LeafVersion::TapScript)
}

pub fn p2tr_output_script(output_key: crate::bitcoin::XOnlyPublicKey) -> ScriptBuf {
    ScriptBuf::new_p2tr_tweaked(TweakedPublicKey::dangerous_assume_tweaked(output_key))
}

/// A PSBT with `n` MuSig2 key path inputs between a user and a BitGo key.
///
/// Each input commits to a script tree with a single user/backup leaf. Input `i`
/// uses keys derived at `m/0/0/40/i`.
pub struct Musig2Fixture {
    pub psbt: Psbt,
    pub user: Xpriv,
    pub bitgo: Xpriv,
    pub backup: Xpriv,
}

impl Musig2Fixture {
    pub fn new(n: usize) -> Self {
        let mut fixture = Musig2Fixture {
            psbt: Psbt::from_unsigned_tx(Transaction {
                version: transaction::Version::TWO,
                lock_time: absolute::LockTime::ZERO,
                input: vec![],
                output: vec![],
            })
            .unwrap(),
            user: get_xpriv_from_seed("user"),
            bitgo: get_xpriv_from_seed("bitgo"),
            backup: get_xpriv_from_seed("backup"),
        };

        let mut tx = fixture.psbt.unsigned_tx.clone();
        for i in 0..n {
            tx.input.push(TxIn {
                previous_output: OutPoint {
                    txid: Txid::from_byte_array([i as u8 + 1; 32]),
                    vout: 0,
                },
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            });
        }
        tx.output.push(TxOut {
            value: Amount::from_sat(INPUT_VALUE * n as u64 - 1_000),
            script_pubkey: ScriptBuf::from(vec![0x6a, 0x01, 0x00]),
        });
        fixture.psbt = Psbt::from_unsigned_tx(tx).unwrap();

        for i in 0..n {
            let participants = fixture.participants(i);
            let merkle_root = fixture.merkle_root(i);
            let origins = [
                (fixture.user, fixture.user_key(i)),
                (fixture.bitgo, fixture.derive(&fixture.bitgo, i)),
            ];
            let input = &mut fixture.psbt.inputs[i];
            input.witness_utxo = Some(TxOut {
                value: Amount::from_sat(INPUT_VALUE),
                script_pubkey: p2tr_output_script(participants.tap_output_key),
            });
            input.tap_internal_key = Some(participants.tap_internal_key);
            input.tap_merkle_root = Some(merkle_root);
            for (root, derived) in origins {
                input.tap_key_origins.insert(
                    x_only(&derived),
                    (
                        vec![],
                        (root.fingerprint(&Secp256k1::new()), Self::path(i)),
                    ),
                );
            }
            let (key, value) = Musig2KeyValue::Participants(participants).encode();
            input.proprietary.insert(key, value);
        }
        fixture
    }

    pub fn path(i: usize) -> DerivationPath {
        DerivationPath::from_str(&format!("m/0/0/40/{}", i)).unwrap()
    }

    fn derive(&self, root: &Xpriv, i: usize) -> Xpriv {
        root.derive_priv(&Secp256k1::new(), &Self::path(i)).unwrap()
    }

    pub fn user_key(&self, i: usize) -> Xpriv {
        self.derive(&self.user, i)
    }

    pub fn user_pub_key(&self, i: usize) -> CompressedPublicKey {
        Xpub::from_priv(&Secp256k1::new(), &self.user_key(i)).to_pub()
    }

    pub fn bitgo_pub_key(&self, i: usize) -> CompressedPublicKey {
        Xpub::from_priv(&Secp256k1::new(), &self.derive(&self.bitgo, i)).to_pub()
    }

    /// Root of the single-leaf tree `<user> OP_CHECKSIGVERIFY <backup> OP_CHECKSIG`
    pub fn merkle_root(&self, i: usize) -> TapNodeHash {
        let script = Builder::new()
            .push_x_only_key(&x_only(&self.user_key(i)))
            .push_opcode(OP_CHECKSIGVERIFY)
            .push_x_only_key(&x_only(&self.derive(&self.backup, i)))
            .push_opcode(OP_CHECKSIG)
            .into_script();
        TapNodeHash::from_script(&script, LeafVersion::TapScript)
    }

    pub fn participants(&self, i: usize) -> Musig2Participants {
        let participant_pub_keys = [self.user_pub_key(i), self.bitgo_pub_key(i)];
        let tap_internal_key = create_tap_internal_key(&participant_pub_keys).unwrap();
        Musig2Participants {
            tap_output_key: create_tap_output_key(&tap_internal_key, &self.merkle_root(i)),
            tap_internal_key,
            participant_pub_keys,
        }
    }

    /// Add a tap key origin for the backup key, which is not a MuSig2 participant
    pub fn add_backup_origin(&mut self, i: usize) {
        let derived = self.derive(&self.backup, i);
        let fingerprint = self.backup.fingerprint(&Secp256k1::new());
        self.psbt.inputs[i]
            .tap_key_origins
            .insert(x_only(&derived), (vec![], (fingerprint, Self::path(i))));
    }
}

fn x_only(key: &Xpriv) -> crate::bitcoin::XOnlyPublicKey {
    key.private_key.x_only_public_key(&Secp256k1::new()).0
}
