//! MuSig2 PSBT proprietary key-value records
//!
//! Three records live in the BitGo namespace of a taproot key path input:
//!
//! ```text
//! participants  <tapOutputKey><tapInternalKey>       => <participantKey1><participantKey2>
//! pub nonce     <participantPubKey><tapOutputKey>    => <pubNonce>
//! partial sig   <participantPubKey><tapOutputKey>    => <partialSig>
//! ```

use miniscript::bitcoin::hashes::hex::DisplayHex;
use miniscript::bitcoin::psbt::Input;
use miniscript::bitcoin::secp256k1::XOnlyPublicKey;
use miniscript::bitcoin::taproot::TapNodeHash;
use miniscript::bitcoin::CompressedPublicKey;
use musig2::{PartialSignature, PubNonce};

use super::aggregation::{create_tap_internal_key, create_tap_output_key};
use super::propkv::{find_kv, is_musig2_key, BitGoKeyValue, ProprietaryKey, ProprietaryKeySubtype};
use super::Musig2Error;

const PARTICIPANTS_KEY_LEN: usize = 64;
const PARTICIPANTS_VALUE_LEN: usize = 66;
const PARTICIPANT_KEY_LEN: usize = 65;
const PUB_NONCE_LEN: usize = 66;
const PARTIAL_SIG_LEN: usize = 32;

/// MuSig2 participant data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Musig2Participants {
    pub tap_output_key: XOnlyPublicKey,
    pub tap_internal_key: XOnlyPublicKey,
    pub participant_pub_keys: [CompressedPublicKey; 2],
}

/// MuSig2 public nonce data
#[derive(Debug, Clone)]
pub struct Musig2PubNonce {
    pub participant_pub_key: CompressedPublicKey,
    pub tap_output_key: XOnlyPublicKey,
    pub pub_nonce: PubNonce,
}

impl PartialEq for Musig2PubNonce {
    fn eq(&self, other: &Self) -> bool {
        self.participant_pub_key == other.participant_pub_key
            && self.tap_output_key == other.tap_output_key
            && self.pub_nonce.serialize() == other.pub_nonce.serialize()
    }
}

impl Eq for Musig2PubNonce {}

/// MuSig2 partial signature data
///
/// `partial_sig` is a 32 byte BIP-327 partial signature, optionally followed by a
/// sighash byte. The 64 byte schnorr signature only exists after aggregation, in
/// `tap_key_sig`, and is rejected here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Musig2PartialSig {
    pub participant_pub_key: CompressedPublicKey,
    pub tap_output_key: XOnlyPublicKey,
    pub partial_sig: Vec<u8>, // 32 or 33 bytes (with optional sighash byte)
}

/// Any of the MuSig2 records, dispatched by subtype
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Musig2KeyValue {
    Participants(Musig2Participants),
    PubNonce(Musig2PubNonce),
    PartialSig(Musig2PartialSig),
}

fn check_lengths(kv: &BitGoKeyValue, key_len: usize, value_lens: &[usize]) -> Result<(), Musig2Error> {
    if kv.key.len() != key_len {
        return Err(Musig2Error::InvalidKeydataLength {
            expected: key_len,
            got: kv.key.len(),
        });
    }
    if !value_lens.contains(&kv.value.len()) {
        let expected = value_lens
            .iter()
            .map(|len| len.to_string())
            .collect::<Vec<_>>()
            .join(" or ");
        return Err(Musig2Error::InvalidValueLength {
            expected,
            got: kv.value.len(),
        });
    }
    Ok(())
}

fn parse_compressed_pubkey(bytes: &[u8]) -> Result<CompressedPublicKey, Musig2Error> {
    CompressedPublicKey::from_slice(bytes).map_err(|e| Musig2Error::InvalidPublicKey(e.to_string()))
}

fn parse_xonly_pubkey(bytes: &[u8]) -> Result<XOnlyPublicKey, Musig2Error> {
    XOnlyPublicKey::from_slice(bytes).map_err(|e| Musig2Error::InvalidPublicKey(e.to_string()))
}

fn participant_keydata(
    participant_pub_key: &CompressedPublicKey,
    tap_output_key: &XOnlyPublicKey,
) -> Vec<u8> {
    let mut key_field = Vec::with_capacity(PARTICIPANT_KEY_LEN);
    key_field.extend_from_slice(&participant_pub_key.to_bytes());
    key_field.extend_from_slice(&tap_output_key.serialize());
    key_field
}

fn parse_participant_keydata(
    key: &[u8],
) -> Result<(CompressedPublicKey, XOnlyPublicKey), Musig2Error> {
    Ok((
        parse_compressed_pubkey(&key[0..33])?,
        parse_xonly_pubkey(&key[33..65])?,
    ))
}

pub(crate) fn pubkey_hex(pubkey: &CompressedPublicKey) -> String {
    pubkey.to_bytes().as_slice().to_lower_hex_string()
}

impl Musig2Participants {
    /// Convert to proprietary key-value pair
    pub fn to_key_value(&self) -> BitGoKeyValue {
        let mut key_field = Vec::with_capacity(PARTICIPANTS_KEY_LEN);
        key_field.extend_from_slice(&self.tap_output_key.serialize());
        key_field.extend_from_slice(&self.tap_internal_key.serialize());

        let mut value = Vec::with_capacity(PARTICIPANTS_VALUE_LEN);
        value.extend_from_slice(&self.participant_pub_keys[0].to_bytes());
        value.extend_from_slice(&self.participant_pub_keys[1].to_bytes());

        BitGoKeyValue::new(
            ProprietaryKeySubtype::Musig2ParticipantPubKeys,
            key_field,
            value,
        )
    }

    /// Create from proprietary key-value pair
    pub fn from_key_value(kv: &BitGoKeyValue) -> Result<Self, Musig2Error> {
        kv.expect_subtype(ProprietaryKeySubtype::Musig2ParticipantPubKeys)?;
        check_lengths(kv, PARTICIPANTS_KEY_LEN, &[PARTICIPANTS_VALUE_LEN])?;

        let tap_output_key = parse_xonly_pubkey(&kv.key[0..32])?;
        let tap_internal_key = parse_xonly_pubkey(&kv.key[32..64])?;
        let participant_key1 = parse_compressed_pubkey(&kv.value[0..33])?;
        let participant_key2 = parse_compressed_pubkey(&kv.value[33..66])?;

        if participant_key1 == participant_key2 {
            return Err(Musig2Error::DuplicateParticipantKeys);
        }

        Ok(Self {
            tap_output_key,
            tap_internal_key,
            participant_pub_keys: [participant_key1, participant_key2],
        })
    }

    pub fn contains(&self, pubkey: &CompressedPublicKey) -> bool {
        self.participant_pub_keys.contains(pubkey)
    }
}

impl Musig2PubNonce {
    /// Convert to proprietary key-value pair
    pub fn to_key_value(&self) -> BitGoKeyValue {
        BitGoKeyValue::new(
            ProprietaryKeySubtype::Musig2PubNonce,
            participant_keydata(&self.participant_pub_key, &self.tap_output_key),
            self.pub_nonce.serialize().to_vec(),
        )
    }

    /// Create from proprietary key-value pair
    pub fn from_key_value(kv: &BitGoKeyValue) -> Result<Self, Musig2Error> {
        kv.expect_subtype(ProprietaryKeySubtype::Musig2PubNonce)?;
        check_lengths(kv, PARTICIPANT_KEY_LEN, &[PUB_NONCE_LEN])?;

        let (participant_pub_key, tap_output_key) = parse_participant_keydata(&kv.key)?;
        let pub_nonce = PubNonce::try_from(&kv.value[..])
            .map_err(|e| Musig2Error::InvalidPubNonce(e.to_string()))?;

        Ok(Self {
            participant_pub_key,
            tap_output_key,
            pub_nonce,
        })
    }
}

impl Musig2PartialSig {
    pub fn new(
        participant_pub_key: CompressedPublicKey,
        tap_output_key: XOnlyPublicKey,
        partial_sig: PartialSignature,
    ) -> Self {
        Self {
            participant_pub_key,
            tap_output_key,
            partial_sig: partial_sig.serialize().to_vec(),
        }
    }

    /// Convert to proprietary key-value pair
    pub fn to_key_value(&self) -> BitGoKeyValue {
        BitGoKeyValue::new(
            ProprietaryKeySubtype::Musig2PartialSig,
            participant_keydata(&self.participant_pub_key, &self.tap_output_key),
            self.partial_sig.clone(),
        )
    }

    /// Create from proprietary key-value pair
    pub fn from_key_value(kv: &BitGoKeyValue) -> Result<Self, Musig2Error> {
        kv.expect_subtype(ProprietaryKeySubtype::Musig2PartialSig)?;
        check_lengths(kv, PARTICIPANT_KEY_LEN, &[PARTIAL_SIG_LEN, PARTIAL_SIG_LEN + 1])?;

        let (participant_pub_key, tap_output_key) = parse_participant_keydata(&kv.key)?;
        let sig = Self {
            participant_pub_key,
            tap_output_key,
            partial_sig: kv.value.clone(),
        };
        sig.normalized_signature()?;
        Ok(sig)
    }

    /// Get the normalized partial signature (32 bytes, with sighash byte removed if present)
    pub fn normalized_signature(&self) -> Result<PartialSignature, Musig2Error> {
        let sig_bytes = self
            .partial_sig
            .get(..PARTIAL_SIG_LEN)
            .ok_or(Musig2Error::InvalidValueLength {
                expected: "32 or 33".to_string(),
                got: self.partial_sig.len(),
            })?;
        PartialSignature::try_from(sig_bytes)
            .map_err(|e| Musig2Error::InvalidPartialSignature(e.to_string()))
    }
}

impl Musig2KeyValue {
    /// Decode a raw proprietary key-value into one of the MuSig2 records
    pub fn decode(key: &ProprietaryKey, value: &[u8]) -> Result<Self, Musig2Error> {
        let kv = BitGoKeyValue::from_key_value(key, value)?;
        match kv.subtype {
            ProprietaryKeySubtype::Musig2ParticipantPubKeys => {
                Musig2Participants::from_key_value(&kv).map(Musig2KeyValue::Participants)
            }
            ProprietaryKeySubtype::Musig2PubNonce => {
                Musig2PubNonce::from_key_value(&kv).map(Musig2KeyValue::PubNonce)
            }
            ProprietaryKeySubtype::Musig2PartialSig => {
                Musig2PartialSig::from_key_value(&kv).map(Musig2KeyValue::PartialSig)
            }
        }
    }

    pub fn encode(&self) -> (ProprietaryKey, Vec<u8>) {
        let kv = match self {
            Musig2KeyValue::Participants(p) => p.to_key_value(),
            Musig2KeyValue::PubNonce(n) => n.to_key_value(),
            Musig2KeyValue::PartialSig(s) => s.to_key_value(),
        };
        kv.to_key_value()
    }
}

/// Parse MuSig2 participants from PSBT input
///
/// Returns `None` if no participant data is found.
pub fn parse_musig2_participants(input: &Input) -> Result<Option<Musig2Participants>, Musig2Error> {
    let kvs: Vec<_> = find_kv(
        ProprietaryKeySubtype::Musig2ParticipantPubKeys,
        &input.proprietary,
    )
    .collect();

    match kvs.as_slice() {
        [] => Ok(None),
        [kv] => Musig2Participants::from_key_value(kv).map(Some),
        _ => Err(Musig2Error::TooManyKeyValues {
            expected: 1,
            got: kvs.len(),
        }),
    }
}

/// Parse MuSig2 public nonces from PSBT input
pub fn parse_musig2_nonces(input: &Input) -> Result<Vec<Musig2PubNonce>, Musig2Error> {
    let kvs: Vec<_> = find_kv(ProprietaryKeySubtype::Musig2PubNonce, &input.proprietary).collect();

    if kvs.len() > 2 {
        return Err(Musig2Error::TooManyKeyValues {
            expected: 2,
            got: kvs.len(),
        });
    }

    kvs.iter().map(Musig2PubNonce::from_key_value).collect()
}

/// Parse MuSig2 partial signatures from PSBT input
pub fn parse_musig2_partial_sigs(input: &Input) -> Result<Vec<Musig2PartialSig>, Musig2Error> {
    let kvs: Vec<_> =
        find_kv(ProprietaryKeySubtype::Musig2PartialSig, &input.proprietary).collect();

    if kvs.len() > 2 {
        return Err(Musig2Error::TooManyKeyValues {
            expected: 2,
            got: kvs.len(),
        });
    }

    kvs.iter().map(Musig2PartialSig::from_key_value).collect()
}

/// Check a participant record against the input it was read from.
///
/// Recomputes the internal key from the participant keys and the output key from the
/// internal key and merkle root, then compares the record's internal key with the
/// input's own `tap_internal_key`.
pub fn validate_participants(
    participants: &Musig2Participants,
    tap_internal_key: &XOnlyPublicKey,
    tap_merkle_root: &TapNodeHash,
) -> Result<(), Musig2Error> {
    let internal_key = create_tap_internal_key(&participants.participant_pub_keys)?;
    if internal_key != participants.tap_internal_key {
        return Err(Musig2Error::TapInternalKeyMismatch {
            expected: participants.tap_internal_key.to_string(),
            got: internal_key.to_string(),
        });
    }

    let output_key = create_tap_output_key(&internal_key, tap_merkle_root);
    if output_key != participants.tap_output_key {
        return Err(Musig2Error::TapOutputKeyMismatch {
            expected: participants.tap_output_key.to_string(),
            got: output_key.to_string(),
        });
    }

    if participants.tap_internal_key != *tap_internal_key {
        return Err(Musig2Error::InputTapInternalKeyMismatch {
            expected: tap_internal_key.to_string(),
            got: participants.tap_internal_key.to_string(),
        });
    }
    Ok(())
}

fn validate_record_keys<'a>(
    records: impl Iterator<Item = (&'a CompressedPublicKey, &'a XOnlyPublicKey)>,
    participants: &Musig2Participants,
    duplicate: fn(String) -> Musig2Error,
) -> Result<(), Musig2Error> {
    let mut seen: Vec<&CompressedPublicKey> = Vec::with_capacity(2);
    for (participant_pub_key, tap_output_key) in records {
        if !participants.contains(participant_pub_key) {
            return Err(Musig2Error::UnknownParticipant(pubkey_hex(participant_pub_key)));
        }
        if *tap_output_key != participants.tap_output_key {
            return Err(Musig2Error::TapOutputKeyMismatch {
                expected: participants.tap_output_key.to_string(),
                got: tap_output_key.to_string(),
            });
        }
        if seen.contains(&participant_pub_key) {
            return Err(duplicate(pubkey_hex(participant_pub_key)));
        }
        seen.push(participant_pub_key);
    }
    Ok(())
}

/// Each nonce must belong to a distinct participant and carry the participants' output key
pub fn validate_nonces(
    nonces: &[Musig2PubNonce],
    participants: &Musig2Participants,
) -> Result<(), Musig2Error> {
    validate_record_keys(
        nonces
            .iter()
            .map(|n| (&n.participant_pub_key, &n.tap_output_key)),
        participants,
        Musig2Error::DuplicateNonce,
    )
}

pub fn validate_partial_sigs(
    partial_sigs: &[Musig2PartialSig],
    participants: &Musig2Participants,
) -> Result<(), Musig2Error> {
    validate_record_keys(
        partial_sigs
            .iter()
            .map(|s| (&s.participant_pub_key, &s.tap_output_key)),
        participants,
        Musig2Error::DuplicatePartialSig,
    )
}

/// All MuSig2 records of one PSBT input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Musig2Input {
    pub participants: Musig2Participants,
    pub nonces: Vec<Musig2PubNonce>,
    pub partial_sigs: Vec<Musig2PartialSig>,
}

impl Musig2Input {
    /// Returns true if the input has any MuSig2 key-value pairs
    pub fn is_musig2_input(input: &Input) -> bool {
        input.proprietary.keys().any(is_musig2_key)
    }

    pub fn from_input(input: &Input) -> Result<Self, Musig2Error> {
        let participants =
            parse_musig2_participants(input)?.ok_or(Musig2Error::MissingParticipants)?;
        let nonces = parse_musig2_nonces(input)?;
        let partial_sigs = parse_musig2_partial_sigs(input)?;
        Ok(Self {
            participants,
            nonces,
            partial_sigs,
        })
    }

    /// Parse and run the full validation chain for the input at `input_index`
    pub fn from_input_validated(input: &Input, input_index: usize) -> Result<Self, Musig2Error> {
        let tap_internal_key = input
            .tap_internal_key
            .ok_or(Musig2Error::MissingTapInternalKey { input_index })?;
        let tap_merkle_root = input
            .tap_merkle_root
            .ok_or(Musig2Error::MissingTapMerkleRoot { input_index })?;

        let musig2_input = Self::from_input(input)?;
        validate_participants(
            &musig2_input.participants,
            &tap_internal_key,
            &tap_merkle_root,
        )?;
        validate_nonces(&musig2_input.nonces, &musig2_input.participants)?;
        validate_partial_sigs(&musig2_input.partial_sigs, &musig2_input.participants)?;
        Ok(musig2_input)
    }

    /// Get public nonces
    pub fn get_pub_nonces(&self) -> Vec<PubNonce> {
        self.nonces.iter().map(|n| n.pub_nonce.clone()).collect()
    }

    pub fn nonce_for(&self, participant_pub_key: &CompressedPublicKey) -> Option<&Musig2PubNonce> {
        self.nonces
            .iter()
            .find(|n| n.participant_pub_key == *participant_pub_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::musig2::propkv::BITGO;
    use crate::test_utils::{compressed_pubkey, pub_nonce, test_merkle_root};

    fn participants() -> Musig2Participants {
        let participant_pub_keys = [compressed_pubkey(1), compressed_pubkey(2)];
        let tap_internal_key = create_tap_internal_key(&participant_pub_keys).unwrap();
        Musig2Participants {
            tap_output_key: create_tap_output_key(&tap_internal_key, &test_merkle_root()),
            tap_internal_key,
            participant_pub_keys,
        }
    }

    fn input_with(records: &[Musig2KeyValue]) -> Input {
        let mut input = Input::default();
        for record in records {
            let (key, value) = record.encode();
            input.proprietary.insert(key, value);
        }
        input
    }

    #[test]
    fn test_participants_decode_inverts_encode() {
        let record = Musig2KeyValue::Participants(participants());
        let (key, value) = record.encode();
        assert_eq!(key.prefix, BITGO);
        assert_eq!(key.subtype, 0x01);
        assert_eq!(key.key.len(), 64);
        assert_eq!(value.len(), 66);
        assert_eq!(Musig2KeyValue::decode(&key, &value).unwrap(), record);
    }

    #[test]
    fn test_pub_nonce_decode_inverts_encode() {
        let p = participants();
        let record = Musig2KeyValue::PubNonce(Musig2PubNonce {
            participant_pub_key: p.participant_pub_keys[1],
            tap_output_key: p.tap_output_key,
            pub_nonce: pub_nonce(9),
        });
        let (key, value) = record.encode();
        assert_eq!(key.key.len(), 65);
        assert_eq!(value.len(), 66);
        assert_eq!(Musig2KeyValue::decode(&key, &value).unwrap(), record);
    }

    #[test]
    fn test_partial_sig_decode_accepts_sighash_suffix() {
        let p = participants();
        let mut value = vec![0x11; 32];
        value.push(0x00);
        let kv = BitGoKeyValue::new(
            ProprietaryKeySubtype::Musig2PartialSig,
            participant_keydata(&p.participant_pub_keys[0], &p.tap_output_key),
            value,
        );
        let sig = Musig2PartialSig::from_key_value(&kv).unwrap();
        assert_eq!(
            sig.normalized_signature().unwrap().serialize(),
            [0x11; 32]
        );
        let (key, value) = Musig2KeyValue::PartialSig(sig.clone()).encode();
        assert_eq!(
            Musig2KeyValue::decode(&key, &value).unwrap(),
            Musig2KeyValue::PartialSig(sig)
        );
    }

    #[rstest::rstest]
    #[case::participants_short_key(0x01, 63, 66, Musig2Error::InvalidKeydataLength { expected: 64, got: 63 })]
    #[case::participants_long_value(0x01, 64, 67, Musig2Error::InvalidValueLength { expected: "66".to_string(), got: 67 })]
    #[case::nonce_legacy_key_width(0x02, 64, 66, Musig2Error::InvalidKeydataLength { expected: 65, got: 64 })]
    #[case::nonce_short_value(0x02, 65, 65, Musig2Error::InvalidValueLength { expected: "66".to_string(), got: 65 })]
    #[case::partial_sig_schnorr_width(0x03, 65, 64, Musig2Error::InvalidValueLength { expected: "32 or 33".to_string(), got: 64 })]
    fn test_decode_reports_expected_and_actual_length(
        #[case] subtype: u8,
        #[case] key_len: usize,
        #[case] value_len: usize,
        #[case] expected: Musig2Error,
    ) {
        let key = ProprietaryKey {
            prefix: BITGO.to_vec(),
            subtype,
            key: vec![0x02; key_len],
        };
        assert_eq!(
            Musig2KeyValue::decode(&key, &vec![0x02; value_len]),
            Err(expected)
        );
    }

    #[test]
    fn test_decode_rejects_equal_participant_keys() {
        let p = participants();
        let mut kv = p.to_key_value();
        let first = kv.value[0..33].to_vec();
        kv.value[33..66].copy_from_slice(&first);
        assert_eq!(
            Musig2Participants::from_key_value(&kv),
            Err(Musig2Error::DuplicateParticipantKeys)
        );
    }

    #[test]
    fn test_record_rejects_wrong_subtype() {
        let kv = participants().to_key_value();
        assert_eq!(
            Musig2PubNonce::from_key_value(&kv),
            Err(Musig2Error::InvalidSubtype {
                expected: 0x02,
                got: 0x01
            })
        );
    }

    #[test]
    fn test_parse_participants_rejects_two_records() {
        let p = participants();
        let other_keys = [compressed_pubkey(3), compressed_pubkey(4)];
        let other_internal = create_tap_internal_key(&other_keys).unwrap();
        let other = Musig2Participants {
            tap_output_key: create_tap_output_key(&other_internal, &test_merkle_root()),
            tap_internal_key: other_internal,
            participant_pub_keys: other_keys,
        };
        let input = input_with(&[
            Musig2KeyValue::Participants(p),
            Musig2KeyValue::Participants(other),
        ]);
        assert_eq!(
            parse_musig2_participants(&input),
            Err(Musig2Error::TooManyKeyValues {
                expected: 1,
                got: 2
            })
        );
    }

    #[test]
    fn test_is_musig2_input() {
        assert!(!Musig2Input::is_musig2_input(&Input::default()));
        let input = input_with(&[Musig2KeyValue::Participants(participants())]);
        assert!(Musig2Input::is_musig2_input(&input));
    }

    #[test]
    fn test_validate_participants_chain() {
        let p = participants();
        let root = test_merkle_root();
        validate_participants(&p, &p.tap_internal_key, &root).unwrap();

        let mut wrong_internal = p.clone();
        wrong_internal.tap_internal_key = p.tap_output_key;
        assert!(matches!(
            validate_participants(&wrong_internal, &p.tap_internal_key, &root),
            Err(Musig2Error::TapInternalKeyMismatch { .. })
        ));

        let mut wrong_output = p.clone();
        wrong_output.tap_output_key = p.tap_internal_key;
        assert!(matches!(
            validate_participants(&wrong_output, &p.tap_internal_key, &root),
            Err(Musig2Error::TapOutputKeyMismatch { .. })
        ));

        assert!(matches!(
            validate_participants(&p, &p.tap_output_key, &root),
            Err(Musig2Error::InputTapInternalKeyMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_nonces() {
        let p = participants();
        let nonce = |pk: CompressedPublicKey, seed: u8| Musig2PubNonce {
            participant_pub_key: pk,
            tap_output_key: p.tap_output_key,
            pub_nonce: pub_nonce(seed),
        };

        let ok = [nonce(p.participant_pub_keys[0], 1), nonce(p.participant_pub_keys[1], 2)];
        validate_nonces(&ok, &p).unwrap();

        let twice = [nonce(p.participant_pub_keys[0], 1), nonce(p.participant_pub_keys[0], 2)];
        assert!(matches!(
            validate_nonces(&twice, &p),
            Err(Musig2Error::DuplicateNonce(_))
        ));

        let stranger = [nonce(compressed_pubkey(7), 1)];
        assert!(matches!(
            validate_nonces(&stranger, &p),
            Err(Musig2Error::UnknownParticipant(_))
        ));
    }
}
