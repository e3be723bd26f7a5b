/// Error types for the MuSig2 key-value protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Musig2Error {
    /// Invalid identifier (expected BITGO)
    InvalidIdentifier { got: String },
    /// Invalid subtype for the operation
    InvalidSubtype { expected: u8, got: u8 },
    /// Subtype is not part of the BitGo MuSig2 set
    UnsupportedSubtype(u8),
    /// Invalid keydata length
    InvalidKeydataLength { expected: usize, got: usize },
    /// Invalid value length
    InvalidValueLength { expected: String, got: usize },
    /// Bytes of the right length that do not parse as a key
    InvalidPublicKey(String),
    InvalidPubNonce(String),
    InvalidPartialSignature(String),
    /// Duplicate participant public keys
    DuplicateParticipantKeys,
    /// Too many key-values found
    TooManyKeyValues { expected: usize, got: usize },
    InvalidSessionIdLength(usize),
    /// The OS random source failed while seeding a nonce
    Entropy(String),
    InputIndexOutOfBounds { input_index: usize, input_count: usize },
    MissingTapInternalKey { input_index: usize },
    MissingTapMerkleRoot { input_index: usize },
    MissingTapKeyOrigins { input_index: usize },
    /// Missing participants
    MissingParticipants,
    MissingPrivateKey,
    MissingUtxo { input_index: usize },
    /// Fewer than two nonces on an input that is being signed or finalized
    MissingNonces { got: usize },
    MissingPartialSignatures { got: usize },
    /// No tap key origin carries the fingerprint of the root key
    NoMatchingFingerprint { fingerprint: String },
    /// Fingerprint matched but no derivation reproduced the origin key
    NoMatchingDerivation,
    AmbiguousDerivation { count: usize },
    UnsupportedSighashType(String),
    TapInternalKeyMismatch { expected: String, got: String },
    /// Tap output key mismatch
    TapOutputKeyMismatch { expected: String, got: String },
    /// Participant record disagrees with the input's own tap_internal_key
    InputTapInternalKeyMismatch { expected: String, got: String },
    ParticipantKeyNotFound(String),
    /// Nonce or signature record that does not belong to the participant set
    UnknownParticipant(String),
    DuplicateNonce(String),
    DuplicatePartialSig(String),
    /// Signing session is bound to a different message than the input sighash
    SessionMessageMismatch { expected: String, got: String },
    KeyDerivation(String),
    Sighash(String),
    Signing(String),
    /// Signature aggregation error
    SignatureAggregation(String),
}

impl std::fmt::Display for Musig2Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Musig2Error::InvalidIdentifier { got } => {
                write!(f, "Invalid identifier, expected BITGO, got {}", got)
            }
            Musig2Error::InvalidSubtype { expected, got } => {
                write!(f, "Invalid subtype: expected {}, got {}", expected, got)
            }
            Musig2Error::UnsupportedSubtype(subtype) => {
                write!(f, "Unsupported BitGo proprietary key subtype: {}", subtype)
            }
            Musig2Error::InvalidKeydataLength { expected, got } => {
                write!(
                    f,
                    "Invalid keydata length: expected {}, got {}",
                    expected, got
                )
            }
            Musig2Error::InvalidValueLength { expected, got } => {
                write!(
                    f,
                    "Invalid value length: expected {}, got {}",
                    expected, got
                )
            }
            Musig2Error::InvalidPublicKey(msg) => write!(f, "Invalid public key: {}", msg),
            Musig2Error::InvalidPubNonce(msg) => write!(f, "Invalid public nonce: {}", msg),
            Musig2Error::InvalidPartialSignature(msg) => {
                write!(f, "Invalid partial signature: {}", msg)
            }
            Musig2Error::DuplicateParticipantKeys => {
                write!(f, "Duplicate participant public keys found")
            }
            Musig2Error::TooManyKeyValues { expected, got } => {
                write!(
                    f,
                    "Too many key-values: expected up to {}, got {}",
                    expected, got
                )
            }
            Musig2Error::InvalidSessionIdLength(len) => {
                write!(f, "Invalid sessionId size {}, expected 32", len)
            }
            Musig2Error::Entropy(msg) => write!(f, "Failed to gather nonce entropy: {}", msg),
            Musig2Error::InputIndexOutOfBounds {
                input_index,
                input_count,
            } => write!(
                f,
                "Input index {} out of bounds, psbt has {} inputs",
                input_index, input_count
            ),
            Musig2Error::MissingTapInternalKey { input_index } => {
                write!(f, "tapInternalKey is required on input {}", input_index)
            }
            Musig2Error::MissingTapMerkleRoot { input_index } => {
                write!(f, "tapMerkleRoot is required on input {}", input_index)
            }
            Musig2Error::MissingTapKeyOrigins { input_index } => {
                write!(f, "tapBip32Derivation is required on input {}", input_index)
            }
            Musig2Error::MissingParticipants => write!(f, "Missing participants"),
            Musig2Error::MissingPrivateKey => {
                write!(f, "private key is required to generate nonce")
            }
            Musig2Error::MissingUtxo { input_index } => {
                write!(f, "Missing UTXO data for input {}", input_index)
            }
            Musig2Error::MissingNonces { got } => {
                write!(f, "Exactly 2 public nonces are required, got {}", got)
            }
            Musig2Error::MissingPartialSignatures { got } => {
                write!(f, "Exactly 2 partial signatures are required, got {}", got)
            }
            Musig2Error::NoMatchingFingerprint { fingerprint } => write!(
                f,
                "Need one tapBip32Derivation masterFingerprint to match the root key fingerprint {}",
                fingerprint
            ),
            Musig2Error::NoMatchingDerivation => {
                write!(f, "root key should derive one tapBip32Derivation, found none")
            }
            Musig2Error::AmbiguousDerivation { count } => write!(
                f,
                "root key should derive one tapBip32Derivation, found {}",
                count
            ),
            Musig2Error::UnsupportedSighashType(ty) => {
                write!(f, "Unsupported sighash type for MuSig2 key path: {}", ty)
            }
            Musig2Error::TapInternalKeyMismatch { expected, got } => write!(
                f,
                "Tap internal key mismatch: expected {}, got {}",
                expected, got
            ),
            Musig2Error::TapOutputKeyMismatch { expected, got } => {
                write!(
                    f,
                    "Tap output key mismatch: expected {}, got {}",
                    expected, got
                )
            }
            Musig2Error::InputTapInternalKeyMismatch { expected, got } => write!(
                f,
                "Participant tap internal key {} does not match input tapInternalKey {}",
                got, expected
            ),
            Musig2Error::ParticipantKeyNotFound(key) => {
                write!(f, "Derived key {} is not a MuSig2 participant", key)
            }
            Musig2Error::UnknownParticipant(key) => {
                write!(f, "Key-value for unknown participant {}", key)
            }
            Musig2Error::DuplicateNonce(key) => {
                write!(f, "Public nonce for participant {} already present", key)
            }
            Musig2Error::DuplicatePartialSig(key) => {
                write!(f, "Partial signature for participant {} already present", key)
            }
            Musig2Error::SessionMessageMismatch { expected, got } => write!(
                f,
                "Signing session message {} does not match input sighash {}",
                got, expected
            ),
            Musig2Error::KeyDerivation(msg) => write!(f, "Key derivation failed: {}", msg),
            Musig2Error::Sighash(msg) => write!(f, "Failed to compute sighash: {}", msg),
            Musig2Error::Signing(msg) => write!(f, "Partial signing failed: {}", msg),
            Musig2Error::SignatureAggregation(msg) => {
                write!(f, "Signature aggregation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Musig2Error {}
