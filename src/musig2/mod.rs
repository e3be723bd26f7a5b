//! MuSig2 co-signing of taproot key path inputs
//!
//! The protocol state lives in BitGo proprietary key-values on each PSBT input,
//! so it survives serialization and can be merged with `Psbt::combine`.

mod aggregation;
mod derive;
mod error;
mod keyvals;
mod nonces;
mod propkv;
mod sighash;
mod sign;

pub use aggregation::{
    create_aggregate_nonce, create_tap_internal_key, create_tap_output_key, create_tap_tweak,
    key_sort, Musig2SigningSession,
};
pub use derive::{derive_signer_key, HierarchicalKey, TapKeyOrigins};
pub use error::Musig2Error;
pub use keyvals::{
    parse_musig2_nonces, parse_musig2_partial_sigs, parse_musig2_participants, validate_nonces,
    validate_partial_sigs, validate_participants, Musig2Input, Musig2KeyValue, Musig2PartialSig,
    Musig2Participants, Musig2PubNonce,
};
pub use nonces::{create_musig2_nonce, generate_nonce, set_musig2_nonces, Musig2SecretNonces};
pub use propkv::{
    find_kv, is_bitgo_key, is_musig2_key, BitGoKeyValue, ProprietaryKey, ProprietaryKeySubtype,
    BITGO,
};
pub use sighash::taproot_key_spend_sighash;
pub use sign::{
    create_musig2_signing_session, finalize_musig2_input, sign_musig2_input, sign_musig2_inputs,
};
