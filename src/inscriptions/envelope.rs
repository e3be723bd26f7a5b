//! Ordinals envelope tapscript

use miniscript::bitcoin::opcodes::all::{OP_CHECKSIG, OP_ENDIF, OP_IF, OP_PUSHBYTES_0};
use miniscript::bitcoin::opcodes::OP_FALSE;
use miniscript::bitcoin::script::{Builder, PushBytes};
use miniscript::bitcoin::secp256k1::XOnlyPublicKey;
use miniscript::bitcoin::ScriptBuf;

use super::InscriptionError;

/// Largest data push allowed in tapscript
const MAX_PUSH_SIZE: usize = 520;

const PROTOCOL_ID: &[u8] = b"ord";
const CONTENT_TYPE_TAG: &[u8] = &[0x01];

fn push_bytes(data: &[u8]) -> Result<&PushBytes, InscriptionError> {
    <&PushBytes>::try_from(data).map_err(|e| InscriptionError::Script(e.to_string()))
}

/// Build the leaf script that carries an inscription
///
/// ```text
/// <pubkey> OP_CHECKSIG OP_FALSE OP_IF
///   "ord"
///   01 <content_type>
///   OP_0 <data_chunk_1> <data_chunk_2> ...
/// OP_ENDIF
/// ```
///
/// The body is split into pushes of at most 520 bytes. A content type longer than
/// one push is rejected.
pub fn build_inscription_script(
    internal_key: &XOnlyPublicKey,
    content_type: &str,
    data: &[u8],
) -> Result<ScriptBuf, InscriptionError> {
    if content_type.len() > MAX_PUSH_SIZE {
        return Err(InscriptionError::Script(format!(
            "content type is {} bytes, at most {} allowed",
            content_type.len(),
            MAX_PUSH_SIZE
        )));
    }

    let mut builder = Builder::new()
        .push_x_only_key(internal_key)
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_FALSE)
        .push_opcode(OP_IF)
        .push_slice(push_bytes(PROTOCOL_ID)?)
        .push_slice(push_bytes(CONTENT_TYPE_TAG)?)
        .push_slice(push_bytes(content_type.as_bytes())?)
        .push_opcode(OP_PUSHBYTES_0);

    for chunk in data.chunks(MAX_PUSH_SIZE) {
        builder = builder.push_slice(push_bytes(chunk)?);
    }

    Ok(builder.push_opcode(OP_ENDIF).into_script())
}
