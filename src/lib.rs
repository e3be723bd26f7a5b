mod error;
pub mod inscriptions;
pub mod musig2;
#[cfg(test)]
mod test_utils;

// re-export bitcoin from the miniscript crate
pub use ::miniscript::bitcoin;

pub use error::WasmUtxoError;

pub mod wasm;
pub use wasm::{InscriptionsNamespace, Musig2Namespace, Musig2Psbt};
