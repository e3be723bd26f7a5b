use crate::inscriptions::InscriptionError;
use crate::musig2::Musig2Error;

/// Error type returned across the wasm boundary
#[derive(Debug, Clone)]
pub struct WasmUtxoError {
    message: String,
}

impl WasmUtxoError {
    pub fn new(message: &str) -> Self {
        WasmUtxoError {
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for WasmUtxoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for WasmUtxoError {}

impl From<&str> for WasmUtxoError {
    fn from(message: &str) -> Self {
        WasmUtxoError::new(message)
    }
}

impl From<String> for WasmUtxoError {
    fn from(message: String) -> Self {
        WasmUtxoError { message }
    }
}

impl From<Musig2Error> for WasmUtxoError {
    fn from(err: Musig2Error) -> Self {
        WasmUtxoError::new(&format!("MuSig2 error: {}", err))
    }
}

impl From<InscriptionError> for WasmUtxoError {
    fn from(err: InscriptionError) -> Self {
        WasmUtxoError::new(&format!("Inscription error: {}", err))
    }
}
