/// Errors from inscription scripts, output layouts and the transactions built from them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InscriptionError {
    /// The input value cannot pay for the inscription output and the fee
    InsufficientFunds { available: u64, required: u64 },
    /// No padding choice satisfies the output constraints
    NoValidLayout,
    /// The inscribed sat does not lie within the input value
    InvalidSatOffset { offset: u64, value: u64 },
    InvalidSatPoint(String),
    /// None of the unspents is the outpoint named by the satpoint
    SatPointNotFound(String),
    NoUnspents,
    LayoutMismatch { input_total: u64, layout_total: u64 },
    UnknownScriptType(String),
    Script(String),
    Taproot(String),
    InvalidControlBlock(String),
    CommitOutputNotFound,
    MultipleCommitOutputs(usize),
    Sighash(String),
    Psbt(String),
    /// An amount or fee does not fit in 64 bits
    AmountOverflow(String),
}

impl std::fmt::Display for InscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InscriptionError::InsufficientFunds {
                available,
                required,
            } => write!(
                f,
                "Insufficient funds: {} sat available, {} sat required",
                available, required
            ),
            InscriptionError::NoValidLayout => write!(f, "Could not find a valid output layout"),
            InscriptionError::InvalidSatOffset { offset, value } => write!(
                f,
                "Sat offset {} is outside of an input worth {} sat",
                offset, value
            ),
            InscriptionError::InvalidSatPoint(s) => write!(f, "Invalid satpoint: {}", s),
            InscriptionError::SatPointNotFound(s) => {
                write!(f, "No unspent matches satpoint {}", s)
            }
            InscriptionError::NoUnspents => write!(f, "At least one unspent is required"),
            InscriptionError::LayoutMismatch {
                input_total,
                layout_total,
            } => write!(
                f,
                "Input total {} does not match layout total {}",
                input_total, layout_total
            ),
            InscriptionError::UnknownScriptType(s) => write!(f, "Unknown script type: {}", s),
            InscriptionError::Script(msg) => write!(f, "Failed to build script: {}", msg),
            InscriptionError::Taproot(msg) => write!(f, "Failed to build taproot tree: {}", msg),
            InscriptionError::InvalidControlBlock(msg) => {
                write!(f, "Invalid control block: {}", msg)
            }
            InscriptionError::CommitOutputNotFound => {
                write!(f, "Commit output not found in transaction")
            }
            InscriptionError::MultipleCommitOutputs(n) => {
                write!(f, "Expected exactly one commit output, found {}", n)
            }
            InscriptionError::Sighash(msg) => write!(f, "Failed to compute sighash: {}", msg),
            InscriptionError::Psbt(msg) => write!(f, "Failed to create PSBT: {}", msg),
            InscriptionError::AmountOverflow(what) => write!(f, "Amount overflow: {}", what),
        }
    }
}

impl std::error::Error for InscriptionError {}
