//! Inscription support for Bitcoin Ordinals
//!
//! Envelope scripts and reveal transactions, plus the output layout of
//! transactions that move an inscribed sat between wallets.
//!
//! See: https://docs.ordinals.com/inscriptions.html

mod dimensions;
mod envelope;
mod error;
mod layout;
mod psbt;
mod reveal;
mod satpoint;

pub use dimensions::{Dimensions, InputScriptType, SizeBound};
pub use envelope::build_inscription_script;
pub use error::InscriptionError;
pub use layout::{
    find_output_layout, layout_for_padding, FeeModel, InscriptionInput, LayoutConstraints,
    OutputLayout, Padding,
};
pub use psbt::{
    create_psbt_for_single_inscription_passing_transaction, create_psbt_from_output_layout,
    find_output_layout_for_unspents, InscriptionOutputs, Unspent,
};
pub use reveal::{
    create_inscription_reveal_data, create_output_script_for_inscription,
    sign_reveal_transaction, InscriptionRevealData, TapLeafScript,
};
pub use satpoint::{is_sat_point, SatPoint};
