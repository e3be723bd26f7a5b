mod inscriptions;
mod musig2;
mod try_from_js_value;
mod try_into_js_value;

pub use inscriptions::InscriptionsNamespace;
pub use musig2::{Musig2Namespace, Musig2Psbt};
