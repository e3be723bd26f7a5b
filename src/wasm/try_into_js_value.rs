use crate::error::WasmUtxoError;
use crate::inscriptions::{InscriptionRevealData, OutputLayout, Padding, TapLeafScript};
use wasm_bindgen::JsValue;

pub(crate) trait TryIntoJsValue {
    fn try_to_js_value(&self) -> Result<JsValue, WasmUtxoError>;
}

macro_rules! js_obj {
    ( $( $key:expr => $value:expr ),* ) => {{
        let obj = js_sys::Object::new();
        $(
            js_sys::Reflect::set(&obj, &$key.into(), &$value.try_to_js_value()?.into())
                .map_err(|_| WasmUtxoError::new("Failed to set object property"))?;
        )*
        Ok(Into::<JsValue>::into(obj)) as Result<JsValue, WasmUtxoError>
    }};
}

impl From<WasmUtxoError> for JsValue {
    fn from(err: WasmUtxoError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

impl TryIntoJsValue for String {
    fn try_to_js_value(&self) -> Result<JsValue, WasmUtxoError> {
        Ok(JsValue::from_str(self))
    }
}

impl TryIntoJsValue for usize {
    fn try_to_js_value(&self) -> Result<JsValue, WasmUtxoError> {
        Ok(JsValue::from_f64(*self as f64))
    }
}

impl TryIntoJsValue for u32 {
    fn try_to_js_value(&self) -> Result<JsValue, WasmUtxoError> {
        Ok(JsValue::from_f64(*self as f64))
    }
}

// amounts cross the boundary as bigint
impl TryIntoJsValue for u64 {
    fn try_to_js_value(&self) -> Result<JsValue, WasmUtxoError> {
        Ok(js_sys::BigInt::from(*self).into())
    }
}

impl TryIntoJsValue for Vec<u8> {
    fn try_to_js_value(&self) -> Result<JsValue, WasmUtxoError> {
        Ok(js_sys::Uint8Array::from(self.as_slice()).into())
    }
}

impl TryIntoJsValue for TapLeafScript {
    fn try_to_js_value(&self) -> Result<JsValue, WasmUtxoError> {
        js_obj!(
            "leafVersion" => self.leaf_version as u32,
            "script" => self.script.clone(),
            "controlBlock" => self.control_block.clone()
        )
    }
}

impl TryIntoJsValue for InscriptionRevealData {
    fn try_to_js_value(&self) -> Result<JsValue, WasmUtxoError> {
        js_obj!(
            "outputScript" => self.output_script.clone(),
            "revealTransactionVSize" => self.reveal_transaction_vsize,
            "tapLeafScript" => self.tap_leaf_script.clone()
        )
    }
}

impl TryIntoJsValue for Padding {
    fn try_to_js_value(&self) -> Result<JsValue, WasmUtxoError> {
        let padding = match self {
            Padding::None => "none",
            Padding::Start => "start",
            Padding::End => "end",
            Padding::Both => "both",
        };
        Ok(JsValue::from_str(padding))
    }
}

impl TryIntoJsValue for OutputLayout {
    fn try_to_js_value(&self) -> Result<JsValue, WasmUtxoError> {
        js_obj!(
            "firstChangeOutput" => self.first_change_output,
            "inscriptionOutput" => self.inscription_output,
            "secondChangeOutput" => self.second_change_output,
            "feeOutput" => self.fee_output,
            "padding" => self.padding()
        )
    }
}
