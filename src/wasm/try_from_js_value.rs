use crate::error::WasmUtxoError;
use crate::inscriptions::{LayoutConstraints, TapLeafScript};
use wasm_bindgen::JsValue;

/// Trait for converting JsValue to Rust types
pub(crate) trait TryFromJsValue: Sized {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmUtxoError>;
}

impl TryFromJsValue for u8 {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmUtxoError> {
        let n = value
            .as_f64()
            .ok_or_else(|| WasmUtxoError::new("Expected a number"))?;
        if n.fract() != 0.0 || !(0.0..=u8::MAX as f64).contains(&n) {
            return Err(WasmUtxoError::new(&format!("{} is not a u8", n)));
        }
        Ok(n as u8)
    }
}

/// Accepts a bigint or a safe integer number
impl TryFromJsValue for u64 {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmUtxoError> {
        if value.is_bigint() {
            return u64::try_from(value.clone())
                .map_err(|_| WasmUtxoError::new("bigint out of range for u64"));
        }
        let n = value
            .as_f64()
            .ok_or_else(|| WasmUtxoError::new("Expected a number or bigint"))?;
        const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
        if n.fract() != 0.0 || !(0.0..=MAX_SAFE_INTEGER).contains(&n) {
            return Err(WasmUtxoError::new(&format!(
                "{} is not a non-negative safe integer",
                n
            )));
        }
        Ok(n as u64)
    }
}

impl TryFromJsValue for Vec<u8> {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmUtxoError> {
        let buffer = js_sys::Uint8Array::new(value);
        let mut bytes = vec![0u8; buffer.length() as usize];
        buffer.copy_to(&mut bytes);
        Ok(bytes)
    }
}

impl<T: TryFromJsValue> TryFromJsValue for Option<T> {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmUtxoError> {
        if value.is_undefined() || value.is_null() {
            Ok(None)
        } else {
            T::try_from_js_value(value).map(Some)
        }
    }
}

fn get_raw_field(obj: &JsValue, key: &str) -> Result<JsValue, WasmUtxoError> {
    js_sys::Reflect::get(obj, &JsValue::from_str(key))
        .map_err(|_| WasmUtxoError::new(&format!("Failed to read {} from object", key)))
}

/// Get a field and convert it using TryFromJsValue
pub(crate) fn get_field<T: TryFromJsValue>(obj: &JsValue, key: &str) -> Result<T, WasmUtxoError> {
    let field_value = get_raw_field(obj, key)?;
    T::try_from_js_value(&field_value)
        .map_err(|e| WasmUtxoError::new(&format!("{} (field: {})", e, key)))
}

impl TryFromJsValue for TapLeafScript {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmUtxoError> {
        Ok(TapLeafScript {
            leaf_version: get_field(value, "leafVersion")?,
            script: get_field(value, "script")?,
            control_block: get_field(value, "controlBlock")?,
        })
    }
}

/// Missing fields keep their default value
impl TryFromJsValue for LayoutConstraints {
    fn try_from_js_value(value: &JsValue) -> Result<Self, WasmUtxoError> {
        let defaults = LayoutConstraints::default();
        Ok(LayoutConstraints {
            min_change_output: get_field::<Option<u64>>(value, "minChangeOutput")?
                .unwrap_or(defaults.min_change_output),
            min_inscription_output: get_field::<Option<u64>>(value, "minInscriptionOutput")?
                .unwrap_or(defaults.min_inscription_output),
            max_inscription_output: get_field::<Option<u64>>(value, "maxInscriptionOutput")?
                .unwrap_or(defaults.max_inscription_output),
        })
    }
}
