// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_wasm_bindgen::{Error, Serializer};
use wasm_bindgen::JsValue;

/// Serialize any value into a plain JavaScript value.
///
/// Structs become plain objects and missing optional fields become `null`, so the result can be
/// handed to `JSON.stringify` as is.
pub fn serialize_to_js<T>(value: &T) -> Result<JsValue, Error>
where
    T: Serialize + ?Sized,
{
    let serializer = Serializer::json_compatible();
    value.serialize(&serializer)
}

/// Read a value from a JavaScript object.
pub fn deserialize_from_js<T>(value: JsValue) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    serde_wasm_bindgen::from_value(value)
}
