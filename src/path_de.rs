use serde::de::DeserializeOwned;

use crate::error::ModelError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, ModelError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(ModelError::Json(format!("at JSON path {path} → {}", err.into_inner())))
        }
    }
}

/// Same as [`from_str_with_path`] for an already-parsed document.
pub fn from_value_with_path<T: DeserializeOwned>(
    value: serde_json::Value,
) -> Result<T, ModelError> {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(ModelError::Json(format!("at JSON path {path} → {}", err.into_inner())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize, Debug)]
    #[allow(dead_code)]
    struct Outer { inner: Vec<Inner> }

    #[derive(serde::Deserialize, Debug)]
    #[allow(dead_code)]
    struct Inner { n: u32 }

    #[test]
    fn error_carries_path() {
        let err = from_str_with_path::<Outer>(r#"{"inner":[{"n":1},{"n":"x"}]}"#).unwrap_err();
        assert!(err.to_string().contains("inner[1].n"), "{err}");
    }
}
