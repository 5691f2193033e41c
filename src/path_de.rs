use serde::de::DeserializeOwned;
use serde_json::Value;

/// A deserialization failure together with the JSON path it occurred at.
#[derive(Debug, Clone)]
pub struct PathError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at JSON path {} → {}", self.path, self.message)
    }
}

impl std::error::Error for PathError {}

impl From<serde_path_to_error::Error<serde_json::Error>> for PathError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        Self { path, message: err.into_inner().to_string() }
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    Ok(serde_path_to_error::deserialize::<_, T>(de)?)
}

/// Same as [`from_str_with_path`] for an already parsed document.
pub fn from_value_with_path<T: DeserializeOwned>(value: &Value) -> Result<T, PathError> {
    // `&Value` is itself a deserializer, so no clone of the document is made.
    Ok(serde_path_to_error::deserialize::<_, T>(value)?)
}
