#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Invalid recognizer output in {source_name}: {reason}")]
    InvalidRecognition { source_name: String, reason: String },

    #[error("Could not load {path}: {reason}")]
    Settings { path: String, reason: String },
}
