//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Load error: {0}")]
    Load(String),
}

/// 推論サービス呼び出しのエラー
///
/// レポート単位で回収され、エラーマーカー行として出力される。
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("empty response from model")]
    EmptyResponse,

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_load() {
        let error = Error::Load("missing column `chd_name`".to_string());
        assert_eq!(error.to_string(), "Load error: missing column `chd_name`");
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
    }

    #[test]
    fn test_inference_error_display() {
        let error = InferenceError::Status { status: 429, body: "rate limited".to_string() };
        let display = error.to_string();
        assert!(display.contains("429"));
        assert!(display.contains("rate limited"));

        assert_eq!(InferenceError::EmptyResponse.to_string(), "empty response from model");
    }
}
