use chd_mapper_common::InferenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`chd-mapper config --set-api-key YOUR_KEY` または環境変数 OPENAI_API_KEY で設定してください")]
    MissingApiKey,

    #[error("入力テーブルの読み込みに失敗: {0}")]
    Load(String),

    #[error("推論サービス呼び出しエラー: {0}")]
    Inference(#[from] InferenceError),

    #[error("出力テーブルの書き込みに失敗: {0}")]
    Write(String),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] chd_mapper_common::Error),
}

pub type Result<T> = std::result::Result<T, MapperError>;
