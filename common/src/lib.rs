//! CHD Mapper Common Library
//!
//! 胎児超音波レポートをCHD語彙・ICD-11コードへ対応付けるコアロジック

pub mod types;
pub mod error;
pub mod vocabulary;
pub mod prompts;
pub mod parser;
pub mod matcher;
pub mod expander;

pub use types::{
    ConfidenceClass, MatchResult, OutputRecord, ReferenceEntry, Report, NO_CHD_IDENTIFIED,
    NO_REPORT_PROVIDED,
};
pub use error::{Error, InferenceError, Result};
pub use vocabulary::{normalize_name, Vocabulary};
pub use prompts::{build_chd_prompt, SYSTEM_INSTRUCTION};
pub use parser::parse_model_response;
pub use matcher::{
    AssertionMatcher, CompletionClient, MatchStrategy, Matcher, ModelMatcher, SubstringMatcher,
};
pub use expander::{error_record, expand};
