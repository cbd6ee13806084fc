//! CHD参照語彙モジュール
//!
//! 専門家が検証したCHD一覧（CHD名 → ICD-11コード、参照番号）を管理する。
//! CSVから読み込み、正規化したCHD名で引けるようにする。

use crate::error::{Error, Result};
use crate::types::ReferenceEntry;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// CHD名の正規化（前後空白除去 + 小文字化）
///
/// 語彙の読み込みと全マッチング戦略がこの関数を共有する。
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// 参照語彙全体
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    /// 参照テーブルの行順
    entries: Vec<ReferenceEntry>,
    /// entriesと同じ順の正規化済みCHD名
    keys: Vec<String>,
    /// 正規化CHD名 → entriesの添字
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// CSVファイルから読み込み
    pub fn from_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Load(format!("reference file not found: {}", path.display())));
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// CSV文字列から読み込み
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_reader(content.as_bytes())
    }

    /// CSVリーダーから読み込み
    ///
    /// 必須列: `chd_name`, `icd11_code`。任意列: `reference_number`。
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let name_idx = find_header_index(&headers, "chd_name")
            .ok_or_else(|| Error::Load("reference table is missing column `chd_name`".into()))?;
        let code_idx = find_header_index(&headers, "icd11_code")
            .ok_or_else(|| Error::Load("reference table is missing column `icd11_code`".into()))?;
        let ref_idx = find_header_index(&headers, "reference_number");

        let mut entries = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let record = record?;
            let chd_name = field_at(&record, Some(name_idx));
            if chd_name.is_empty() {
                log::warn!("reference row {} has an empty chd_name, skipping", row_idx);
                continue;
            }

            let reference_number = Some(field_at(&record, ref_idx)).filter(|s| !s.is_empty());
            entries.push(ReferenceEntry {
                chd_name,
                icd11_code: field_at(&record, Some(code_idx)),
                reference_number,
            });
        }

        Self::from_entries(entries)
    }

    /// エントリ列から構築
    ///
    /// 正規化名が重複した場合は先勝ち。空の語彙はエラー。
    pub fn from_entries(entries: Vec<ReferenceEntry>) -> Result<Self> {
        let mut vocabulary = Self::default();

        for entry in entries {
            let key = normalize_name(&entry.chd_name);
            if key.is_empty() {
                continue;
            }
            if vocabulary.index.contains_key(&key) {
                log::warn!("duplicate CHD name in reference table: {}", entry.chd_name);
                continue;
            }
            vocabulary.index.insert(key.clone(), vocabulary.entries.len());
            vocabulary.keys.push(key);
            vocabulary.entries.push(entry);
        }

        if vocabulary.entries.is_empty() {
            return Err(Error::Load("reference table is empty".into()));
        }

        Ok(vocabulary)
    }

    /// CHD名で検索（大文字小文字・前後空白を無視）
    pub fn lookup(&self, name: &str) -> Option<&ReferenceEntry> {
        self.index
            .get(&normalize_name(name))
            .map(|&i| &self.entries[i])
    }

    /// (正規化名, エントリ) の組を行順で返す
    pub fn normalized_entries(&self) -> impl Iterator<Item = (&str, &ReferenceEntry)> {
        self.keys.iter().map(String::as_str).zip(self.entries.iter())
    }

    /// 参照テーブル上の表記でCHD名一覧を取得
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.chd_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// ヘッダー名で列番号を探す（大文字小文字・前後空白を無視）
pub fn find_header_index(headers: &StringRecord, name: &str) -> Option<usize> {
    let target = normalize_name(name);
    headers.iter().position(|h| normalize_name(h) == target)
}

/// 列番号のフィールドを取得（列が無い・短い行は空文字）
pub fn field_at(record: &StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .unwrap_or("")
        .to_string()
}
