use crate::error::{MapperError, Result};
use chd_mapper_common::vocabulary::{field_at, find_header_index};
use chd_mapper_common::Report;
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;

/// 本文列の候補（先に見つかった方を使う）
const TEXT_COLUMNS: &[&str] = &["report", "reports"];

pub fn load_reports(path: &Path) -> Result<Vec<Report>> {
    if !path.exists() {
        return Err(MapperError::Load(format!(
            "reportsファイルが見つかりません: {}",
            path.display()
        )));
    }

    let file = std::fs::File::open(path)?;
    read_reports(file)
}

/// レポートテーブルを読み込む
///
/// `scan_id` 列は任意。無い・空のセルは `ROW_<行番号>` を合成する。
pub fn read_reports<R: Read>(reader: R) -> Result<Vec<Report>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let text_idx = TEXT_COLUMNS
        .iter()
        .find_map(|name| find_header_index(&headers, name))
        .ok_or_else(|| {
            MapperError::Load("reportsテーブルに `report` / `reports` 列がありません".into())
        })?;
    let scan_id_idx = find_header_index(&headers, "scan_id");

    let mut reports = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let scan_id = field_at(&record, scan_id_idx);
        let text = field_at(&record, Some(text_idx));
        reports.push(Report::new(Some(scan_id.as_str()), index, &text));
    }

    Ok(reports)
}
