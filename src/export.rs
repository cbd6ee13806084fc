use crate::error::{MapperError, Result};
use chd_mapper_common::OutputRecord;
use std::io::Write;
use std::path::Path;

/// 出力テーブルの列（この順で書き出す）
pub const OUTPUT_COLUMNS: &[&str] = &[
    "scan_id",
    "report",
    "chd_name",
    "icd11_code",
    "reference_number",
    "confidence_class",
];

/// 出力CSVを書き出す（親ディレクトリが無ければ作成）
pub fn export_records(records: &[OutputRecord], output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| MapperError::Write(format!("{}: {}", parent.display(), e)))?;
    }

    let file = std::fs::File::create(output)
        .map_err(|e| MapperError::Write(format!("{}: {}", output.display(), e)))?;
    write_records(records, file)
        .map_err(|e| MapperError::Write(format!("{}: {}", output.display(), e)))
}

/// ヘッダー行付きで出力行を書き出す（値の無いセルは空）
pub fn write_records<W: Write>(records: &[OutputRecord], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(OUTPUT_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
