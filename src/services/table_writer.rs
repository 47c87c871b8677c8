//! 表格落盘服务 - 业务能力层
//!
//! 只负责"把提取出的表格写成 CSV 文件"能力：
//! 文件名由文档键与 1 起始的序号组成，目录不存在时自动创建

use crate::error::{AppError, AppResult, FileError};
use crate::services::table_extractor::ExtractedTable;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// 表格落盘服务
pub struct TableWriter {
    output_dir: PathBuf,
}

impl TableWriter {
    /// 创建新的表格落盘服务
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 某个键的第 index 个表格的输出路径
    pub fn artifact_path(&self, key: &str, index: usize) -> PathBuf {
        self.output_dir.join(format!("{}-{}.csv", key, index))
    }

    /// 写入一个文档键下的全部表格
    ///
    /// # 参数
    /// - `key`: 文档键（或回退命名）
    /// - `tables`: 提取出的表格列表
    ///
    /// # 返回
    /// 返回写入的表格数量
    pub fn write_tables(&self, key: &str, tables: &[ExtractedTable]) -> AppResult<usize> {
        if tables.is_empty() {
            return Ok(0);
        }

        self.ensure_output_dir()?;

        for table in tables {
            let path = self.artifact_path(key, table.index);
            fs::write(&path, &table.content)
                .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
            info!("💾 表格已保存: {}", path.display());
        }

        Ok(tables.len())
    }

    fn ensure_output_dir(&self) -> AppResult<()> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir).map_err(|e| {
                AppError::File(FileError::CreateDirFailed {
                    path: self.output_dir.display().to_string(),
                    source: Box::new(e),
                })
            })?;
        }
        Ok(())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(index: usize, content: &str) -> ExtractedTable {
        ExtractedTable {
            index,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_write_tables_naming_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TableWriter::new(dir.path());

        let count = writer
            .write_tables("page-001", &[table(1, "a,b\n1,2"), table(2, "c,d")])
            .unwrap();

        assert_eq!(count, 2);
        let first = fs::read_to_string(dir.path().join("page-001-1.csv")).unwrap();
        assert_eq!(first, "a,b\n1,2");
        let second = fs::read_to_string(dir.path().join("page-001-2.csv")).unwrap();
        assert_eq!(second, "c,d");
    }

    #[test]
    fn test_write_tables_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("result").join("nested");
        let writer = TableWriter::new(&nested);

        writer.write_tables("k", &[table(1, "x")]).unwrap();

        assert!(nested.join("k-1.csv").exists());
    }

    #[test]
    fn test_write_tables_empty_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("untouched");
        let writer = TableWriter::new(&nested);

        let count = writer.write_tables("k", &[]).unwrap();

        assert_eq!(count, 0);
        // 没有表格时不应创建目录
        assert!(!nested.exists());
    }
}
