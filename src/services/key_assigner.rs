//! 键分配服务 - 业务能力层
//!
//! 只负责"为每个文档分配唯一键"能力：键取文件名去掉扩展名后的主干，
//! 同一批次内的键必须两两不同，冲突在任何网络调用之前就报错

use crate::error::{AppError, AppResult, BatchError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 一个待提交的文档：路径、唯一键、媒体类型
#[derive(Clone, Debug)]
pub struct DocumentInput {
    pub path: PathBuf,
    pub key: String,
    pub media_type: String,
}

/// 为一批文档分配唯一键并推断媒体类型
///
/// # 参数
/// - `documents`: 文档路径列表
///
/// # 返回
/// 按输入顺序返回 `DocumentInput` 列表；任意两个文档主干相同时
/// 返回 `DuplicateKey` 错误
pub fn assign_keys(documents: &[PathBuf]) -> AppResult<Vec<DocumentInput>> {
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut inputs = Vec::with_capacity(documents.len());

    for path in documents {
        let key = document_key(path)?;

        if let Some(first) = seen.get(&key) {
            return Err(AppError::duplicate_key(
                key,
                first.display().to_string(),
                path.display().to_string(),
            ));
        }
        seen.insert(key.clone(), path.clone());

        inputs.push(DocumentInput {
            path: path.clone(),
            key,
            media_type: infer_media_type(path),
        });
    }

    Ok(inputs)
}

/// 从文档路径得出唯一键（文件名主干）
pub fn document_key(path: &Path) -> AppResult<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            AppError::Batch(BatchError::InvalidDocumentPath {
                path: path.display().to_string(),
            })
        })
}

/// 按扩展名推断媒体类型，未知类型回退为 PDF
pub fn infer_media_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/pdf")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, BatchError};

    #[test]
    fn test_assign_keys_distinct_stems() {
        let documents = vec![
            PathBuf::from("pages/page-001.pdf"),
            PathBuf::from("pages/page-002.pdf"),
            PathBuf::from("pages/page-003.pdf"),
        ];

        let inputs = assign_keys(&documents).expect("主干互不相同时应该成功");

        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0].key, "page-001");
        assert_eq!(inputs[1].key, "page-002");
        assert_eq!(inputs[2].key, "page-003");
    }

    #[test]
    fn test_assign_keys_duplicate_stems() {
        // 不同目录下的同名文件会得出相同的键
        let documents = vec![
            PathBuf::from("a/page-001.pdf"),
            PathBuf::from("b/page-001.pdf"),
        ];

        let err = assign_keys(&documents).expect_err("主干重复时应该报错");
        match err {
            AppError::Batch(BatchError::DuplicateKey { key, .. }) => {
                assert_eq!(key, "page-001");
            }
            other => panic!("预期 DuplicateKey 错误，实际: {:?}", other),
        }
    }

    #[test]
    fn test_infer_media_type() {
        assert_eq!(
            infer_media_type(Path::new("doc.pdf")),
            "application/pdf"
        );
        assert_eq!(infer_media_type(Path::new("notes.txt")), "text/plain");
        // 未知扩展名回退为 PDF
        assert_eq!(
            infer_media_type(Path::new("mystery.zzz")),
            "application/pdf"
        );
    }
}
