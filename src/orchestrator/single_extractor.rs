//! 单文档同步提取流程 - 编排层
//!
//! 上传一个文档，同步调用模型，提取并落盘表格。
//! 与批处理流程不同，这里要求文档必含表格：零匹配视为错误

use crate::api::gemini::GenerateRequest;
use crate::clients::GeminiApi;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::key_assigner::{document_key, infer_media_type};
use crate::services::table_extractor::TableExtractor;
use crate::services::table_writer::TableWriter;
use std::fs;
use std::path::Path;
use tracing::info;

/// 提取单个文档中的表格并保存为 CSV 文件
///
/// # 参数
/// - `client`: 外部服务客户端
/// - `config`: 程序配置
/// - `prompt_path`: 提示词文件路径
/// - `document`: 文档路径
///
/// # 返回
/// 返回保存的表格数量；响应中没有任何表格时返回 `NoTablesFound`
pub async fn extract_and_save<C: GeminiApi>(
    client: &C,
    config: &Config,
    prompt_path: &Path,
    document: &Path,
) -> AppResult<usize> {
    let prompt = fs::read_to_string(prompt_path)
        .map_err(|e| AppError::file_read_failed(prompt_path.display().to_string(), e))?;

    let key = document_key(document)?;
    let media_type = infer_media_type(document);

    info!("📤 上传文件: {}", document.display());
    let bytes = fs::read(document)
        .map_err(|e| AppError::file_read_failed(document.display().to_string(), e))?;
    let uploaded = client
        .upload_file(bytes, &media_type, Some(&key))
        .await
        .map_err(|e| AppError::upload_failed(document.display().to_string(), e))?;
    info!("✓ 上传完成: {}", uploaded.uri);

    info!("🤖 正在调用模型生成内容...");
    let model = format!("models/{}", config.model_name);
    let request = GenerateRequest::for_document(&uploaded.uri, &media_type, &prompt);
    let response = client.generate_content(&model, &request).await?;

    let Some(response_text) = response.first_text() else {
        return Err(AppError::no_tables_found(&key));
    };

    let extractor = TableExtractor::new();
    let tables = extractor.extract(response_text);
    if tables.is_empty() {
        return Err(AppError::no_tables_found(&key));
    }

    let writer = TableWriter::new(&config.output_dir);
    let count = writer.write_tables(&key, &tables)?;

    info!("✅ 成功提取 {} 个表格", count);
    Ok(count)
}
