//! 批处理任务协调器 - 编排层
//!
//! 把一批 (提示词, 文档) 输入变成一个异步批处理任务，
//! 之后仅凭任务句柄即可恢复跟踪：查询状态、解析结果、落盘表格。
//! 协调器本身无状态，轮询节奏由持有句柄的调用方决定

use crate::api::gemini::{BatchRequestRecord, GenerateRequest, InlineResponse, JobState, ResultRecord};
use crate::clients::GeminiApi;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::services::key_assigner::assign_keys;
use crate::services::table_extractor::TableExtractor;
use crate::services::table_writer::TableWriter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// 批处理 JSONL 文件的展示名
const BATCH_FILE_DISPLAY_NAME: &str = "pdf-extraction-batch";
/// 批处理任务的展示名
const BATCH_JOB_DISPLAY_NAME: &str = "pdf-table-extraction-batch";

/// check 的综合结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// 任务仍在处理中
    Pending { state: JobState },
    /// 任务以非成功的终态结束
    Failed { state: JobState },
    /// 任务成功结束
    Succeeded {
        /// 本次共提取并落盘的表格数量
        tables_extracted: usize,
        /// 内联投递时服务端不回填键，无法恢复与原始文档的对应关系
        correlation_lost: bool,
    },
}

/// 结果解析统计
#[derive(Debug, Default)]
struct ResolutionStats {
    tables_extracted: usize,
    records_failed: usize,
    correlation_lost: bool,
}

/// 批处理任务协调器
pub struct BatchCoordinator<'a, C: GeminiApi> {
    client: &'a C,
    model_name: String,
    extractor: TableExtractor,
    writer: TableWriter,
}

impl<'a, C: GeminiApi> BatchCoordinator<'a, C> {
    /// 创建新的协调器
    pub fn new(client: &'a C, config: &Config) -> Self {
        Self {
            client,
            model_name: config.model_name.clone(),
            extractor: TableExtractor::new(),
            writer: TableWriter::new(&config.output_dir),
        }
    }

    /// 提交一批文档，返回任务句柄
    ///
    /// # 参数
    /// - `prompt_path`: 提示词文件路径（全部条目共用同一提示词）
    /// - `documents`: 文档路径列表
    ///
    /// # 返回
    /// 返回外部服务的任务名，后续 `poll`/`check` 仅需此句柄
    ///
    /// 键冲突在任何网络调用之前报错；任何一次上传失败都让
    /// 整次提交失败，服务端没有"向已有批次追加"的概念
    pub async fn submit(&self, prompt_path: &Path, documents: &[PathBuf]) -> AppResult<String> {
        let prompt = fs::read_to_string(prompt_path)
            .map_err(|e| AppError::file_read_failed(prompt_path.display().to_string(), e))?;

        // 纯本地校验，先于任何网络调用
        let inputs = assign_keys(documents)?;

        info!("📤 开始上传 {} 个文档...", inputs.len());
        let mut records = Vec::with_capacity(inputs.len());

        for input in &inputs {
            info!("  上传: {}", input.path.display());
            let bytes = fs::read(&input.path)
                .map_err(|e| AppError::file_read_failed(input.path.display().to_string(), e))?;
            let uploaded = self
                .client
                .upload_file(bytes, &input.media_type, Some(&input.key))
                .await
                .map_err(|e| AppError::upload_failed(input.path.display().to_string(), e))?;

            records.push(BatchRequestRecord {
                key: input.key.clone(),
                request: GenerateRequest::for_document(&uploaded.uri, &input.media_type, &prompt),
            });
        }

        // JSONL：一行一条记录
        let lines = records
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        let jsonl = lines.join("\n");

        info!("📦 创建批处理任务...");
        let staging = StagingFile::create(&jsonl)?;
        let jsonl_bytes = fs::read(staging.path())
            .map_err(|e| AppError::file_read_failed(staging.path().display().to_string(), e))?;
        let uploaded_jsonl = self
            .client
            .upload_file(jsonl_bytes, "text/plain", Some(BATCH_FILE_DISPLAY_NAME))
            .await?;

        let model = format!("models/{}", self.model_name);
        let job = self
            .client
            .create_batch(&model, &uploaded_jsonl.name, BATCH_JOB_DISPLAY_NAME)
            .await?;

        info!("✓ 批处理任务已创建: {}", job.name);
        info!("当前状态: {}", job.state());

        Ok(job.name)
        // staging 在此析构，暂存文件随之删除
    }

    /// 查询任务状态（单次非阻塞调用，从不等待完成）
    pub async fn poll(&self, job_name: &str) -> AppResult<JobState> {
        let resource = self.client.get_batch(job_name).await?;
        Ok(resource.state())
    }

    /// 查询任务并在成功时解析结果、落盘表格
    pub async fn check(&self, job_name: &str) -> AppResult<BatchOutcome> {
        info!("检查批处理任务: {}", job_name);
        let resource = self.client.get_batch(job_name).await?;
        let state = resource.state();
        info!("当前状态: {}", resource.state_name());

        if !state.is_terminal() {
            info!("任务仍在处理中，请稍后再查");
            return Ok(BatchOutcome::Pending { state });
        }

        if state != JobState::Succeeded {
            warn!("❌ 任务以状态 {} 结束", state);
            return Ok(BatchOutcome::Failed { state });
        }

        info!("任务已成功完成，开始解析结果...");
        let stats = match resource.dest() {
            Some(dest) if dest.file_name.is_some() => {
                let file_name = dest.file_name.as_deref().unwrap_or_default();
                self.resolve_file_results(file_name).await?
            }
            Some(dest) if dest.inlined_responses.is_some() => {
                let responses = dest.inlined_responses.as_deref().unwrap_or_default();
                self.resolve_inline_results(responses)?
            }
            _ => {
                warn!("成功的任务没有携带结果位置");
                ResolutionStats::default()
            }
        };

        info!(
            "✅ 批处理完成: 共提取 {} 个表格，{} 条记录失败",
            stats.tables_extracted, stats.records_failed
        );

        Ok(BatchOutcome::Succeeded {
            tables_extracted: stats.tables_extracted,
            correlation_lost: stats.correlation_lost,
        })
    }

    /// 解析文件投递的结果：逐行独立解析，单行损坏不影响其余记录
    async fn resolve_file_results(&self, file_name: &str) -> AppResult<ResolutionStats> {
        let bytes = self.client.download_file(file_name).await?;
        let text = String::from_utf8(bytes).map_err(|e| {
            AppError::Api(ApiError::InvalidResultEncoding {
                source: Box::new(e),
            })
        })?;

        let mut stats = ResolutionStats::default();

        for (line_number, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l)) {
            if line.trim().is_empty() {
                continue;
            }

            let record: ResultRecord = match serde_json::from_str(line) {
                Ok(record) => record,
                Err(e) => {
                    // 一条损坏的记录不能丢掉其余 N-1 条好记录
                    let err = ApiError::MalformedResultRecord {
                        line_number,
                        source: Box::new(e),
                    };
                    warn!("跳过损坏的结果记录: {}", err);
                    stats.records_failed += 1;
                    continue;
                }
            };

            let key = match &record.key {
                Some(key) => key.clone(),
                None => {
                    warn!("第 {} 行结果记录没有键，使用顺序命名", line_number);
                    format!("batch-result-{}", line_number)
                }
            };

            if let Some(error_payload) = &record.error {
                error!("处理 {} 失败: {}", key, error_payload);
                stats.records_failed += 1;
                continue;
            }

            match record.response.as_ref().and_then(|r| r.first_text()) {
                Some(response_text) => {
                    stats.tables_extracted += self.extract_and_write(&key, response_text)?;
                }
                None => {
                    // 响应文本缺失视为"没有表格"，不是错误
                    debug!("记录 {} 没有可用的响应文本", key);
                }
            }
        }

        Ok(stats)
    }

    /// 解析内联投递的结果：键不可恢复，使用带序号的回退命名
    fn resolve_inline_results(&self, responses: &[InlineResponse]) -> AppResult<ResolutionStats> {
        warn!("⚠️ 内联投递不携带文档键，无法恢复与原始文档的对应关系，输出使用顺序命名");

        let mut stats = ResolutionStats {
            correlation_lost: true,
            ..Default::default()
        };

        for (position, inline) in responses.iter().enumerate() {
            // 序号进入文件名，保证各条目的输出互不覆盖
            let fallback_key = format!("batch-result-{}", position + 1);

            if let Some(error_payload) = &inline.error {
                error!("响应 {} 返回错误: {}", position + 1, error_payload);
                stats.records_failed += 1;
                continue;
            }

            match inline.response.as_ref().and_then(|r| r.first_text()) {
                Some(response_text) => {
                    stats.tables_extracted += self.extract_and_write(&fallback_key, response_text)?;
                }
                None => {
                    debug!("响应 {} 没有可用的文本", position + 1);
                }
            }
        }

        Ok(stats)
    }

    /// 从一段响应文本中提取表格并落盘，返回表格数量
    fn extract_and_write(&self, key: &str, response_text: &str) -> AppResult<usize> {
        let tables = self.extractor.extract(response_text);
        if tables.is_empty() {
            info!("文档 {} 的响应中没有表格", key);
            return Ok(0);
        }
        self.writer.write_tables(key, &tables)
    }
}

// ========== 暂存文件 ==========

/// 批处理 JSONL 的本地暂存文件
///
/// 只在一次 submit 期间存在；Drop 时删除，任何退出路径都不留盘
struct StagingFile {
    path: PathBuf,
}

impl StagingFile {
    fn create(content: &str) -> AppResult<Self> {
        let path = std::env::temp_dir().join(format!(
            "batch-requests-{}-{}.jsonl",
            std::process::id(),
            chrono::Utc::now().timestamp_millis()
        ));
        fs::write(&path, content)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        debug!("暂存文件已写入: {}", path.display());
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!("删除暂存文件失败 ({}): {}", self.path.display(), e);
        }
    }
}
