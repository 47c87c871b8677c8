//! Gemini API 数据类型模块
//!
//! 定义与 Gemini 文件/批处理接口交互的全部请求与响应结构，
//! 包括 JSONL 批处理记录的序列化格式

use serde::{Deserialize, Serialize};
use std::fmt;

// ========== 批处理请求（JSONL 每行一条记录） ==========

/// 文档引用（已上传文件的 URI 与媒体类型）
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FileData {
    pub file_uri: String,
    pub mime_type: String,
}

/// 请求内容片段：文档引用或提示词文本
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum RequestPart {
    FileData { file_data: FileData },
    Text { text: String },
}

/// 单条请求内容
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// generateContent 请求体
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GenerateRequest {
    pub contents: Vec<RequestContent>,
}

impl GenerateRequest {
    /// 为单个文档构建请求：文档引用在前，用户提示词在后
    pub fn for_document(file_uri: &str, mime_type: &str, prompt: &str) -> Self {
        Self {
            contents: vec![
                RequestContent {
                    parts: vec![RequestPart::FileData {
                        file_data: FileData {
                            file_uri: file_uri.to_string(),
                            mime_type: mime_type.to_string(),
                        },
                    }],
                    role: None,
                },
                RequestContent {
                    parts: vec![RequestPart::Text {
                        text: prompt.to_string(),
                    }],
                    role: Some("user".to_string()),
                },
            ],
        }
    }
}

/// JSONL 批处理文件中的一行：键 + 请求体
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BatchRequestRecord {
    pub key: String,
    pub request: GenerateRequest,
}

// ========== 响应结构 ==========

/// generateContent 响应体
#[derive(Deserialize, Clone, Debug, Default)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// 按固定路径提取响应文本：第一个候选 → content → 第一个 part → text
    ///
    /// 任何一级字段缺失都返回 `None`，调用方将其视为"没有表格"
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// 结果文件中的一行：键 + 成功响应或错误负载
#[derive(Deserialize, Clone, Debug)]
pub struct ResultRecord {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub response: Option<GenerateResponse>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

// ========== 文件上传 ==========

/// 文件上传响应外层
#[derive(Deserialize, Clone, Debug)]
pub struct UploadFileResponse {
    pub file: FileResource,
}

/// 已上传文件的资源描述
#[derive(Deserialize, Clone, Debug)]
pub struct FileResource {
    /// 资源名（形如 `files/abc-123`），创建批处理任务时引用
    pub name: String,
    /// 文件内容 URI，写入批处理记录的 file_data
    #[serde(default)]
    pub uri: String,
    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
}

// ========== 批处理任务 ==========

/// 创建批处理任务的请求体
#[derive(Serialize, Debug)]
pub struct CreateBatchRequest {
    pub batch: BatchConfig,
}

#[derive(Serialize, Debug)]
pub struct BatchConfig {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "inputConfig")]
    pub input_config: BatchInputConfig,
}

#[derive(Serialize, Debug)]
pub struct BatchInputConfig {
    #[serde(rename = "fileName")]
    pub file_name: String,
}

/// 批处理任务资源（创建与查询共用）
#[derive(Deserialize, Clone, Debug)]
pub struct BatchResource {
    /// 任务名（形如 `batches/xyz`），即任务句柄
    pub name: String,
    #[serde(default)]
    pub metadata: Option<BatchMetadata>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BatchMetadata {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub dest: Option<BatchDest>,
}

/// 结果投递位置：文件或内联响应序列，两者只会出现其一
#[derive(Deserialize, Clone, Debug)]
pub struct BatchDest {
    #[serde(default, rename = "fileName")]
    pub file_name: Option<String>,
    #[serde(default, rename = "inlinedResponses")]
    pub inlined_responses: Option<Vec<InlineResponse>>,
}

/// 内联投递的单条响应（服务端不回填键）
#[derive(Deserialize, Clone, Debug)]
pub struct InlineResponse {
    #[serde(default)]
    pub response: Option<GenerateResponse>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl BatchResource {
    /// 外部状态字符串（缺失时视为未指定）
    pub fn state_name(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.state.as_deref())
            .unwrap_or("JOB_STATE_UNSPECIFIED")
    }

    /// 映射后的任务状态
    pub fn state(&self) -> JobState {
        JobState::from_external(self.state_name())
    }

    /// 结果投递位置（仅成功的任务会携带）
    pub fn dest(&self) -> Option<&BatchDest> {
        self.metadata.as_ref().and_then(|m| m.dest.as_ref())
    }
}

// ========== 任务状态 ==========

/// 批处理任务状态
///
/// `Pending` 是唯一的非终态；终态一旦到达不会再变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Succeeded,
    Failed,
    Cancelled,
    Expired,
}

impl JobState {
    /// 映射外部状态字符串；未知或运行中的状态一律视为 `Pending`
    pub fn from_external(state: &str) -> Self {
        match state {
            "JOB_STATE_SUCCEEDED" => JobState::Succeeded,
            "JOB_STATE_FAILED" => JobState::Failed,
            "JOB_STATE_CANCELLED" => JobState::Cancelled,
            "JOB_STATE_EXPIRED" => JobState::Expired,
            _ => JobState::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Pending)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Pending => "PENDING",
            JobState::Succeeded => "SUCCEEDED",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "CANCELLED",
            JobState::Expired => "EXPIRED",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_request_record_serialization() {
        let record = BatchRequestRecord {
            key: "page-001".to_string(),
            request: GenerateRequest::for_document(
                "https://files.example/abc",
                "application/pdf",
                "提取所有表格",
            ),
        };

        let line = serde_json::to_string(&record).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["key"], "page-001");
        assert_eq!(
            value["request"]["contents"][0]["parts"][0]["file_data"]["file_uri"],
            "https://files.example/abc"
        );
        assert_eq!(
            value["request"]["contents"][0]["parts"][0]["file_data"]["mime_type"],
            "application/pdf"
        );
        assert_eq!(value["request"]["contents"][1]["role"], "user");
        assert_eq!(
            value["request"]["contents"][1]["parts"][0]["text"],
            "提取所有表格"
        );
        // 文档引用部分不携带 role 字段
        assert!(value["request"]["contents"][0].get("role").is_none());
    }

    #[test]
    fn test_first_text_full_path() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"hello"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.first_text(), Some("hello"));
    }

    #[test]
    fn test_first_text_missing_fields() {
        // 各级字段缺失都不应 panic，而是返回 None
        let no_candidates: GenerateResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(no_candidates.first_text(), None);

        let no_content: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{}]}"#).unwrap();
        assert_eq!(no_content.first_text(), None);

        let empty_parts: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]}}]}"#).unwrap();
        assert_eq!(empty_parts.first_text(), None);

        let no_text: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{}]}}]}"#).unwrap();
        assert_eq!(no_text.first_text(), None);
    }

    #[test]
    fn test_result_record_with_error_payload() {
        let record: ResultRecord = serde_json::from_str(
            r#"{"key":"page-002","error":{"code":500,"message":"internal"}}"#,
        )
        .unwrap();
        assert_eq!(record.key.as_deref(), Some("page-002"));
        assert!(record.response.is_none());
        assert!(record.error.is_some());
    }

    #[test]
    fn test_job_state_mapping() {
        assert_eq!(
            JobState::from_external("JOB_STATE_SUCCEEDED"),
            JobState::Succeeded
        );
        assert_eq!(JobState::from_external("JOB_STATE_FAILED"), JobState::Failed);
        assert_eq!(
            JobState::from_external("JOB_STATE_CANCELLED"),
            JobState::Cancelled
        );
        assert_eq!(
            JobState::from_external("JOB_STATE_EXPIRED"),
            JobState::Expired
        );
        // 非终态与未知状态一律映射为 Pending
        assert_eq!(JobState::from_external("JOB_STATE_PENDING"), JobState::Pending);
        assert_eq!(JobState::from_external("JOB_STATE_RUNNING"), JobState::Pending);
        assert_eq!(JobState::from_external("SOMETHING_NEW"), JobState::Pending);
        assert!(JobState::Succeeded.is_terminal());
        assert!(!JobState::Pending.is_terminal());
    }

    #[test]
    fn test_batch_resource_state_and_dest() {
        let resource: BatchResource = serde_json::from_str(
            r#"{
                "name": "batches/xyz",
                "metadata": {
                    "state": "JOB_STATE_SUCCEEDED",
                    "dest": {"fileName": "files/results-1"}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(resource.state(), JobState::Succeeded);
        assert_eq!(
            resource.dest().and_then(|d| d.file_name.as_deref()),
            Some("files/results-1")
        );

        // metadata 缺失时状态视为未指定 → Pending
        let bare: BatchResource = serde_json::from_str(r#"{"name":"batches/abc"}"#).unwrap();
        assert_eq!(bare.state(), JobState::Pending);
        assert!(bare.dest().is_none());
    }
}
