/// Gemini API 客户端
///
/// 封装所有与 Gemini 文件/批处理接口相关的 HTTP 调用逻辑
use crate::api::gemini::{
    BatchConfig, BatchInputConfig, BatchResource, CreateBatchRequest, FileResource,
    GenerateRequest, GenerateResponse, UploadFileResponse,
};
use crate::clients::GeminiApi;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Gemini 客户端
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base_url: String,
}

impl GeminiClient {
    /// 创建新的 Gemini 客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 读取响应并解析 JSON；非 2xx 状态映射为 BadResponse
    async fn read_json<T: DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.ok();
            warn!("API返回错误响应 ({}): status={}", endpoint, status);
            return Err(AppError::Api(ApiError::BadResponse {
                endpoint: endpoint.to_string(),
                status: Some(status.as_u16()),
                message,
            }));
        }
        response.json::<T>().await.map_err(|e| {
            AppError::Api(ApiError::JsonParseFailed {
                source: Box::new(e),
            })
        })
    }
}

impl GeminiApi for GeminiClient {
    async fn upload_file(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        display_name: Option<&str>,
    ) -> AppResult<FileResource> {
        let endpoint = format!("{}/upload/v1beta/files", self.api_base_url);
        debug!("上传文件: {} 字节, 类型 {}", bytes.len(), mime_type);

        let metadata = serde_json::json!({
            "file": { "display_name": display_name.unwrap_or("document") }
        });
        let metadata_part = reqwest::multipart::Part::text(metadata.to_string())
            .mime_str("application/json")?;
        let file_part = reqwest::multipart::Part::bytes(bytes).mime_str(mime_type)?;
        let form = reqwest::multipart::Form::new()
            .part("metadata", metadata_part)
            .part("file", file_part);

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        let uploaded: UploadFileResponse = Self::read_json(&endpoint, response).await?;
        debug!("上传完成: {}", uploaded.file.name);
        Ok(uploaded.file)
    }

    async fn create_batch(
        &self,
        model: &str,
        src_file: &str,
        display_name: &str,
    ) -> AppResult<BatchResource> {
        let endpoint = format!("{}/v1beta/{}:batchGenerateContent", self.api_base_url, model);
        debug!("创建批处理任务: 模型 {}, 源文件 {}", model, src_file);

        let body = CreateBatchRequest {
            batch: BatchConfig {
                display_name: display_name.to_string(),
                input_config: BatchInputConfig {
                    file_name: src_file.to_string(),
                },
            },
        };

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        Self::read_json(&endpoint, response).await
    }

    async fn get_batch(&self, name: &str) -> AppResult<BatchResource> {
        let endpoint = format!("{}/v1beta/{}", self.api_base_url, name);
        debug!("查询批处理任务: {}", name);

        let response = self
            .http
            .get(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        Self::read_json(&endpoint, response).await
    }

    async fn download_file(&self, name: &str) -> AppResult<Vec<u8>> {
        let endpoint = format!("{}/v1beta/{}:download?alt=media", self.api_base_url, name);
        debug!("下载结果文件: {}", name);

        let response = self
            .http
            .get(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.ok();
            warn!("结果文件下载失败 ({}): status={}", endpoint, status);
            return Err(AppError::Api(ApiError::BadResponse {
                endpoint,
                status: Some(status.as_u16()),
                message,
            }));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;
        Ok(bytes.to_vec())
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> AppResult<GenerateResponse> {
        let endpoint = format!("{}/v1beta/{}:generateContent", self.api_base_url, model);
        debug!("调用 generateContent: 模型 {}", model);

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        Self::read_json(&endpoint, response).await
    }
}
