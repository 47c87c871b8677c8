pub mod gemini_client;

pub use gemini_client::GeminiClient;

use crate::api::gemini::{BatchResource, FileResource, GenerateRequest, GenerateResponse};
use crate::error::AppResult;

/// 外部服务能力接口
///
/// 协调器只依赖这组调用；测试中可以用带计数器的模拟实现替换
#[allow(async_fn_in_trait)]
pub trait GeminiApi {
    /// 上传文件，返回稳定的内容引用
    async fn upload_file(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        display_name: Option<&str>,
    ) -> AppResult<FileResource>;

    /// 创建异步批处理任务，返回任务资源（含任务句柄）
    async fn create_batch(
        &self,
        model: &str,
        src_file: &str,
        display_name: &str,
    ) -> AppResult<BatchResource>;

    /// 查询批处理任务状态（非阻塞，单次调用）
    async fn get_batch(&self, name: &str) -> AppResult<BatchResource>;

    /// 下载结果文件的原始字节
    async fn download_file(&self, name: &str) -> AppResult<Vec<u8>>;

    /// 同步生成内容（单文档流程使用）
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> AppResult<GenerateResponse>;
}
