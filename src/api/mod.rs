//! API 数据类型模块
//!
//! 定义外部服务的请求/响应结构

pub mod gemini;

pub use gemini::{
    BatchRequestRecord, BatchResource, FileResource, GenerateRequest, GenerateResponse,
    InlineResponse, JobState, ResultRecord,
};
