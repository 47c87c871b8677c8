//! # PDF Table Extract
//!
//! 一个把 PDF 批量提交给 Gemini 批处理接口并从响应中提取表格的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① API 类型层（Api）
//! - `api/` - 外部服务的请求/响应结构与 JSONL 记录格式
//! - `GenerateResponse::first_text` - 显式的可失败响应文本访问器
//!
//! ### ② 客户端层（Clients）
//! - `clients/` - `GeminiApi` 能力接口与 reqwest 实现
//! - `GeminiClient` - 上传 / 建任务 / 查状态 / 下载结果
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只做一件事
//! - `key_assigner` - 为文档分配唯一键（文件名主干），冲突即报错
//! - `TableExtractor` - 定位 ```csv 围栏块，零匹配不报错
//! - `TableWriter` - 按 键-序号.csv 落盘表格
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_coordinator` - 批处理任务的提交、轮询与结果解析
//! - `orchestrator/single_extractor` - 单文档同步提取流程
//!
//! ## 模块结构

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use api::gemini::JobState;
pub use clients::{GeminiApi, GeminiClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use orchestrator::{extract_and_save, BatchCoordinator, BatchOutcome};
pub use services::{ExtractedTable, TableExtractor, TableWriter};
