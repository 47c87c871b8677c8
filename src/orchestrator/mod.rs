//! 编排层
//!
//! 把业务能力层的单项能力组合成完整流程：
//! - `batch_coordinator` - 批处理任务的提交、轮询与结果解析
//! - `single_extractor` - 单文档的同步提取流程

pub mod batch_coordinator;
pub mod single_extractor;

pub use batch_coordinator::{BatchCoordinator, BatchOutcome};
pub use single_extractor::extract_and_save;
