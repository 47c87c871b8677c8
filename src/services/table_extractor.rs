//! 表格提取服务 - 业务能力层
//!
//! 只负责"从响应文本中定位 ```csv 围栏块"能力：
//! 返回全部匹配块的原文，不做任何 CSV 内容校验；
//! 没有匹配时返回空序列，由调用方决定严重程度

use regex::Regex;
use tracing::debug;

/// 围栏块的正则：开围栏标记为 csv，块体惰性匹配到最近的闭围栏
const FENCE_PATTERN: &str = r"(?s)```csv\n(.*?)\n```";

/// 从响应中提取出的一个表格
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedTable {
    /// 在响应中的出现顺序（1 起始）
    pub index: usize,
    /// 围栏之间的原始文本，不做任何整理
    pub content: String,
}

/// 表格提取服务
pub struct TableExtractor {
    fence: Regex,
}

impl TableExtractor {
    /// 创建新的表格提取服务
    pub fn new() -> Self {
        Self {
            // 模式是静态字符串，编译失败属于程序缺陷
            fence: Regex::new(FENCE_PATTERN).expect("围栏正则必须合法"),
        }
    }

    /// 提取文本中全部 csv 围栏块
    ///
    /// # 参数
    /// - `response_text`: 模型响应的原始文本
    ///
    /// # 返回
    /// 按出现顺序返回全部块体；没有匹配时返回空序列，从不报错
    pub fn extract(&self, response_text: &str) -> Vec<ExtractedTable> {
        let tables: Vec<ExtractedTable> = self
            .fence
            .captures_iter(response_text)
            .filter_map(|cap| cap.get(1))
            .enumerate()
            .map(|(i, m)| ExtractedTable {
                index: i + 1,
                content: m.as_str().to_string(),
            })
            .collect();

        debug!("提取到 {} 个表格块", tables.len());
        tables
    }
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self::new()
    }
}
