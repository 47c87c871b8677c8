use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化与格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志订阅器
///
/// 默认 info 级别，可用 RUST_LOG 环境变量覆盖
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("日志初始化失败: {}", e))?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `model_name`: 使用的模型名称
pub fn log_startup(model_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - PDF 表格批量提取");
    info!("🤖 模型: {}", model_name);
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 记录提交完成信息与后续查询命令
///
/// # 参数
/// - `job_name`: 任务句柄
pub fn log_submit_complete(job_name: &str) {
    info!("{}", "=".repeat(60));
    info!("✅ 批处理任务创建成功");
    info!("任务句柄: {}", job_name);
    info!("稍后查询状态与结果:");
    info!("  pdf-table-extract check {}", job_name);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
