use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use pdf_table_extract::orchestrator::{extract_and_save, BatchCoordinator, BatchOutcome};
use pdf_table_extract::utils::logging;
use pdf_table_extract::{Config, GeminiClient};

/// PDF 表格批量提取工具
#[derive(Parser)]
#[command(name = "pdf-table-extract", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 创建批处理任务，返回任务句柄
    Create {
        /// 文档路径（支持 glob 模式，如 pages/page-*.pdf）
        #[arg(required = true)]
        documents: Vec<String>,
        /// 提示词文件路径（默认取配置中的 prompt.md）
        #[arg(long)]
        prompt: Option<String>,
    },
    /// 查询批处理任务状态，完成时解析结果并保存表格
    Check {
        /// create 返回的任务句柄
        job: String,
    },
    /// 同步提取单个文档中的表格（要求文档必含表格）
    Extract {
        /// 文档路径
        document: String,
        /// 提示词文件路径（默认取配置中的 prompt.md）
        #[arg(long)]
        prompt: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env 并初始化日志
    dotenvy::dotenv().ok();
    logging::init()?;

    // 加载配置
    let config = Config::from_env();
    if config.api_key.is_empty() {
        anyhow::bail!("环境变量 GEMINI_API_KEY 未设置，请在 .env 文件中配置 API 密钥");
    }

    let cli = Cli::parse();
    let client = GeminiClient::new(&config);

    match cli.command {
        Command::Create { documents, prompt } => {
            logging::log_startup(&config.model_name);

            let paths = expand_documents(&documents)?;
            info!("✓ 找到 {} 个待处理的文档", paths.len());

            let prompt_path = prompt.unwrap_or_else(|| config.prompt_path.clone());
            let coordinator = BatchCoordinator::new(&client, &config);
            let job = coordinator.submit(Path::new(&prompt_path), &paths).await?;

            logging::log_submit_complete(&job);
        }
        Command::Check { job } => {
            let coordinator = BatchCoordinator::new(&client, &config);
            match coordinator.check(&job).await? {
                BatchOutcome::Pending { state } => {
                    info!("⏳ 任务仍在处理中 (状态: {})，请稍后再查", state);
                }
                BatchOutcome::Failed { state } => {
                    anyhow::bail!("任务以状态 {} 结束", state);
                }
                BatchOutcome::Succeeded {
                    tables_extracted,
                    correlation_lost,
                } => {
                    info!("✅ 成功！共提取 {} 个表格", tables_extracted);
                    if correlation_lost {
                        warn!("输出文件使用顺序命名，无法对应到原始文档");
                    }
                }
            }
        }
        Command::Extract { document, prompt } => {
            let prompt_path = prompt.unwrap_or_else(|| config.prompt_path.clone());
            let count = extract_and_save(
                &client,
                &config,
                Path::new(&prompt_path),
                Path::new(&document),
            )
            .await?;
            info!("✅ 成功提取 {} 个表格", count);
        }
    }

    Ok(())
}

/// 展开文档参数中的 glob 模式
fn expand_documents(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        let mut matched = false;
        for entry in glob::glob(pattern)? {
            paths.push(entry?);
            matched = true;
        }
        // 不含通配符的字面路径也允许直接传入
        if !matched {
            let literal = PathBuf::from(pattern);
            if literal.exists() {
                paths.push(literal);
            }
        }
    }

    if paths.is_empty() {
        anyhow::bail!("没有找到匹配的文档: {:?}", patterns);
    }

    Ok(paths)
}
