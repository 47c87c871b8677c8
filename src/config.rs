/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// Gemini API 基础 URL
    pub api_base_url: String,
    /// Gemini API 密钥
    pub api_key: String,
    /// 批处理使用的模型名称
    pub model_name: String,
    /// 提取结果（CSV 文件）输出目录
    pub output_dir: String,
    /// 默认提示词文件路径
    pub prompt_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            model_name: "gemini-3.0-pro".to_string(),
            output_dir: "result".to_string(),
            prompt_path: "prompt.md".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("GEMINI_API_BASE_URL").unwrap_or(default.api_base_url),
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or(default.api_key),
            model_name: std::env::var("GEMINI_MODEL_NAME").unwrap_or(default.model_name),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            prompt_path: std::env::var("PROMPT_PATH").unwrap_or(default.prompt_path),
        }
    }
}
