use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use advisor_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, env_key, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let llm_api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };

    let lines = vec![
        "effective config (source precedence: env > file > default):".to_string(),
        render_line("database.url", &config.database.url, source("database.url", "ADVISOR_DATABASE_URL")),
        render_line(
            "database.max_connections",
            &config.database.max_connections.to_string(),
            source("database.max_connections", "ADVISOR_DATABASE_MAX_CONNECTIONS"),
        ),
        render_line(
            "database.timeout_secs",
            &config.database.timeout_secs.to_string(),
            source("database.timeout_secs", "ADVISOR_DATABASE_TIMEOUT_SECS"),
        ),
        render_line("llm.api_key", llm_api_key, source("llm.api_key", "ADVISOR_LLM_API_KEY")),
        render_line("llm.base_url", &config.llm.base_url, source("llm.base_url", "ADVISOR_LLM_BASE_URL")),
        render_line("llm.model", &config.llm.model, source("llm.model", "ADVISOR_LLM_MODEL")),
        render_line(
            "llm.timeout_secs",
            &config.llm.timeout_secs.to_string(),
            source("llm.timeout_secs", "ADVISOR_LLM_TIMEOUT_SECS"),
        ),
        render_line(
            "llm.max_retries",
            &config.llm.max_retries.to_string(),
            source("llm.max_retries", "ADVISOR_LLM_MAX_RETRIES"),
        ),
        render_line(
            "advisory.documents_dir",
            &config.advisory.documents_dir.display().to_string(),
            source("advisory.documents_dir", "ADVISOR_DOCUMENTS_DIR"),
        ),
        render_line(
            "server.bind_address",
            &config.server.bind_address,
            source("server.bind_address", "ADVISOR_SERVER_BIND_ADDRESS"),
        ),
        render_line(
            "server.port",
            &config.server.port.to_string(),
            source("server.port", "ADVISOR_SERVER_PORT"),
        ),
        render_line("logging.level", &config.logging.level, source("logging.level", "ADVISOR_LOGGING_LEVEL")),
        render_line(
            "logging.format",
            &format!("{:?}", config.logging.format),
            source("logging.format", "ADVISOR_LOGGING_FORMAT"),
        ),
    ];

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("advisor.toml"), PathBuf::from("config/advisor.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
