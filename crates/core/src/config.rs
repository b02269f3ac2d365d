use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub repo: RepoConfig,
    #[serde(default)]
    pub run: RunDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_drive_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default = "default_github_base_url")]
    pub base_url: String,
}

/// Run parameters from the config file; CLI flags override these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunDefaults {
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub target_dir: Option<String>,
    #[serde(default)]
    pub instruction: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_url: default_drive_base_url(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            base_url: default_anthropic_base_url(),
        }
    }
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner: String::new(),
            base_url: default_github_base_url(),
        }
    }
}

fn default_drive_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_github_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_model() -> String {
    "claude-3-opus-20240229".to_string()
}

fn default_max_tokens() -> u32 {
    4000
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    let cfg = settings.build()?;
    let mut app: AppConfig = cfg.try_deserialize()?;
    apply_env_overrides(&mut app);
    Ok(app)
}

// Environment variables win over file values; the names match what the
// desktop build's settings loader read.
fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Ok(v) = std::env::var("GOOGLE_DRIVE_TOKEN") {
        cfg.storage.access_token = v;
    }
    if let Ok(v) = std::env::var("ANTHROPIC_API_KEY") {
        cfg.ai.api_key = v;
    }
    if let Ok(v) = std::env::var("GITHUB_TOKEN") {
        cfg.repo.token = v;
    }
    if let Ok(v) = std::env::var("GITHUB_OWNER") {
        cfg.repo.owner = v;
    }
    if let Ok(v) = std::env::var("FOLDER_ID") {
        cfg.run.folder_id = Some(v);
    }
    if let Ok(v) = std::env::var("GITHUB_REPO") {
        cfg.run.repository = Some(v);
    }
    if let Ok(v) = std::env::var("GITHUB_REPO_DIR") {
        cfg.run.target_dir = Some(v);
    }
    if let Ok(v) = std::env::var("AI_MESSAGE") {
        cfg.run.instruction = Some(v);
    }
}
