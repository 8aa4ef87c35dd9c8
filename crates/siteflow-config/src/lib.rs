pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "SITEFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["deploy.local.toml", "deploy.toml"];
const PROJECT_DIR: &str = ".siteflow";

/// デプロイ設定 (deploy.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub aws: AwsSection,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub deploy: DeploySection,
}

/// `[aws]` セクション
///
/// キー名は旧来の設定ファイルとの互換のため小文字のみ。
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AwsSection {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub keyid: String,
    #[serde(default)]
    pub secretkey: String,
    #[serde(default)]
    pub bucketname: String,
    #[serde(default)]
    pub domainname: String,
    #[serde(default)]
    pub hostedzoneid: String,
}

impl std::fmt::Debug for AwsSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSection")
            .field("region", &self.region)
            .field("keyid", &self.keyid)
            .field("secretkey", &"***")
            .field("bucketname", &self.bucketname)
            .field("domainname", &self.domainname)
            .field("hostedzoneid", &self.hostedzoneid)
            .finish()
    }
}

/// `[build]` セクション
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSection {
    #[serde(default = "default_build_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// プロジェクトルートからの相対パス
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            command: default_build_command(),
            args: Vec::new(),
            output: default_output(),
        }
    }
}

/// `[deploy]` セクション
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploySection {
    /// アップロード先キーの接頭辞
    #[serde(default)]
    pub prefix: String,
    /// バケットが既存の場合、ディストリビューションの有無で完了済みか確認する
    #[serde(default = "default_true")]
    pub probe_existing: bool,
}

impl Default for DeploySection {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            probe_existing: true,
        }
    }
}

fn default_build_command() -> String {
    "hugo".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("public")
}

fn default_true() -> bool {
    true
}

impl DeployConfig {
    /// TOML文字列から読み込む (検証は行わない)
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `[aws]` の必須項目がすべて空でないことを確認
    pub fn validate(&self) -> Result<()> {
        let aws = &self.aws;
        for (key, value) in [
            ("region", &aws.region),
            ("keyid", &aws.keyid),
            ("secretkey", &aws.secretkey),
            ("bucketname", &aws.bucketname),
            ("domainname", &aws.domainname),
            ("hostedzoneid", &aws.hostedzoneid),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(format!("aws.{key}")));
            }
        }
        Ok(())
    }
}

/// 設定ファイルを読み込み、検証する
pub fn load(path: &Path) -> Result<DeployConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = DeployConfig::parse(&content, path)?;
    config.validate()?;
    Ok(config)
}

/// グローバル設定ファイルのパス (~/.config/siteflow/deploy.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("siteflow").join("deploy.toml"))
}

/// プロジェクトのdeploy.tomlファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 SITEFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: deploy.local.toml, deploy.toml
/// 3. ./.siteflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/siteflow/deploy.toml (グローバル設定)
pub fn find_deploy_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let project_dir = current_dir.join(PROJECT_DIR);
    if project_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(global_config) = global_config_path()
        && global_config.exists()
    {
        return Ok(global_config);
    }

    Err(ConfigError::DeployFileNotFound)
}

/// 設定ファイルの位置からプロジェクトルートを決める
///
/// `.siteflow/` 内のファイルはその親、グローバル設定はカレントディレクトリ。
pub fn project_root_for(config_path: &Path) -> Result<PathBuf> {
    if global_config_path().as_deref() == Some(config_path) {
        return Ok(std::env::current_dir()?);
    }

    match config_path.parent() {
        Some(dir) if dir.file_name().is_some_and(|n| n == PROJECT_DIR) => Ok(dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dir.to_path_buf())),
        Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.to_path_buf()),
        _ => Ok(std::env::current_dir()?),
    }
}
