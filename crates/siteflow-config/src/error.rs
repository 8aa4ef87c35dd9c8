use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: deploy.local.toml, deploy.toml\n\
        - ./.siteflow/ ディレクトリ\n\
        - ~/.config/siteflow/deploy.toml\n\
        または SITEFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    DeployFileNotFound,

    #[error("必須の設定値がありません: {0}")]
    MissingField(String),

    #[error("設定ファイルの解析に失敗しました ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
