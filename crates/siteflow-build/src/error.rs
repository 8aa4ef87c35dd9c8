use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Build command not found: {0}")]
    CommandNotFound(String),

    #[error("Project root not found: {0}")]
    ProjectRootNotFound(PathBuf),

    #[error("Build failed (exit status {status:?}): {output}")]
    BuildFailed { status: Option<i32>, output: String },

    #[error("Build output directory not found: {0}")]
    OutputDirNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// One-line reason, without the captured build output
    pub fn summary(&self) -> String {
        match self {
            BuildError::BuildFailed {
                status: Some(code), ..
            } => format!("exit status {}", code),
            BuildError::BuildFailed { status: None, .. } => "terminated by signal".to_string(),
            other => other.to_string(),
        }
    }

    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::CommandNotFound(command) => {
                format!(
                    "ビルドコマンドが見つかりません: {}\n\
                     \n\
                     解決方法:\n\
                     1. コマンドがインストールされ PATH に含まれているか確認してください\n\
                     2. deploy.toml で明示的にコマンドを指定してください:\n\
                        [build]\n\
                        command = \"hugo\"",
                    command
                )
            }
            BuildError::BuildFailed { output, .. } => {
                format!(
                    "ビルドに失敗しました\n\
                     \n\
                     {}\n\
                     \n\
                     ビルドコマンドの出力を確認してください。",
                    output.trim_end()
                )
            }
            BuildError::OutputDirNotFound(path) => {
                format!(
                    "ビルド出力ディレクトリが見つかりません: {}\n\
                     \n\
                     deploy.toml の [build] output を確認してください。",
                    path.display()
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_omits_build_output() {
        let err = BuildError::BuildFailed {
            status: Some(1),
            output: "ERROR template \"index.html\" not found\n".into(),
        };
        assert_eq!(err.summary(), "exit status 1");
        assert!(err.user_message().contains("template"));
    }

    #[test]
    fn test_summary_of_other_errors() {
        let err = BuildError::CommandNotFound("hugo".into());
        assert_eq!(err.summary(), "Build command not found: hugo");
    }
}
