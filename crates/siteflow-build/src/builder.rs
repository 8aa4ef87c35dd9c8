use crate::error::{BuildError, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::process::Command;

/// Result of a successful build
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// stdout followed by stderr
    pub combined_output: String,
    pub output_dir: PathBuf,
}

pub struct SiteBuilder {
    project_root: PathBuf,
    command: String,
    args: Vec<String>,
    output_dir: PathBuf,
}

impl SiteBuilder {
    pub fn new(
        project_root: impl Into<PathBuf>,
        command: impl Into<String>,
        args: Vec<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            command: command.into(),
            args,
            output_dir: output_dir.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// 出力ディレクトリの絶対パス (相対指定はプロジェクトルート基準)
    pub fn output_dir(&self) -> PathBuf {
        if self.output_dir.is_absolute() {
            self.output_dir.clone()
        } else {
            self.project_root.join(&self.output_dir)
        }
    }

    /// ビルドを実行
    pub async fn build(&self) -> Result<BuildOutput> {
        if !self.project_root.is_dir() {
            return Err(BuildError::ProjectRootNotFound(self.project_root.clone()));
        }

        tracing::info!(
            "Running {} {} in {}",
            self.command,
            self.args.join(" "),
            self.project_root.display()
        );

        let output = Command::new(&self.command)
            .args(&self.args)
            .current_dir(&self.project_root)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => BuildError::CommandNotFound(self.command.clone()),
                _ => BuildError::Io(e),
            })?;

        let mut combined_output = String::from_utf8_lossy(&output.stdout).into_owned();
        combined_output.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(BuildError::BuildFailed {
                status: output.status.code(),
                output: combined_output,
            });
        }

        for line in combined_output.lines() {
            tracing::debug!("{}", line);
        }

        Ok(BuildOutput {
            combined_output,
            output_dir: self.existing_output()?,
        })
    }

    /// ビルドせずに既存の出力ディレクトリを使う
    pub fn existing_output(&self) -> Result<PathBuf> {
        let dir = self.output_dir();
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(BuildError::OutputDirNotFound(dir))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn sh(root: &Path, script: &str) -> SiteBuilder {
        SiteBuilder::new(root, "sh", vec!["-c".into(), script.into()], "public")
    }

    #[tokio::test]
    async fn test_build_success() {
        let temp_dir = TempDir::new().unwrap();
        let builder = sh(temp_dir.path(), "mkdir -p public && echo built && echo warn >&2");

        let output = builder.build().await.unwrap();
        assert_eq!(output.output_dir, temp_dir.path().join("public"));
        assert!(output.combined_output.contains("built"));
        assert!(output.combined_output.contains("warn"));
    }

    #[tokio::test]
    async fn test_build_runs_in_project_root() {
        let temp_dir = TempDir::new().unwrap();
        let builder = sh(temp_dir.path(), "mkdir -p public && touch public/marker");

        builder.build().await.unwrap();
        assert!(temp_dir.path().join("public/marker").exists());
    }

    #[tokio::test]
    async fn test_build_failure() {
        let temp_dir = TempDir::new().unwrap();
        let builder = sh(temp_dir.path(), "echo 'template missing' >&2; exit 3");

        match builder.build().await {
            Err(BuildError::BuildFailed { status, output }) => {
                assert_eq!(status, Some(3));
                assert!(output.contains("template missing"));
            }
            other => panic!("Expected BuildFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_command_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let builder = SiteBuilder::new(
            temp_dir.path(),
            "siteflow-no-such-generator",
            Vec::new(),
            "public",
        );

        assert!(matches!(
            builder.build().await,
            Err(BuildError::CommandNotFound(ref c)) if c == "siteflow-no-such-generator"
        ));
    }

    #[tokio::test]
    async fn test_missing_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let builder = sh(temp_dir.path(), "true");

        assert!(matches!(
            builder.build().await,
            Err(BuildError::OutputDirNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_project_root() {
        let temp_dir = TempDir::new().unwrap();
        let builder = sh(&temp_dir.path().join("nope"), "true");

        assert!(matches!(
            builder.build().await,
            Err(BuildError::ProjectRootNotFound(_))
        ));
    }

    #[test]
    fn test_existing_output() {
        let temp_dir = TempDir::new().unwrap();
        let builder = sh(temp_dir.path(), "true");
        assert!(builder.existing_output().is_err());

        std::fs::create_dir(temp_dir.path().join("public")).unwrap();
        assert_eq!(
            builder.existing_output().unwrap(),
            temp_dir.path().join("public")
        );
    }

    #[test]
    fn test_user_message_mentions_config() {
        let err = BuildError::CommandNotFound("hugo".into());
        assert!(err.user_message().contains("deploy.toml"));
    }
}
