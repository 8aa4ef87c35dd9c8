use anyhow::Context;
use colored::Colorize;
use siteflow_build::{BuildProgress, SiteBuilder};
use siteflow_cloud::{DeployTarget, UploadReport};
use siteflow_cloud_aws::{AwsCredentials, AwsSession};
use siteflow_config::DeployConfig;
use std::path::{Path, PathBuf};

/// 読み込んだ設定とその場所
pub struct LoadedConfig {
    pub path: PathBuf,
    pub project_root: PathBuf,
    pub config: DeployConfig,
}

/// 設定ファイルを探して読み込む (--config 指定時はそのパス)
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LoadedConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => siteflow_config::find_deploy_file()?,
    };
    let config = siteflow_config::load(&path)
        .with_context(|| format!("設定ファイルの読み込みに失敗しました: {}", path.display()))?;
    let project_root = siteflow_config::project_root_for(&path)?;

    Ok(LoadedConfig {
        path,
        project_root,
        config,
    })
}

/// 読み込んだ設定ファイル情報を表示
pub fn print_loaded_config_file(loaded: &LoadedConfig) {
    println!(
        "📄 読み込んだ設定ファイル: {}",
        loaded.path.display().to_string().cyan()
    );
    println!(
        "   プロジェクトルート: {}",
        loaded.project_root.display().to_string().cyan()
    );
}

/// 設定と CLI オプションからデプロイ先を組み立てる
pub fn deploy_target(config: &DeployConfig, prefix: Option<String>, no_probe: bool) -> DeployTarget {
    DeployTarget {
        bucket: config.aws.bucketname.clone(),
        domain: config.aws.domainname.clone(),
        hosted_zone_id: config.aws.hostedzoneid.clone(),
        region: config.aws.region.clone(),
        prefix: prefix.unwrap_or_else(|| config.deploy.prefix.clone()),
        probe_existing: config.deploy.probe_existing && !no_probe,
    }
}

/// サイトをビルドし、出力ディレクトリを返す
pub async fn build_site(loaded: &LoadedConfig, skip_build: bool) -> anyhow::Result<PathBuf> {
    let build = &loaded.config.build;
    let builder = SiteBuilder::new(
        &loaded.project_root,
        &build.command,
        build.args.clone(),
        &build.output,
    );

    if skip_build {
        println!("  ビルドをスキップ（--skip-build指定）");
        let dir = builder
            .existing_output()
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        println!("  ✓ 出力ディレクトリ: {}", dir.display().to_string().cyan());
        return Ok(dir);
    }

    let progress = BuildProgress::new(builder.command());
    match builder.build().await {
        Ok(output) => {
            progress.finish_success();
            print_build_output(&output.combined_output);
            println!(
                "  ✓ 出力ディレクトリ: {}",
                output.output_dir.display().to_string().cyan()
            );
            Ok(output.output_dir)
        }
        Err(e) => {
            progress.finish_error(&e.summary());
            Err(anyhow::anyhow!(e.user_message()))
        }
    }
}

/// ビルドコマンドの出力をそのまま表示
fn print_build_output(output: &str) {
    let output = output.trim_end();
    if output.is_empty() {
        return;
    }
    for line in output.lines() {
        println!("  {}", line.dimmed());
    }
}

/// 設定の認証情報で AWS セッションを開く
pub async fn open_session(config: &DeployConfig) -> anyhow::Result<AwsSession> {
    let credentials = AwsCredentials {
        access_key_id: config.aws.keyid.clone(),
        secret_access_key: config.aws.secretkey.clone(),
    };
    let session = AwsSession::new(&config.aws.region, credentials).await?;
    println!("  ✓ リージョン: {}", config.aws.region.cyan());
    Ok(session)
}

/// アップロード結果を表示
pub fn print_upload_report(report: &UploadReport) {
    println!(
        "  ✓ {} 個のファイルをアップロードしました ({} ms)",
        report.uploaded.len(),
        report.duration_ms
    );
    if !report.is_success() {
        println!(
            "{}",
            format!("  ⚠ {} 個のファイルでエラー:", report.failed.len()).yellow()
        );
        for failure in &report.failed {
            println!("    - {}: {}", failure.key.red(), failure.error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteflow_config::{AwsSection, DeploySection};

    fn config() -> DeployConfig {
        DeployConfig {
            aws: AwsSection {
                region: "us-west-2".into(),
                keyid: "AKIDEXAMPLE".into(),
                secretkey: "secret".into(),
                bucketname: "example-site".into(),
                domainname: "example.com".into(),
                hostedzoneid: "Z123".into(),
            },
            deploy: DeploySection {
                prefix: "blog/".into(),
                probe_existing: true,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_deploy_target_from_config() {
        let target = deploy_target(&config(), None, false);
        assert_eq!(target.bucket, "example-site");
        assert_eq!(target.domain, "example.com");
        assert_eq!(target.hosted_zone_id, "Z123");
        assert_eq!(target.region, "us-west-2");
        assert_eq!(target.prefix, "blog/");
        assert!(target.probe_existing);
    }

    #[test]
    fn test_cli_options_override_config() {
        let target = deploy_target(&config(), Some(String::new()), true);
        assert_eq!(target.prefix, "");
        assert!(!target.probe_existing);
    }
}
