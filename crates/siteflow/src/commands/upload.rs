use crate::utils;
use colored::Colorize;
use siteflow_cloud::DeployPipeline;
use std::path::Path;

pub async fn handle(
    config_path: Option<&Path>,
    skip_build: bool,
    prefix: Option<String>,
) -> anyhow::Result<()> {
    println!("{}", "【Step 1/4】設定を読み込み中...".yellow());
    let loaded = utils::load_config(config_path)?;
    utils::print_loaded_config_file(&loaded);
    let target = utils::deploy_target(&loaded.config, prefix, false);

    println!();
    println!("{}", "【Step 2/4】サイトをビルド中...".yellow());
    let site_dir = utils::build_site(&loaded, skip_build).await?;

    println!();
    println!("{}", "【Step 3/4】AWS に接続中...".yellow());
    let session = utils::open_session(&loaded.config).await?;

    println!();
    println!(
        "{}",
        format!("【Step 4/4】s3://{} にアップロード中...", target.bucket).yellow()
    );
    let report = DeployPipeline::new(session.clients())
        .upload_only(&target, &site_dir)
        .await?;
    utils::print_upload_report(&report);

    println!();
    if report.is_success() {
        println!("{}", "✓ アップロードが完了しました！".green().bold());
    } else {
        println!(
            "{}",
            "⚠ 一部のファイルはアップロードできませんでした".yellow().bold()
        );
    }

    Ok(())
}
