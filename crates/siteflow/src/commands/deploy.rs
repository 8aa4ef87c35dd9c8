use crate::utils;
use colored::Colorize;
use siteflow_cloud::{DeployPipeline, DeployReport, ProvisionOutcome};
use std::path::PathBuf;

pub struct DeployOptions {
    pub config_path: Option<PathBuf>,
    pub skip_build: bool,
    pub prefix: Option<String>,
    pub no_probe: bool,
    pub json: bool,
}

pub async fn handle(opts: DeployOptions) -> anyhow::Result<()> {
    println!("{}", "【Step 1/5】設定を読み込み中...".yellow());
    let loaded = utils::load_config(opts.config_path.as_deref())?;
    utils::print_loaded_config_file(&loaded);
    let target = utils::deploy_target(&loaded.config, opts.prefix, opts.no_probe);
    println!(
        "  ✓ {} → {}",
        target.domain.cyan(),
        format!("s3://{}", target.bucket).cyan()
    );

    println!();
    println!("{}", "【Step 2/5】サイトをビルド中...".yellow());
    let site_dir = utils::build_site(&loaded, opts.skip_build).await?;

    println!();
    println!("{}", "【Step 3/5】AWS に接続中...".yellow());
    let session = utils::open_session(&loaded.config).await?;

    println!();
    println!("{}", "【Step 4/5】リソースを用意してアップロード中...".yellow());
    println!("  (初回は証明書の発行を最大30分待つため時間がかかります)");
    let report = DeployPipeline::new(session.clients())
        .run(&target, &site_dir)
        .await?;

    println!();
    println!("{}", "【Step 5/5】結果".yellow());
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    print_summary(&target.domain, &report);

    Ok(())
}

fn outcome_label(outcome: &ProvisionOutcome) -> &'static str {
    match outcome {
        ProvisionOutcome::Provisioned { .. } => "新規作成",
        ProvisionOutcome::Resumed { .. } => "途中から再開",
        ProvisionOutcome::AlreadyProvisioned { .. } => "作成済み",
        ProvisionOutcome::Skipped => "スキップ",
    }
}

fn print_summary(domain: &str, report: &DeployReport) {
    println!(
        "  ✓ プロビジョニング: {}",
        outcome_label(&report.provisioning).cyan()
    );
    if let Some(cdn) = report.provisioning.distribution_domain() {
        println!("  ✓ CloudFront: {}", cdn.cyan());
    }
    utils::print_upload_report(&report.upload);

    println!();
    if report.upload.is_success() {
        println!("{}", "✓ デプロイが完了しました！".green().bold());
    } else {
        println!(
            "{}",
            "⚠ デプロイは完了しましたが、一部のファイルはアップロードできませんでした"
                .yellow()
                .bold()
        );
    }
    println!("  https://{}", domain);
    println!("  https://www.{}", domain);
    if matches!(report.provisioning, ProvisionOutcome::Provisioned { .. }) {
        println!();
        println!("  CloudFront の展開完了まで数十分かかることがあります");
    }
    println!("  ({} ms)", report.duration_ms);
}
