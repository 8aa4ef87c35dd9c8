use crate::utils;
use colored::Colorize;
use std::path::Path;

pub fn handle(config_path: Option<&Path>) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());

    let loaded = match utils::load_config(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            return Err(e);
        }
    };

    utils::print_loaded_config_file(&loaded);
    println!("{}", "✓ 設定ファイルは正常です！".green().bold());
    println!();

    let target = utils::deploy_target(&loaded.config, None, false);
    let build = &loaded.config.build;
    println!("サマリー:");
    println!("  リージョン: {}", target.region.cyan());
    println!("  バケット: {}", target.bucket.cyan());
    println!(
        "  ドメイン: {} (www.{})",
        target.domain.cyan(),
        target.domain
    );
    println!("  ホストゾーン: {}", target.hosted_zone_id.cyan());
    println!("  アクセスキー: {}", loaded.config.aws.keyid);
    println!("  シークレット: ********");
    println!(
        "  ビルド: {} {}",
        build.command.cyan(),
        build.args.join(" ")
    );
    println!("  出力: {}", build.output.display());
    if !target.prefix.is_empty() {
        println!("  接頭辞: {}", target.prefix);
    }
    println!(
        "  既存リソースの確認: {}",
        if target.probe_existing { "有効" } else { "無効" }
    );

    Ok(())
}
