mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "siteflow")]
#[command(about = "書いて、ビルドして、届ける。静的サイトを独自ドメインの HTTPS で公開", long_about = None)]
struct Cli {
    /// 詳細なログを表示 (debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// サイトをビルドし、AWS リソースを用意してアップロード
    /// (S3 バケット、ACM 証明書、CloudFront、Route 53)
    Deploy {
        /// ビルドをスキップし、既存の出力ディレクトリを使う
        #[arg(long)]
        skip_build: bool,
        /// アップロード先キーの接頭辞 (deploy.toml の設定を上書き)
        #[arg(long)]
        prefix: Option<String>,
        /// 既存バケットの完了確認をせず、プロビジョニングを丸ごとスキップ
        #[arg(long)]
        no_probe: bool,
        /// 設定ファイルのパス
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// 結果を JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// サイトをビルドしてアップロードのみ行う
    Upload {
        /// ビルドをスキップし、既存の出力ディレクトリを使う
        #[arg(long)]
        skip_build: bool,
        /// アップロード先キーの接頭辞 (deploy.toml の設定を上書き)
        #[arg(long)]
        prefix: Option<String>,
        /// 設定ファイルのパス
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// 設定を検証
    Validate {
        /// 設定ファイルのパス
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// バージョン情報を表示
    Version,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("siteflow=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("siteflow=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Version => {
            println!("siteflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Validate { config } => commands::validate::handle(config.as_deref()),
        Commands::Deploy {
            skip_build,
            prefix,
            no_probe,
            config,
            json,
        } => {
            commands::deploy::handle(commands::deploy::DeployOptions {
                config_path: config,
                skip_build,
                prefix,
                no_probe,
                json,
            })
            .await
        }
        Commands::Upload {
            skip_build,
            prefix,
            config,
        } => commands::upload::handle(config.as_deref(), skip_build, prefix).await,
    }
}
