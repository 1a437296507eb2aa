//! 트레이딩 봇 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 라이브 세션 실행 (Ctrl-C로 종료)
//! trader run
//!
//! # 다른 설정 파일과 전략으로 실행
//! trader -c config/paper.toml run --strategy sma_cross
//!
//! # 설정 검증
//! trader check-config
//!
//! # 전략 목록
//! trader strategies
//! ```

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use trader_cli::commands::check_config::{check_config, print_strategies};
use trader_cli::commands::run::run_live;
use trader_core::logging::{init_logging, LogConfig};
use trader_core::AppConfig;

#[derive(Parser)]
#[command(name = "trader")]
#[command(about = "Live trading engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (TOML)
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    /// 로그 레벨 덮어쓰기 (예: debug, trader_execution=trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 라이브 트레이딩 세션 시작
    Run {
        /// 전략 이름 (설정값 덮어쓰기)
        #[arg(short, long)]
        strategy: Option<String>,

        /// 세션 ID (설정값 덮어쓰기)
        #[arg(long)]
        id: Option<String>,
    },

    /// 설정 파일 검증
    CheckConfig,

    /// 사용 가능한 전략 목록 보기
    Strategies,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::Strategies = cli.command {
        print_strategies();
        return Ok(());
    }

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    match cli.command {
        Commands::Run { strategy, id } => {
            if let Some(strategy) = strategy {
                config.strategy.name = strategy;
            }
            if let Some(id) = id {
                config.engine.id = id;
            }
            config.validate()?;

            init_logging(LogConfig::from_settings(&config.logging))
                .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;
            run_live(config).await?;
        }
        Commands::CheckConfig => check_config(&config)?,
        Commands::Strategies => print_strategies(),
    }

    Ok(())
}
