//! # slide-host
//!
//! 以模拟内容运行播放列表，输出轮播过程。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p slide-host
//! cargo run -p slide-host -- --playlist demos/playlist.json --run-secs 30
//! cargo run -p slide-host -- --realtime
//! cargo run -p slide-host -- check demos/playlist.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use slide_host::{AppConfig, Manifest, Player, PlayerEvent, PresentationEvent};
use tracing::info;

#[derive(Parser)]
#[command(name = "slide-host")]
#[command(about = "幻灯片轮播宿主 - 以模拟内容运行播放列表")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 配置文件（默认：config.json）
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// 播放列表（覆盖配置文件）
    #[arg(short, long)]
    playlist: Option<PathBuf>,

    /// 运行时长，秒（覆盖配置文件）
    #[arg(long)]
    run_secs: Option<u64>,

    /// 按真实时间运行
    #[arg(long)]
    realtime: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 检查播放列表并打印解析结果
    Check {
        /// 播放列表路径
        playlist: PathBuf,
    },
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("slide-host error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 日志级别来自配置，加载配置期间的警告先用临时 subscriber 输出
    let bootstrap = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .finish();
    let mut config =
        tracing::subscriber::with_default(bootstrap, || AppConfig::load(&cli.config));

    if let Some(playlist) = cli.playlist {
        config.playlist_path = playlist;
    }
    if let Some(run_secs) = cli.run_secs {
        config.simulation.run_secs = run_secs;
    }
    if cli.realtime {
        config.simulation.realtime = true;
    }
    config.validate().context("配置无效")?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .init();

    match cli.command {
        Some(Commands::Check { playlist }) => check(&playlist),
        None => run(&config),
    }
}

/// 加载并打印播放列表
fn check(path: &Path) -> anyhow::Result<()> {
    let manifest =
        Manifest::load(path).with_context(|| format!("无法加载播放列表 {path:?}"))?;
    let items = manifest.valid_items();

    println!(
        "播放列表 {path:?}: {} 项有效（共 {} 项），play-until-done = {}",
        items.len(),
        manifest.items.len(),
        manifest.play_until_done
    );
    for (index, item) in items.iter().enumerate() {
        let mode = if item.play_until_done {
            "直到完成".to_string()
        } else {
            format!("{}s", item.duration_secs)
        };
        println!(
            "  {}. <{}> {} [{}]",
            index + 1,
            item.tag,
            mode,
            item.transition_type
        );
    }

    Ok(())
}

/// 按帧间隔驱动播放器
fn run(config: &AppConfig) -> anyhow::Result<()> {
    let manifest = Manifest::load(&config.playlist_path)
        .with_context(|| format!("无法加载播放列表 {:?}", config.playlist_path))?;

    let mut player = Player::new(config);
    player.load(&manifest).context("无法创建播放项")?;

    let frame = config.frame_interval();
    let total = std::time::Duration::from_secs(config.simulation.run_secs);
    let mut elapsed = std::time::Duration::ZERO;

    info!(
        run_secs = config.simulation.run_secs,
        realtime = config.simulation.realtime,
        "开始模拟"
    );

    while elapsed < total {
        for event in player.update(frame) {
            match event {
                PlayerEvent::SlideChanged { tag } => {
                    info!(at = ?player.schedule().now(), tag = %tag, "切换内容");
                }
                PlayerEvent::Done => {
                    info!(at = ?player.schedule().now(), "播放列表完成");
                }
            }
        }

        elapsed += frame;
        if config.simulation.realtime {
            std::thread::sleep(frame);
        }
    }

    player.handle(PresentationEvent::Stop);
    info!("模拟结束");
    Ok(())
}
