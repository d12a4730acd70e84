use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use license_checker_core::{
    check, select_files, CheckOptions, Error, ProjectLayout, ReportItem, DEFAULT_CONFIG_FILE_NAME,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

/// 命令行入口（基于 clap）；不带子命令时等同于 `check`
#[derive(Parser, Debug)]
#[command(
    name = "license-checker",
    version,
    about = "Checks project file licenses against a rule file",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    check: CheckArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描项目并检查每个被选中文件的许可证
    Check(CheckArgs),
    /// 仅列出每个配置单元选中的文件，不做扫描
    Files {
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        #[arg(long, default_value = DEFAULT_CONFIG_FILE_NAME)]
        config_name: String,
    },
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// 项目根目录（默认当前目录）
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// 线程数（"auto"=CPU 核心数；1 表示串行）
    #[arg(long, default_value = "auto")]
    threads: String,

    /// 许可证检测规则文件（TOML），默认使用内置规则
    #[arg(long)]
    rules: Option<PathBuf>,

    /// 项目根目录下的配置文件名
    #[arg(long, default_value = DEFAULT_CONFIG_FILE_NAME)]
    config_name: String,

    /// 失败项的输出格式
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Check(cli.check)) {
        Commands::Check(args) => run_check(args),
        Commands::Files { dir, config_name } => {
            let selections = select_files(&dir, &layout_with(config_name))
                .context("failed to select files")?;
            let many = selections.len() > 1;
            for (i, files) in selections.iter().enumerate() {
                if many {
                    println!("# config {}", i);
                }
                for f in files {
                    println!("{}", f);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_check(args: CheckArgs) -> Result<ExitCode> {
    let CheckArgs { dir, threads, rules, config_name, format } = args;
    info!(?dir, "starting license check");
    let opts = CheckOptions {
        layout: layout_with(config_name),
        threads: parse_threads(&threads),
        rules_path: rules,
    };

    match check(&dir, &opts) {
        Ok(report) => {
            debug!(
                configs = report.configs_checked,
                files = report.files_scanned,
                "check finished"
            );
            if format == Format::Json {
                println!("[]");
            } else {
                println!("No license issues found");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::Violations(violations)) => {
            match format {
                Format::Text => eprint!("{}", violations),
                Format::Json => {
                    let items: Vec<ReportItem> =
                        violations.failures.iter().filter_map(ReportItem::from_result).collect();
                    let json =
                        serde_json::to_string_pretty(&items).context("serialize report")?;
                    println!("{}", json);
                }
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).context("license check failed"),
    }
}

fn layout_with(config_file_name: String) -> ProjectLayout {
    ProjectLayout { config_file_name, ..ProjectLayout::default() }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug；日志写到 stderr
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") { return None; }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
