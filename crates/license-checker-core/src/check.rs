//! 检查主流程：加载配置 → 逐个配置单元收集文件并扫描 → 汇总失败
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::load_configs;
use crate::detectors::{LicenseDetector, RuleDetector};
use crate::error::{Error, Result, Violations};
use crate::options::{CheckOptions, CheckReport, ProjectLayout};
use crate::scan::scan_files;
use crate::walk::gather_files;

/// 使用选项中的规则文件（或内置规则）检查 `root`
pub fn check(root: &Path, opts: &CheckOptions) -> Result<CheckReport> {
    let detector = match &opts.rules_path {
        Some(path) => RuleDetector::from_file(path)?,
        None => RuleDetector::builtin()?,
    };
    check_with(root, opts, &detector)
}

/// 使用给定检测器检查 `root`。
///
/// 配置单元按声明顺序处理；某个单元出现任何失败即返回 `Error::Violations`，
/// 其后的单元不再处理。
pub fn check_with(
    root: &Path,
    opts: &CheckOptions,
    detector: &dyn LicenseDetector,
) -> Result<CheckReport> {
    let root = absolute(root)?;
    let configs = load_configs(&root, &opts.layout)?;
    let threads = opts.worker_count();
    let mut report = CheckReport::default();

    for (i, cfg) in configs.iter().enumerate() {
        let files = gather_files(&root, &cfg.rules, &opts.layout)?;
        info!("Scanning {} files...", files.len());
        debug!(config = i, threads, "scanning config");

        let results = scan_files(&root, &files, &cfg.licenses, detector, threads);
        report.configs_checked += 1;
        report.files_scanned += files.len();

        let violations = Violations::from_results(results);
        if !violations.is_empty() {
            return Err(Error::Violations(violations));
        }
    }

    Ok(report)
}

/// 只收集文件、不扫描：返回每个配置单元选中的文件（`/` 分隔的显示路径）
pub fn select_files(root: &Path, layout: &ProjectLayout) -> Result<Vec<Vec<String>>> {
    let root = absolute(root)?;
    load_configs(&root, layout)?
        .iter()
        .map(|cfg| {
            let files = gather_files(&root, &cfg.rules, layout)?;
            Ok(files.into_iter().map(|f| f.rel).collect())
        })
        .collect()
}

fn absolute(root: &Path) -> Result<PathBuf> {
    if root.is_absolute() {
        return Ok(root.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(root))
        .map_err(|e| Error::Io { path: root.to_path_buf(), source: e })
}
