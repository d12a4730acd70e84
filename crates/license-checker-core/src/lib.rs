//! 许可证合规检查核心库
//!
//! 设计要点：
//! - 路径选择：有序的 include/exclude glob 规则，默认全部包含，后声明的规则覆盖先声明的。
//! - 遍历：确定性顺序；被排除的目录仍会进入，以便后续规则重新选中其中的文件。
//! - 扫描：固定大小线程池并行检测，结果按文件选择顺序归位，输出可复现。
//! - 检测器通过 `LicenseDetector` 注入，内置实现由 TOML 规则文件驱动。

mod check;
mod config;
mod detectors;
mod error;
mod findings;
mod options;
mod paths;
mod pattern;
mod rules;
mod scan;
mod types;
mod walk;

pub use check::{check, check_with, select_files};
pub use config::{load_configs, parse_configs, ConfigRecord};
pub use detectors::{LicenseDetector, RuleDetector};
pub use error::{Error, Result, Violations};
pub use findings::{LicenseMatch, ScanResult};
pub use options::{
    CheckOptions, CheckReport, ProjectLayout, DEFAULT_CONFIG_FILE_NAME, DEFAULT_VCS_DIR_NAME,
};
pub use paths::{Rule, RuleSet};
pub use pattern::Pattern;
pub use scan::scan_files;
pub use types::ReportItem;
pub use walk::{gather_files, SelectedFile};
