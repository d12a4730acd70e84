//! 检查选项与项目布局（模块）
use std::path::PathBuf;

/// 配置文件的默认文件名（位于项目根目录）
pub const DEFAULT_CONFIG_FILE_NAME: &str = "license-checker.cfg";
/// 版本控制元数据目录，遍历时整体剪枝
pub const DEFAULT_VCS_DIR_NAME: &str = ".git";

/// 项目根目录下的保留名称
/// - `config_file_name`：配置文件本身，永不扫描
/// - `vcs_dir_name`：顶层元数据目录，永不进入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub config_file_name: String,
    pub vcs_dir_name: String,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            config_file_name: DEFAULT_CONFIG_FILE_NAME.to_string(),
            vcs_dir_name: DEFAULT_VCS_DIR_NAME.to_string(),
        }
    }
}

/// 检查选项
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub layout: ProjectLayout,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
    /// 许可证检测规则文件（TOML）；为空则使用内置规则
    pub rules_path: Option<PathBuf>,
}

impl CheckOptions {
    pub(crate) fn worker_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// 检查统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub configs_checked: usize,
    pub files_scanned: usize,
}
