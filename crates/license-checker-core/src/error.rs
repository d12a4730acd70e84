//! 错误类型
//!
//! 结构性错误（配置、规则、遍历）直接中止；逐文件的扫描失败先汇总为
//! `Violations`，再作为一个整体错误返回。
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::findings::ScanResult;

#[derive(Debug, Error)]
pub enum Error {
    /// 配置文件缺失或无法解析
    #[error("Failed to load config file '{}': {reason}", path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("Invalid config: {0}")]
    ConfigParse(String),

    #[error("Invalid pattern '{pattern}' at byte {index}: {message}")]
    PatternSyntax {
        pattern: String,
        index: usize,
        message: String,
    },

    #[error("Rule cannot contain both include and exclude")]
    RuleConflict,

    #[error("Failed to gather files under '{}': {source}", path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to get absolute path of '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 许可证检测规则文件错误
    #[error("Failed to load license rules '{}': {reason}", path.display())]
    Rules { path: PathBuf, reason: String },

    #[error("{0}")]
    Violations(Violations),
}

pub type Result<T> = std::result::Result<T, Error>;

/// 一个配置单元下所有失败文件的汇总（按文件选择顺序）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations {
    pub failures: Vec<ScanResult>,
}

impl Violations {
    /// 过滤掉成功项，保留原有顺序
    pub fn from_results(results: Vec<ScanResult>) -> Self {
        Self { failures: results.into_iter().filter(|r| !r.is_ok()).collect() }
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} errors:", self.failures.len())?;
        for failure in &self.failures {
            writeln!(f, "* {}", failure)?;
        }
        Ok(())
    }
}
