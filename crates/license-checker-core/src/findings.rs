//! 检测命中项与逐文件扫描结果
use std::fmt;

/// 检测器的一次命中：许可证标识 + 在文件中的字节区间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseMatch {
    pub id: String,
    pub start: usize,
    pub end: usize,
}

/// 对单文件命中进行稳定排序：起始偏移升序 → 长度降序 → 标识字典序升序；
/// 随后按标识去重，只保留最靠前的一次
pub(crate) fn sort_matches_stable(matches: &mut Vec<LicenseMatch>) {
    matches.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| (b.end - b.start).cmp(&(a.end - a.start)))
            .then_with(|| a.id.cmp(&b.id))
    });
    let mut seen = std::collections::HashSet::new();
    matches.retain(|m| seen.insert(m.id.clone()));
}

/// 单个文件的扫描结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
    Ok,
    ReadFailure { path: String, reason: String },
    NoLicense { path: String },
    NotPermitted { path: String, license: String },
}

impl ScanResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ScanResult::Ok)
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            ScanResult::Ok => None,
            ScanResult::ReadFailure { path, .. }
            | ScanResult::NoLicense { path }
            | ScanResult::NotPermitted { path, .. } => Some(path),
        }
    }

    /// 机器可读的失败类别
    pub fn kind(&self) -> &'static str {
        match self {
            ScanResult::Ok => "ok",
            ScanResult::ReadFailure { .. } => "read-failure",
            ScanResult::NoLicense { .. } => "no-license-detected",
            ScanResult::NotPermitted { .. } => "license-not-permitted",
        }
    }
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanResult::Ok => f.write_str("ok"),
            ScanResult::ReadFailure { path, reason } => {
                write!(f, "Failed to read file '{}': {}", path, reason)
            }
            ScanResult::NoLicense { path } => write!(f, "{} has no license", path),
            ScanResult::NotPermitted { path, license } => {
                write!(f, "{} uses unsupported license '{}'", path, license)
            }
        }
    }
}
