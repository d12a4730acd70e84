//! 公共类型（对外暴露）
use serde::Serialize;

use crate::findings::ScanResult;

/// JSON 报告中的单个失败项
#[derive(Debug, Clone, Serialize)]
pub struct ReportItem<'a> {
    pub path: &'a str,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<&'a str>,
    pub message: String,
}

impl<'a> ReportItem<'a> {
    /// `ScanResult::Ok` 没有对应的报告项
    pub fn from_result(result: &'a ScanResult) -> Option<Self> {
        let path = result.path()?;
        let license = match result {
            ScanResult::NotPermitted { license, .. } => Some(license.as_str()),
            _ => None,
        };
        Some(Self { path, kind: result.kind(), license, message: result.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_not_permitted_with_license() {
        let r = ScanResult::NotPermitted { path: "a.c".into(), license: "GPL-2.0".into() };
        let item = ReportItem::from_result(&r).unwrap();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["path"], "a.c");
        assert_eq!(json["kind"], "license-not-permitted");
        assert_eq!(json["license"], "GPL-2.0");
    }

    #[test]
    fn omits_license_for_other_failures() {
        let r = ScanResult::NoLicense { path: "b.c".into() };
        let json = serde_json::to_value(ReportItem::from_result(&r).unwrap()).unwrap();
        assert!(json.get("license").is_none());
        assert!(ReportItem::from_result(&ScanResult::Ok).is_none());
    }
}
