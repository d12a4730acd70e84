//! 配置文件加载（JSON）
//!
//! 文件可以是单个对象，也可以是对象数组（多个配置单元，依次检查）：
//!
//! ```json
//! {
//!   "paths": [
//!     { "exclude": [ "out/*", "build/*" ] },
//!     { "include": [ "out/foo.txt" ] }
//!   ],
//!   "licenses": [ "Apache-2.0-Header", "MIT" ]
//! }
//! ```
use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::options::ProjectLayout;
use crate::paths::{Rule, RuleSet};

/// 单条路径规则的原始形式
#[derive(Debug, Clone, Default, Deserialize)]
struct RawRule {
    #[serde(default, alias = "Include")]
    include: Vec<String>,
    #[serde(default, alias = "Exclude")]
    exclude: Vec<String>,
}

/// 单个配置单元的原始形式
#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    #[serde(default, alias = "Paths")]
    paths: Vec<RawRule>,
    #[serde(default, alias = "Licenses")]
    licenses: Vec<String>,
}

/// 解码后的配置单元：路径规则 + 允许的许可证标识
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigRecord {
    pub rules: RuleSet,
    pub licenses: BTreeSet<String>,
}

impl ConfigRecord {
    pub fn allows_license(&self, id: &str) -> bool {
        self.licenses.contains(id)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let mut rules = Vec::with_capacity(raw.paths.len());
        for r in &raw.paths {
            if let Some(rule) = Rule::from_lists(&r.include, &r.exclude)? {
                rules.push(rule);
            }
        }
        Ok(Self {
            rules: RuleSet::new(rules),
            licenses: raw.licenses.into_iter().collect(),
        })
    }
}

/// 解析配置文本；首个非空白字符为 `{` 时视为单个配置，否则为数组
pub fn parse_configs(text: &str) -> Result<Vec<ConfigRecord>> {
    let raws: Vec<RawConfig> = if text.trim_start().starts_with('{') {
        vec![serde_json::from_str(text).map_err(json_err)?]
    } else {
        serde_json::from_str(text).map_err(json_err)?
    };
    raws.into_iter().map(ConfigRecord::from_raw).collect()
}

/// 读取 `<root>/<config_file_name>`；任何失败都归为配置加载错误
pub fn load_configs(root: &Path, layout: &ProjectLayout) -> Result<Vec<ConfigRecord>> {
    let path = root.join(&layout.config_file_name);
    let load_err = |reason: String| Error::ConfigLoad { path: path.clone(), reason };

    let text = std::fs::read_to_string(&path).map_err(|e| load_err(e.to_string()))?;
    let configs = parse_configs(&text).map_err(|e| load_err(e.to_string()))?;
    if configs.is_empty() {
        return Err(load_err("no configurations declared".to_string()));
    }
    tracing::debug!(path = %path.display(), configs = configs.len(), "loaded config");
    Ok(configs)
}

fn json_err(e: serde_json::Error) -> Error {
    Error::ConfigParse(e.to_string())
}
