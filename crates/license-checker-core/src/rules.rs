//! 许可证检测规则文件加载（TOML）
use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

/// 内置规则，未指定规则文件时使用
const BUILTIN_RULES: &str = include_str!("../rules/licenses.toml");

/// 单条规则的配置（支持 phrase 或 regex 字段）
#[derive(Debug, Clone, Deserialize)]
struct RuleEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phrase: Option<String>,
    #[serde(default)]
    pub regex: Option<String>,
}

fn default_true() -> bool {
    true
}

/// 顶层规则文件结构
#[derive(Debug, Clone, Deserialize)]
struct RuleFile {
    /// 是否识别 `SPDX-License-Identifier:` 标签
    #[serde(default = "default_true")]
    pub spdx_tags: bool,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// 规则的匹配方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Needle {
    /// 单词归一化后的短语
    Phrase(String),
    /// 原始字节上的正则
    Regex(String),
}

/// 归一化后的规则规格（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RuleSpec {
    pub id: String,
    pub name: Option<String>,
    pub needle: Needle,
}

/// 规则文件的完整内容
#[derive(Debug, Clone)]
pub(crate) struct RuleBook {
    pub spdx_tags: bool,
    pub specs: Vec<RuleSpec>,
}

/// 从 TOML 规则文件加载并归一化为 RuleBook
pub(crate) fn load_rule_specs(path: &Path) -> Result<RuleBook> {
    let txt = std::fs::read_to_string(path).map_err(|e| Error::Rules {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_rule_specs(&txt, path)
}

pub(crate) fn builtin_rule_specs() -> Result<RuleBook> {
    parse_rule_specs(BUILTIN_RULES, Path::new("<builtin>"))
}

fn parse_rule_specs(txt: &str, origin: &Path) -> Result<RuleBook> {
    let rules_err = |reason: String| Error::Rules { path: origin.to_path_buf(), reason };
    let parsed: RuleFile = toml::from_str(txt).map_err(|e| rules_err(e.to_string()))?;
    let mut specs = Vec::with_capacity(parsed.rules.len());

    for e in parsed.rules {
        let needle = match (e.phrase, e.regex) {
            (Some(_), Some(_)) => {
                return Err(rules_err(format!("rule '{}' has both phrase and regex", e.id)))
            }
            (Some(p), None) => Needle::Phrase(p),
            (None, Some(r)) => Needle::Regex(r),
            (None, None) => {
                return Err(rules_err(format!("rule '{}' has no phrase or regex", e.id)))
            }
        };
        specs.push(RuleSpec { id: e.id, name: e.name, needle });
    }

    Ok(RuleBook { spdx_tags: parsed.spdx_tags, specs })
}
