//! 路径选择规则（有序 include/exclude，后者覆盖前者）
use crate::error::{Error, Result};
use crate::pattern::Pattern;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Include(Vec<Pattern>),
    Exclude(Vec<Pattern>),
}

impl Rule {
    /// 由配置中的一条规则构建；同时带 include 与 exclude 的条目非法。
    /// 两者都为空时返回 `None`，该条目不参与求值。
    pub fn from_lists(include: &[String], exclude: &[String]) -> Result<Option<Self>> {
        match (include.is_empty(), exclude.is_empty()) {
            (false, false) => Err(Error::RuleConflict),
            (false, true) => Ok(Some(Rule::Include(compile_all(include)?))),
            (true, false) => Ok(Some(Rule::Exclude(compile_all(exclude)?))),
            (true, true) => Ok(None),
        }
    }

    fn patterns(&self) -> &[Pattern] {
        match self {
            Rule::Include(p) | Rule::Exclude(p) => p,
        }
    }

    /// 第一个命中 `path` 的模式
    pub(crate) fn matching_pattern(&self, path: &str) -> Option<&Pattern> {
        self.patterns().iter().find(|p| p.test(path))
    }

    /// 规则命中时给出的判定；未命中返回 `None`（保持上一判定）
    fn verdict(&self, path: &str) -> Option<bool> {
        let hit = self.matching_pattern(path)?;
        let include = matches!(self, Rule::Include(_));
        tracing::trace!(path, pattern = hit.as_str(), include, "path rule matched");
        Some(include)
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns.iter().map(|p| Pattern::compile(p)).collect()
}

/// 按声明顺序求值的规则序列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 初始为包含；逐条左折叠，不提前退出
    pub fn evaluate(&self, relative_path: &str) -> bool {
        self.rules
            .iter()
            .fold(true, |decision, rule| rule.verdict(relative_path).unwrap_or(decision))
    }
}
