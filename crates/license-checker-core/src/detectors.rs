//! 许可证检测器
//!
//! 检查流程只依赖 [`LicenseDetector`]：给定文件字节，返回零个或多个命中。
//! 内置实现 [`RuleDetector`] 由规则文件驱动：
//! - phrase 规则：对文本做单词归一化后用 Aho-Corasick 一次性匹配全部短语，
//!   注释符、换行与大小写差异都不影响结果
//! - regex 规则：`regex::bytes` 直接在原始字节上匹配
//! - SPDX 标签：`SPDX-License-Identifier:` 后的每个标识都算一次命中
use std::path::Path;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use regex::bytes::Regex;

use crate::error::{Error, Result};
use crate::findings::{sort_matches_stable, LicenseMatch};
use crate::rules::{builtin_rule_specs, load_rule_specs, Needle, RuleBook};

/// 许可证检测接口，需可跨线程共享
pub trait LicenseDetector: Send + Sync {
    fn detect(&self, body: &[u8]) -> Vec<LicenseMatch>;
}

/// 规则驱动的检测器
pub struct RuleDetector {
    /// 短语自动机（模式索引与 phrase_ids 一一对应）
    phrases: Option<AhoCorasick>,
    phrase_ids: Vec<String>,
    regexes: Vec<(String, Regex)>,
    spdx: Option<Regex>,
}

const SPDX_TAG: &str = r"SPDX-License-Identifier:[ \t]*([^\r\n]*)";

impl RuleDetector {
    /// 使用内置规则构建
    pub fn builtin() -> Result<Self> {
        Self::from_book(builtin_rule_specs()?, Path::new("<builtin>"))
    }

    /// 从 TOML 规则文件构建
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_book(load_rule_specs(path)?, path)
    }

    fn from_book(book: RuleBook, origin: &Path) -> Result<Self> {
        let rules_err = |reason: String| Error::Rules { path: origin.to_path_buf(), reason };

        let mut phrase_ids = Vec::new();
        let mut phrase_texts = Vec::new();
        let mut regexes = Vec::new();

        for spec in book.specs {
            tracing::trace!(id = %spec.id, name = ?spec.name, "compiling license rule");
            match spec.needle {
                Needle::Phrase(p) => {
                    let words = normalize_phrase(&p);
                    if words.trim().is_empty() {
                        return Err(rules_err(format!("rule '{}' has an empty phrase", spec.id)));
                    }
                    phrase_ids.push(spec.id);
                    phrase_texts.push(words);
                }
                Needle::Regex(r) => {
                    let rx = Regex::new(&r)
                        .map_err(|e| rules_err(format!("rule '{}': {}", spec.id, e)))?;
                    regexes.push((spec.id, rx));
                }
            }
        }

        let phrases = if phrase_texts.is_empty() {
            None
        } else {
            let ac = AhoCorasickBuilder::new()
                .match_kind(MatchKind::Standard)
                .build(&phrase_texts)
                .map_err(|e| rules_err(e.to_string()))?;
            Some(ac)
        };

        let spdx = if book.spdx_tags {
            Some(Regex::new(SPDX_TAG).map_err(|e| rules_err(e.to_string()))?)
        } else {
            None
        };

        Ok(Self { phrases, phrase_ids, regexes, spdx })
    }

    fn detect_phrases(&self, body: &[u8], out: &mut Vec<LicenseMatch>) {
        let ac = match &self.phrases {
            Some(ac) => ac,
            None => return,
        };
        let (text, offsets) = normalize_body(body);
        for m in ac.find_overlapping_iter(text.as_bytes()) {
            // 短语两端各带一个空格，实际单词区间为 [start+1, end-1)
            let first = m.start() + 1;
            let last = m.end() - 2;
            out.push(LicenseMatch {
                id: self.phrase_ids[m.pattern().as_usize()].clone(),
                start: offsets[first],
                end: offsets[last] + 1,
            });
        }
    }

    fn detect_regexes(&self, body: &[u8], out: &mut Vec<LicenseMatch>) {
        for (id, re) in &self.regexes {
            for m in re.find_iter(body) {
                if m.end() <= m.start() {
                    continue;
                }
                out.push(LicenseMatch { id: id.clone(), start: m.start(), end: m.end() });
            }
        }
    }

    fn detect_spdx(&self, body: &[u8], out: &mut Vec<LicenseMatch>) {
        let re = match &self.spdx {
            Some(re) => re,
            None => return,
        };
        for caps in re.captures_iter(body) {
            let Some(expr) = caps.get(1) else { continue };
            let mut skip_next = false;
            // 每个标识使用自身的区间，排序后保持表达式中的书写顺序
            for (offset, token) in spdx_expression_ids(expr.as_bytes()) {
                if skip_next {
                    skip_next = false;
                    continue;
                }
                match token {
                    b"AND" | b"OR" => {}
                    // WITH 之后是例外条款，不是许可证
                    b"WITH" => skip_next = true,
                    _ => {
                        let start = expr.start() + offset;
                        out.push(LicenseMatch {
                            id: String::from_utf8_lossy(token).into_owned(),
                            start,
                            end: start + token.len(),
                        });
                    }
                }
            }
        }
    }
}

impl LicenseDetector for RuleDetector {
    fn detect(&self, body: &[u8]) -> Vec<LicenseMatch> {
        let mut out = Vec::new();
        self.detect_phrases(body, &mut out);
        self.detect_regexes(body, &mut out);
        self.detect_spdx(body, &mut out);
        sort_matches_stable(&mut out);
        out
    }
}

/// 拆分 SPDX 表达式，去掉括号与常见的注释结尾；返回 (表达式内偏移, 标记)
fn spdx_expression_ids(expr: &[u8]) -> Vec<(usize, &[u8])> {
    let mut end = expr.len();
    while end > 0 && expr[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    let body = &expr[..end];
    if body.ends_with(b"*/") {
        end -= 2;
    } else if body.ends_with(b"-->") {
        end -= 3;
    }

    let is_delim = |b: u8| b.is_ascii_whitespace() || b == b'(' || b == b')';
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < end {
        if is_delim(expr[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < end && !is_delim(expr[i]) {
            i += 1;
        }
        tokens.push((start, &expr[start..i]));
    }
    tokens
}

/// 单词归一化：ASCII 字母数字转小写，其余字节串压缩为一个空格，首尾各补一个空格。
/// 返回归一化文本及其每个字节对应的原始偏移。
fn normalize_body(body: &[u8]) -> (String, Vec<usize>) {
    let mut text = String::with_capacity(body.len() + 2);
    let mut offsets = Vec::with_capacity(body.len() + 2);
    text.push(' ');
    offsets.push(0);

    for (i, &b) in body.iter().enumerate() {
        if b.is_ascii_alphanumeric() {
            text.push(b.to_ascii_lowercase() as char);
            offsets.push(i);
        } else if !text.ends_with(' ') {
            text.push(' ');
            offsets.push(i);
        }
    }
    if !text.ends_with(' ') {
        text.push(' ');
        offsets.push(body.len());
    }
    (text, offsets)
}

fn normalize_phrase(phrase: &str) -> String {
    let (text, _) = normalize_body(phrase.as_bytes());
    text
}
