//! 路径 glob 模式（编译为锚定的 `regex::Regex`）
//!
//! 语法（仅以 `/` 为分隔符，大小写敏感，整串匹配）：
//! - `?`  匹配一个非 `/` 字符
//! - `*`  匹配零个或多个非 `/` 字符
//! - `**` 匹配零个或多个任意字符（可跨越 `/`）
//!
//! 其余字符均按字面量处理。连续三个及以上的 `*` 视为语法错误。
use regex::Regex;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    AnyChar,
    Star,
    GlobStar,
}

/// 编译后的单条模式，不可变
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    re: Regex,
}

impl Pattern {
    pub fn compile(pattern: &str) -> Result<Self> {
        let tokens = tokenize(pattern)?;
        let re = Regex::new(&to_regex(&tokens)).map_err(|e| Error::PatternSyntax {
            pattern: pattern.to_string(),
            index: 0,
            message: e.to_string(),
        })?;
        Ok(Self { source: pattern.to_string(), re })
    }

    /// 对 `/` 分隔的相对路径做整串匹配
    pub fn test(&self, path: &str) -> bool {
        self.re.is_match(path)
    }

    /// 编译前的原始 glob 文本
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

fn tokenize(pattern: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match c {
            '*' => {
                let mut run = 1;
                while let Some(&(_, '*')) = chars.peek() {
                    chars.next();
                    run += 1;
                }
                if run > 2 {
                    return Err(Error::PatternSyntax {
                        pattern: pattern.to_string(),
                        index: idx,
                        message: format!("'{}' is not a valid wildcard", "*".repeat(run)),
                    });
                }
                flush_literal(&mut literal, &mut tokens);
                tokens.push(if run == 2 { Token::GlobStar } else { Token::Star });
            }
            '?' => {
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::AnyChar);
            }
            _ => literal.push(c),
        }
    }
    flush_literal(&mut literal, &mut tokens);

    Ok(tokens)
}

fn flush_literal(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

fn to_regex(tokens: &[Token]) -> String {
    // (?s)：让 `**` 同样覆盖换行符，路径中理论上可出现
    let mut out = String::from("(?s)^");
    for t in tokens {
        match t {
            Token::Literal(s) => out.push_str(&regex::escape(s)),
            Token::AnyChar => out.push_str("[^/]"),
            Token::Star => out.push_str("[^/]*"),
            Token::GlobStar => out.push_str(".*"),
        }
    }
    out.push('$');
    out
}
