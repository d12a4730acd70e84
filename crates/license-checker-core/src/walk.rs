//! 文件收集：遍历项目树，按路径规则筛选需要扫描的文件
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::options::ProjectLayout;
use crate::paths::RuleSet;

/// 被选中的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// 相对 `root` 的真实路径（保留原始 OsStr，用于读取）
    pub path: PathBuf,
    /// `/` 分隔的显示路径（规则匹配与报告使用；非 UTF-8 部分有损转换）
    pub rel: String,
}

/// 遍历 `root` 下的所有条目，返回被 `rules` 选中的文件。
///
/// - 同一目录内按文件名排序，输出顺序可复现
/// - 顶层 VCS 目录直接剪枝；顶层配置文件始终跳过
/// - 被排除的目录仍会进入，以便后续 include 规则重新选中其中的文件
/// - 只输出非目录条目；任何遍历错误都会中止
pub fn gather_files(
    root: &Path,
    rules: &RuleSet,
    layout: &ProjectLayout,
) -> Result<Vec<SelectedFile>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_vcs_dir(e, layout));

    for entry in walker {
        let entry = entry.map_err(|e| Error::Traversal {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path().strip_prefix(root).unwrap_or(entry.path()).to_path_buf();
        let rel = slash_path(&path);
        if entry.depth() == 1 && rel == layout.config_file_name {
            continue;
        }
        if rules.evaluate(&rel) {
            files.push(SelectedFile { path, rel });
        } else {
            tracing::trace!(path = %rel, "excluded by rules");
        }
    }

    tracing::debug!(root = %root.display(), selected = files.len(), "gathered files");
    Ok(files)
}

fn is_vcs_dir(entry: &DirEntry, layout: &ProjectLayout) -> bool {
    entry.depth() == 1 && entry.file_name().to_string_lossy() == layout.vcs_dir_name.as_str()
}

/// 分隔符统一为 `/`
fn slash_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::Rule;
    use crate::pattern::Pattern;
    use std::fs;

    fn write_file(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn patterns(p: &[&str]) -> Vec<Pattern> {
        p.iter().map(|s| Pattern::compile(s).unwrap()).collect()
    }

    fn include(p: &[&str]) -> Rule {
        Rule::Include(patterns(p))
    }

    fn exclude(p: &[&str]) -> Rule {
        Rule::Exclude(patterns(p))
    }

    fn rels(root: &Path, rules: &RuleSet, layout: &ProjectLayout) -> Vec<String> {
        gather_files(root, rules, layout).unwrap().into_iter().map(|f| f.rel).collect()
    }

    fn fixture() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write_file(&root.join("license-checker.cfg"), "{}");
        write_file(&root.join(".git/HEAD"), "ref: refs/heads/main");
        write_file(&root.join("b.txt"), "b");
        write_file(&root.join("a/z.txt"), "z");
        write_file(&root.join("a/b/c.txt"), "c");
        write_file(&root.join("out/foo.txt"), "foo");
        write_file(&root.join("out/bar.txt"), "bar");
        write_file(&root.join("build/x"), "x");
        tmp
    }

    #[test]
    fn include_all_yields_tree_minus_reserved_entries() {
        let tmp = fixture();
        let rules = RuleSet::new(vec![include(&["**"])]);
        let files = rels(tmp.path(), &rules, &ProjectLayout::default());
        assert_eq!(
            files,
            vec!["a/b/c.txt", "a/z.txt", "b.txt", "build/x", "out/bar.txt", "out/foo.txt"]
        );
    }

    #[test]
    fn exclude_all_yields_nothing() {
        let tmp = fixture();
        let rules = RuleSet::new(vec![exclude(&["**"])]);
        let files = rels(tmp.path(), &rules, &ProjectLayout::default());
        assert!(files.is_empty());
    }

    #[test]
    fn include_resurrects_file_inside_excluded_directory() {
        let tmp = fixture();
        let rules = RuleSet::new(vec![exclude(&["out/*", "build/*"]), include(&["out/foo.txt"])]);
        let files = rels(tmp.path(), &rules, &ProjectLayout::default());
        assert!(files.contains(&"out/foo.txt".to_string()));
        assert!(!files.contains(&"out/bar.txt".to_string()));
        assert!(!files.contains(&"build/x".to_string()));
    }

    #[test]
    fn excluded_directory_is_still_descended() {
        let tmp = fixture();
        let rules = RuleSet::new(vec![exclude(&["a", "a/**"]), include(&["a/b/c.txt"])]);
        let files = rels(tmp.path(), &rules, &ProjectLayout::default());
        assert!(files.contains(&"a/b/c.txt".to_string()));
        assert!(!files.contains(&"a/z.txt".to_string()));
    }

    #[test]
    fn reserved_names_are_configurable() {
        let tmp = fixture();
        write_file(&tmp.path().join("custom.json"), "{}");
        write_file(&tmp.path().join(".hg/store"), "s");
        let layout = ProjectLayout {
            config_file_name: "custom.json".into(),
            vcs_dir_name: ".hg".into(),
        };
        let files = rels(tmp.path(), &RuleSet::default(), &layout);
        assert!(files.contains(&".git/HEAD".to_string()));
        assert!(files.contains(&"license-checker.cfg".to_string()));
        assert!(!files.contains(&"custom.json".to_string()));
        assert!(!files.iter().any(|f| f.starts_with(".hg")));
    }

    #[test]
    fn nested_config_name_is_not_reserved() {
        let tmp = fixture();
        write_file(&tmp.path().join("sub/license-checker.cfg"), "{}");
        let files = rels(tmp.path(), &RuleSet::default(), &ProjectLayout::default());
        assert!(files.contains(&"sub/license-checker.cfg".to_string()));
        assert!(!files.contains(&"license-checker.cfg".to_string()));
    }

    #[test]
    fn missing_root_is_traversal_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        let err = gather_files(&missing, &RuleSet::default(), &ProjectLayout::default())
            .unwrap_err();
        assert!(matches!(err, Error::Traversal { .. }));
    }

    #[test]
    fn selected_file_keeps_native_path() {
        let tmp = fixture();
        let files = gather_files(tmp.path(), &RuleSet::default(), &ProjectLayout::default())
            .unwrap();
        let nested = files.iter().find(|f| f.rel == "a/b/c.txt").unwrap();
        assert_eq!(nested.path, Path::new("a").join("b").join("c.txt"));
        assert!(tmp.path().join(&nested.path).is_file());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_name_keeps_raw_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempfile::tempdir().unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.c");
        write_file(&tmp.path().join(name), "x");

        let files = gather_files(tmp.path(), &RuleSet::default(), &ProjectLayout::default())
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, Path::new(name));
        assert_eq!(files[0].rel, "caf\u{fffd}.c");
    }
}
