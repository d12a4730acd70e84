//! 逐文件扫描与并行调度
use std::collections::BTreeSet;
use std::path::Path;

use crate::detectors::LicenseDetector;
use crate::findings::ScanResult;
use crate::walk::SelectedFile;

/// 扫描 `files`（相对 `root`），返回与输入一一对应、顺序一致的结果。
///
/// - 单个文件读取失败只影响该文件的结果，不会中止整批
/// - `threads > 1` 时在固定大小的 Rayon 线程池中执行，结果按输入下标归位
pub fn scan_files(
    root: &Path,
    files: &[SelectedFile],
    licenses: &BTreeSet<String>,
    detector: &dyn LicenseDetector,
    threads: usize,
) -> Vec<ScanResult> {
    if threads > 1 && files.len() > 1 {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => return scan_parallel(&pool, root, files, licenses, detector),
            Err(e) => {
                tracing::warn!(error = %e, "failed to build worker pool, scanning serially")
            }
        }
    }

    files.iter().map(|f| examine(root, f, licenses, detector)).collect()
}

/// 并行调度：
/// - 线程池内并行扫描，结果携带下标经有界通道发回
/// - 当前线程负责收集，按下标写回对应槽位
/// - 线程池完成（join）后才返回结果
fn scan_parallel(
    pool: &rayon::ThreadPool,
    root: &Path,
    files: &[SelectedFile],
    licenses: &BTreeSet<String>,
    detector: &dyn LicenseDetector,
) -> Vec<ScanResult> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;

    let (tx, rx) = channel::bounded::<(usize, ScanResult)>(256);
    let mut slots: Vec<Option<ScanResult>> = (0..files.len()).map(|_| None).collect();

    std::thread::scope(|s| {
        s.spawn(move || {
            pool.install(|| {
                files.par_iter().enumerate().for_each_with(tx, |tx, (idx, file)| {
                    let _ = tx.send((idx, examine(root, file, licenses, detector)));
                });
            });
            // 结束后 Sender 全部被丢弃，Receiver 将收到关闭信号
        });

        while let Ok((idx, result)) = rx.recv() {
            slots[idx] = Some(result);
        }
    });

    slots
        .into_iter()
        .zip(files)
        .map(|(slot, file)| {
            slot.unwrap_or_else(|| ScanResult::ReadFailure {
                path: file.rel.clone(),
                reason: "scan did not complete".to_string(),
            })
        })
        .collect()
}

/// 检查单个文件：无命中 → 无许可证；首个不在允许列表中的标识 → 不被允许
fn examine(
    root: &Path,
    file: &SelectedFile,
    licenses: &BTreeSet<String>,
    detector: &dyn LicenseDetector,
) -> ScanResult {
    let path = file.rel.as_str();
    let body = match std::fs::read(root.join(&file.path)) {
        Ok(b) => b,
        Err(e) => {
            return ScanResult::ReadFailure { path: path.to_string(), reason: e.to_string() }
        }
    };

    let matches = detector.detect(&body);
    if matches.is_empty() {
        return ScanResult::NoLicense { path: path.to_string() };
    }
    match matches.iter().find(|m| !licenses.contains(&m.id)) {
        Some(m) => ScanResult::NotPermitted { path: path.to_string(), license: m.id.clone() },
        None => ScanResult::Ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::LicenseMatch;
    use std::fs;
    use std::path::PathBuf;

    /// 以 `LICENSE:<id>` 行作为命中的假检测器
    struct TagDetector;

    impl LicenseDetector for TagDetector {
        fn detect(&self, body: &[u8]) -> Vec<LicenseMatch> {
            let text = String::from_utf8_lossy(body);
            text.lines()
                .filter_map(|l| l.strip_prefix("LICENSE:"))
                .map(|id| LicenseMatch { id: id.trim().to_string(), start: 0, end: 0 })
                .collect()
        }
    }

    fn permitted(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn selected(rel: &str) -> SelectedFile {
        SelectedFile { path: PathBuf::from(rel), rel: rel.to_string() }
    }

    fn fixture(n: usize) -> (tempfile::TempDir, Vec<SelectedFile>) {
        let tmp = tempfile::tempdir().unwrap();
        let mut files = Vec::new();
        for i in 0..n {
            let name = format!("f{:03}.txt", i);
            let body = match i % 3 {
                0 => "LICENSE:MIT\n".to_string(),
                1 => "nothing here\n".to_string(),
                _ => "LICENSE:MIT\nLICENSE:GPL-2.0\nLICENSE:AGPL-3.0\n".to_string(),
            };
            fs::write(tmp.path().join(&name), body).unwrap();
            files.push(selected(&name));
        }
        (tmp, files)
    }

    #[test]
    fn classifies_each_file() {
        let (tmp, files) = fixture(3);
        let results = scan_files(tmp.path(), &files, &permitted(&["MIT"]), &TagDetector, 1);
        assert_eq!(
            results,
            vec![
                ScanResult::Ok,
                ScanResult::NoLicense { path: "f001.txt".into() },
                ScanResult::NotPermitted { path: "f002.txt".into(), license: "GPL-2.0".into() },
            ]
        );
    }

    #[test]
    fn read_failure_does_not_abort_batch() {
        let (tmp, mut files) = fixture(1);
        files.insert(0, selected("missing.txt"));
        let results = scan_files(tmp.path(), &files, &permitted(&["MIT"]), &TagDetector, 4);
        assert!(matches!(
            &results[0],
            ScanResult::ReadFailure { path, .. } if path == "missing.txt"
        ));
        assert_eq!(results[1], ScanResult::Ok);
    }

    #[test]
    fn parallel_results_keep_input_order() {
        let (tmp, files) = fixture(200);
        let licenses = permitted(&["MIT"]);
        let serial = scan_files(tmp.path(), &files, &licenses, &TagDetector, 1);
        let parallel = scan_files(tmp.path(), &files, &licenses, &TagDetector, 8);
        assert_eq!(serial.len(), 200);
        assert_eq!(serial, parallel);
    }

    #[test]
    fn all_permitted_identifiers_is_ok() {
        let (tmp, files) = fixture(3);
        let results = scan_files(
            tmp.path(),
            &files[2..],
            &permitted(&["MIT", "GPL-2.0", "AGPL-3.0"]),
            &TagDetector,
            2,
        );
        assert_eq!(results, vec![ScanResult::Ok]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(scan_files(tmp.path(), &[], &BTreeSet::new(), &TagDetector, 4).is_empty());
    }
}
