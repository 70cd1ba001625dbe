use std::cell::Cell;
use std::time::Instant;

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// 是否输出性能日志
///
/// 开关：
/// - Debug 默认开启；Release 默认关闭
/// - `DEVICE_TALLY_PERF=1` 强制开启
pub fn perf_enabled() -> bool {
    match std::env::var("DEVICE_TALLY_PERF") {
        Ok(v) => is_true(&v),
        Err(_) => cfg!(debug_assertions),
    }
}

/// 性能统计 Guard：记录 elapsed_ms + 处理行数
///
/// 使用方式：
/// ```ignore
/// let _perf = device_tally::perf::PerfGuard::new("run_pass");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    rows: Cell<u64>,
    enabled: bool,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
            rows: Cell::new(0),
            enabled: perf_enabled(),
        }
    }

    /// 累加处理行数
    pub fn add_rows(&self, rows: usize) {
        self.rows
            .set(self.rows.get().saturating_add(rows as u64));
    }

    pub fn rows(&self) -> u64 {
        self.rows.get()
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        if !self.enabled {
            return;
        }
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            rows = self.rows.get(),
            "done"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_true() {
        assert!(is_true(" YES "));
        assert!(is_true("1"));
        assert!(!is_true("0"));
        assert!(!is_true(""));
    }

    #[test]
    fn test_row_counter() {
        let guard = PerfGuard::new("test");
        guard.add_rows(3);
        guard.add_rows(4);
        assert_eq!(guard.rows(), 7);
    }
}
