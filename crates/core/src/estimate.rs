use std::fs;
use std::path::PathBuf;

const DEFAULT_PAGES_PER_SECOND: f64 = 100.0;
const DEFAULT_MB_PER_PAGE: f64 = 0.1;

/// Benchmark-derived throughput figures. Deliberately separate from
/// [`crate::config::PipelineConfig`]: the static configuration stays
/// immutable while these values may be replaced by a measured run.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeEstimate {
    pub pages_per_second: f64,
    pub mb_per_page: f64,
}

impl Default for RuntimeEstimate {
    fn default() -> Self {
        Self {
            pages_per_second: DEFAULT_PAGES_PER_SECOND,
            mb_per_page: DEFAULT_MB_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub total_mb: f64,
    pub estimated_pages: f64,
    pub estimated_seconds: f64,
    pub estimated_memory_mb: f64,
}

impl RuntimeEstimate {
    pub fn from_run(pages: usize, seconds: f64, memory_mb: f64) -> Self {
        if pages == 0 || seconds <= 0.0 {
            return Self::default();
        }
        Self {
            pages_per_second: pages as f64 / seconds,
            mb_per_page: memory_mb / pages as f64,
        }
    }

    /// Linear extrapolation of processing time and memory from total input
    /// size. Unreadable files contribute zero bytes.
    pub fn project(&self, files: &[PathBuf]) -> Projection {
        let total_bytes: u64 = files
            .iter()
            .filter_map(|path| fs::metadata(path).ok())
            .map(|meta| meta.len())
            .sum();

        let total_mb = total_bytes as f64 / (1024.0 * 1024.0);
        let estimated_pages = if self.mb_per_page > 0.0 {
            total_mb / self.mb_per_page
        } else {
            0.0
        };
        let estimated_seconds = if self.pages_per_second > 0.0 {
            estimated_pages / self.pages_per_second
        } else {
            0.0
        };

        Projection {
            total_mb,
            estimated_pages,
            estimated_seconds,
            estimated_memory_mb: estimated_pages * self.mb_per_page,
        }
    }
}
