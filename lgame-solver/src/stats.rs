//! Search statistics and progress logging.

use std::time::Instant;

/// Get current process memory usage in bytes (RSS - Resident Set Size).
/// Returns None if unable to determine.
#[cfg(target_os = "macos")]
pub fn get_memory_usage() -> Option<u64> {
    use std::mem::MaybeUninit;

    // macOS: use mach APIs
    extern "C" {
        fn mach_task_self() -> u32;
        fn task_info(
            target_task: u32,
            flavor: i32,
            task_info_out: *mut libc::c_void,
            task_info_outCnt: *mut u32,
        ) -> i32;
    }

    #[repr(C)]
    struct TaskBasicInfo {
        suspend_count: i32,
        virtual_size: u64,
        resident_size: u64,
        user_time: (i32, i32),
        system_time: (i32, i32),
        policy: i32,
    }

    const TASK_BASIC_INFO_64: i32 = 5;
    const TASK_BASIC_INFO_64_COUNT: u32 = 10;

    unsafe {
        let mut info = MaybeUninit::<TaskBasicInfo>::uninit();
        let mut count = TASK_BASIC_INFO_64_COUNT;

        let result = task_info(
            mach_task_self(),
            TASK_BASIC_INFO_64,
            info.as_mut_ptr() as *mut libc::c_void,
            &mut count,
        );

        if result == 0 {
            Some(info.assume_init().resident_size)
        } else {
            None
        }
    }
}

#[cfg(target_os = "linux")]
pub fn get_memory_usage() -> Option<u64> {
    // Linux: read from /proc/self/status
    use std::fs;

    let status = fs::read_to_string("/proc/self/status").ok()?;
    for line in status.lines() {
        if line.starts_with("VmRSS:") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 2 {
                let kb: u64 = parts[1].parse().ok()?;
                return Some(kb * 1024);
            }
        }
    }
    None
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub fn get_memory_usage() -> Option<u64> {
    None
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Statistics collected during a search.
#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    /// Nodes entered by the search (including leaves)
    pub nodes: u64,

    /// Calls to the mobility evaluator
    pub leaf_evaluations: u64,

    /// Transposition table probes that returned a usable entry
    pub cache_hits: u64,

    /// Entries written to the transposition table
    pub cache_stores: u64,

    /// Positions with no legal move for the side to move
    pub terminal_positions: u64,

    /// Alpha or beta cutoffs
    pub cutoffs: u64,

    /// Sibling actions skipped because of a cutoff
    pub branches_pruned: u64,

    /// Decisions that fell back to heuristic ranking
    pub fallbacks: u64,

    /// Deepest ply reached below the root
    pub max_depth: u64,

    /// For rate calculation
    start_time: Option<Instant>,
    last_log_time: Option<Instant>,
    last_log_nodes: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            last_log_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Get current nodes per second
    pub fn nodes_per_sec(&self) -> f64 {
        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                return self.nodes as f64 / elapsed;
            }
        }
        0.0
    }

    /// Check if we should log progress
    pub fn should_log(&self, interval_secs: u64) -> bool {
        if let Some(last) = self.last_log_time {
            last.elapsed().as_secs() >= interval_secs
        } else {
            true
        }
    }

    /// Share of generated branches skipped by pruning, in percent.
    pub fn pruning_pct(&self) -> f64 {
        if self.nodes > 0 {
            100.0 * self.branches_pruned as f64 / (self.nodes + self.branches_pruned) as f64
        } else {
            0.0
        }
    }

    /// Log progress and reset log timer
    pub fn log_progress(&mut self, table_size: usize, unique: usize) {
        let now = Instant::now();
        let elapsed_total = self.start_time.map(|s| s.elapsed().as_secs()).unwrap_or(0);

        // Calculate rate since last log
        let rate = if let Some(last) = self.last_log_time {
            let elapsed = last.elapsed().as_secs_f64();
            let nodes = self.nodes - self.last_log_nodes;
            if elapsed > 0.0 {
                nodes as f64 / elapsed
            } else {
                0.0
            }
        } else {
            self.nodes_per_sec()
        };

        let mem_str = get_memory_usage()
            .map(|m| format!(" mem={}", format_bytes(m)))
            .unwrap_or_default();

        println!(
            "[{:02}:{:02}:{:02}] nodes={} unique={} table={} cache_hits={} rate={:.0}/s depth={} pruned={:.1}%{}",
            elapsed_total / 3600,
            (elapsed_total % 3600) / 60,
            elapsed_total % 60,
            self.nodes,
            unique,
            table_size,
            self.cache_hits,
            rate,
            self.max_depth,
            self.pruning_pct(),
            mem_str,
        );
        println!(
            "           leaves={} terminals={} cutoffs={} fallbacks={}",
            self.leaf_evaluations, self.terminal_positions, self.cutoffs, self.fallbacks
        );

        self.last_log_time = Some(now);
        self.last_log_nodes = self.nodes;
    }

    /// Print final summary
    pub fn print_summary(&self, unique: usize) {
        println!("Nodes searched: {}", self.nodes);
        println!("Unique positions: {}", unique);
        println!("Leaf evaluations: {}", self.leaf_evaluations);
        println!("Cache hits: {}", self.cache_hits);
        println!("Cache stores: {}", self.cache_stores);
        println!("Terminal positions: {}", self.terminal_positions);
        println!("Cutoffs: {}", self.cutoffs);
        println!("Branches pruned: {} ({:.1}%)", self.branches_pruned, self.pruning_pct());
        println!("Fallbacks: {}", self.fallbacks);
        println!("Max depth: {}", self.max_depth);

        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                println!("Average rate: {:.0} nodes/sec", self.nodes as f64 / elapsed);
            }
        }
    }
}
