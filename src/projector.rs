use crate::types::{ExecStatus, ExecutionLog};

// ---------------------------------------------------------------------------
// Log view projection
// ---------------------------------------------------------------------------

/// Status dimension of the log filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Success,
    Failed,
}

impl StatusFilter {
    fn matches(self, status: ExecStatus) -> bool {
        match self {
            Self::All => true,
            Self::Success => status == ExecStatus::Success,
            Self::Failed => status == ExecStatus::Failed,
        }
    }
}

/// One page of the filtered log view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogProjection {
    /// Indices into the input slice for the visible page, in input order.
    pub visible: Vec<usize>,
    pub total_filtered: usize,
    pub total_pages: usize,
}

/// Project the raw log stream into one visible page.
///
/// A log is included iff the workflow id's text contains `search_term`
/// (case-insensitive; empty term matches everything) and its status passes
/// `status`. Pages are 1-based; an out-of-range page yields an empty slice,
/// never an error. Callers changing `search_term` or `status` must reset
/// `page` to 1 themselves — this function is stateless.
pub fn project(
    logs: &[ExecutionLog],
    search_term: &str,
    status: StatusFilter,
    page: usize,
    page_size: usize,
) -> LogProjection {
    let needle = search_term.to_lowercase();
    let filtered: Vec<usize> = logs
        .iter()
        .enumerate()
        .filter(|(_, log)| {
            (needle.is_empty() || log.workflow_id.to_string().contains(&needle))
                && status.matches(log.status)
        })
        .map(|(i, _)| i)
        .collect();

    let total_filtered = filtered.len();
    let total_pages = if page_size == 0 {
        0
    } else {
        total_filtered.div_ceil(page_size)
    };

    let start = page.saturating_sub(1).saturating_mul(page_size);
    let visible = if page == 0 || start >= total_filtered {
        Vec::new()
    } else {
        filtered[start..(start + page_size).min(total_filtered)].to_vec()
    };

    LogProjection {
        visible,
        total_filtered,
        total_pages,
    }
}

/// Page numbers to offer as direct controls: at most 5, centered on
/// `current` but clamped so the window never extends past `[1, total_pages]`.
pub fn page_window(current: usize, total_pages: usize) -> Vec<usize> {
    if total_pages == 0 {
        return Vec::new();
    }
    let width = total_pages.min(5);
    let first = current
        .saturating_sub(2)
        .clamp(1, total_pages - width + 1);
    (first..first + width).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn make_log(id: i64, workflow_id: i64, status: ExecStatus) -> ExecutionLog {
        ExecutionLog {
            id,
            workflow_id,
            status,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// 12 success / 11 failed across workflows 1..=23.
    fn sample_logs() -> Vec<ExecutionLog> {
        (0..23)
            .map(|i| {
                let status = if i < 12 {
                    ExecStatus::Success
                } else {
                    ExecStatus::Failed
                };
                make_log(i, i + 1, status)
            })
            .collect()
    }

    #[test]
    fn all_filter_keeps_every_log() {
        let logs = sample_logs();
        let p = project(&logs, "", StatusFilter::All, 1, 10);
        assert_eq!(p.total_filtered, logs.len());
        assert_eq!(p.total_pages, 3);
    }

    #[test]
    fn visible_never_exceeds_page_size() {
        let logs = sample_logs();
        for page in 1..=5 {
            let p = project(&logs, "", StatusFilter::All, page, 10);
            assert!(p.visible.len() <= 10);
        }
    }

    #[test]
    fn failed_filter_paginates_eleven_as_ten_plus_one() {
        let logs = sample_logs();

        let page1 = project(&logs, "", StatusFilter::Failed, 1, 10);
        assert_eq!(page1.total_filtered, 11);
        assert_eq!(page1.total_pages, 2);
        assert_eq!(page1.visible.len(), 10);

        let page2 = project(&logs, "", StatusFilter::Failed, 2, 10);
        assert_eq!(page2.visible.len(), 1);
    }

    #[test]
    fn search_matches_workflow_id_text() {
        let logs = vec![
            make_log(1, 42, ExecStatus::Success),
            make_log(2, 7, ExecStatus::Success),
            make_log(3, 142, ExecStatus::Failed),
        ];
        // Substring match: both 42 and 142 contain "42".
        let p = project(&logs, "42", StatusFilter::All, 1, 10);
        assert_eq!(p.visible, vec![0, 2]);
        assert_eq!(p.total_filtered, 2);
    }

    #[test]
    fn search_and_status_combine() {
        let logs = vec![
            make_log(1, 42, ExecStatus::Success),
            make_log(2, 42, ExecStatus::Failed),
        ];
        let p = project(&logs, "42", StatusFilter::Failed, 1, 10);
        assert_eq!(p.visible, vec![1]);
    }

    #[test]
    fn out_of_range_page_yields_empty_slice() {
        let logs = sample_logs();
        let p = project(&logs, "", StatusFilter::All, 9, 10);
        assert!(p.visible.is_empty());
        assert_eq!(p.total_filtered, 23);
    }

    #[test]
    fn empty_input_has_zero_pages() {
        let p = project(&[], "", StatusFilter::All, 1, 10);
        assert!(p.visible.is_empty());
        assert_eq!(p.total_filtered, 0);
        assert_eq!(p.total_pages, 0);
    }

    #[test]
    fn projection_is_pure() {
        let logs = sample_logs();
        let a = project(&logs, "1", StatusFilter::Failed, 1, 5);
        let b = project(&logs, "1", StatusFilter::Failed, 1, 5);
        assert_eq!(a, b);
    }

    // --- page_window tests ---

    #[test]
    fn window_is_all_pages_when_five_or_fewer() {
        assert_eq!(page_window(1, 3), vec![1, 2, 3]);
        assert_eq!(page_window(3, 3), vec![1, 2, 3]);
        assert_eq!(page_window(2, 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn window_centers_on_current_page() {
        assert_eq!(page_window(5, 9), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn window_clamps_at_the_edges() {
        assert_eq!(page_window(1, 9), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(2, 9), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(9, 9), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn window_is_empty_for_zero_pages() {
        assert!(page_window(1, 0).is_empty());
    }
}
