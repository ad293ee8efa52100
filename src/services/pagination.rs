use serde::Serialize;

/// How many page buttons are shown at once
pub const PAGE_WINDOW: u32 = 5;

/// Page numbers to display around `current`
///
/// The window is [`PAGE_WINDOW`] wide, stays inside `1..=total`, is centered on
/// `current` away from the edges and pins to the first or last pages near them.
pub fn page_window(current: u32, total: u32) -> Vec<u32> {
    if total <= PAGE_WINDOW {
        return (1..=total).collect();
    }

    let half = PAGE_WINDOW / 2;
    let start = if current <= half + 1 {
        1
    } else if current >= total - half {
        total - PAGE_WINDOW + 1
    } else {
        current - half
    };

    (start..start + PAGE_WINDOW).collect()
}

/// Everything a pager needs to draw Previous / numbers / Next
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationControls {
    pub current: u32,
    pub total: u32,
    pub pages: Vec<u32>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PaginationControls {
    pub fn new(current: u32, total: u32) -> Self {
        Self {
            current,
            total,
            pages: page_window(current, total),
            has_previous: current > 1,
            has_next: current < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_totals_show_every_page() {
        for total in 1..=PAGE_WINDOW {
            for current in 1..=total {
                assert_eq!(page_window(current, total), (1..=total).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_zero_total_is_empty() {
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn test_near_start_pins_first_pages() {
        for current in 1..=3 {
            assert_eq!(page_window(current, 10), vec![1, 2, 3, 4, 5]);
        }
        assert_eq!(page_window(3, 6), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_near_end_pins_last_pages() {
        for current in 8..=10 {
            assert_eq!(page_window(current, 10), vec![6, 7, 8, 9, 10]);
        }
        assert_eq!(page_window(4, 6), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_middle_is_centered() {
        assert_eq!(page_window(4, 10), vec![2, 3, 4, 5, 6]);
        assert_eq!(page_window(7, 10), vec![5, 6, 7, 8, 9]);
        assert_eq!(page_window(250, 500), vec![248, 249, 250, 251, 252]);
    }

    #[test]
    fn test_window_always_in_range() {
        for total in 6..40 {
            for current in 1..=total {
                let window = page_window(current, total);
                assert_eq!(window.len(), PAGE_WINDOW as usize);
                assert!(window.contains(&current));
                assert!(window[0] >= 1 && *window.last().unwrap() <= total);
            }
        }
    }

    #[test]
    fn test_controls_boundaries() {
        let first = PaginationControls::new(1, 10);
        assert!(!first.has_previous);
        assert!(first.has_next);

        let last = PaginationControls::new(10, 10);
        assert!(last.has_previous);
        assert!(!last.has_next);

        let only = PaginationControls::new(1, 1);
        assert!(!only.has_previous && !only.has_next);
    }
}
