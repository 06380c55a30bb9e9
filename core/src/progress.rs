//! Progress Percentage
//!
//! The enrollment row caches `progress_percentage`, recomputed from the
//! completed-lecture count every time a lecture is completed.

/// floor(completed / total * 100), clamped to 0..=100.
///
/// Returns `None` for a course without lectures; the cached value is left
/// untouched in that case.
pub fn progress_percentage(completed: i64, total: i64) -> Option<i32> {
    if total <= 0 {
        return None;
    }

    let completed = completed.clamp(0, total);
    Some(((completed * 100) / total) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        assert_eq!(progress_percentage(0, 3), Some(0));
        assert_eq!(progress_percentage(1, 3), Some(33));
        assert_eq!(progress_percentage(2, 3), Some(66));
        assert_eq!(progress_percentage(3, 3), Some(100));
    }

    #[test]
    fn test_no_lectures() {
        assert_eq!(progress_percentage(0, 0), None);
    }

    #[test]
    fn test_monotonic_as_lectures_complete() {
        let total = 7;
        let mut last = 0;
        for completed in 0..=total {
            let p = progress_percentage(completed, total).unwrap();
            assert!(p >= last);
            last = p;
        }
        assert_eq!(last, 100);
    }
}
