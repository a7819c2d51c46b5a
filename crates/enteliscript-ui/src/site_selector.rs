//! SiteSelector modal state: single-choice list over fetched site names.

/// State of the modal site-selection list.
///
/// Presents an ordered list of site names with one highlighted row.
/// Confirmation yields the highlighted name; cancellation yields nothing
/// and leaves the caller's state untouched.
#[derive(Debug)]
pub struct SiteSelector {
    options: Vec<String>,
    highlighted: usize,
}

impl SiteSelector {
    /// Open a selector over a non-empty candidate list; `None` when the
    /// list is empty, since there would be nothing to choose.
    pub fn open(options: Vec<String>) -> Option<Self> {
        if options.is_empty() {
            return None;
        }
        Some(Self {
            options,
            highlighted: 0,
        })
    }

    /// Candidate names in presentation order.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Index of the highlighted row.
    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    /// The highlighted name.
    pub fn selected(&self) -> &str {
        &self.options[self.highlighted]
    }

    /// Move the highlight up one row, clamping at the top.
    pub fn move_up(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(1);
    }

    /// Move the highlight down one row, clamping at the bottom.
    pub fn move_down(&mut self) {
        if self.highlighted + 1 < self.options.len() {
            self.highlighted += 1;
        }
    }

    /// Confirm the highlighted choice, consuming the selector.
    pub fn confirm(mut self) -> String {
        self.options.swap_remove(self.highlighted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> SiteSelector {
        SiteSelector::open(vec!["A".to_string(), "B".to_string(), "C".to_string()])
            .expect("non-empty")
    }

    #[test]
    fn open_rejects_empty_list() {
        assert!(SiteSelector::open(Vec::new()).is_none());
    }

    #[test]
    fn starts_at_first_option() {
        let s = selector();
        assert_eq!(s.highlighted(), 0);
        assert_eq!(s.selected(), "A");
    }

    #[test]
    fn movement_clamps_at_both_ends() {
        let mut s = selector();
        s.move_up();
        assert_eq!(s.selected(), "A");
        s.move_down();
        s.move_down();
        s.move_down();
        assert_eq!(s.selected(), "C");
    }

    #[test]
    fn confirm_yields_highlighted_name() {
        let mut s = selector();
        s.move_down();
        assert_eq!(s.confirm(), "B");
    }

    #[test]
    fn options_preserve_order() {
        let s = selector();
        assert_eq!(s.options(), ["A", "B", "C"]);
    }
}
