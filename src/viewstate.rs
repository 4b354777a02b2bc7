/// Prefix of the URL fragment encoding a selected organization report.
const REPORT_FRAGMENT_PREFIX: &str = "#report-";

/// Top-level view state, owned by the application controller and read
/// one-way by dependent panels. Never persisted server-side.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub country: String,
    pub category: String,
    pub week: u32,
    pub selected_organization: Option<String>,
    pub search_text: Option<String>,
}

impl ViewState {
    pub fn new(country: &str, category: &str) -> Self {
        ViewState {
            country: country.to_string(),
            category: category.to_string(),
            week: 0,
            selected_organization: None,
            search_text: None,
        }
    }

    /// Switches focus to an organization and returns the shareable URL
    /// fragment for the deep link.
    pub fn select_organization(&mut self, id: &str) -> String {
        self.selected_organization = Some(id.to_string());
        format!("{}{}", REPORT_FRAGMENT_PREFIX, id)
    }

    pub fn clear_selection(&mut self) {
        self.selected_organization = None;
    }

    pub fn set_search(&mut self, text: &str) {
        self.search_text = if text.trim().is_empty() {
            None
        } else {
            Some(text.to_string())
        };
    }

    pub fn fragment(&self) -> Option<String> {
        self.selected_organization
            .as_ref()
            .map(|id| format!("{}{}", REPORT_FRAGMENT_PREFIX, id))
    }

    /// Restores a selection from a URL fragment on load. Unrecognized
    /// fragments are ignored.
    pub fn apply_fragment(&mut self, fragment: &str) -> bool {
        match parse_report_fragment(fragment) {
            Some(id) => {
                self.selected_organization = Some(id.to_string());
                true
            }
            None => false,
        }
    }
}

pub fn parse_report_fragment(fragment: &str) -> Option<&str> {
    let id = fragment.strip_prefix(REPORT_FRAGMENT_PREFIX)?;
    if id.is_empty() {
        return None;
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_round_trips_through_the_fragment() {
        let mut view = ViewState::new("NL", "municipality");
        assert_eq!(view.week, 0);
        assert_eq!(view.selected_organization, None);

        let fragment = view.select_organization("133");
        assert_eq!(fragment, "#report-133");
        assert_eq!(view.fragment().as_deref(), Some("#report-133"));

        let mut restored = ViewState::new("NL", "municipality");
        assert!(restored.apply_fragment(&fragment));
        assert_eq!(restored.selected_organization.as_deref(), Some("133"));
    }

    #[test]
    fn unrecognized_fragments_are_ignored() {
        let mut view = ViewState::new("NL", "municipality");
        assert!(!view.apply_fragment("#about"));
        assert!(!view.apply_fragment("#report-"));
        assert_eq!(view.selected_organization, None);
    }

    #[test]
    fn blank_search_text_clears_the_filter() {
        let mut view = ViewState::new("NL", "municipality");
        view.set_search("alp");
        assert_eq!(view.search_text.as_deref(), Some("alp"));
        view.set_search("   ");
        assert_eq!(view.search_text, None);
    }
}
