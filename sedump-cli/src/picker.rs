//! dialoguer-backed interactive archive picker.

use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;

use sedump::{ArchivePicker, PickError};

/// Picker that prompts on the controlling terminal.
///
/// In non-interactive environments (piped stderr, CI) picking is reported
/// as unavailable rather than blocking on input that can never arrive.
pub struct TermPicker {
    term: Term,
}

impl TermPicker {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Default for TermPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchivePicker for TermPicker {
    fn pick(&self, prompt: &str, candidates: &[String]) -> Result<Option<usize>, PickError> {
        if !self.term.is_term() {
            return Err(PickError::Unavailable);
        }

        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(candidates)
            .default(0)
            .interact_on_opt(&self.term)
            .map_err(|e| PickError::Prompt(e.to_string()))
    }
}
