use std::mem;

use chrono::NaiveDate;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use serde_json::{Map, Value};

use crate::models::{BrewDraft, BrewField, Suggestions, ValidationError};

/// Width reserved for field labels so values line up in one column.
pub(crate) const LABEL_WIDTH: usize = 18;

/// Form state for a new brew, including autocomplete tracking.
pub(crate) struct BrewForm {
    pub(crate) draft: BrewDraft,
    /// Index into [`BrewField::ALL`].
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
    pub(crate) suggestion: Option<String>,
    pub(crate) autocomplete_disabled: bool,
}

impl BrewForm {
    /// Start a fresh draft dated `today`, focused on the first field.
    pub(crate) fn new(today: NaiveDate) -> Self {
        Self {
            draft: BrewDraft::new(today),
            active: 0,
            error: None,
            suggestion: None,
            autocomplete_disabled: false,
        }
    }

    pub(crate) fn active_field(&self) -> BrewField {
        BrewField::ALL[self.active]
    }

    /// Move focus forward, wrapping after the last field.
    pub(crate) fn next_field(&mut self) {
        self.active = (self.active + 1) % BrewField::ALL.len();
        self.reset_autocomplete();
    }

    /// Move focus backward, wrapping before the first field.
    pub(crate) fn previous_field(&mut self) {
        self.active = (self.active + BrewField::ALL.len() - 1) % BrewField::ALL.len();
        self.reset_autocomplete();
    }

    fn reset_autocomplete(&mut self) {
        self.autocomplete_disabled = false;
        self.suggestion = None;
    }

    /// Replace the active field's value, producing a new draft.
    fn set_active_value(&mut self, value: String) {
        let field = self.active_field();
        self.draft = mem::take(&mut self.draft).with_value(field, value);
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let mut value = self.draft.value(self.active_field()).to_string();
        value.push(ch);
        self.set_active_value(value);
        self.autocomplete_disabled = false;
        true
    }

    /// Remove a character from the active field.
    pub(crate) fn backspace(&mut self) {
        let mut value = self.draft.value(self.active_field()).to_string();
        if value.pop().is_some() {
            self.set_active_value(value);
        }
        self.autocomplete_disabled = false;
    }

    /// Client-side validation followed by the JSON body for the create call.
    /// The draft itself is left untouched either way.
    pub(crate) fn submission(&self) -> Result<Map<String, Value>, ValidationError> {
        self.draft.validate()?;
        Ok(self.draft.to_payload())
    }

    /// Update the ghost-text suggestion for the active field.
    pub(crate) fn update_suggestion(&mut self, suggestions: &Suggestions) {
        let field = self.active_field();
        let current = self.draft.value(field);
        if !field.is_suggestible() || self.autocomplete_disabled || current.is_empty() {
            self.suggestion = None;
            return;
        }

        let current_lower = current.to_lowercase();
        let maybe_match = suggestions
            .get(field.name())
            .into_iter()
            .flatten()
            .find(|candidate| candidate.to_lowercase().starts_with(&current_lower));

        self.suggestion = match maybe_match {
            Some(candidate)
                if !(candidate.chars().count() == current.chars().count()
                    && candidate.to_lowercase() == current_lower) =>
            {
                Some(candidate.clone())
            }
            _ => None,
        };
    }

    /// Apply the suggested value, marking autocomplete as satisfied.
    pub(crate) fn accept_suggestion(&mut self) -> bool {
        if self.suggestion_suffix().is_none() {
            return false;
        }
        match self.suggestion.take() {
            Some(candidate) => {
                self.set_active_value(candidate);
                self.autocomplete_disabled = true;
                true
            }
            None => false,
        }
    }

    /// Explicitly disable autocomplete until the value changes again.
    pub(crate) fn cancel_autocomplete(&mut self) -> bool {
        if self.suggestion.is_some() {
            self.autocomplete_disabled = true;
            self.suggestion = None;
            return true;
        }
        false
    }

    pub(crate) fn has_active_suggestion(&self) -> bool {
        self.suggestion.is_some()
    }

    /// Return the remaining characters to display as a ghosted hint.
    pub(crate) fn suggestion_suffix(&self) -> Option<String> {
        let candidate = self.suggestion.as_ref()?;
        let current_len = self.draft.value(self.active_field()).chars().count();
        let suffix: String = candidate.chars().skip(current_len).collect();
        if suffix.is_empty() {
            None
        } else {
            Some(suffix)
        }
    }

    /// Render one label/value line, with the autocomplete suffix on the
    /// active field.
    pub(crate) fn build_line(&self, field: BrewField) -> Line<'static> {
        let value = self.draft.value(field);
        let is_active = field == self.active_field();

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let marker = if field.is_required() { "*" } else { " " };
        let mut spans = vec![Span::raw(format!(
            "{marker}{:<width$}",
            format!("{}:", field.label()),
            width = LABEL_WIDTH
        ))];

        if value.is_empty() {
            if let (true, Some(suffix)) = (is_active, self.suggestion_suffix()) {
                spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
            } else {
                spans.push(Span::styled(field.placeholder().to_string(), Style::default().fg(Color::DarkGray)));
            }
        } else {
            spans.push(Span::styled(value.to_string(), style));
            if is_active {
                if let Some(suffix) = self.suggestion_suffix() {
                    spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
                }
            }
        }

        Line::from(spans)
    }

    /// Column where the cursor sits on the active line.
    pub(crate) fn cursor_column(&self) -> usize {
        1 + LABEL_WIDTH + self.draft.value(self.active_field()).chars().count()
    }
}
