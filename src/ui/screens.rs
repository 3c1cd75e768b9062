use std::collections::HashSet;

use crate::models::{Brew, BrewField};

/// How the brew list is presented.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ListView {
    /// One row per brew, one column per attribute.
    Table,
    /// One summary line per brew, expandable into label/value pairs.
    Collapsible,
}

/// A column of the table view.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Column {
    Field(BrewField),
    Created,
}

impl Column {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Column::Field(field) => field.label(),
            Column::Created => "Created",
        }
    }

    pub(crate) fn cell(self, brew: &Brew) -> String {
        match self {
            Column::Field(field) => brew.value(field).unwrap_or_default().to_string(),
            Column::Created => brew.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Every table column in display order.
pub(crate) fn table_columns() -> Vec<Column> {
    BrewField::ALL
        .into_iter()
        .map(Column::Field)
        .chain(std::iter::once(Column::Created))
        .collect()
}

/// State for the brew list, rebuilt whenever the list is reloaded.
pub(crate) struct ListScreen {
    pub(crate) brews: Vec<Brew>,
    pub(crate) view: ListView,
    pub(crate) selected: usize,
    pub(crate) expanded: HashSet<i64>,
    /// First visible column in the table view.
    pub(crate) column_offset: usize,
}

impl ListScreen {
    pub(crate) fn new(brews: Vec<Brew>, view: ListView) -> Self {
        Self {
            brews,
            view,
            selected: 0,
            expanded: HashSet::new(),
            column_offset: 0,
        }
    }

    pub(crate) fn toggle_view(&mut self) {
        self.view = match self.view {
            ListView::Table => ListView::Collapsible,
            ListView::Collapsible => ListView::Table,
        };
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.brews.is_empty() {
            self.selected = 0;
            return;
        }
        let max = self.brews.len() - 1;
        self.selected = self.selected.saturating_add_signed(offset).min(max);
    }

    pub(crate) fn scroll_columns(&mut self, offset: isize) {
        let max = table_columns().len() - 1;
        self.column_offset = self.column_offset.saturating_add_signed(offset).min(max);
    }

    pub(crate) fn selected_brew(&self) -> Option<&Brew> {
        self.brews.get(self.selected)
    }

    /// Expand or collapse the selected brew in the collapsible view.
    pub(crate) fn toggle_expanded(&mut self) {
        if let Some(id) = self.selected_brew().map(|brew| brew.id) {
            if !self.expanded.remove(&id) {
                self.expanded.insert(id);
            }
        }
    }

    pub(crate) fn is_expanded(&self, brew: &Brew) -> bool {
        self.expanded.contains(&brew.id)
    }
}

/// Collapsed one-line summary of a brew.
pub(crate) fn summary_line(brew: &Brew) -> String {
    let fields = &brew.fields;
    format!(
        "{} · {} · {} · {}g · {} · {}/10",
        fields.date, fields.coffee, fields.roaster, fields.dose, fields.brew_time, fields.score
    )
}

/// Every attribute of a brew as label/value pairs, empty notes included.
pub(crate) fn detail_rows(brew: &Brew) -> Vec<(&'static str, String)> {
    table_columns()
        .into_iter()
        .map(|column| (column.label(), column.cell(brew)))
        .collect()
}
