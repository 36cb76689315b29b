use std::path::PathBuf;

use crate::core::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::kernel::effect::{Location, LocationKind};
use crate::kernel::Effect;

use super::mode::Mode;
use super::state::EditorState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    items: Vec<String>,
    index: usize,
}

impl ListState {
    fn new(items: Vec<String>, index: usize) -> Self {
        let index = index.min(items.len().saturating_sub(1));
        Self { items, index }
    }

    fn step(&mut self, forward: bool) -> bool {
        let len = self.items.len();
        if len < 2 {
            return false;
        }
        self.index = if forward {
            (self.index + 1) % len
        } else {
            (self.index + len - 1) % len
        };
        true
    }

    fn jump(&mut self, index: usize) -> bool {
        let index = index.min(self.items.len().saturating_sub(1));
        let changed = index != self.index;
        self.index = index;
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Unchanged,
    Moved,
    Cancel,
    Choose,
}

/// What Enter yields for the highlighted item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerChoice {
    Branch { root: PathBuf, branch: String },
    Location(Location),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Picker {
    Branches {
        root: PathBuf,
        list: ListState,
    },
    Locations {
        kind: LocationKind,
        locations: Vec<Location>,
        list: ListState,
    },
}

impl Picker {
    /// A branch list that starts on `current` when it is present.
    pub fn branches(root: PathBuf, branches: Vec<String>, current: Option<&str>) -> Self {
        let index = current
            .and_then(|c| branches.iter().position(|b| b == c))
            .unwrap_or(0);
        Self::Branches {
            root,
            list: ListState::new(branches, index),
        }
    }

    pub fn locations(kind: LocationKind, locations: Vec<Location>, labels: Vec<String>) -> Self {
        Self::Locations {
            kind,
            locations,
            list: ListState::new(labels, 0),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::Branches { .. } => "branches".to_string(),
            Self::Locations { kind, list, .. } => format!("{} ({})", kind.label(), list.items.len()),
        }
    }

    pub fn items(&self) -> &[String] {
        &self.list().items
    }

    pub fn index(&self) -> usize {
        self.list().index
    }

    pub fn available(&self) -> bool {
        !self.list().items.is_empty()
    }

    pub fn on_key(&mut self, key: &KeyEvent) -> PickerOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let list = self.list_mut();
        let moved = match key.code {
            KeyCode::Enter => return PickerOutcome::Choose,
            KeyCode::Esc => return PickerOutcome::Cancel,
            KeyCode::Char('c') if ctrl => return PickerOutcome::Cancel,
            KeyCode::Up | KeyCode::BackTab => list.step(false),
            KeyCode::Char('p') if ctrl => list.step(false),
            KeyCode::Char('k') if !ctrl => list.step(false),
            KeyCode::Down | KeyCode::Tab => list.step(true),
            KeyCode::Char('n') if ctrl => list.step(true),
            KeyCode::Char('j') if !ctrl => list.step(true),
            KeyCode::Home => list.jump(0),
            KeyCode::End => list.jump(usize::MAX),
            _ => false,
        };
        if moved {
            PickerOutcome::Moved
        } else {
            PickerOutcome::Unchanged
        }
    }

    pub fn on_enter(&self) -> Option<PickerChoice> {
        match self {
            Self::Branches { root, list } => list.items.get(list.index).map(|branch| PickerChoice::Branch {
                root: root.clone(),
                branch: branch.clone(),
            }),
            Self::Locations {
                locations, list, ..
            } => locations.get(list.index).cloned().map(PickerChoice::Location),
        }
    }

    fn list(&self) -> &ListState {
        match self {
            Self::Branches { list, .. } | Self::Locations { list, .. } => list,
        }
    }

    fn list_mut(&mut self) -> &mut ListState {
        match self {
            Self::Branches { list, .. } | Self::Locations { list, .. } => list,
        }
    }
}

impl EditorState {
    pub fn picker(&self) -> Option<&Picker> {
        self.picker.as_ref()
    }

    /// Shows `picker` unless it has nothing to offer.
    pub(super) fn open_picker(&mut self, picker: Picker) -> bool {
        if !picker.available() {
            return false;
        }
        self.picker = Some(picker);
        self.set_mode(Mode::Picker);
        true
    }

    /// Delivers the branch list for the picker. `current` is preselected.
    pub fn open_branch_picker(
        &mut self,
        root: PathBuf,
        branches: Result<Vec<String>, String>,
        current: Option<&str>,
    ) -> bool {
        match branches {
            Ok(branches) if branches.is_empty() => {
                self.set_error("no branches".to_string());
                true
            }
            Ok(branches) => {
                let current = current.or(self.branch.as_deref()).map(str::to_string);
                self.open_picker(Picker::branches(root, branches, current.as_deref()))
            }
            Err(err) => {
                self.set_error(format!("branches: {err}"));
                true
            }
        }
    }

    pub(super) fn picker_key(&mut self, key: &KeyEvent) -> (bool, Vec<Effect>) {
        let Some(picker) = self.picker.as_mut() else {
            self.set_mode(Mode::Normal);
            return (true, Vec::new());
        };

        match picker.on_key(key) {
            PickerOutcome::Unchanged => (false, Vec::new()),
            PickerOutcome::Moved => (true, Vec::new()),
            PickerOutcome::Cancel => {
                self.close_picker();
                (true, Vec::new())
            }
            PickerOutcome::Choose => {
                let choice = picker.on_enter();
                self.close_picker();
                match choice {
                    Some(PickerChoice::Branch { root, branch }) => {
                        self.set_status(format!("main branch: {branch}"));
                        (true, vec![Effect::BranchSelected { root, branch }])
                    }
                    Some(PickerChoice::Location(location)) => self.jump_to_location(location),
                    None => (true, Vec::new()),
                }
            }
        }
    }

    fn close_picker(&mut self) {
        self.picker = None;
        self.set_mode(Mode::Normal);
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/picker.rs"]
mod tests;
