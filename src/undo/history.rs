//! Undo/redo history.
//!
//! Maintains two stacks:
//! - `undo_stack`: commands that can be undone (most recent at the end)
//! - `redo_stack`: commands that can be redone (most recent at the end)
//!
//! Pushing applies the command and clears the redo stack. Commands pushed
//! under the same `MergeGroup` fold into one entry when `Command::try_merge`
//! accepts them, so a drag or a stroke is a single undo step.

use crate::constants::{DEFAULT_MAX_HISTORY, DEFAULT_PAN_MERGE_LIMIT};

use super::command::Command;
use super::scene::Scene;

/// Configuration for the command log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    /// Maximum number of entries kept in history
    pub max_history: usize,
    /// Maximum number of pans folded into one entry
    pub pan_merge_limit: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            pan_merge_limit: DEFAULT_PAN_MERGE_LIMIT,
        }
    }
}

/// Identifies one continuous interaction (a drag, a stroke).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeGroup(u64);

#[derive(Debug, Clone)]
struct Entry {
    command: Command,
    group: Option<MergeGroup>,
}

/// The undo/redo history.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    undo_stack: Vec<Entry>,
    redo_stack: Vec<Entry>,
    config: LogConfig,
    next_group: u64,
}

impl CommandLog {
    /// Create a new empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: LogConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> LogConfig {
        self.config
    }

    /// Allocate a merge group for a new interaction.
    pub fn new_group(&mut self) -> MergeGroup {
        self.next_group += 1;
        MergeGroup(self.next_group)
    }

    /// Apply `command` to `scene` and record it.
    ///
    /// The command merges into the most recent entry when both carry the
    /// same group and the entry accepts it. Ungrouped commands never merge.
    pub fn push(&mut self, command: Command, group: Option<MergeGroup>, scene: &mut Scene) {
        command.apply(scene);
        self.redo_stack.clear();

        if let Some(group) = group
            && let Some(top) = self.undo_stack.last_mut()
            && top.group == Some(group)
            && top.command.try_merge(&command, self.config.pan_merge_limit)
        {
            log::debug!("📝 Undo: merged '{}'", command.description());
            return;
        }

        log::debug!("📝 Undo: pushed '{}'", command.description());
        self.undo_stack.push(Entry { command, group });

        if self.undo_stack.len() > self.config.max_history {
            let excess = self.undo_stack.len() - self.config.max_history;
            self.undo_stack.drain(..excess);
        }
    }

    /// Revert the most recent entry. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        log::debug!("⏪ Undo: '{}'", entry.command.description());
        entry.command.revert(scene);
        self.redo_stack.push(entry);
        true
    }

    /// Re-apply the most recently undone entry. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        let Some(mut entry) = self.redo_stack.pop() else {
            return false;
        };
        log::debug!("⏩ Redo: '{}'", entry.command.description());
        entry.command.apply(scene);
        // A redone entry starts a fresh interaction
        entry.group = None;
        self.undo_stack.push(entry);
        true
    }

    /// The command `undo` would revert.
    pub fn next_undo(&self) -> Option<&Command> {
        self.undo_stack.last().map(|e| &e.command)
    }

    /// The command `redo` would re-apply.
    pub fn next_redo(&self) -> Option<&Command> {
        self.redo_stack.last().map(|e| &e.command)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the description of the command that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|e| e.command.description())
    }

    /// Get the description of the command that would be redone
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|e| e.command.description())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("🗑️ Undo history cleared");
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
