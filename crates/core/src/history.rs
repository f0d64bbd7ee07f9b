use std::collections::VecDeque;

use crate::core::Selection;
use crate::ops::Op;

/// One undoable step: the ops that revert it and the selections on either
/// side of it.
#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub revert: Vec<Op>,
    pub before: Selection,
    pub after: Selection,
}

#[derive(Debug, Default)]
pub(crate) struct History {
    done: VecDeque<Step>,
    undone: Vec<Step>,
}

impl History {
    /// Records a fresh edit. Anything undone before it can no longer be
    /// redone.
    pub fn record(&mut self, step: Step, limit: usize) {
        self.undone.clear();
        self.done.push_back(step);
        while self.done.len() > limit {
            self.done.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn take_undo(&mut self) -> Option<Step> {
        self.done.pop_back()
    }

    pub fn take_redo(&mut self) -> Option<Step> {
        self.undone.pop()
    }

    pub fn push_undone(&mut self, step: Step) {
        self.undone.push(step);
    }

    pub fn push_redone(&mut self, step: Step) {
        self.done.push_back(step);
    }
}
