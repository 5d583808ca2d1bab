//! Lexically nested name-to-type bindings.

use cryptran_core::Type;
use indexmap::IndexMap;

/// Stack of binding frames. The bottom frame holds module-level names and is
/// never popped.
#[derive(Clone, Debug)]
pub struct ScopeStack {
    frames: Vec<IndexMap<String, Type>>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            frames: vec![IndexMap::new()],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self) {
        self.frames.push(IndexMap::new());
    }

    /// Frame for a closure body, pre-filled with a copy of every binding
    /// visible at the point of creation. Declarations inside the closure never
    /// leak back into the enclosing frames.
    pub fn push_closure(&mut self) {
        let mut captured = IndexMap::new();
        for frame in &self.frames {
            for (name, ty) in frame {
                captured.insert(name.clone(), ty.clone());
            }
        }
        self.frames.push(captured);
    }

    pub fn pop(&mut self) {
        debug_assert!(self.frames.len() > 1, "module frame popped");
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Bind `name` in the innermost frame, replacing an earlier binding there.
    pub fn declare(&mut self, name: impl Into<String>, ty: Type) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), ty);
        }
    }

    /// Innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Replace the innermost binding of `name` with `ty` when the binding
    /// still has holes and `ty` has none. Returns false if `name` is not
    /// bound.
    pub fn refine(&mut self, name: &str, ty: &Type) -> bool {
        let Some(slot) = self.frames.iter_mut().rev().find_map(|frame| frame.get_mut(name)) else {
            return false;
        };
        if slot.contains_unknown() && !ty.contains_unknown() {
            *slot = ty.clone();
        }
        true
    }
}
