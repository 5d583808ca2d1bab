//! Identifier sanitization and collision-free naming per scope.

use cryptran_core::{Case, Type};
use indexmap::IndexMap;

use super::dialect::Dialect;

/// Target spelling of a source identifier.
///
/// Steps, in order: characters outside `[A-Za-z0-9_]` become `_`; the naming
/// convention is applied (all-caps constants keep their spelling); a leading
/// digit gets an `n` prefix; an empty result becomes `_`; a reserved word
/// gets a `_` suffix. Applying it to its own output changes nothing.
pub fn sanitize(name: &str, case: Option<Case>, dialect: &dyn Dialect) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    let apply = |s: &str| match case {
        Some(case) if !is_constant_name(s) => case.apply(s),
        _ => s.to_string(),
    };

    let mut out = apply(&cleaned);
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out = apply(&format!("n{out}"));
    }
    if out.is_empty() {
        out.push('_');
    }
    if dialect.is_reserved(&out) {
        out.push('_');
    }
    out
}

/// `SBOX`, `MAX_ROUNDS`: at least one letter and no lowercase.
pub(super) fn is_constant_name(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_alphabetic())
        && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// `get_x` / `GetX` / `getX` accessor method name for property `name`.
pub fn accessor_name(prefix: &str, name: &str, case: Case) -> String {
    case.apply(&format!("{prefix}_{name}"))
}

#[derive(Debug)]
struct Frame {
    /// Source name to target name, for lookups.
    bindings: IndexMap<String, String>,
    /// Target names taken in this frame (case-folded when the target is
    /// case-insensitive), with the source name and type that took them.
    taken: IndexMap<String, (String, Type)>,
    routine: bool,
}

impl Frame {
    fn new(routine: bool) -> Self {
        Self {
            bindings: IndexMap::new(),
            taken: IndexMap::new(),
            routine,
        }
    }
}

/// A declared name, and whether it had to move away from its natural
/// spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub renamed: bool,
}

/// Target names visible at each point of the walk. Parallel to the type
/// [`ScopeStack`](crate::analyze::ScopeStack).
#[derive(Debug)]
pub struct NameScopes {
    frames: Vec<Frame>,
    case_insensitive: bool,
    flat: bool,
}

impl NameScopes {
    pub fn new(dialect: &dyn Dialect) -> Self {
        Self {
            frames: vec![Frame::new(true)],
            case_insensitive: dialect.case_insensitive(),
            flat: dialect.flat_locals(),
        }
    }

    /// Enter a block; `routine` marks a function, method or lambda body.
    pub fn push(&mut self, routine: bool) {
        self.frames.push(Frame::new(routine));
    }

    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    fn key(&self, name: &str) -> String {
        if self.case_insensitive {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Frame whose namespace a new local joins.
    fn owner(&self) -> usize {
        if self.flat {
            self.frames.iter().rposition(|f| f.routine).unwrap_or(0)
        } else {
            self.frames.len() - 1
        }
    }

    /// Bind `source` to `natural` (its sanitized spelling), moving to
    /// `natural_2`, `natural_3`, .. when another source name holds it.
    ///
    /// In a shared routine namespace the same source name redeclared with the
    /// same type reuses its slot.
    pub fn declare(&mut self, source: &str, natural: String, ty: &Type) -> Binding {
        let owner = self.owner();
        let mut candidate = natural.clone();
        let mut n = 1;
        loop {
            let key = self.key(&candidate);
            match self.frames[owner].taken.get(&key) {
                None => break,
                Some((src, taken_ty)) if src == source && (taken_ty == ty || !self.flat) => break,
                Some(_) => {
                    n += 1;
                    candidate = format!("{natural}_{n}");
                }
            }
        }
        let key = self.key(&candidate);
        self.frames[owner]
            .taken
            .insert(key, (source.to_string(), ty.clone()));
        if let Some(frame) = self.frames.last_mut() {
            frame.bindings.insert(source.to_string(), candidate.clone());
        }
        Binding {
            renamed: candidate != natural,
            name: candidate,
        }
    }

    pub fn lookup(&self, source: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.bindings.get(source))
            .map(String::as_str)
    }
}
