//! Statements. Every compound statement body is a `begin` .. `end` block.

use cryptran_core::Type;

use super::PascalEmitter;
use crate::emit::config::BraceLayout;
use crate::emit::placeholder_note;
use crate::emit::printer::Printer;
use crate::target::{
    BinOp, Case, Catch, ExprKind, IncDec, Stmt, TExpr, UnOp, Visitor, walk_stmts,
};

/// Head of a `for .. to` loop.
struct Counting<'s> {
    var: &'s str,
    from: &'s TExpr,
    bound: &'s TExpr,
    /// The bound is excluded (`<` or `>`).
    exclusive: bool,
    down: bool,
}

impl PascalEmitter<'_> {
    pub(super) fn body(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    /// `head begin` .. `close`, or `head` and `begin` on their own lines.
    pub(super) fn block<F>(&mut self, head: &str, close: &str, f: F)
    where
        F: FnOnce(&mut Self),
    {
        if head.is_empty() {
            return Printer::wrapped(self, "begin", close, f);
        }
        if self.p.layout() == BraceLayout::SameLine {
            return Printer::wrapped(self, &format!("{head} begin"), close, f);
        }
        self.p.line(head);
        Printer::wrapped(self, "begin", close, f);
    }

    pub(super) fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(body) => self.block("", "end;", |e| e.body(body)),
            Stmt::VarDecl { name, ty, init } => {
                let value = match init {
                    Some(init) => self.expr(init),
                    None => format!("Default({})", self.ty(ty)),
                };
                self.p.line(format!("{name} := {value};"));
            }
            Stmt::Expr(e) => self.effect(e),
            Stmt::If { cond, then, els } => {
                let mut arms = Vec::new();
                self.flatten_if(cond, then, els.as_deref(), &mut arms);
                self.chain(arms);
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => self.for_loop(init.as_deref(), cond.as_ref(), update, body),
            Stmt::ForEach {
                var, iter, body, ..
            } => {
                let head = format!("for {var} in {} do", self.expr(iter));
                self.loop_body(&head, Vec::new(), body);
            }
            Stmt::While { cond, body } => {
                let head = format!("while {} do", self.expr(cond));
                self.loop_body(&head, Vec::new(), body);
            }
            Stmt::DoWhile { body, cond } => {
                let until = match &cond.kind {
                    ExprKind::Unary {
                        op: UnOp::Not,
                        operand,
                    } => self.expr(operand),
                    _ => format!("not {}", self.operand(cond, super::exprs::UNARY)),
                };
                self.loop_updates.push(Vec::new());
                Printer::wrapped(self, "repeat", &format!("until {until};"), |e| e.body(body));
                self.loop_updates.pop();
            }
            Stmt::Switch {
                subject,
                cases,
                default,
            } => self.switch(subject, cases, default.as_deref()),
            Stmt::Try {
                body,
                catch,
                finally,
            } => self.try_stmt(body, catch.as_ref(), finally.as_deref()),
            Stmt::Return(Some(value)) => {
                let value = self.expr(value);
                self.p.line(format!("Exit({value});"));
            }
            Stmt::Return(None) => self.p.line("Exit;"),
            Stmt::Throw(message) => {
                let message = self.expr(message);
                self.p.line(format!("raise Exception.Create({message});"));
            }
            Stmt::Break => self.p.line("Break;"),
            Stmt::Continue => {
                let updates = self.loop_updates.last().cloned().unwrap_or_default();
                for update in &updates {
                    self.effect(update);
                }
                self.p.line("Continue;");
            }
            Stmt::Comment(text) => self.p.line(format!("// {text}")),
            Stmt::Placeholder(placeholder) => {
                let note = self.comment(&placeholder_note(placeholder));
                self.p.line(note);
            }
        }
    }

    /// An expression in statement position. Pascal only allows
    /// assignments and calls there.
    pub(super) fn effect(&mut self, e: &TExpr) {
        match &e.kind {
            ExprKind::Assign {
                op: None,
                target,
                value,
            } => {
                let target = self.expr(target);
                let value = self.expr(value);
                self.p.line(format!("{target} := {value};"));
            }
            ExprKind::Assign {
                op: Some(op @ (BinOp::Add | BinOp::Sub)),
                target,
                value,
            } if target.ty.is_integer() && value.ty.is_integer() => {
                let name = if *op == BinOp::Add { "Inc" } else { "Dec" };
                let target = self.expr(target);
                match value.int_value() {
                    Some(1) => self.p.line(format!("{name}({target});")),
                    _ => {
                        let value = self.expr(value);
                        self.p.line(format!("{name}({target}, {value});"));
                    }
                }
            }
            ExprKind::Assign {
                op: Some(op),
                target,
                value,
            } => {
                let combined = TExpr::binary(*op, (**target).clone(), (**value).clone(), target.ty.clone());
                let target = self.expr(target);
                let value = self.expr(&combined);
                self.p.line(format!("{target} := {value};"));
            }
            ExprKind::Postfix { op, target } => {
                let target = self.expr(target);
                match op {
                    IncDec::Inc => self.p.line(format!("Inc({target});")),
                    IncDec::Dec => self.p.line(format!("Dec({target});")),
                }
            }
            ExprKind::Unary {
                op: op @ (UnOp::PreInc | UnOp::PreDec),
                operand,
            } => {
                let name = if *op == UnOp::PreInc { "Inc" } else { "Dec" };
                let target = self.expr(operand);
                self.p.line(format!("{name}({target});"));
            }
            ExprKind::Group(inner) => self.effect(inner),
            ExprKind::Call { .. } | ExprKind::Builtin { .. } | ExprKind::Placeholder(_) => {
                let text = self.expr(e);
                self.p.line(format!("{text};"));
            }
            _ => {
                let text = self.expr(e);
                log::warn!("dropping expression statement without effect: {text}");
                self.p.line(format!("// {text}"));
            }
        }
    }

    fn flatten_if<'s>(
        &mut self,
        cond: &TExpr,
        then: &'s [Stmt],
        els: Option<&'s [Stmt]>,
        arms: &mut Vec<(Option<String>, &'s [Stmt])>,
    ) {
        arms.push((Some(self.expr(cond)), then));
        match els {
            Some([Stmt::If { cond, then, els }]) => self.flatten_if(cond, then, els.as_deref(), arms),
            Some(els) => arms.push((None, els)),
            None => {}
        }
    }

    /// `if A then begin .. end else if B then begin .. end else begin .. end;`
    fn chain(&mut self, arms: Vec<(Option<String>, &[Stmt])>) {
        let count = arms.len();
        for (i, (cond, body)) in arms.into_iter().enumerate() {
            let head = match (i, cond) {
                (0, Some(cond)) => format!("if {cond} then"),
                (_, Some(cond)) => format!("else if {cond} then"),
                (0, None) => String::new(),
                (_, None) => "else".to_string(),
            };
            let close = if i + 1 == count { "end;" } else { "end" };
            self.block(&head, close, |e| e.body(body));
        }
    }

    fn loop_body(&mut self, head: &str, updates: Vec<TExpr>, body: &[Stmt]) {
        self.loop_updates.push(updates.clone());
        self.block(head, "end;", |e| {
            e.body(body);
            if !body.last().is_some_and(Stmt::is_terminal) {
                for update in &updates {
                    e.effect(update);
                }
            }
        });
        self.loop_updates.pop();
    }

    /// Counting loops become `for .. to`; anything else becomes a
    /// `while` loop with the updates at the end of the body.
    fn for_loop(&mut self, init: Option<&Stmt>, cond: Option<&TExpr>, update: &[TExpr], body: &[Stmt]) {
        if let Some(counting) = counting(init, cond, update, body) {
            let from = self.expr(counting.from);
            let to = self.bound(&counting);
            let dir = if counting.down { "downto" } else { "to" };
            let head = format!("for {} := {from} {dir} {to} do", counting.var);
            return self.loop_body(&head, Vec::new(), body);
        }
        if let Some(init) = init {
            self.stmt(init);
        }
        let cond = cond.map_or_else(|| "True".to_string(), |c| self.expr(c));
        self.loop_body(&format!("while {cond} do"), update.to_vec(), body);
    }

    /// Last value the counter takes.
    fn bound(&mut self, counting: &Counting<'_>) -> String {
        if !counting.exclusive {
            return self.expr(counting.bound);
        }
        let step: i128 = if counting.down { 1 } else { -1 };
        if let Some(value) = counting.bound.int_value() {
            return (value + step).to_string();
        }
        let bound = self.operand(counting.bound, super::exprs::ADDITIVE);
        if counting.down {
            format!("{bound} + 1")
        } else {
            format!("{bound} - 1")
        }
    }

    /// Ordinal subjects with constant labels use `case`; anything else
    /// compares arm by arm.
    fn switch(&mut self, subject: &TExpr, cases: &[Case], default: Option<&[Stmt]>) {
        let ordinal = subject.ty.is_integer() || self.is_enum(&subject.ty);
        let constant = cases.iter().flat_map(|c| &c.labels).all(|label| {
            label.int_value().is_some() || matches!(label.kind, ExprKind::StaticMember { .. })
        });
        if !(ordinal && constant) {
            let mut arms = Vec::new();
            for case in cases {
                let tests: Vec<String> = case
                    .labels
                    .iter()
                    .map(|label| {
                        let test = TExpr::binary(BinOp::Eq, subject.clone(), label.clone(), Type::bool());
                        self.operand(&test, super::exprs::UNARY)
                    })
                    .collect();
                arms.push((Some(tests.join(" or ")), case.body.as_slice()));
            }
            if let Some(default) = default {
                arms.push((None, default));
            }
            return self.chain(arms);
        }

        let head = format!("case {} of", self.expr(subject));
        Printer::wrapped(self, &head, "end;", |e| {
            for case in cases {
                let labels: Vec<String> = case.labels.iter().map(|l| e.expr(l)).collect();
                e.p.line(format!("{}:", labels.join(", ")));
                Printer::indented(e, |e| e.block("", "end;", |e| e.body(&case.body)));
            }
            if let Some(default) = default {
                e.p.line("else");
                Printer::indented(e, |e| e.block("", "end;", |e| e.body(default)));
            }
        });
    }

    fn try_stmt(&mut self, body: &[Stmt], catch: Option<&Catch>, finally: Option<&[Stmt]>) {
        let guarded = |e: &mut Self| {
            let Some(catch) = catch else {
                return e.body(body);
            };
            e.p.line("try");
            Printer::indented(e, |e| e.body(body));
            e.p.line("except");
            Printer::indented(e, |e| {
                let name = if catch.name.is_empty() { "E" } else { &catch.name };
                let head = format!("on {name}: Exception do");
                e.block(&head, "end;", |e| e.body(&catch.body));
            });
            e.p.line("end;");
        };
        let Some(finally) = finally else {
            return guarded(self);
        };
        self.p.line("try");
        Printer::indented(self, guarded);
        self.p.line("finally");
        Printer::indented(self, |e| e.body(finally));
        self.p.line("end;");
    }
}

fn counter(e: &TExpr) -> Option<&str> {
    match &e.kind {
        ExprKind::Ident(name) => Some(name),
        ExprKind::Group(inner) => counter(inner),
        _ => None,
    }
}

/// +1 or -1 applied to `var`.
fn step(update: &TExpr, var: &str) -> Option<i128> {
    match &update.kind {
        ExprKind::Postfix { op, target } if counter(target) == Some(var) => {
            Some(if *op == IncDec::Inc { 1 } else { -1 })
        }
        ExprKind::Unary {
            op: op @ (UnOp::PreInc | UnOp::PreDec),
            operand,
        } if counter(operand) == Some(var) => Some(if *op == UnOp::PreInc { 1 } else { -1 }),
        ExprKind::Assign {
            op: Some(op @ (BinOp::Add | BinOp::Sub)),
            target,
            value,
        } if counter(target) == Some(var) && value.int_value() == Some(1) => {
            Some(if *op == BinOp::Add { 1 } else { -1 })
        }
        _ => None,
    }
}

fn counting<'s>(
    init: Option<&'s Stmt>,
    cond: Option<&'s TExpr>,
    update: &'s [TExpr],
    body: &[Stmt],
) -> Option<Counting<'s>> {
    let Some(Stmt::VarDecl {
        name: var,
        ty,
        init: Some(from),
    }) = init
    else {
        return None;
    };
    if !ty.is_integer() {
        return None;
    }
    let ExprKind::Binary { op, left, right } = &cond?.kind else {
        return None;
    };
    if counter(left) != Some(var.as_str()) || !right.is_pure() {
        return None;
    }
    let [update] = update else {
        return None;
    };
    let down = match (op, step(update, var)?) {
        (BinOp::Lt | BinOp::Le, 1) => false,
        (BinOp::Gt | BinOp::Ge, -1) => true,
        _ => return None,
    };
    let mut watched = vec![var.clone()];
    roots(right, &mut watched);
    if writes_any(body, &watched) {
        return None;
    }
    // A negative literal bound wraps an unsigned counter.
    if right.int_value().is_some_and(|v| v < 0) {
        return None;
    }
    Some(Counting {
        var,
        from,
        bound: right,
        exclusive: matches!(op, BinOp::Lt | BinOp::Gt),
        down,
    })
}

/// Names whose value `e` reads.
fn roots(e: &TExpr, out: &mut Vec<String>) {
    struct Reads<'o>(&'o mut Vec<String>);

    impl Visitor for Reads<'_> {
        fn visit_expr(&mut self, e: &TExpr) {
            if let ExprKind::Ident(name) = &e.kind {
                self.0.push(name.clone());
            }
        }
    }

    crate::target::walk_expr("<bound>", e, &mut Reads(out));
}

/// `body` assigns, increments or resizes one of `names`.
fn writes_any(body: &[Stmt], names: &[String]) -> bool {
    struct Writes<'n> {
        names: &'n [String],
        hit: bool,
    }

    fn root(e: &TExpr) -> Option<&str> {
        match &e.kind {
            ExprKind::Ident(name) => Some(name),
            ExprKind::Member { object, .. } | ExprKind::Index { object, .. } => root(object),
            ExprKind::Group(inner) => root(inner),
            _ => None,
        }
    }

    impl Writes<'_> {
        fn write(&mut self, target: &TExpr) {
            if let Some(name) = root(target)
                && self.names.iter().any(|n| n == name)
            {
                self.hit = true;
            }
        }
    }

    impl Visitor for Writes<'_> {
        fn visit_expr(&mut self, e: &TExpr) {
            match &e.kind {
                ExprKind::Assign { target, .. } | ExprKind::Postfix { target, .. } => {
                    self.write(target);
                }
                ExprKind::Unary {
                    op: UnOp::PreInc | UnOp::PreDec,
                    operand,
                } => self.write(operand),
                ExprKind::Builtin { args, .. } => {
                    if let Some(recv) = args.first() {
                        // Sequence builtins may change the length.
                        if recv.ty.element().is_some() {
                            self.write(recv);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    let mut writes = Writes { names, hit: false };
    walk_stmts("<loop>", body, &mut writes);
    writes.hit
}
