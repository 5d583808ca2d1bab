use cryptran_core::Type;

use super::ScopeStack;

#[test]
fn lookup_prefers_innermost_binding() {
    let mut scope = ScopeStack::new();
    scope.declare("x", Type::u32());
    scope.push();
    scope.declare("x", Type::bytes());

    assert_eq!(scope.lookup("x"), Some(&Type::bytes()));
    scope.pop();
    assert_eq!(scope.lookup("x"), Some(&Type::u32()));
}

#[test]
fn popped_bindings_are_gone() {
    let mut scope = ScopeStack::new();
    scope.push();
    scope.declare("tmp", Type::u8());
    scope.pop();

    assert_eq!(scope.lookup("tmp"), None);
    assert_eq!(scope.depth(), 1);
}

#[test]
fn closure_frame_sees_copies_and_does_not_leak() {
    let mut scope = ScopeStack::new();
    scope.declare("state", Type::words());
    scope.push();
    scope.declare("i", Type::u32());

    scope.push_closure();
    assert_eq!(scope.lookup("state"), Some(&Type::words()));
    assert_eq!(scope.lookup("i"), Some(&Type::u32()));
    scope.declare("inner", Type::bool());
    scope.declare("i", Type::string());
    scope.pop();

    assert_eq!(scope.lookup("inner"), None);
    assert_eq!(scope.lookup("i"), Some(&Type::u32()));
}

#[test]
fn module_bindings_visible_from_nested_frames() {
    let mut scope = ScopeStack::new();
    scope.declare("g", Type::u32());
    scope.push();
    scope.push();
    assert_eq!(scope.lookup("g"), Some(&Type::u32()));
    assert!(scope.is_declared("g"));
    assert_eq!(scope.depth(), 3);
}

#[test]
fn refine_fills_holes_only() {
    let mut scope = ScopeStack::new();
    scope.declare("out", Type::seq(Type::Unknown));
    scope.declare("n", Type::u32());

    assert!(scope.refine("out", &Type::bytes()));
    assert!(scope.refine("n", &Type::string()));
    assert!(!scope.refine("missing", &Type::u8()));

    assert_eq!(scope.lookup("out"), Some(&Type::bytes()));
    assert_eq!(scope.lookup("n"), Some(&Type::u32()));
}
