use decorum::{prevent_recursion, ReentrancyFlag};
use std::cell::RefCell;
use std::rc::Rc;

struct Scope {
    name: String,
    parent: RefCell<Option<Rc<Scope>>>,
    describing: ReentrancyFlag,
    counting: ReentrancyFlag,
}

impl Scope {
    fn new(name: &str) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            parent: RefCell::new(None),
            describing: ReentrancyFlag::new(),
            counting: ReentrancyFlag::new(),
        })
    }

    #[prevent_recursion(flag = describing, default = "...".to_string())]
    fn describe(&self) -> String {
        match self.parent.borrow().as_ref() {
            Some(parent) => format!("{} < {}", self.name, parent.describe()),
            None => self.name.clone(),
        }
    }

    /// No explicit default: re-entry returns `Default::default()`
    #[prevent_recursion(flag = counting)]
    fn depth(&self) -> usize {
        match self.parent.borrow().as_ref() {
            Some(parent) => parent.depth() + 1,
            None => 0,
        }
    }
}

#[test]
fn test_acyclic_chain_runs_normally() {
    let root = Scope::new("root");
    let child = Scope::new("child");
    *child.parent.borrow_mut() = Some(Rc::clone(&root));

    assert_eq!(child.describe(), "child < root");
    assert_eq!(child.depth(), 1);
}

#[test]
fn test_cycle_returns_default() {
    let a = Scope::new("a");
    let b = Scope::new("b");
    *a.parent.borrow_mut() = Some(Rc::clone(&b));
    *b.parent.borrow_mut() = Some(Rc::clone(&a));

    assert_eq!(a.describe(), "a < b < ...");
    // a -> b -> a (default 0) gives 0 + 1 + 1
    assert_eq!(a.depth(), 2);

    // Flags are lowered after each call
    assert!(!a.describing.is_active());
    assert_eq!(a.describe(), "a < b < ...");

    // Break the cycle so the Rc pair is freed
    b.parent.borrow_mut().take();
}

#[test]
fn test_self_reference() {
    let scope = Scope::new("loop");
    *scope.parent.borrow_mut() = Some(Rc::clone(&scope));

    assert_eq!(scope.describe(), "loop < ...");
    assert_eq!(scope.depth(), 1);

    scope.parent.borrow_mut().take();
}
