use decorum::{save_it, SaveSlot};
use std::cell::Cell;

struct Module {
    source: String,
    parses: Cell<u32>,
    names: SaveSlot<Vec<String>>,
    first_word: SaveSlot<Option<String>>,
}

impl Module {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            parses: Cell::new(0),
            names: SaveSlot::new(),
            first_word: SaveSlot::new(),
        }
    }

    #[save_it(slot = names)]
    fn defined_names(&self) -> Vec<String> {
        self.parses.set(self.parses.get() + 1);
        self.source
            .lines()
            .filter_map(|line| line.strip_prefix("def "))
            .map(|name| name.to_string())
            .collect()
    }

    /// Arguments after the first call are ignored
    #[save_it(slot = first_word)]
    fn word(&self, index: usize) -> Option<String> {
        self.source.split_whitespace().nth(index).map(str::to_string)
    }
}

#[test]
fn test_computes_once_per_instance() {
    let module = Module::new("def a\nx = 1\ndef b");

    assert_eq!(module.defined_names(), vec!["a", "b"]);
    assert_eq!(module.defined_names(), vec!["a", "b"]);
    assert_eq!(module.parses.get(), 1);
    assert!(module.names.is_set());
}

#[test]
fn test_instances_do_not_share_results() {
    let first = Module::new("def a");
    let second = Module::new("def z");

    assert_eq!(first.defined_names(), vec!["a"]);
    assert_eq!(second.defined_names(), vec!["z"]);
}

#[test]
fn test_later_arguments_ignored() {
    let module = Module::new("alpha beta gamma");

    assert_eq!(module.word(1), Some("beta".to_string()));
    assert_eq!(module.word(2), Some("beta".to_string()));
}

#[test]
fn test_take_allows_recompute() {
    let mut module = Module::new("def a");
    module.defined_names();

    assert_eq!(module.names.take(), Some(vec!["a".to_string()]));
    module.source = "def c".to_string();
    assert_eq!(module.defined_names(), vec!["c"]);
    assert_eq!(module.parses.get(), 2);
}
