use spinelog::printer::show_term;
use spinelog::{EngineConfig, LogicError, Machine, Term};

const FAMILY: &str = include_str!("../demos/family.nl");
const ADD: &str = include_str!("../demos/add.nl");
const APP: &str = include_str!("../demos/app.nl");
const PERM: &str = include_str!("../demos/perm.nl");
const ITEMS: &str = include_str!("../demos/items.nl");

fn shown(src: &str, config: EngineConfig) -> Vec<String> {
    let mut machine = Machine::with_config(src, config).unwrap();
    machine.answers().map(|t| show_term(&t)).collect()
}

#[test]
fn test_grandparent() {
    let mut machine = Machine::from_source(FAMILY).unwrap();
    let first = machine.ask_next().unwrap();
    assert_eq!(first, Term::Array(vec!["goal".into(), "ann".into()]));
    let second = machine.ask_next().unwrap();
    assert_eq!(show_term(&second), "goal(pat)");
    assert_eq!(machine.ask_next(), None);
}

#[test]
fn test_peano_addition() {
    assert_eq!(shown(ADD, EngineConfig::default()), vec!["goal(s(s(0)))"]);
}

#[test]
fn test_list_splits_in_order() {
    assert_eq!(
        shown(APP, EngineConfig::default()),
        vec![
            "goal(nil,[a,b,c])",
            "goal([a],[b,c])",
            "goal([a,b],[c])",
            "goal([a,b,c],nil)",
        ]
    );
}

#[test]
fn test_permutations() {
    assert_eq!(
        shown(PERM, EngineConfig::default()),
        vec![
            "goal([1,2,3])",
            "goal([1,3,2])",
            "goal([2,1,3])",
            "goal([2,3,1])",
            "goal([3,1,2])",
            "goal([3,2,1])",
        ]
    );
}

#[test]
fn test_indexed_lookup() {
    let machine = Machine::from_source(ITEMS).unwrap();
    assert!(machine.is_indexed());
    assert_eq!(shown(ITEMS, EngineConfig::default()), vec!["goal(10)", "goal(22)"]);
    assert_eq!(shown(ITEMS, EngineConfig::without_index()), vec!["goal(10)", "goal(22)"]);
}

#[test]
fn test_facts_come_back_in_declaration_order() {
    let mut src = String::new();
    for i in 0..40 {
        src.push_str(&format!("n {} .\n", i));
    }
    src.push_str("goal X if n X .\n");
    let expected: Vec<String> = (0..40).map(|i| format!("goal({})", i)).collect();
    assert_eq!(shown(&src, EngineConfig::default()), expected);
}

#[test]
fn test_same_program_same_answers() {
    let a = shown(PERM, EngineConfig::default());
    let b = shown(PERM, EngineConfig::default());
    assert_eq!(a, b);

    let mut machine = Machine::from_source(PERM).unwrap();
    let first: Vec<Term> = machine.answers().collect();
    machine.restart();
    let again: Vec<Term> = machine.answers().collect();
    assert_eq!(first, again);
}

#[test]
fn test_stopping_early_then_resuming() {
    let mut machine = Machine::from_source(PERM).unwrap();
    let head: Vec<Term> = machine.answers().take(2).collect();
    assert_eq!(head.len(), 2);
    let rest: Vec<String> = machine.answers().map(|t| show_term(&t)).collect();
    assert_eq!(rest.len(), 4);
    assert_eq!(rest[0], "goal([2,1,3])");
}

#[test]
fn test_heap_restored_after_search() {
    let mut machine = Machine::from_source(APP).unwrap();
    let top = machine.heap().top();
    let before = machine.heap().slice(0, top).to_vec();
    while machine.ask_next().is_some() {}
    assert_eq!(machine.heap().top(), top);
    assert_eq!(machine.heap().slice(0, top), before.as_slice());
}

#[test]
fn test_unbound_variables_in_answers() {
    let mut machine = Machine::from_source("same X X .\ngoal A B if same A B .").unwrap();
    let answer = machine.ask_next().unwrap();
    let a = answer.arg(1).and_then(Term::as_label).unwrap();
    let b = answer.arg(2).and_then(Term::as_label).unwrap();
    assert!(a.starts_with('V'));
    assert_eq!(a, b);
    assert_eq!(machine.ask_next(), None);
}

#[test]
fn test_clause_used_twice_gets_fresh_variables() {
    let src = "pair X Y if item X and item Y .\n\
               item a .\n\
               item b .\n\
               goal X Y if pair X Y .";
    assert_eq!(
        shown(src, EngineConfig::default()),
        vec!["goal(a,a)", "goal(a,b)", "goal(b,a)", "goal(b,b)"]
    );
}

#[test]
fn test_load_errors() {
    assert!(matches!(
        Machine::from_source("p X if X is 1 ."),
        Err(LogicError::Unsupported(_))
    ));
    assert!(matches!(
        Machine::from_source("p a .\ngoal"),
        Err(LogicError::ReadError(_))
    ));
    assert!(matches!(
        Machine::from_source("p a .\ngoal X if p a and X holds f a and X holds g b ."),
        Err(LogicError::MalformedTerm(_))
    ));
    assert!(matches!(
        Machine::from_source("// nothing here\n"),
        Err(LogicError::EmptyProgram)
    ));
    assert!(matches!(
        Machine::from_file("demos/no-such-program.nl", EngineConfig::default()),
        Err(LogicError::Io(_))
    ));
}

#[test]
fn test_load_from_file() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/add.nl");
    let mut machine = Machine::from_file(path, EngineConfig::default()).unwrap();
    assert_eq!(machine.ask_next().map(|t| show_term(&t)).as_deref(), Some("goal(s(s(0)))"));
}

#[test]
fn test_query_head_may_use_structure_built_in_body() {
    let src = "p a .\ngoal X if p Y and X holds f Y .";
    assert_eq!(shown(src, EngineConfig::default()), vec!["goal(f(a))"]);
}

#[test]
fn test_clause_head_may_use_structure_built_in_body() {
    let src = "wrap X if p Y and X holds f Y .\n\
               p a .\n\
               p b .\n\
               goal W if wrap W .";
    assert_eq!(
        shown(src, EngineConfig::default()),
        vec!["goal(f(a))", "goal(f(b))"]
    );
}

#[test]
fn test_cyclic_answer_is_cut_off() {
    let src = "eq X X .\ngoal X if eq X Y and Y holds f X X .";
    let mut machine = Machine::from_source(src).unwrap();
    let answer = machine.ask_next().unwrap();
    assert_eq!(show_term(&answer), "goal(f(...,...))");
    assert_eq!(machine.ask_next(), None);
}
