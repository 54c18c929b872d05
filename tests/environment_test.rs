use sttfs::clock::Timestamp;
use sttfs::environment::Environment;

fn env() -> Environment {
    Environment::with_timestamp(Timestamp::from_unix(1_709_209_815, 0))
}

#[test]
fn test_system_values() {
    let env = env();
    assert_eq!(env.get("date"), Some("2024-02-29"));
    assert_eq!(env.get("time"), Some("12:30:15"));
    assert_eq!(env.get("other"), None);
}

#[test]
fn test_loop_scope_restores_previous_value() {
    let mut env = env();
    env.assign("i", "outer".to_string());

    env.push_scope("i", "0".to_string());
    assert_eq!(env.get("i"), Some("0"));
    env.pop_scope();

    assert_eq!(env.get("i"), Some("outer"));
}

#[test]
fn test_loop_scope_removes_unbound_variable() {
    let mut env = env();
    env.push_scope("i", "0".to_string());
    assert!(env.contains("i"));
    env.pop_scope();
    assert!(!env.contains("i"));
}

#[test]
fn test_global_scope_is_never_popped() {
    let mut env = env();
    env.assign("x", "1".to_string());
    env.pop_scope();
    env.pop_scope();
    assert_eq!(env.depth(), 1);
    assert_eq!(env.get("x"), Some("1"));
}

#[test]
fn test_assign_inside_loop() {
    let mut env = env();
    env.push_scope("i", "0".to_string());
    // Overwriting the loop variable stays inside the loop scope.
    env.assign("i", "typed".to_string());
    // New names go to the global scope and outlive the loop.
    env.assign("name", "app".to_string());
    assert_eq!(env.get("i"), Some("typed"));
    env.pop_scope();

    assert_eq!(env.get("i"), None);
    assert_eq!(env.get("name"), Some("app"));
}

#[test]
fn test_system_values_are_read_only() {
    let mut env = env();
    env.assign("date", "overwritten".to_string());
    env.assign("time", "later".to_string());
    assert_eq!(env.get("date"), Some("2024-02-29"));
    assert_eq!(env.get("time"), Some("12:30:15"));
    assert_eq!(env.to_context()["date"], "2024-02-29");
}

#[test]
fn test_loop_variable_shadows_system_value_inside_loop() {
    let mut env = env();
    env.push_scope("date", "0".to_string());
    assert_eq!(env.get("date"), Some("0"));
    env.assign("date", "typed".to_string());
    assert_eq!(env.get("date"), Some("typed"));
    env.pop_scope();
    assert_eq!(env.get("date"), Some("2024-02-29"));
}

#[test]
fn test_context_contains_visible_bindings() {
    let mut env = env();
    env.assign("name", "app".to_string());
    env.push_scope("name", "inner".to_string());
    let context = env.to_context();
    assert_eq!(context["name"], "inner");
    assert_eq!(context["date"], "2024-02-29");
}
