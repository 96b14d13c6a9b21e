use super::*;

#[test]
fn test_temp_name_sequence() {
    assert_eq!(temp_name(0), "_a");
    assert_eq!(temp_name(25), "_z");
    assert_eq!(temp_name(26), "_0");
    assert_eq!(temp_name(27), "_1");
}

#[test]
fn test_acquire_skips_reserved_names() {
    let reserved: FxHashSet<String> = ["_a".to_string(), "_c".to_string()].into_iter().collect();
    let mut registry = TempRegistry::new();
    assert_eq!(registry.acquire(&reserved), "_b");
    assert_eq!(registry.acquire(&reserved), "_d");
    assert_eq!(registry.declared(), ["_b".to_string(), "_d".to_string()]);
}

#[test]
fn test_released_names_are_reused_lowest_first() {
    let reserved = FxHashSet::default();
    let mut registry = TempRegistry::new();
    let a = registry.acquire(&reserved);
    let b = registry.acquire(&reserved);
    assert_eq!(registry.in_use(), 2);
    assert!(registry.release(&b));
    assert!(registry.release(&a));
    assert_eq!(registry.in_use(), 0);
    assert_eq!(registry.acquire(&reserved), "_a");
    assert_eq!(registry.acquire(&reserved), "_b");
    assert_eq!(registry.acquire(&reserved), "_c");
    assert_eq!(registry.declared().len(), 3);
}

#[test]
fn test_release_rejects_unknown_and_double_release() {
    let reserved = FxHashSet::default();
    let mut registry = TempRegistry::new();
    let a = registry.acquire(&reserved);
    assert!(!registry.release("x"));
    assert!(registry.release(&a));
    assert!(!registry.release(&a));
}

#[test]
fn test_claimed_names_are_never_reused_or_declared() {
    let reserved = FxHashSet::default();
    let mut registry = TempRegistry::new();
    let a = registry.acquire(&reserved);
    let claimed = registry.claim(&reserved);
    assert_eq!(claimed, "_b");
    registry.release(&a);
    assert_eq!(registry.acquire(&reserved), "_a");
    assert_eq!(registry.acquire(&reserved), "_c");
    assert!(!registry.declared().contains(&claimed));
}
