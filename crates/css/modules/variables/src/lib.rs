//! CSS Custom Properties for Cascading Variables Module Level 1: CSS variables.
//! Reference: <https://www.w3.org/TR/css-variables-1/>

#![forbid(unsafe_code)]

use core::hash::BuildHasher;
use std::collections::HashMap;

/// Keys are property names (including the leading `--`); values are raw token strings.
pub type CustomProperties = HashMap<String, String>;

/// Extract custom properties (`--*`) from a declaration map.
#[inline]
pub fn extract_custom_properties<S: BuildHasher>(
    declarations: &HashMap<String, String, S>,
) -> CustomProperties {
    declarations
        .iter()
        .filter(|(key, _)| key.starts_with("--"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Compute an element's custom properties: inherited values overlaid with the
/// element's own declarations, with `var()` references substituted.
///
/// Properties that take part in a reference cycle, or reference an undefined
/// property without a fallback, become guaranteed-invalid and are dropped.
/// Resolving dependency cycles (§2.3)
pub fn compute_custom_properties(
    declared: &CustomProperties,
    inherited: &CustomProperties,
) -> CustomProperties {
    let mut env = inherited.clone();
    env.extend(
        declared
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    let mut computed = inherited.clone();
    for name in declared.keys() {
        let mut stack = vec![name.clone()];
        let Some(raw) = env.get(name) else {
            continue;
        };
        match resolve_vars_internal(raw, &env, &mut stack) {
            Some(value) => {
                computed.insert(name.clone(), value);
            }
            None => {
                computed.remove(name);
            }
        }
    }
    computed
}

/// Resolve `var()` functions within a value against the provided custom properties.
///
/// Returns `None` when a reference cannot be resolved and has no usable
/// fallback, which makes the declaration invalid at computed-value time.
/// Using cascading variables: the var() notation (§3)
#[inline]
pub fn resolve_vars_in_value(value_text: &str, env: &CustomProperties) -> Option<String> {
    resolve_vars_internal(value_text, env, &mut Vec::new())
}

/// Recursive resolver carrying the resolution stack for cycle detection.
fn resolve_vars_internal(
    value_text: &str,
    env: &CustomProperties,
    stack: &mut Vec<String>,
) -> Option<String> {
    let Some(start) = value_text.find("var(") else {
        return Some(value_text.to_owned());
    };
    let head = value_text.get(..start)?;
    let after_open = value_text.get(start.saturating_add(4)..)?;
    // An unterminated var() runs to the end of the value.
    let (args_text, tail) = match matching_close_paren(after_open) {
        Some(close) => (after_open.get(..close)?, after_open.get(close.saturating_add(1)..)?),
        None => (after_open, ""),
    };
    let replacement = resolve_single_var(args_text, env, stack)?;
    let resolved_tail = resolve_vars_internal(tail, env, stack)?;
    Some([head, &replacement, &resolved_tail].concat())
}

/// Byte index of the `)` closing a function whose arguments start at index 0.
fn matching_close_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (index, character) in text.char_indices() {
        match character {
            '(' => depth = depth.saturating_add(1),
            ')' if depth == 0 => return Some(index),
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

/// Split `--name, fallback` at the first top-level comma.
fn split_var_args(args_text: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    for (index, character) in args_text.char_indices() {
        match character {
            '(' => depth = depth.saturating_add(1),
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                let name = args_text.get(..index).unwrap_or_default();
                let fallback = args_text.get(index.saturating_add(1)..);
                return (name.trim(), fallback.map(str::trim));
            }
            _ => {}
        }
    }
    (args_text.trim(), None)
}

/// Resolve a single `var()` argument string like `--name` or `--name, fallback`.
fn resolve_single_var(
    args_text: &str,
    env: &CustomProperties,
    stack: &mut Vec<String>,
) -> Option<String> {
    let (name, fallback) = split_var_args(args_text);
    let use_fallback = |stack: &mut Vec<String>| {
        fallback.and_then(|fallback_src| resolve_vars_internal(fallback_src, env, stack))
    };
    if !name.starts_with("--") || stack.iter().any(|entry| entry == name) {
        return use_fallback(stack);
    }
    let Some(raw) = env.get(name) else {
        return use_fallback(stack);
    };
    stack.push(name.to_owned());
    let expanded = resolve_vars_internal(raw, env, stack);
    stack.pop();
    match expanded {
        Some(value) => Some(value),
        None => use_fallback(stack),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> CustomProperties {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn fallback_with_nested_parentheses() {
        let vars = env(&[("--pad", "10px")]);
        assert_eq!(
            resolve_vars_in_value("var(--missing, rgb(1, 2, 3)) var(--pad)", &vars),
            Some("rgb(1, 2, 3) 10px".to_owned())
        );
        assert_eq!(
            resolve_vars_in_value("calc(var(--pad) * 2)", &vars),
            Some("calc(10px * 2)".to_owned())
        );
    }

    #[test]
    fn undefined_without_fallback_is_invalid() {
        assert_eq!(resolve_vars_in_value("var(--nope)", &env(&[])), None);
    }

    #[test]
    fn cycles_are_dropped_and_indirection_resolves() {
        let declared = env(&[
            ("--a", "33px"),
            ("--b", "var(--a)"),
            ("--x", "var(--y)"),
            ("--y", "var(--x)"),
        ]);
        let computed = compute_custom_properties(&declared, &env(&[("--inherited", "#fff")]));
        assert_eq!(computed.get("--b").map(String::as_str), Some("33px"));
        assert_eq!(computed.get("--inherited").map(String::as_str), Some("#fff"));
        assert!(!computed.contains_key("--x"));
        assert!(!computed.contains_key("--y"));
        assert_eq!(
            resolve_vars_in_value("var(--x, 5px)", &computed),
            Some("5px".to_owned())
        );
    }
}
