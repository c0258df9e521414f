use indexmap::IndexMap;

/// Ordered env var mapping. Keys are unique; insertion order is kept so the
/// container sees the variables in the order they were composed.
pub type EnvVars = IndexMap<String, String>;

/// Overlays `extra` on top of `base`. Keys in `extra` win.
pub fn merge_env_vars(mut base: EnvVars, extra: &EnvVars) -> EnvVars {
    for (key, value) in extra {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// Keys present in both sets, sorted.
pub fn conflicting_keys(reserved: &EnvVars, supplied: &EnvVars) -> Vec<String> {
    let mut conflicts: Vec<String> = reserved
        .keys()
        .filter(|key| supplied.contains_key(*key))
        .cloned()
        .collect();
    conflicts.sort();
    conflicts
}

/// Parses `KEY=VALUE`. The value may itself contain `=`.
pub fn parse_env_pair(pair: &str) -> Option<(String, String)> {
    let (key, value) = pair.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}

/// `KEY=VALUE` strings in the form the container engine expects.
pub fn to_env_list(vars: &EnvVars) -> Vec<String> {
    vars.iter().map(|(k, v)| format!("{k}={v}")).collect()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
