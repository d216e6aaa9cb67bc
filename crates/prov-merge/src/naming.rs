//! Collision-safe file naming.
//!
//! The suffix goes before the first `.` that is not the leading character,
//! so `alice.txt` becomes `alice(1).txt`, `archive.tar.gz` becomes
//! `archive(1).tar.gz`, and `.bashrc` or `foo` get the suffix appended.

/// Insert the `(n)` suffix into `name`.
pub fn suffixed_name(name: &str, n: usize) -> String {
    match name.char_indices().skip(1).find(|&(_, c)| c == '.') {
        Some((dot, _)) => format!("{}({n}){}", &name[..dot], &name[dot..]),
        None => format!("{name}({n})"),
    }
}

/// Return `name` if it is free, otherwise the suffixed form with the
/// smallest `n >= 1` for which `taken` is false.
pub fn unique_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    (1..)
        .map(|n| suffixed_name(name, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}
