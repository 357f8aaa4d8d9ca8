//! Path helpers

use std::path::PathBuf;

/// Resolve a user-supplied path to an absolute one
///
/// `~` and `~/...` expand to the home directory; relative paths are joined
/// onto the current directory. An empty string means the current directory.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let home = dirs::home_dir();
    let expanded = match (path, &home) {
        ("~", Some(home)) => home.clone(),
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_absolute_path_unchanged() {
        assert_eq!(expand_path("/etc/beerpy.json"), PathBuf::from("/etc/beerpy.json"));
    }

    #[test]
    fn test_relative_path_joins_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("migrations"), cwd.join("migrations"));
        assert_eq!(expand_path("../beerpy.json"), cwd.join("../beerpy.json"));
    }

    #[test]
    fn test_tilde_expands_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
            assert_eq!(expand_path("~/.beerpy/beerpy.json"), home.join(".beerpy/beerpy.json"));
        }
    }

    #[test]
    fn test_empty_is_cwd() {
        assert_eq!(expand_path("  "), std::env::current_dir().unwrap());
    }
}
