use glob::Pattern;
use regex::Regex;
use std::path::Path;

/// Check if a file path matches a glob pattern, by full path or by file name
pub fn file_matches_pattern(file_path: &str, pattern: &Pattern) -> bool {
    if pattern.matches(file_path) {
        return true;
    }

    if let Some(filename) = Path::new(file_path).file_name() {
        if pattern.matches(filename.to_string_lossy().as_ref()) {
            return true;
        }
    }

    false
}

/// Last path component, or the path itself when it has none
pub fn base_name(file_path: &str) -> &str {
    Path::new(file_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_path)
}

/// Test files by naming convention or directory
pub fn is_test_file(file_path: &str) -> bool {
    if file_path.is_empty() {
        return false;
    }
    file_path.contains(".test.")
        || file_path.contains(".spec.")
        || file_path.contains("/tests/")
        || file_path.contains("/__tests__/")
}

/// Production source: under a source root, not a test, not a declaration file,
/// and carrying one of the code extensions.
pub fn is_production_code(file_path: &str, source_root: &Regex, extensions: &[String]) -> bool {
    if file_path.is_empty() {
        return false;
    }

    if !source_root.is_match(file_path) {
        return false;
    }

    if file_path.contains(".test.") || file_path.contains(".spec.") || file_path.contains("/tests/")
    {
        return false;
    }

    if file_path.ends_with(".d.ts") {
        return false;
    }

    extensions.iter().any(|ext| file_path.ends_with(ext.as_str()))
}
