//! Standard library headers available to `#include`.
//!
//! The bundled headers are embedded into the binary; an alternative
//! root can be loaded from disk, mirroring the layout of
//! `templates/stdlib/`.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// An in-memory filesystem of includable headers, keyed by the path
/// used in `#include` directives.
#[derive(Debug, Clone, Default)]
pub struct Stdlib {
    files: BTreeMap<String, String>,
}

impl Stdlib {
    /// The headers shipped with the compiler.
    pub fn bundled() -> Self {
        let mut files = BTreeMap::new();
        files.insert(
            "stdio.h".to_string(),
            include_str!("../templates/stdlib/stdio.h").to_string(),
        );
        files.insert(
            "math.h".to_string(),
            include_str!("../templates/stdlib/math.h").to_string(),
        );
        Stdlib { files }
    }

    /// Loads every `.h` file under `root`, keyed by its path relative
    /// to the root.
    pub fn from_root(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("stdlib root {root:?} not found"),
            ));
        }
        let mut files = BTreeMap::new();
        for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "h") {
                let contents = fs::read_to_string(path)?;
                let relative = path.strip_prefix(root).unwrap_or(path);
                files.insert(relative.to_string_lossy().replace('\\', "/"), contents);
            }
        }
        Ok(Stdlib { files })
    }

    pub fn file(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_headers_are_present() {
        let stdlib = Stdlib::bundled();
        let paths: Vec<&str> = stdlib.paths().collect();
        assert!(paths.contains(&"stdio.h"));
        assert!(paths.contains(&"math.h"));

        assert!(stdlib.file("stdio.h").unwrap().contains("putchar"));
        let math = stdlib.file("math.h").unwrap();
        assert!(math.contains("fabsf"));
        assert!(math.contains("log1pf"));
    }

    #[test]
    fn loads_headers_from_a_custom_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("sys");
        fs::create_dir_all(&nested).expect("create nested dir");
        fs::write(dir.path().join("custom.h"), "extern int answer();").expect("write header");
        fs::write(nested.join("io.h"), "extern void poke(int x);").expect("write nested header");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write stray file");

        let stdlib = Stdlib::from_root(dir.path()).expect("stdlib should load");
        assert_eq!(stdlib.paths().count(), 2);
        assert!(stdlib.file("custom.h").unwrap().contains("answer"));
        assert!(stdlib.file("sys/io.h").unwrap().contains("poke"));
        assert!(stdlib.file("notes.txt").is_none());
    }

    #[test]
    fn reports_missing_root() {
        let err = Stdlib::from_root("./path/that/does/not/exist").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
