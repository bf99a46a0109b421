//! Line-oriented textual preprocessor.
//!
//! Runs before the lexer: expands `#define` macros with naive textual
//! substitution, evaluates single-level `#ifdef`/`#ifndef`/`#else`/
//! `#endif` conditionals, and splices `#include` files from the
//! standard library filesystem. Directives execute even inside a
//! skipped region, which is what makes include guards work.

use std::collections::HashMap;

use crate::error::CompileError;
use crate::stdlib::Stdlib;

/// Macros defined before any source line is seen.
const PREDEFINED: &[(&str, &str)] = &[
    ("__wasm__", "1"),
    ("__wasm32__", "1"),
    ("__EMSCRIPTEN__", "1"),
    ("__ILP32__", "1"),
    ("__BIGGEST_ALIGNMENT__", "16"),
    ("__wcc__", "1"),
];

pub struct Preprocessor {
    definitions: HashMap<String, String>,
    include_statements: bool,
    in_conditional: bool,
    stdlib: Stdlib,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Preprocessor::new()
    }
}

impl Preprocessor {
    /// A preprocessor over the bundled standard library.
    pub fn new() -> Self {
        Preprocessor::with_stdlib(Stdlib::bundled())
    }

    pub fn with_stdlib(stdlib: Stdlib) -> Self {
        let definitions = PREDEFINED
            .iter()
            .map(|&(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Preprocessor {
            definitions,
            include_statements: true,
            in_conditional: false,
            stdlib,
        }
    }

    pub fn definitions(&self) -> &HashMap<String, String> {
        &self.definitions
    }

    /// Expands the source, returning the text the lexer will see.
    pub fn parse(&mut self, source: &str) -> Result<String, CompileError> {
        let mut output = String::new();

        for line in source.lines() {
            let line = line.trim_start();
            if line.is_empty() {
                continue;
            }

            if !line.starts_with('#') {
                if self.include_statements {
                    let mut replaced = line.to_string();
                    for (name, value) in &self.definitions {
                        replaced = replaced.replace(name.as_str(), value);
                    }
                    output.push_str(&replaced);
                    output.push('\n');
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix("#define") {
                let mut parts = rest.split_whitespace();
                let name = parts
                    .next()
                    .ok_or_else(|| invalid_directive(line))?
                    .to_string();
                let value: Vec<&str> = parts.collect();
                let value = if value.is_empty() {
                    "1".to_string()
                } else {
                    value.join(" ")
                };
                self.definitions.insert(name, value);
            } else if let Some(rest) = line.strip_prefix("#ifdef") {
                let name = rest
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| invalid_directive(line))?;
                self.in_conditional = true;
                if !self.definitions.contains_key(name) {
                    self.include_statements = false;
                }
            } else if let Some(rest) = line.strip_prefix("#ifndef") {
                let name = rest
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| invalid_directive(line))?;
                self.in_conditional = true;
                if self.definitions.contains_key(name) {
                    self.include_statements = false;
                }
            } else if line.starts_with("#else") {
                self.include_statements = !self.include_statements;
            } else if line.starts_with("#endif") {
                if !self.in_conditional {
                    return Err(CompileError::Preprocess(
                        "#endif without a matching conditional".to_string(),
                    ));
                }
                self.include_statements = true;
                self.in_conditional = false;
            } else if let Some(rest) = line.strip_prefix("#include") {
                let token = rest
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| invalid_directive(line))?;
                let path = parse_include_path(token).ok_or_else(|| {
                    CompileError::Preprocess(format!("invalid include path '{token}'"))
                })?;
                let contents = self
                    .stdlib
                    .file(&path)
                    .ok_or_else(|| {
                        CompileError::Preprocess(format!("unknown include file '{path}'"))
                    })?
                    .to_string();
                let expanded = self.parse(&contents)?;
                output.push_str(&expanded);
            }
            // other # lines are ignored
        }

        Ok(output)
    }
}

fn invalid_directive(line: &str) -> CompileError {
    CompileError::Preprocess(format!("invalid preprocessor statement '{line}'"))
}

/// Extracts the path from `<path>` or `"path"`.
fn parse_include_path(token: &str) -> Option<String> {
    let mut chars = token.chars();
    let end = match chars.next()? {
        '<' => '>',
        '"' => '"',
        _ => return None,
    };
    let path: String = chars.take_while(|&c| c != end).collect();
    if path.is_empty() {
        None
    } else {
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_definitions() {
        let input = "#define FOOBAR 1\n#define BARFOO Hello World";
        let mut pp = Preprocessor::new();
        pp.parse(input).expect("preprocess should succeed");

        // two new definitions plus the predefined ones
        assert_eq!(pp.definitions().len(), PREDEFINED.len() + 2);
        assert_eq!(pp.definitions()["FOOBAR"], "1");
        assert_eq!(pp.definitions()["BARFOO"], "Hello World");
    }

    #[test]
    fn bare_defines_default_to_one() {
        let mut pp = Preprocessor::new();
        pp.parse("#define FLAG").expect("preprocess should succeed");
        assert_eq!(pp.definitions()["FLAG"], "1");
    }

    #[test]
    fn substitutes_macros_in_source_lines() {
        let mut pp = Preprocessor::new();
        let output = pp
            .parse("#define SIZE 10\nint x = SIZE;")
            .expect("preprocess should succeed");
        assert_eq!(output, "int x = 10;\n");
    }

    #[test]
    fn evaluates_conditionals() {
        let input = "#define FOOBAR 1\n\
                     #ifdef FOOBAR\n\
                     blah blah blah\n\
                     #endif\n\
                     #ifndef FOOBAR\n\
                     boo boo boo\n\
                     #else\n\
                     blah blah blah\n\
                     #endif\n\
                     boo\n";
        let mut pp = Preprocessor::new();
        let output = pp.parse(input).expect("preprocess should succeed");
        assert_eq!(output, "blah blah blah\nblah blah blah\nboo\n");
    }

    #[test]
    fn predefined_platform_macros_expand() {
        let mut pp = Preprocessor::new();
        let output = pp
            .parse("int platform = __wcc__;")
            .expect("preprocess should succeed");
        assert_eq!(output, "int platform = 1;\n");
    }

    #[test]
    fn includes_bundled_headers() {
        let mut pp = Preprocessor::new();
        let output = pp
            .parse("#include <stdio.h>\nint main() { return 0; }")
            .expect("preprocess should succeed");
        assert!(output.contains("extern void putchar(char c);"));
        assert!(output.contains("int main() { return 0; }"));
    }

    #[test]
    fn include_guards_prevent_duplicate_declarations() {
        let mut pp = Preprocessor::new();
        let output = pp
            .parse("#include <stdio.h>\n#include <stdio.h>")
            .expect("preprocess should succeed");
        assert_eq!(output.matches("putchar").count(), 1);
    }

    #[test]
    fn quoted_include_paths_resolve_too() {
        let mut pp = Preprocessor::new();
        let output = pp
            .parse("#include \"math.h\"")
            .expect("preprocess should succeed");
        assert!(output.contains("extern float fabsf(float arg);"));
    }

    #[test]
    fn unknown_includes_are_errors() {
        let mut pp = Preprocessor::new();
        let err = pp.parse("#include <missing.h>").unwrap_err();
        assert!(matches!(err, CompileError::Preprocess(_)));
        assert!(err.to_string().contains("missing.h"));
    }

    #[test]
    fn stray_endif_is_an_error() {
        let mut pp = Preprocessor::new();
        let err = pp.parse("#endif").unwrap_err();
        assert!(matches!(err, CompileError::Preprocess(_)));
    }

    #[test]
    fn skipped_regions_emit_nothing() {
        let mut pp = Preprocessor::new();
        let output = pp
            .parse("#ifdef NOT_DEFINED\nint hidden = 1;\n#endif\nint shown = 2;")
            .expect("preprocess should succeed");
        assert_eq!(output, "int shown = 2;\n");
    }
}
