//! Compilation pipeline orchestration.
//!
//! Drives preprocess -> lex -> parse -> codegen and packages the result
//! for the driver. Parse errors abort before code generation; type and
//! codegen errors abort emission.

use crate::ast::Function;
use crate::codegen_wasm::WasmModule;
use crate::error::CompileError;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::preprocessor::Preprocessor;
use crate::types::ValueType;

/// Signature of an imported function. Hosts use these to build the
/// `libc` import object for instantiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFunction {
    pub name: String,
    pub params: Vec<ValueType>,
    pub result: ValueType,
}

impl ExternalFunction {
    fn from_function(func: &Function) -> Self {
        ExternalFunction {
            name: func.name.clone(),
            params: func.params.iter().map(|p| p.ty).collect(),
            result: func.return_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompilationArtifact {
    pub wasm: Vec<u8>,
    pub externals: Vec<ExternalFunction>,
}

/// Compiles a translation unit against the bundled standard library.
pub fn compile_wasm(source: &str) -> Result<CompilationArtifact, CompileError> {
    compile_wasm_with(Preprocessor::new(), source)
}

/// Compiles with a caller-supplied preprocessor, e.g. one loading a
/// custom stdlib root.
pub fn compile_wasm_with(
    mut preprocessor: Preprocessor,
    source: &str,
) -> Result<CompilationArtifact, CompileError> {
    let expanded = preprocessor.parse(source)?;

    let mut parser = Parser::new(Lexer::new(&expanded));
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        return Err(CompileError::Parse(parser.errors().to_vec()));
    }

    let mut module = WasmModule::new(&program);
    module.generate()?;
    let wasm = module.into_bytes();

    let externals = program
        .external_functions
        .iter()
        .map(ExternalFunction::from_function)
        .collect();

    Ok(CompilationArtifact { wasm, externals })
}
