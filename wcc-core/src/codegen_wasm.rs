//! WASM 1.0 binary emission.
//!
//! The generator serializes five sections (Type, Import, Function,
//! Export, Code) into a single buffer behind the 8-byte magic/version
//! header, borrowing the AST for the duration of emission. Imported
//! functions occupy the front of the function index space; local
//! functions follow in declaration order.
//!
//! Operand compatibility is verified here while lowering: incompatible
//! infix operands, mismatched initializers, assignments, returns and
//! call arguments abort emission with a type error.

use crate::ast::{Expression, Function, InfixOp, PrefixOp, Program, Statement};
use crate::encoding::{encode_f32, encode_sleb128, encode_uleb128};
use crate::error::CompileError;
use crate::types::{compatible, ValueType};

const MAGIC_AND_VERSION: [u8; 8] = [0x00, b'a', b's', b'm', 0x01, 0x00, 0x00, 0x00];

/// Module every external function is imported from.
pub const IMPORT_MODULE: &str = "libc";

const SEC_TYPE: u8 = 1;
const SEC_IMPORT: u8 = 2;
const SEC_FUNCTION: u8 = 3;
const SEC_EXPORT: u8 = 7;
const SEC_CODE: u8 = 10;

const FUNC_TYPE: u8 = 0x60;
const TYPE_I32: u8 = 0x7F;
const TYPE_F32: u8 = 0x7D;
const KIND_FUNC: u8 = 0x00;

const OP_END: u8 = 0x0B;
const OP_RETURN: u8 = 0x0F;
const OP_CALL: u8 = 0x10;
const OP_DROP: u8 = 0x1A;
const OP_LOCAL_GET: u8 = 0x20;
const OP_LOCAL_SET: u8 = 0x21;
const OP_I32_CONST: u8 = 0x41;
const OP_F32_CONST: u8 = 0x43;
const OP_I32_EQZ: u8 = 0x45;
const OP_I32_EQ: u8 = 0x46;
const OP_I32_NE: u8 = 0x47;
const OP_I32_LT_S: u8 = 0x48;
const OP_I32_GT_S: u8 = 0x4A;
const OP_I32_LE_S: u8 = 0x4C;
const OP_I32_GE_S: u8 = 0x4E;
const OP_F32_EQ: u8 = 0x5B;
const OP_F32_NE: u8 = 0x5C;
const OP_F32_LT: u8 = 0x5D;
const OP_F32_GT: u8 = 0x5E;
const OP_F32_LE: u8 = 0x5F;
const OP_F32_GE: u8 = 0x60;
const OP_I32_ADD: u8 = 0x6A;
const OP_I32_SUB: u8 = 0x6B;
const OP_I32_MUL: u8 = 0x6C;
const OP_I32_DIV_S: u8 = 0x6D;
const OP_I32_AND: u8 = 0x71;
const OP_F32_NEG: u8 = 0x8C;
const OP_F32_ADD: u8 = 0x92;
const OP_F32_SUB: u8 = 0x93;
const OP_F32_MUL: u8 = 0x94;
const OP_F32_DIV: u8 = 0x95;

/// `int` and `char` share the i32 representation; only `float` maps to
/// f32. `void` never reaches the tag (results of arity 0).
fn value_type_tag(ty: ValueType) -> u8 {
    match ty {
        ValueType::Float => TYPE_F32,
        _ => TYPE_I32,
    }
}

fn write_name(payload: &mut Vec<u8>, name: &str) {
    payload.extend(encode_uleb128(name.len() as u32));
    payload.extend_from_slice(name.as_bytes());
}

fn write_function_type(payload: &mut Vec<u8>, func: &Function) {
    payload.push(FUNC_TYPE);
    payload.extend(encode_uleb128(func.params.len() as u32));
    for param in &func.params {
        payload.push(value_type_tag(param.ty));
    }
    match func.return_type {
        ValueType::Void => payload.extend(encode_uleb128(0)),
        ty => {
            payload.extend(encode_uleb128(1));
            payload.push(value_type_tag(ty));
        }
    }
}

pub struct WasmModule<'a> {
    buffer: Vec<u8>,
    program: &'a Program,
}

impl<'a> WasmModule<'a> {
    pub fn new(program: &'a Program) -> Self {
        let mut module = WasmModule {
            buffer: Vec::new(),
            program,
        };
        module.buffer.extend_from_slice(&MAGIC_AND_VERSION);
        module
    }

    /// Serializes all sections into the buffer.
    pub fn generate(&mut self) -> Result<(), CompileError> {
        for func in &self.program.functions {
            if !func.has_body {
                return Err(CompileError::Codegen(format!(
                    "function '{}' is declared but never defined",
                    func.name
                )));
            }
        }

        self.write_type_section();
        if !self.program.external_functions.is_empty() {
            self.write_import_section();
        }
        self.write_function_section();
        self.write_export_section()?;
        self.write_code_section()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    fn write_section(&mut self, id: u8, payload: &[u8]) {
        self.buffer.push(id);
        self.buffer
            .extend(encode_uleb128(payload.len() as u32));
        self.buffer.extend_from_slice(payload);
    }

    /// One entry per function, externals first, matching the function
    /// index space.
    fn write_type_section(&mut self) {
        let externals = &self.program.external_functions;
        let locals = &self.program.functions;
        let mut payload = Vec::new();
        payload.extend(encode_uleb128((externals.len() + locals.len()) as u32));
        for func in externals.iter().chain(locals.iter()) {
            write_function_type(&mut payload, func);
        }
        self.write_section(SEC_TYPE, &payload);
    }

    fn write_import_section(&mut self) {
        let externals = &self.program.external_functions;
        let mut payload = Vec::new();
        payload.extend(encode_uleb128(externals.len() as u32));
        for (index, func) in externals.iter().enumerate() {
            write_name(&mut payload, IMPORT_MODULE);
            write_name(&mut payload, &func.name);
            payload.push(KIND_FUNC);
            payload.extend(encode_uleb128(index as u32));
        }
        self.write_section(SEC_IMPORT, &payload);
    }

    fn write_function_section(&mut self) {
        let external_count = self.program.external_functions.len();
        let mut payload = Vec::new();
        payload.extend(encode_uleb128(self.program.functions.len() as u32));
        for index in 0..self.program.functions.len() {
            payload.extend(encode_uleb128((external_count + index) as u32));
        }
        self.write_section(SEC_FUNCTION, &payload);
    }

    fn write_export_section(&mut self) -> Result<(), CompileError> {
        let (position, _) = self
            .program
            .find_function("main")
            .ok_or_else(|| CompileError::Codegen("no 'main' function to export".to_string()))?;
        let index = self.program.external_functions.len() + position;

        let mut payload = Vec::new();
        payload.extend(encode_uleb128(1));
        write_name(&mut payload, "main");
        payload.push(KIND_FUNC);
        payload.extend(encode_uleb128(index as u32));
        self.write_section(SEC_EXPORT, &payload);
        Ok(())
    }

    fn write_code_section(&mut self) -> Result<(), CompileError> {
        let mut payload = Vec::new();
        payload.extend(encode_uleb128(self.program.functions.len() as u32));
        for func in &self.program.functions {
            let body = self.generate_function_body(func)?;
            payload.extend(encode_uleb128(body.len() as u32));
            payload.extend_from_slice(&body);
        }
        self.write_section(SEC_CODE, &payload);
        Ok(())
    }

    fn generate_function_body(&self, func: &Function) -> Result<Vec<u8>, CompileError> {
        // parameters already occupy the leading slots of the local index
        // space; only the remaining symbols need declarations. One group
        // per symbol is verbose but valid.
        let locals = &func.symbols[func.params.len()..];
        let mut body = Vec::new();
        body.extend(encode_uleb128(locals.len() as u32));
        for symbol in locals {
            body.extend(encode_uleb128(1));
            body.push(value_type_tag(symbol.ty));
        }

        if func.return_type != ValueType::Void
            && !matches!(func.statements.last(), Some(Statement::Return { .. }))
        {
            return Err(CompileError::Codegen(format!(
                "function '{}' must end with a return statement",
                func.name
            )));
        }

        for stmt in &func.statements {
            self.generate_statement(func, stmt, &mut body)?;
        }
        body.push(OP_END);
        Ok(body)
    }

    fn generate_statement(
        &self,
        func: &Function,
        stmt: &Statement,
        body: &mut Vec<u8>,
    ) -> Result<(), CompileError> {
        match stmt {
            Statement::VariableDefine {
                name,
                symbol,
                value,
                ..
            } => {
                let Some(value) = value else {
                    // uninitialized definitions produce no instructions
                    return Ok(());
                };
                let value_ty = value.value_type();
                if !compatible(symbol.ty, value_ty) {
                    return Err(CompileError::Type(format!(
                        "cannot initialize {} variable '{}' with a {} value",
                        symbol.ty, name, value_ty
                    )));
                }
                self.generate_expression(value, body)?;
                body.push(OP_LOCAL_SET);
                body.extend(encode_uleb128(symbol.index as u32));
                Ok(())
            }
            Statement::VariableUpdate {
                name,
                symbol,
                op,
                value,
            } => {
                match op.infix_op() {
                    // compound assignment lowers as var = var <op> rhs
                    Some(infix) => {
                        let expanded = Expression::Infix {
                            left: Box::new(Expression::Identifier {
                                name: name.clone(),
                                symbol: *symbol,
                            }),
                            op: infix,
                            right: Box::new(value.clone()),
                        };
                        self.generate_expression(&expanded, body)?;
                    }
                    None => {
                        let value_ty = value.value_type();
                        if !compatible(symbol.ty, value_ty) {
                            return Err(CompileError::Type(format!(
                                "cannot assign a {} value to {} variable '{}'",
                                value_ty, symbol.ty, name
                            )));
                        }
                        self.generate_expression(value, body)?;
                    }
                }
                body.push(OP_LOCAL_SET);
                body.extend(encode_uleb128(symbol.index as u32));
                Ok(())
            }
            Statement::Return { value } => {
                let value_ty = value.value_type();
                if !compatible(func.return_type, value_ty) {
                    return Err(CompileError::Type(format!(
                        "function '{}' returns {} but the return value is {}",
                        func.name, func.return_type, value_ty
                    )));
                }
                self.generate_expression(value, body)?;
                body.push(OP_RETURN);
                Ok(())
            }
            Statement::Expression { expression } => {
                self.generate_expression(expression, body)?;
                if expression.value_type() != ValueType::Void {
                    // keep the operand stack balanced
                    body.push(OP_DROP);
                }
                Ok(())
            }
        }
    }

    fn generate_expression(
        &self,
        expr: &Expression,
        body: &mut Vec<u8>,
    ) -> Result<(), CompileError> {
        match expr {
            Expression::IntegerLiteral(value) => {
                body.push(OP_I32_CONST);
                body.extend(encode_sleb128(*value as i32));
                Ok(())
            }
            Expression::CharLiteral(value) => {
                body.push(OP_I32_CONST);
                body.extend(encode_sleb128(i32::from(*value)));
                Ok(())
            }
            Expression::FloatLiteral(value) => {
                body.push(OP_F32_CONST);
                body.extend_from_slice(&encode_f32(*value as f32));
                Ok(())
            }
            Expression::Identifier { symbol, .. } => {
                body.push(OP_LOCAL_GET);
                body.extend(encode_uleb128(symbol.index as u32));
                Ok(())
            }
            Expression::Prefix { op, right } => self.generate_prefix(*op, right, body),
            Expression::Infix { left, op, right } => self.generate_infix(left, *op, right, body),
            Expression::Call { name, args, external_index, .. } => {
                self.generate_call(name, args, *external_index, body)
            }
        }
    }

    fn generate_prefix(
        &self,
        op: PrefixOp,
        right: &Expression,
        body: &mut Vec<u8>,
    ) -> Result<(), CompileError> {
        let ty = right.value_type();
        match op {
            PrefixOp::Neg => match ty {
                ValueType::Float => {
                    self.generate_expression(right, body)?;
                    body.push(OP_F32_NEG);
                    Ok(())
                }
                ValueType::Int | ValueType::Char => {
                    // i32 has no neg opcode; emit 0 - x
                    body.push(OP_I32_CONST);
                    body.extend(encode_sleb128(0));
                    self.generate_expression(right, body)?;
                    body.push(OP_I32_SUB);
                    Ok(())
                }
                ValueType::Void => Err(CompileError::Type(
                    "operator '-' cannot be applied to a void value".to_string(),
                )),
            },
            PrefixOp::Not => {
                if !compatible(ValueType::Int, ty) {
                    return Err(CompileError::Type(format!(
                        "operator '!' expects an int operand but found {ty}"
                    )));
                }
                self.generate_expression(right, body)?;
                body.push(OP_I32_EQZ);
                Ok(())
            }
        }
    }

    fn generate_infix(
        &self,
        left: &Expression,
        op: InfixOp,
        right: &Expression,
        body: &mut Vec<u8>,
    ) -> Result<(), CompileError> {
        let left_ty = left.value_type();
        let right_ty = right.value_type();
        if left_ty == ValueType::Void || right_ty == ValueType::Void {
            return Err(CompileError::Type(format!(
                "operator '{op}' cannot be applied to a void value"
            )));
        }
        if !compatible(left_ty, right_ty) {
            return Err(CompileError::Type(format!(
                "operator '{op}' cannot combine {left_ty} and {right_ty} operands"
            )));
        }

        self.generate_expression(left, body)?;
        self.generate_expression(right, body)?;

        let float = left_ty == ValueType::Float;
        let opcode = match (op, float) {
            (InfixOp::Add, false) => OP_I32_ADD,
            (InfixOp::Add, true) => OP_F32_ADD,
            (InfixOp::Sub, false) => OP_I32_SUB,
            (InfixOp::Sub, true) => OP_F32_SUB,
            (InfixOp::Mul, false) => OP_I32_MUL,
            (InfixOp::Mul, true) => OP_F32_MUL,
            (InfixOp::Div, false) => OP_I32_DIV_S,
            (InfixOp::Div, true) => OP_F32_DIV,
            (InfixOp::Eq, false) => OP_I32_EQ,
            (InfixOp::Eq, true) => OP_F32_EQ,
            (InfixOp::NotEq, false) => OP_I32_NE,
            (InfixOp::NotEq, true) => OP_F32_NE,
            (InfixOp::Lt, false) => OP_I32_LT_S,
            (InfixOp::Lt, true) => OP_F32_LT,
            (InfixOp::Gt, false) => OP_I32_GT_S,
            (InfixOp::Gt, true) => OP_F32_GT,
            (InfixOp::LtEq, false) => OP_I32_LE_S,
            (InfixOp::LtEq, true) => OP_F32_LE,
            (InfixOp::GtEq, false) => OP_I32_GE_S,
            (InfixOp::GtEq, true) => OP_F32_GE,
        };
        body.push(opcode);

        // char arithmetic wraps at 8 bits
        if !op.is_comparison() && left_ty == ValueType::Char {
            body.push(OP_I32_CONST);
            body.extend(encode_sleb128(0xFF));
            body.push(OP_I32_AND);
        }
        Ok(())
    }

    fn generate_call(
        &self,
        name: &str,
        args: &[Expression],
        external_index: Option<usize>,
        body: &mut Vec<u8>,
    ) -> Result<(), CompileError> {
        let (index, callee) = match external_index {
            Some(import) => (import, &self.program.external_functions[import]),
            None => {
                let (position, func) = self.program.find_function(name).ok_or_else(|| {
                    CompileError::Codegen(format!("call to unknown function '{name}'"))
                })?;
                (self.program.external_functions.len() + position, func)
            }
        };

        for (arg, param) in args.iter().zip(callee.params.iter()) {
            let arg_ty = arg.value_type();
            if !compatible(param.ty, arg_ty) {
                return Err(CompileError::Type(format!(
                    "parameter '{}' of '{}' expects {} but the argument is {}",
                    param.name, name, param.ty, arg_ty
                )));
            }
        }

        for arg in args {
            self.generate_expression(arg, body)?;
        }
        body.push(OP_CALL);
        body.extend(encode_uleb128(index as u32));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn build(source: &str) -> Result<Vec<u8>, CompileError> {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();
        assert!(
            parser.errors().is_empty(),
            "parse errors: {:?}",
            parser.errors()
        );
        let mut module = WasmModule::new(&program);
        module.generate()?;
        Ok(module.into_bytes())
    }

    fn section_ids(bytes: &[u8]) -> Vec<u8> {
        let mut ids = Vec::new();
        let mut offset = 8;
        while offset < bytes.len() {
            ids.push(bytes[offset]);
            offset += 1;
            let mut length = 0usize;
            let mut shift = 0;
            loop {
                let byte = bytes[offset];
                offset += 1;
                length |= usize::from(byte & 0x7F) << shift;
                shift += 7;
                if byte & 0x80 == 0 {
                    break;
                }
            }
            offset += length;
        }
        ids
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn module_starts_with_magic_and_version() {
        let bytes = build("int main() { return 0; }").expect("codegen");
        assert_eq!(&bytes[0..4], &[0x00, 0x61, 0x73, 0x6D]);
        assert_eq!(&bytes[4..8], &[0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn section_ids_ascend_without_imports() {
        let bytes = build("int main() { return 0; }").expect("codegen");
        assert_eq!(section_ids(&bytes), vec![1, 3, 7, 10]);
    }

    #[test]
    fn import_section_appears_with_externals() {
        let bytes = build(
            "extern void putchar(char c);\
             int main() { putchar('a'); return 0; }",
        )
        .expect("codegen");
        assert_eq!(section_ids(&bytes), vec![1, 2, 3, 7, 10]);
        assert!(contains(&bytes, b"libc"));
        assert!(contains(&bytes, b"putchar"));
    }

    #[test]
    fn emitted_modules_validate() {
        let sources = [
            "int main() { return 42; }",
            "int main() { int x = 10; x += 10; return x; }",
            "float main() { float x = 10.0; x += 10.1; return x; }",
            "char main() { char x = 'a'; x += 4; return x; }",
            "int main() { return !(10 < 15); }",
            "float timestwo(float x) { return x * 2.0; } float main() { return timestwo(2.0); }",
            "extern float fabsf(float x); float main() { return fabsf(-3.5); }",
            "void noop() { } int main() { noop(); return 0; }",
            "int main() { 1 + 2; return 0; }",
        ];
        for source in sources {
            let bytes = build(source).expect("codegen");
            wasmparser::validate(&bytes).unwrap_or_else(|err| {
                panic!("module for {source:?} failed validation: {err}")
            });
        }
    }

    #[test]
    fn locals_are_declared_one_group_per_symbol() {
        let bytes = build("int main() { int x = 1; int y = 2; return x; }").expect("codegen");
        // 2 groups, each of one i32
        assert!(contains(&bytes, &[0x02, 0x01, 0x7F, 0x01, 0x7F]));
    }

    #[test]
    fn char_arithmetic_is_masked_to_eight_bits() {
        let bytes = build("char main() { char x = 'a'; x += 4; return x; }").expect("codegen");
        // i32.const 255 ; i32.and
        assert!(contains(&bytes, &[OP_I32_CONST, 0xFF, 0x01, OP_I32_AND]));
    }

    #[test]
    fn expression_statements_drop_their_value() {
        let bytes = build("int main() { 1 + 2; return 0; }").expect("codegen");
        assert!(contains(&bytes, &[OP_I32_ADD, OP_DROP]));
    }

    #[test]
    fn missing_main_is_a_hard_error() {
        let err = build("int helper() { return 1; }").unwrap_err();
        assert!(matches!(err, CompileError::Codegen(_)));
        assert!(err.to_string().contains("main"));
    }

    #[test]
    fn incompatible_operands_are_type_errors() {
        let err = build("int main() { return 1 + 2.5; }").unwrap_err();
        assert!(matches!(err, CompileError::Type(_)));
    }

    #[test]
    fn float_initializer_for_int_variable_is_a_type_error() {
        let err = build("int main() { int x = 2.5; return x; }").unwrap_err();
        assert!(matches!(err, CompileError::Type(_)));
    }

    #[test]
    fn return_type_mismatch_is_a_type_error() {
        let err = build("float main() { return 1; }").unwrap_err();
        assert!(matches!(err, CompileError::Type(_)));
    }

    #[test]
    fn bang_on_float_is_a_type_error() {
        let err = build("int main() { return !1.5; }").unwrap_err();
        assert!(matches!(err, CompileError::Type(_)));
    }

    #[test]
    fn non_void_functions_must_end_with_return() {
        let err = build("int main() { int x = 1; }").unwrap_err();
        assert!(matches!(err, CompileError::Codegen(_)));
        assert!(err.to_string().contains("return"));
    }

    #[test]
    fn undefined_forward_declarations_are_rejected() {
        let err = build("int helper(); int main() { return helper(); }").unwrap_err();
        assert!(matches!(err, CompileError::Codegen(_)));
        assert!(err.to_string().contains("never defined"));
    }

    #[test]
    fn call_argument_type_mismatch_is_a_type_error() {
        let err = build(
            "float timestwo(float x) { return x * 2.0; }\
             float main() { return timestwo(2); }",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::Type(_)));
    }
}
