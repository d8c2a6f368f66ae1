//! Single-pass compiler: parses one Jack class and emits VM code as each
//! grammar production completes.
//!
//! Recursive descent with one token of lookahead and no backtracking. Every
//! `compile_*` method expects the scanner to sit on the first token of its
//! construct and leaves it on the first token after it. No tree is built:
//! identifiers are resolved through the symbol table and instructions go
//! straight to the `Emit` sink.
//
//  Grammar (informal):
//
//      class          ::= 'class' ident '{' classVarDec* subroutineDec* '}'
//      classVarDec    ::= ('static' | 'field') type ident (',' ident)* ';'
//      type           ::= 'int' | 'char' | 'boolean' | ident
//      subroutineDec  ::= ('constructor' | 'function' | 'method')
//                         ('void' | type) ident '(' parameterList ')' body
//      parameterList  ::= ( type ident (',' type ident)* )?
//      body           ::= '{' varDec* statements '}'
//      varDec         ::= 'var' type ident (',' ident)* ';'
//      statements     ::= (let | if | while | do | return)*
//      expression     ::= term (op term)*          -- no precedence, left to right
//      term           ::= int | string | keywordConst | ident | ident '[' expr ']'
//                       | call | '(' expr ')' | ('-' | '~') term
//      call           ::= ident '(' exprList ')' | ident '.' ident '(' exprList ')'

use log::{debug, trace};

use super::lexer::{Keyword, Token};
use super::scanner::Scanner;
use super::symbol_table::{Kind, SymbolTable};
use super::vm::{Command, Emit, Instruction, Segment};
use crate::error::{CompileError, SymbolError};

/// Largest integer constant the VM can push.
pub const MAX_INT: u32 = 32767;

const BINARY_OPS: &[char] = &['+', '-', '*', '/', '&', '|', '<', '>', '='];

type Result<T> = std::result::Result<T, CompileError>;

/// Per-file state: never shared between files.
#[derive(Debug, Default)]
struct Context {
    class_name: String,
    /// Fully qualified name of the subroutine being compiled.
    subroutine: String,
    labels: usize,
}

pub struct CompilationEngine<'a, E: Emit> {
    scanner: Scanner<'a>,
    symbols: SymbolTable,
    ctx: Context,
    out: E,
}

impl<'a, E: Emit> CompilationEngine<'a, E> {
    pub fn new(src: &'a str, out: E) -> Self {
        Self {
            scanner: Scanner::new(src),
            symbols: SymbolTable::new(),
            ctx: Context::default(),
            out,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.ctx.class_name
    }

    pub fn into_output(self) -> E {
        self.out
    }

    /// Compiles the whole input, which must hold exactly one class.
    pub fn compile_class(&mut self) -> Result<()> {
        self.scanner.advance()?;
        self.expect_keyword(Keyword::Class)?;
        self.ctx.class_name = self.expect_identifier()?;
        self.expect_symbol('{')?;

        while matches!(
            self.scanner.keyword(),
            Some(Keyword::Static | Keyword::Field)
        ) {
            self.compile_class_var_dec()?;
        }

        while matches!(
            self.scanner.keyword(),
            Some(Keyword::Constructor | Keyword::Function | Keyword::Method)
        ) {
            self.compile_subroutine()?;
        }

        self.expect_symbol('}')?;
        if self.scanner.token().is_some() {
            return Err(self.syntax_error("end of input"));
        }
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> Result<()> {
        let kind = match self.scanner.keyword() {
            Some(Keyword::Static) => Kind::Static,
            _ => Kind::Field,
        };
        self.scanner.advance()?;

        let ty = self.compile_type()?;
        self.declare_list(&ty, kind)?;
        self.expect_symbol(';')
    }

    fn compile_subroutine(&mut self) -> Result<()> {
        let flavour = self.scanner.keyword();
        self.scanner.advance()?;
        self.symbols.reset_scope();

        if self.scanner.keyword() == Some(Keyword::Void) {
            self.scanner.advance()?;
        } else {
            self.compile_type()?;
        }
        let name = self.expect_identifier()?;
        self.ctx.subroutine = format!("{}.{}", self.ctx.class_name, name);

        if flavour == Some(Keyword::Method) {
            let class_name = self.ctx.class_name.clone();
            self.define("this", &class_name, Kind::Argument)?;
        }

        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;

        self.expect_symbol('{')?;
        while self.scanner.keyword() == Some(Keyword::Var) {
            self.compile_var_dec()?;
        }

        let locals = self.symbols.var_count(Kind::Local);
        debug!("compiling {} ({} locals)", self.ctx.subroutine, locals);
        self.emit(Instruction::Function {
            name: self.ctx.subroutine.clone(),
            locals,
        })?;

        match flavour {
            Some(Keyword::Constructor) => {
                let fields = self.symbols.var_count(Kind::Field);
                self.emit(Instruction::Push(Segment::Constant, fields))?;
                self.emit_call("Memory.alloc", 1)?;
                self.emit(Instruction::Pop(Segment::Pointer, 0))?;
            }
            Some(Keyword::Method) => {
                self.emit(Instruction::Push(Segment::Argument, 0))?;
                self.emit(Instruction::Pop(Segment::Pointer, 0))?;
            }
            _ => {}
        }

        self.compile_statements()?;
        self.expect_symbol('}')
    }

    fn compile_parameter_list(&mut self) -> Result<()> {
        if self.is_symbol(')') {
            return Ok(());
        }
        loop {
            let ty = self.compile_type()?;
            self.declare(&ty, Kind::Argument)?;
            if !self.is_symbol(',') {
                return Ok(());
            }
            self.scanner.advance()?;
        }
    }

    fn compile_var_dec(&mut self) -> Result<()> {
        self.expect_keyword(Keyword::Var)?;
        let ty = self.compile_type()?;
        self.declare_list(&ty, Kind::Local)?;
        self.expect_symbol(';')
    }

    fn compile_statements(&mut self) -> Result<()> {
        loop {
            match self.scanner.keyword() {
                Some(Keyword::Let) => self.compile_let()?,
                Some(Keyword::If) => self.compile_if()?,
                Some(Keyword::While) => self.compile_while()?,
                Some(Keyword::Do) => self.compile_do()?,
                Some(Keyword::Return) => self.compile_return()?,
                _ => return Ok(()),
            }
        }
    }

    fn compile_let(&mut self) -> Result<()> {
        self.scanner.advance()?;
        let line = self.scanner.line();
        let name = self.expect_identifier()?;
        let (segment, index) = self.resolve(&name, line)?;

        let indexed = self.is_symbol('[');
        if indexed {
            self.scanner.advance()?;
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.emit(Instruction::Push(segment, index))?;
            self.emit(Instruction::Arithmetic(Command::Add))?;
        }

        self.expect_symbol('=')?;
        self.compile_expression()?;

        if indexed {
            // the element address is under the value on the stack
            self.emit(Instruction::Pop(Segment::Temp, 0))?;
            self.emit(Instruction::Pop(Segment::Pointer, 1))?;
            self.emit(Instruction::Push(Segment::Temp, 0))?;
            self.emit(Instruction::Pop(Segment::That, 0))?;
        } else {
            self.emit(Instruction::Pop(segment, index))?;
        }

        self.expect_symbol(';')
    }

    fn compile_if(&mut self) -> Result<()> {
        let end_label = self.new_label();
        let else_label = self.new_label();

        self.scanner.advance()?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        self.emit(Instruction::Arithmetic(Command::Not))?;
        self.emit(Instruction::IfGoto(else_label.clone()))?;

        self.compile_block()?;

        self.emit(Instruction::Goto(end_label.clone()))?;
        self.emit(Instruction::Label(else_label))?;

        if self.scanner.keyword() == Some(Keyword::Else) {
            self.scanner.advance()?;
            self.compile_block()?;
        }

        self.emit(Instruction::Label(end_label))
    }

    fn compile_while(&mut self) -> Result<()> {
        let start_label = self.new_label();
        let end_label = self.new_label();

        self.emit(Instruction::Label(start_label.clone()))?;
        self.scanner.advance()?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        self.emit(Instruction::Arithmetic(Command::Not))?;
        self.emit(Instruction::IfGoto(end_label.clone()))?;

        self.compile_block()?;

        self.emit(Instruction::Goto(start_label))?;
        self.emit(Instruction::Label(end_label))
    }

    fn compile_do(&mut self) -> Result<()> {
        self.scanner.advance()?;
        let line = self.scanner.line();
        let name = self.expect_identifier()?;
        self.compile_subroutine_call(&name, line)?;
        // every call leaves a value behind, even void ones
        self.emit(Instruction::Pop(Segment::Temp, 0))?;
        self.expect_symbol(';')
    }

    fn compile_return(&mut self) -> Result<()> {
        self.scanner.advance()?;
        if self.is_symbol(';') {
            self.emit(Instruction::Push(Segment::Constant, 0))?;
        } else {
            self.compile_expression()?;
        }
        self.emit(Instruction::Return)?;
        self.expect_symbol(';')
    }

    /// `'{' statements '}'`
    fn compile_block(&mut self) -> Result<()> {
        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')
    }

    fn compile_expression(&mut self) -> Result<()> {
        self.compile_term()?;

        while let Some(op) = self.scanner.symbol().filter(|c| BINARY_OPS.contains(c)) {
            self.scanner.advance()?;
            self.compile_term()?;

            match op {
                '+' => self.emit(Instruction::Arithmetic(Command::Add))?,
                '-' => self.emit(Instruction::Arithmetic(Command::Sub))?,
                '&' => self.emit(Instruction::Arithmetic(Command::And))?,
                '|' => self.emit(Instruction::Arithmetic(Command::Or))?,
                '<' => self.emit(Instruction::Arithmetic(Command::Lt))?,
                '>' => self.emit(Instruction::Arithmetic(Command::Gt))?,
                '=' => self.emit(Instruction::Arithmetic(Command::Eq))?,
                '*' => self.emit_call("Math.multiply", 2)?,
                '/' => self.emit_call("Math.divide", 2)?,
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    fn compile_term(&mut self) -> Result<()> {
        let token = match self.scanner.token() {
            Some(token) => token.clone(),
            None => return Err(self.syntax_error("term")),
        };
        let line = self.scanner.line();

        match token {
            Token::IntegerConstant(value) => {
                if value > MAX_INT {
                    return Err(CompileError::IntegerOutOfRange { line, value });
                }
                self.emit(Instruction::Push(Segment::Constant, value as u16))?;
                self.scanner.advance()?;
            }
            Token::StringConstant(text) => {
                let len = text.chars().count();
                if len > MAX_INT as usize {
                    return Err(CompileError::StringTooLong { line, len });
                }
                self.emit(Instruction::Push(Segment::Constant, len as u16))?;
                self.emit_call("String.new", 1)?;
                for ch in text.chars() {
                    let code = ch as u32;
                    if code > MAX_INT {
                        return Err(CompileError::CharOutOfRange { line, ch });
                    }
                    self.emit(Instruction::Push(Segment::Constant, code as u16))?;
                    self.emit_call("String.appendChar", 2)?;
                }
                self.scanner.advance()?;
            }
            Token::Keyword(Keyword::True) => {
                self.emit(Instruction::Push(Segment::Constant, 1))?;
                self.emit(Instruction::Arithmetic(Command::Neg))?;
                self.scanner.advance()?;
            }
            Token::Keyword(Keyword::False | Keyword::Null) => {
                self.emit(Instruction::Push(Segment::Constant, 0))?;
                self.scanner.advance()?;
            }
            Token::Keyword(Keyword::This) => {
                self.emit(Instruction::Push(Segment::Pointer, 0))?;
                self.scanner.advance()?;
            }
            Token::Symbol('(') => {
                self.scanner.advance()?;
                self.compile_expression()?;
                self.expect_symbol(')')?;
            }
            Token::Symbol(op @ ('-' | '~')) => {
                self.scanner.advance()?;
                self.compile_term()?;
                let command = if op == '-' { Command::Neg } else { Command::Not };
                self.emit(Instruction::Arithmetic(command))?;
            }
            Token::Identifier(name) => {
                self.scanner.advance()?;
                match self.scanner.symbol() {
                    Some('[') => {
                        let (segment, index) = self.resolve(&name, line)?;
                        self.scanner.advance()?;
                        self.compile_expression()?;
                        self.expect_symbol(']')?;
                        self.emit(Instruction::Push(segment, index))?;
                        self.emit(Instruction::Arithmetic(Command::Add))?;
                        self.emit(Instruction::Pop(Segment::Pointer, 1))?;
                        self.emit(Instruction::Push(Segment::That, 0))?;
                    }
                    Some('(' | '.') => self.compile_subroutine_call(&name, line)?,
                    _ => {
                        let (segment, index) = self.resolve(&name, line)?;
                        self.emit(Instruction::Push(segment, index))?;
                    }
                }
            }
            _ => return Err(self.syntax_error("term")),
        }
        Ok(())
    }

    /// Compiles a call whose leading identifier `first` has already been
    /// consumed. The scanner sits on `(` or `.`.
    fn compile_subroutine_call(&mut self, first: &str, line: usize) -> Result<()> {
        let (function, receiver) = match self.scanner.symbol() {
            Some('(') => {
                self.emit(Instruction::Push(Segment::Pointer, 0))?;
                (format!("{}.{}", self.ctx.class_name, first), 1)
            }
            Some('.') => {
                self.scanner.advance()?;
                let member = self.expect_identifier()?;
                match self.symbols.lookup(first).cloned() {
                    Some(entry) => {
                        self.emit(Instruction::Push(entry.kind.segment(), entry.index))?;
                        (format!("{}.{}", entry.ty, member), 1)
                    }
                    None => (format!("{first}.{member}"), 0),
                }
            }
            _ => {
                return Err(CompileError::Syntax {
                    line,
                    expected: "'(' or '.'".into(),
                    found: self.scanner.describe(),
                });
            }
        };

        self.expect_symbol('(')?;
        let args = self.compile_expression_list()?;
        self.expect_symbol(')')?;
        self.emit_call(&function, receiver + args)
    }

    /// Returns the number of expressions compiled.
    fn compile_expression_list(&mut self) -> Result<u16> {
        if self.is_symbol(')') {
            return Ok(0);
        }
        self.compile_expression()?;
        let mut count = 1;
        while self.is_symbol(',') {
            self.scanner.advance()?;
            self.compile_expression()?;
            count += 1;
        }
        Ok(count)
    }

    /// `'int' | 'char' | 'boolean' | className`
    fn compile_type(&mut self) -> Result<String> {
        let ty = match self.scanner.token() {
            Some(Token::Keyword(k @ (Keyword::Int | Keyword::Char | Keyword::Boolean))) => {
                k.as_str().to_string()
            }
            Some(Token::Identifier(name)) => name.clone(),
            _ => return Err(self.syntax_error("type")),
        };
        self.scanner.advance()?;
        Ok(ty)
    }

    /// `ident (',' ident)*`, each registered with the same type and kind.
    fn declare_list(&mut self, ty: &str, kind: Kind) -> Result<()> {
        self.declare(ty, kind)?;
        while self.is_symbol(',') {
            self.scanner.advance()?;
            self.declare(ty, kind)?;
        }
        Ok(())
    }

    fn declare(&mut self, ty: &str, kind: Kind) -> Result<()> {
        let name = match self.scanner.identifier() {
            Some(name) => name.to_string(),
            None => return Err(self.syntax_error("identifier")),
        };
        self.define(&name, ty, kind)?;
        self.scanner.advance()
    }

    fn define(&mut self, name: &str, ty: &str, kind: Kind) -> Result<()> {
        let line = self.scanner.line();
        self.symbols
            .define(name, ty, kind)
            .map(|_| ())
            .map_err(|source| CompileError::Symbol { line, source })
    }

    fn resolve(&self, name: &str, line: usize) -> Result<(Segment, u16)> {
        match self.symbols.lookup(name) {
            Some(entry) => Ok((entry.kind.segment(), entry.index)),
            None => Err(CompileError::Symbol {
                line,
                source: SymbolError::Undefined(name.to_string()),
            }),
        }
    }

    fn new_label(&mut self) -> String {
        let label = format!("{}_{}", self.ctx.class_name, self.ctx.labels);
        self.ctx.labels += 1;
        label
    }

    fn emit(&mut self, instruction: Instruction) -> Result<()> {
        trace!("{}: {}", self.ctx.subroutine, instruction);
        self.out.emit(instruction)?;
        Ok(())
    }

    fn emit_call(&mut self, name: &str, args: u16) -> Result<()> {
        self.emit(Instruction::Call {
            name: name.to_string(),
            args,
        })
    }

    fn is_symbol(&self, c: char) -> bool {
        self.scanner.symbol() == Some(c)
    }

    fn expect_symbol(&mut self, c: char) -> Result<()> {
        if !self.is_symbol(c) {
            return Err(self.syntax_error(format!("'{c}'")));
        }
        self.scanner.advance()
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.scanner.keyword() != Some(keyword) {
            return Err(self.syntax_error(format!("'{}'", keyword.as_str())));
        }
        self.scanner.advance()
    }

    fn expect_identifier(&mut self) -> Result<String> {
        let name = match self.scanner.identifier() {
            Some(name) => name.to_string(),
            None => return Err(self.syntax_error("identifier")),
        };
        self.scanner.advance()?;
        Ok(name)
    }

    fn syntax_error(&self, expected: impl Into<String>) -> CompileError {
        CompileError::Syntax {
            line: self.scanner.line(),
            expected: expected.into(),
            found: self.scanner.describe(),
        }
    }
}
