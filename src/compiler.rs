// A recursive-descent parser that writes VM code as it goes. There is no syntax tree: every
// compile_* method consumes exactly the tokens of its production and emits that production's
// instructions before returning. Jump targets are symbolic labels, so nothing is backpatched.

use std::fmt::{self, Display};
use std::io;

use log::debug;

use crate::{
    error::{CompileError, CompileResult, InternalError},
    options::{CompilerOptions, DoResultPolicy},
    scanner::{Keyword, Scanner, Token, TokenType},
    symbols::{Kind, SymbolError, SymbolTable},
    vm::{Arity, Command, Instruction, Label, Segment, VmWriter},
};

const BINARY_OPS: &[char] = &['+', '-', '*', '/', '&', '|', '<', '>', '='];
const UNARY_OPS: &[char] = &['-', '~'];
const MAX_INTEGER: u16 = 32767;
// Terms and blocks nested deeper than this are rejected before the native stack runs out.
const MAX_NESTING: usize = 256;

const THIS_POINTER: usize = 0;
const THAT_POINTER: usize = 1;
const SCRATCH: usize = 0;

const ALLOC: &str = "Memory.alloc";
const STRING_NEW: &str = "String.new";
const STRING_APPEND_CHAR: &str = "String.appendChar";

/// The output of compiling one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledClass {
    name: String,
    instructions: Vec<Instruction>,
}

impl CompiledClass {
    /// Name given in the class declaration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The emitted code, in order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Writes the code as VM text, one instruction per line.
    pub fn write_to<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: io::Write,
    {
        for instruction in &self.instructions {
            writeln!(writer, "{}", instruction)?;
        }
        Ok(())
    }
}

impl Display for CompiledClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}

/// Compile one class from source text. Each call is an independent session: a fresh symbol
/// table and label counter. Nothing is returned unless the whole class compiled.
pub fn compile(source: &str, options: &CompilerOptions) -> CompileResult<CompiledClass> {
    let mut compiler = Compiler::new(source, options.clone());
    compiler.compile_class()?;
    Ok(CompiledClass {
        name: compiler.class_name,
        instructions: compiler.writer.finish(),
    })
}

/// How a qualified call's receiver `recv` in `recv.name(...)` resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// `recv` is a variable: a method call on its value.
    ResolvedAsVariable {
        /// Declared type of the variable, used as the target class.
        typ: String,
        /// Where the receiver is read from.
        segment: Segment,
        /// Index within `segment`.
        index: usize,
    },
    /// `recv` is a class name: a function or constructor call.
    ResolvedAsClass {
        /// The class.
        name: String,
    },
}

// Result of testing the current token. An optional grammar element that is simply not there is
// `Absent`; running off the end of the input is never a legitimate absence.
#[derive(Debug)]
enum Expect<'a> {
    Matched(Token<'a>),
    Absent,
    EndOfInput,
}

#[derive(Debug, Clone, Copy)]
enum Want {
    Symbol(char),
    Keyword(Keyword),
    Identifier,
    // int, char, boolean or a class name
    Type,
}

impl Want {
    fn matches(&self, token: &Token<'_>) -> bool {
        match self {
            Want::Symbol(c) => token.is_symbol(*c),
            Want::Keyword(k) => token.is_keyword(*k),
            Want::Identifier => token.typ() == TokenType::Identifier,
            Want::Type => {
                token.typ() == TokenType::Identifier
                    || matches!(
                        token.keyword(),
                        Some(Keyword::Int | Keyword::Char | Keyword::Boolean)
                    )
            }
        }
    }
}

impl Display for Want {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Want::Symbol(c) => write!(f, "'{}'", c),
            Want::Keyword(k) => write!(f, "'{}'", k),
            Want::Identifier => write!(f, "identifier"),
            Want::Type => write!(f, "type"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

impl Display for SubroutineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubroutineKind::Constructor => "constructor",
            SubroutineKind::Function => "function",
            SubroutineKind::Method => "method",
        };
        f.write_str(name)
    }
}

// Class names are capitalised; anything else that fails to resolve is an error rather than a call
// to a class nobody declared.
fn is_plausible_class_name(name: &str) -> bool {
    name.chars().next().map_or(false, |c| c.is_ascii_uppercase())
}

/// One compilation session. Owns its scanner position, symbol table, label counter and output
/// for exactly one class.
#[derive(Debug)]
pub struct Compiler<'a> {
    scanner: Scanner<'a>,
    exhausted: bool,
    symbols: SymbolTable,
    writer: VmWriter,
    options: CompilerOptions,
    class_name: String,
    next_label: usize,
    header_emitted: bool,
    depth: usize,
    production: &'static str,
}

impl<'a> Compiler<'a> {
    /// A session positioned before the first token of `source`.
    pub fn new(source: &'a str, options: CompilerOptions) -> Self {
        Compiler {
            scanner: Scanner::new(source),
            exhausted: false,
            symbols: SymbolTable::new(),
            writer: VmWriter::new(),
            options,
            class_name: String::new(),
            next_label: 0,
            header_emitted: false,
            depth: 0,
            production: "class",
        }
    }

    /// Instructions emitted so far.
    pub fn instructions(&self) -> &[Instruction] {
        self.writer.instructions()
    }

    /// `class Name { classVarDec* subroutineDec* }`, then end of input.
    pub fn compile_class(&mut self) -> CompileResult<()> {
        self.production = "class";
        self.step()?;
        self.expect(Want::Keyword(Keyword::Class))?;
        let name = self.expect(Want::Identifier)?;
        self.class_name = name.raw().to_owned();
        debug!("compiling class {}", self.class_name);
        self.expect(Want::Symbol('{'))?;

        while let Some(kind) = self.class_var_kind() {
            self.compile_class_var_dec(kind)?;
        }
        while let Some(kind) = self.subroutine_kind() {
            self.compile_subroutine(kind)?;
        }

        self.expect(Want::Symbol('}'))?;
        if self.current().is_some() {
            return Err(self.unexpected("end of input"));
        }
        Ok(())
    }

    fn compile_class_var_dec(&mut self, kind: Kind) -> CompileResult<()> {
        let outer = self.enter("classVarDec");
        self.bump()?;
        let typ = self.compile_type()?;
        loop {
            let name = self.expect(Want::Identifier)?;
            self.define(&name, &typ, kind)?;
            if self.optional(Want::Symbol(','))?.is_none() {
                break;
            }
        }
        self.expect(Want::Symbol(';'))?;
        self.leave(outer);
        Ok(())
    }

    fn compile_subroutine(&mut self, kind: SubroutineKind) -> CompileResult<()> {
        let outer = self.enter("subroutineDec");
        let keyword = self.bump()?;

        self.symbols.start_subroutine();
        self.header_emitted = false;
        if kind == SubroutineKind::Method {
            let class_name = self.class_name.clone();
            self.bind("this", &class_name, Kind::Argument, keyword.line())?;
        }

        // The return type does not change the generated code.
        if self.optional(Want::Keyword(Keyword::Void))?.is_none() {
            self.compile_type()?;
        }
        let name = self.expect(Want::Identifier)?;
        debug!("compiling {} {}.{}", kind, self.class_name, name.raw());

        self.expect(Want::Symbol('('))?;
        self.compile_parameter_list()?;
        self.expect(Want::Symbol(')'))?;
        self.compile_subroutine_body(kind, name.raw())?;
        self.leave(outer);
        Ok(())
    }

    fn compile_parameter_list(&mut self) -> CompileResult<()> {
        let outer = self.enter("parameterList");
        if !self.current_is_symbol(')') {
            loop {
                let typ = self.compile_type()?;
                let name = self.expect(Want::Identifier)?;
                self.define(&name, &typ, Kind::Argument)?;
                if self.optional(Want::Symbol(','))?.is_none() {
                    break;
                }
            }
        }
        self.leave(outer);
        Ok(())
    }

    fn compile_subroutine_body(&mut self, kind: SubroutineKind, name: &str) -> CompileResult<()> {
        let outer = self.enter("subroutineBody");
        self.expect(Want::Symbol('{'))?;

        let mut n_locals = 0;
        while self.current_keyword() == Some(Keyword::Var) {
            n_locals += self.compile_var_dec()?;
        }

        self.writer.write_function(&self.class_name, name, n_locals);
        self.header_emitted = true;
        match kind {
            SubroutineKind::Constructor => {
                let n_fields = self.symbols.var_count(Kind::Field);
                self.writer.write_push(Segment::Constant, n_fields);
                self.writer.write_call(ALLOC, 1);
                self.writer.write_pop(Segment::Pointer, THIS_POINTER);
            }
            SubroutineKind::Method => {
                self.writer.write_push(Segment::Argument, 0);
                self.writer.write_pop(Segment::Pointer, THIS_POINTER);
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements()?;
        self.expect(Want::Symbol('}'))?;
        self.leave(outer);
        Ok(())
    }

    // Returns the number of locals declared.
    fn compile_var_dec(&mut self) -> CompileResult<usize> {
        let outer = self.enter("varDec");
        self.bump()?;
        let typ = self.compile_type()?;
        let mut declared = 0;
        loop {
            let name = self.expect(Want::Identifier)?;
            self.define(&name, &typ, Kind::Local)?;
            declared += 1;
            if self.optional(Want::Symbol(','))?.is_none() {
                break;
            }
        }
        self.expect(Want::Symbol(';'))?;
        self.leave(outer);
        Ok(declared)
    }

    fn compile_type(&mut self) -> CompileResult<String> {
        Ok(self.expect(Want::Type)?.raw().to_owned())
    }

    fn compile_statements(&mut self) -> CompileResult<()> {
        loop {
            match self.current_keyword() {
                Some(Keyword::Let) => self.compile_let()?,
                Some(Keyword::If) => self.compile_if()?,
                Some(Keyword::While) => self.compile_while()?,
                Some(Keyword::Do) => self.compile_do()?,
                Some(Keyword::Return) => self.compile_return()?,
                _ => return Ok(()),
            }
        }
    }

    fn compile_let(&mut self) -> CompileResult<()> {
        let outer = self.enter("letStatement");
        self.bump()?;
        let name = self.expect(Want::Identifier)?;
        let (segment, index) = self.resolve_variable(&name)?;

        if self.optional(Want::Symbol('['))?.is_some() {
            // The destination address has to be on the stack before the right-hand side runs:
            // any array access in there reuses pointer 1.
            self.writer.write_push(segment, index);
            self.compile_expression()?;
            self.expect(Want::Symbol(']'))?;
            self.writer.write_command(Command::Add);

            self.expect(Want::Symbol('='))?;
            self.compile_expression()?;
            self.expect(Want::Symbol(';'))?;

            self.writer.write_pop(Segment::Temp, SCRATCH);
            self.writer.write_pop(Segment::Pointer, THAT_POINTER);
            self.writer.write_push(Segment::Temp, SCRATCH);
            self.writer.write_pop(Segment::That, 0);
        } else {
            self.expect(Want::Symbol('='))?;
            self.compile_expression()?;
            self.expect(Want::Symbol(';'))?;
            self.writer.write_pop(segment, index);
        }
        self.leave(outer);
        Ok(())
    }

    fn compile_if(&mut self) -> CompileResult<()> {
        let outer = self.enter("ifStatement");
        self.bump()?;
        self.expect(Want::Symbol('('))?;
        self.compile_expression()?;
        self.expect(Want::Symbol(')'))?;

        self.writer.write_command(Command::Not);
        let else_label = self.new_label();
        self.writer.write_if(else_label);

        self.compile_block()?;

        let end_label = self.new_label();
        self.writer.write_goto(end_label);
        self.writer.write_label(else_label);
        if self.optional(Want::Keyword(Keyword::Else))?.is_some() {
            self.compile_block()?;
        }
        self.writer.write_label(end_label);
        self.leave(outer);
        Ok(())
    }

    fn compile_while(&mut self) -> CompileResult<()> {
        let outer = self.enter("whileStatement");
        self.bump()?;
        let top_label = self.new_label();
        self.writer.write_label(top_label);

        self.expect(Want::Symbol('('))?;
        self.compile_expression()?;
        self.expect(Want::Symbol(')'))?;

        self.writer.write_command(Command::Not);
        let end_label = self.new_label();
        self.writer.write_if(end_label);

        self.compile_block()?;

        self.writer.write_goto(top_label);
        self.writer.write_label(end_label);
        self.leave(outer);
        Ok(())
    }

    // `{ statements }`
    fn compile_block(&mut self) -> CompileResult<()> {
        self.nested(|compiler| {
            compiler.expect(Want::Symbol('{'))?;
            compiler.compile_statements()?;
            compiler.expect(Want::Symbol('}'))
        })?;
        Ok(())
    }

    fn compile_do(&mut self) -> CompileResult<()> {
        let outer = self.enter("doStatement");
        self.bump()?;
        let name = self.expect(Want::Identifier)?;
        self.compile_subroutine_call(&name)?;
        self.expect(Want::Symbol(';'))?;
        if self.options.do_result == DoResultPolicy::Discard {
            self.writer.write_pop(Segment::Temp, SCRATCH);
        }
        self.leave(outer);
        Ok(())
    }

    fn compile_return(&mut self) -> CompileResult<()> {
        let outer = self.enter("returnStatement");
        self.bump()?;
        if self.optional(Want::Symbol(';'))?.is_some() {
            // void subroutines still hand back a value
            self.writer.write_push(Segment::Constant, 0);
        } else {
            // `return this` needs no special path: the keyword always compiles to pointer 0.
            self.compile_expression()?;
            self.expect(Want::Symbol(';'))?;
        }
        self.writer.write_return();
        self.leave(outer);
        Ok(())
    }

    /// `term (op term)*`, applied strictly left to right.
    fn compile_expression(&mut self) -> CompileResult<()> {
        let outer = self.enter("expression");
        self.compile_term()?;
        while let Some(op) = self.current_symbol().filter(|c| BINARY_OPS.contains(c)) {
            self.bump()?;
            self.compile_term()?;
            self.writer.write_arithmetic(op, Arity::Binary)?;
        }
        self.leave(outer);
        Ok(())
    }

    // Every recursive path through an expression passes through here.
    fn compile_term(&mut self) -> CompileResult<()> {
        self.nested(Self::compile_nested_term)
    }

    fn compile_nested_term(&mut self) -> CompileResult<()> {
        let outer = self.enter("term");
        let token = match self.current() {
            Some(token) => token.clone(),
            None => return Err(self.unexpected("term")),
        };

        match token.typ() {
            TokenType::IntegerConstant => {
                let value = token
                    .raw()
                    .parse::<u16>()
                    .ok()
                    .filter(|v| *v <= MAX_INTEGER)
                    .ok_or_else(|| CompileError::IntegerOutOfRange {
                        value: token.raw().to_owned(),
                        line: token.line(),
                    })?;
                self.bump()?;
                self.writer.write_push(Segment::Constant, usize::from(value));
            }
            TokenType::StringConstant => {
                self.bump()?;
                self.compile_string_constant(&token)?;
            }
            TokenType::Keyword => {
                match token.keyword() {
                    Some(Keyword::True) => {
                        self.writer.write_push(Segment::Constant, 1);
                        self.writer.write_command(Command::Neg);
                    }
                    Some(Keyword::False | Keyword::Null) => {
                        self.writer.write_push(Segment::Constant, 0);
                    }
                    Some(Keyword::This) => {
                        self.writer.write_push(Segment::Pointer, THIS_POINTER);
                    }
                    _ => return Err(self.unexpected("term")),
                }
                self.bump()?;
            }
            TokenType::Symbol => match token.symbol() {
                Some('(') => {
                    self.bump()?;
                    self.compile_expression()?;
                    self.expect(Want::Symbol(')'))?;
                }
                Some(op) if UNARY_OPS.contains(&op) => {
                    self.bump()?;
                    self.compile_term()?;
                    self.writer.write_arithmetic(op, Arity::Unary)?;
                }
                _ => return Err(self.unexpected("term")),
            },
            TokenType::Identifier => {
                self.bump()?;
                match self.current_symbol() {
                    Some('[') => {
                        let (segment, index) = self.resolve_variable(&token)?;
                        self.bump()?;
                        self.writer.write_push(segment, index);
                        self.compile_expression()?;
                        self.expect(Want::Symbol(']'))?;
                        self.writer.write_command(Command::Add);
                        self.writer.write_pop(Segment::Pointer, THAT_POINTER);
                        self.writer.write_push(Segment::That, 0);
                    }
                    Some('(' | '.') => self.compile_subroutine_call(&token)?,
                    _ => {
                        let (segment, index) = self.resolve_variable(&token)?;
                        self.writer.write_push(segment, index);
                    }
                }
            }
        }
        self.leave(outer);
        Ok(())
    }

    // Strings are built at runtime: allocate, then append one character code at a time.
    fn compile_string_constant(&mut self, token: &Token<'a>) -> CompileResult<()> {
        let payload = token.raw();
        if let Some(character) = payload.chars().find(|c| *c as u32 > u32::from(MAX_INTEGER)) {
            return Err(CompileError::CharacterOutOfRange {
                character,
                line: token.line(),
            });
        }
        self.writer
            .write_push(Segment::Constant, payload.chars().count());
        self.writer.write_call(STRING_NEW, 1);
        for c in payload.chars() {
            self.writer.write_push(Segment::Constant, c as usize);
            self.writer.write_call(STRING_APPEND_CHAR, 2);
        }
        Ok(())
    }

    // `name` has been consumed; the current token is '(' or '.'.
    fn compile_subroutine_call(&mut self, name: &Token<'a>) -> CompileResult<()> {
        let outer = self.enter("subroutineCall");
        let (function, mut n_args) = if self.optional(Want::Symbol('.'))?.is_some() {
            let target = self.resolve_call_target(name)?;
            let subroutine = self.expect(Want::Identifier)?;
            match target {
                CallTarget::ResolvedAsVariable {
                    typ,
                    segment,
                    index,
                } => {
                    self.writer.write_push(segment, index);
                    (format!("{}.{}", typ, subroutine.raw()), 1)
                }
                CallTarget::ResolvedAsClass { name } => {
                    (format!("{}.{}", name, subroutine.raw()), 0)
                }
            }
        } else {
            // Unqualified calls are methods of this class on the current object.
            self.writer.write_push(Segment::Pointer, THIS_POINTER);
            (format!("{}.{}", self.class_name, name.raw()), 1)
        };

        self.expect(Want::Symbol('('))?;
        n_args += self.compile_expression_list()?;
        self.expect(Want::Symbol(')'))?;
        self.writer.write_call(function, n_args);
        self.leave(outer);
        Ok(())
    }

    // Returns the number of expressions compiled.
    fn compile_expression_list(&mut self) -> CompileResult<usize> {
        let outer = self.enter("expressionList");
        let mut count = 0;
        if !self.current_is_symbol(')') {
            loop {
                self.compile_expression()?;
                count += 1;
                if self.optional(Want::Symbol(','))?.is_none() {
                    break;
                }
            }
        }
        self.leave(outer);
        Ok(count)
    }

    fn resolve_call_target(&self, name: &Token<'a>) -> CompileResult<CallTarget> {
        if let Some(var) = self.symbols.lookup(name.raw()) {
            Ok(CallTarget::ResolvedAsVariable {
                typ: var.typ().to_owned(),
                segment: var.kind().into(),
                index: var.index(),
            })
        } else if is_plausible_class_name(name.raw()) {
            Ok(CallTarget::ResolvedAsClass {
                name: name.raw().to_owned(),
            })
        } else {
            Err(CompileError::Unresolved {
                name: name.raw().to_owned(),
                line: name.line(),
            })
        }
    }

    fn resolve_variable(&self, name: &Token<'a>) -> CompileResult<(Segment, usize)> {
        self.symbols
            .lookup(name.raw())
            .map(|var| (var.kind().into(), var.index()))
            .ok_or_else(|| CompileError::Unresolved {
                name: name.raw().to_owned(),
                line: name.line(),
            })
    }

    fn define(&mut self, name: &Token<'a>, typ: &str, kind: Kind) -> CompileResult<usize> {
        self.bind(name.raw(), typ, kind, name.line())
    }

    fn bind(&mut self, name: &str, typ: &str, kind: Kind, line: usize) -> CompileResult<usize> {
        if kind == Kind::Local && self.header_emitted {
            return Err(InternalError::LocalAfterFunctionHeader(name.to_owned()).into());
        }
        self.symbols
            .define(name, typ, kind)
            .map_err(|SymbolError::Redefined(name)| CompileError::Redefinition { name, line })
    }

    fn new_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    fn class_var_kind(&self) -> Option<Kind> {
        match self.current_keyword()? {
            Keyword::Static => Some(Kind::Static),
            Keyword::Field => Some(Kind::Field),
            _ => None,
        }
    }

    fn subroutine_kind(&self) -> Option<SubroutineKind> {
        match self.current_keyword()? {
            Keyword::Constructor => Some(SubroutineKind::Constructor),
            Keyword::Function => Some(SubroutineKind::Function),
            Keyword::Method => Some(SubroutineKind::Method),
            _ => None,
        }
    }

    // Token helpers

    fn current(&self) -> Option<&Token<'a>> {
        if self.exhausted {
            None
        } else {
            self.scanner.token()
        }
    }

    fn current_keyword(&self) -> Option<Keyword> {
        self.current().and_then(Token::keyword)
    }

    fn current_symbol(&self) -> Option<char> {
        self.current().and_then(Token::symbol)
    }

    fn current_is_symbol(&self, c: char) -> bool {
        self.current_symbol() == Some(c)
    }

    // Moves the scanner one token on, or marks the input as used up.
    fn step(&mut self) -> CompileResult<()> {
        if self.scanner.has_more_tokens()? {
            self.scanner.advance()
        } else {
            self.exhausted = true;
            Ok(())
        }
    }

    // Consumes and returns the current token.
    fn bump(&mut self) -> CompileResult<Token<'a>> {
        let token = self
            .current()
            .cloned()
            .ok_or_else(|| self.unexpected("a token"))?;
        self.step()?;
        Ok(token)
    }

    fn check(&mut self, want: Want) -> CompileResult<Expect<'a>> {
        let matched = match self.current() {
            None => return Ok(Expect::EndOfInput),
            Some(token) => want.matches(token),
        };
        if matched {
            Ok(Expect::Matched(self.bump()?))
        } else {
            Ok(Expect::Absent)
        }
    }

    // The current token must be `want`.
    fn expect(&mut self, want: Want) -> CompileResult<Token<'a>> {
        match self.check(want)? {
            Expect::Matched(token) => Ok(token),
            Expect::Absent | Expect::EndOfInput => Err(self.unexpected(want)),
        }
    }

    // The current token may be `want`. Running out of input is still an error.
    fn optional(&mut self, want: Want) -> CompileResult<Option<Token<'a>>> {
        match self.check(want)? {
            Expect::Matched(token) => Ok(Some(token)),
            Expect::Absent => Ok(None),
            Expect::EndOfInput => Err(self.unexpected(want)),
        }
    }

    #[cold]
    fn unexpected(&self, expected: impl Display) -> CompileError {
        let expected = format!("{} in {}", expected, self.production);
        match self.current() {
            Some(token) => CompileError::UnexpectedToken {
                expected,
                found: token.raw().to_owned(),
                line: token.line(),
            },
            None => CompileError::UnexpectedEof { expected },
        }
    }

    // Runs `f` one nesting level deeper, failing once MAX_NESTING is reached.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> CompileResult<T>) -> CompileResult<T> {
        if self.depth == MAX_NESTING {
            let line = self.current().map_or(self.scanner.line(), Token::line);
            return Err(CompileError::NestingTooDeep {
                limit: MAX_NESTING,
                line,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn enter(&mut self, production: &'static str) -> &'static str {
        std::mem::replace(&mut self.production, production)
    }

    fn leave(&mut self, outer: &'static str) {
        self.production = outer;
    }
}
