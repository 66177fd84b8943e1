use std::fmt::{self, Display};

use log::trace;

use crate::error::InternalError;
use crate::symbols::Kind;

/// A named memory region of the target machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Read-only pseudo segment holding the integer `i` at index `i`.
    Constant,
    /// Current function's locals.
    Local,
    /// Current function's arguments.
    Argument,
    /// Class-wide statics.
    Static,
    /// Fields of the object `pointer 0` points at.
    This,
    /// Cells of the array `pointer 1` points at.
    That,
    /// `pointer 0` is the `this` base, `pointer 1` the `that` base.
    Pointer,
    /// Scratch registers.
    Temp,
}

impl From<Kind> for Segment {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Static => Segment::Static,
            Kind::Field => Segment::This,
            Kind::Argument => Segment::Argument,
            Kind::Local => Segment::Local,
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        };
        f.write_str(name)
    }
}

/// Stack arithmetic and logic commands.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Add => "add",
            Command::Sub => "sub",
            Command::Neg => "neg",
            Command::Eq => "eq",
            Command::Gt => "gt",
            Command::Lt => "lt",
            Command::And => "and",
            Command::Or => "or",
            Command::Not => "not",
        };
        f.write_str(name)
    }
}

/// A jump target, unique within one compiled class. Rendered as `L<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(pub usize);

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Whether an operator symbol is used with one operand or two. `-` is both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Prefix operator.
    Unary,
    /// Infix operator.
    Binary,
}

/// A single VM instruction. Displays as one line of VM text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `push segment index`
    Push(Segment, usize),
    /// `pop segment index`
    Pop(Segment, usize),
    /// One of the stack arithmetic commands.
    Arithmetic(Command),
    /// `label L<n>`
    Label(Label),
    /// `goto L<n>`
    Goto(Label),
    /// `if-goto L<n>`, jumps if the popped value is not zero.
    IfGoto(Label),
    /// `call Class.name nArgs`
    Call(String, usize),
    /// `function Class.name nLocals`
    Function(String, usize),
    /// `return`
    Return,
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(segment, index) => write!(f, "push {} {}", segment, index),
            Instruction::Pop(segment, index) => write!(f, "pop {} {}", segment, index),
            Instruction::Arithmetic(command) => write!(f, "{}", command),
            Instruction::Label(label) => write!(f, "label {}", label),
            Instruction::Goto(label) => write!(f, "goto {}", label),
            Instruction::IfGoto(label) => write!(f, "if-goto {}", label),
            Instruction::Call(name, n_args) => write!(f, "call {} {}", name, n_args),
            Instruction::Function(name, n_locals) => write!(f, "function {} {}", name, n_locals),
            Instruction::Return => write!(f, "return"),
        }
    }
}

const MULTIPLY: &str = "Math.multiply";
const DIVIDE: &str = "Math.divide";

/// Appends instructions one call at a time. Purely syntactic: segments and indices are written
/// as given.
#[derive(Debug, Default)]
pub struct VmWriter {
    code: Vec<Instruction>,
}

impl VmWriter {
    /// An empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    fn write_instruction(&mut self, instruction: Instruction) {
        #[cfg(feature = "trace")]
        trace!("{:04} {}", self.code.len(), instruction);
        #[cfg(not(feature = "trace"))]
        trace!("{}", instruction);
        self.code.push(instruction);
    }

    /// `push segment index`
    pub fn write_push(&mut self, segment: impl Into<Segment>, index: usize) {
        self.write_instruction(Instruction::Push(segment.into(), index));
    }

    /// `pop segment index`
    pub fn write_pop(&mut self, segment: impl Into<Segment>, index: usize) {
        self.write_instruction(Instruction::Pop(segment.into(), index));
    }

    /// Translates an operator symbol. Multiplication and division become OS calls.
    pub fn write_arithmetic(&mut self, symbol: char, arity: Arity) -> Result<(), InternalError> {
        let instruction = match (arity, symbol) {
            (Arity::Binary, '+') => Instruction::Arithmetic(Command::Add),
            (Arity::Binary, '-') => Instruction::Arithmetic(Command::Sub),
            (Arity::Binary, '*') => Instruction::Call(MULTIPLY.to_owned(), 2),
            (Arity::Binary, '/') => Instruction::Call(DIVIDE.to_owned(), 2),
            (Arity::Binary, '&') => Instruction::Arithmetic(Command::And),
            (Arity::Binary, '|') => Instruction::Arithmetic(Command::Or),
            (Arity::Binary, '<') => Instruction::Arithmetic(Command::Lt),
            (Arity::Binary, '>') => Instruction::Arithmetic(Command::Gt),
            (Arity::Binary, '=') => Instruction::Arithmetic(Command::Eq),
            (Arity::Unary, '-') => Instruction::Arithmetic(Command::Neg),
            (Arity::Unary, '~') => Instruction::Arithmetic(Command::Not),
            (Arity::Unary, _) => {
                return Err(InternalError::UnknownOperator {
                    symbol,
                    arity: "unary",
                })
            }
            (Arity::Binary, _) => {
                return Err(InternalError::UnknownOperator {
                    symbol,
                    arity: "binary",
                })
            }
        };
        self.write_instruction(instruction);
        Ok(())
    }

    /// Writes a bare command such as `add` or `not`.
    pub fn write_command(&mut self, command: Command) {
        self.write_instruction(Instruction::Arithmetic(command));
    }

    /// `label L<n>`
    pub fn write_label(&mut self, label: Label) {
        self.write_instruction(Instruction::Label(label));
    }

    /// `goto L<n>`
    pub fn write_goto(&mut self, label: Label) {
        self.write_instruction(Instruction::Goto(label));
    }

    /// `if-goto L<n>`
    pub fn write_if(&mut self, label: Label) {
        self.write_instruction(Instruction::IfGoto(label));
    }

    /// `call name nArgs`
    pub fn write_call(&mut self, name: impl Into<String>, n_args: usize) {
        self.write_instruction(Instruction::Call(name.into(), n_args));
    }

    /// `function Class.name nLocals`
    pub fn write_function(&mut self, class_name: &str, name: &str, n_locals: usize) {
        self.write_instruction(Instruction::Function(
            format!("{}.{}", class_name, name),
            n_locals,
        ));
    }

    /// `return`
    pub fn write_return(&mut self) {
        self.write_instruction(Instruction::Return);
    }

    /// Everything written so far.
    pub fn instructions(&self) -> &[Instruction] {
        &self.code
    }

    /// Hands over the written instructions.
    pub fn finish(self) -> Vec<Instruction> {
        self.code
    }
}
