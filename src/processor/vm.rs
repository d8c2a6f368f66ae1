//! Stack VM instruction set and the sink the compiler emits into.
//!
//! The compiler never formats text itself. It hands each finished
//! `Instruction` to an `Emit` implementation: a plain `Vec` while a file is
//! being compiled, or `VmWriter` when the result is written out.

use std::fmt;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn as_str(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }
}

/// Arithmetic and logical commands, all operating on the stack top.
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

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Add => "add",
            Command::Sub => "sub",
            Command::Neg => "neg",
            Command::Eq => "eq",
            Command::Gt => "gt",
            Command::Lt => "lt",
            Command::And => "and",
            Command::Or => "or",
            Command::Not => "not",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Push(Segment, u16),
    Pop(Segment, u16),
    Arithmetic(Command),
    Label(String),
    Goto(String),
    IfGoto(String),
    Call { name: String, args: u16 },
    Function { name: String, locals: u16 },
    Return,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(segment, index) => write!(f, "push {} {index}", segment.as_str()),
            Instruction::Pop(segment, index) => write!(f, "pop {} {index}", segment.as_str()),
            Instruction::Arithmetic(command) => write!(f, "{}", command.as_str()),
            Instruction::Label(label) => write!(f, "label {label}"),
            Instruction::Goto(label) => write!(f, "goto {label}"),
            Instruction::IfGoto(label) => write!(f, "if-goto {label}"),
            Instruction::Call { name, args } => write!(f, "call {name} {args}"),
            Instruction::Function { name, locals } => write!(f, "function {name} {locals}"),
            Instruction::Return => write!(f, "return"),
        }
    }
}

/// Append-only destination for generated instructions.
pub trait Emit {
    fn emit(&mut self, instruction: Instruction) -> io::Result<()>;
}

impl Emit for Vec<Instruction> {
    fn emit(&mut self, instruction: Instruction) -> io::Result<()> {
        self.push(instruction);
        Ok(())
    }
}

/// Writes instructions as VM text, one per line. `function` and `label`
/// lines start at column 0, everything else is indented four spaces.
pub struct VmWriter<W: Write> {
    out: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_all<'i>(
        &mut self,
        instructions: impl IntoIterator<Item = &'i Instruction>,
    ) -> io::Result<()> {
        for instruction in instructions {
            self.emit(instruction.clone())?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Emit for VmWriter<W> {
    fn emit(&mut self, instruction: Instruction) -> io::Result<()> {
        match instruction {
            Instruction::Function { .. } | Instruction::Label(_) => {
                writeln!(self.out, "{instruction}")
            }
            _ => writeln!(self.out, "    {instruction}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_text() {
        let test_cases = vec![
            (Instruction::Push(Segment::Constant, 7), "push constant 7"),
            (Instruction::Push(Segment::Argument, 0), "push argument 0"),
            (Instruction::Pop(Segment::Pointer, 1), "pop pointer 1"),
            (Instruction::Pop(Segment::This, 2), "pop this 2"),
            (Instruction::Arithmetic(Command::Neg), "neg"),
            (Instruction::Arithmetic(Command::Lt), "lt"),
            (Instruction::Label("Main_0".into()), "label Main_0"),
            (Instruction::Goto("Main_1".into()), "goto Main_1"),
            (Instruction::IfGoto("Main_2".into()), "if-goto Main_2"),
            (
                Instruction::Call {
                    name: "Math.multiply".into(),
                    args: 2,
                },
                "call Math.multiply 2",
            ),
            (
                Instruction::Function {
                    name: "Main.main".into(),
                    locals: 3,
                },
                "function Main.main 3",
            ),
            (Instruction::Return, "return"),
        ];

        for (instruction, expected) in test_cases {
            assert_eq!(instruction.to_string(), expected);
        }
    }

    #[test]
    fn test_vm_writer_layout() {
        let program = vec![
            Instruction::Function {
                name: "Main.main".into(),
                locals: 0,
            },
            Instruction::Label("Main_0".into()),
            Instruction::Push(Segment::Constant, 0),
            Instruction::Return,
        ];

        let mut writer = VmWriter::new(Vec::<u8>::new());
        writer.write_all(&program).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();

        assert_eq!(
            text,
            "function Main.main 0\nlabel Main_0\n    push constant 0\n    return\n"
        );
    }
}
