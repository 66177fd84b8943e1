//! A reference stack machine for checking what compiled programs do. Only the handful of OS
//! routines the compiler itself calls are built in.
#![allow(dead_code)]

use std::collections::HashMap;

use jackc::{
    compile,
    vm::{Command, Instruction, Label, Segment},
    CompiledClass, CompilerOptions,
};

const SP: usize = 0;
const LCL: usize = 1;
const ARG: usize = 2;
const THIS: usize = 3;
const THAT: usize = 4;
const TEMP: usize = 5;
const STATIC_BASE: usize = 16;
const STATICS_PER_CLASS: usize = 16;
const STACK_BASE: usize = 256;
const HEAP_BASE: usize = 2048;
const RAM_SIZE: usize = 32768;
const STEP_LIMIT: usize = 1_000_000;

pub fn compile_all(sources: &[&str]) -> Vec<CompiledClass> {
    sources
        .iter()
        .map(|source| compile(source, &CompilerOptions::default()).expect("compiling succeeds"))
        .collect()
}

#[derive(Debug)]
pub struct Machine {
    ram: Vec<i16>,
    code: Vec<Instruction>,
    // class owning each instruction, for label and static lookup
    owners: Vec<String>,
    functions: HashMap<String, usize>,
    labels: HashMap<(String, Label), usize>,
    statics: HashMap<String, usize>,
    heap_next: usize,
    pc: usize,
}

impl Machine {
    pub fn load(classes: &[CompiledClass]) -> Self {
        let mut machine = Machine {
            ram: vec![0; RAM_SIZE],
            code: Vec::new(),
            owners: Vec::new(),
            functions: HashMap::new(),
            labels: HashMap::new(),
            statics: HashMap::new(),
            heap_next: HEAP_BASE,
            pc: 0,
        };
        for (n, class) in classes.iter().enumerate() {
            machine
                .statics
                .insert(class.name().to_owned(), STATIC_BASE + n * STATICS_PER_CLASS);
            for instruction in class.instructions() {
                let at = machine.code.len();
                match instruction {
                    Instruction::Function(name, _) => {
                        machine.functions.insert(name.clone(), at);
                    }
                    Instruction::Label(label) => {
                        machine.labels.insert((class.name().to_owned(), *label), at);
                    }
                    _ => {}
                }
                machine.code.push(instruction.clone());
                machine.owners.push(class.name().to_owned());
            }
        }
        machine
    }

    /// Calls `entry` with no arguments and returns what it returns.
    pub fn run(&mut self, entry: &str) -> i16 {
        self.ram[SP] = STACK_BASE as i16;
        self.ram[LCL] = STACK_BASE as i16;
        self.ram[ARG] = STACK_BASE as i16;
        let halt = self.code.len();
        self.call(entry, 0, halt);

        let mut steps = 0;
        while self.pc != halt {
            steps += 1;
            assert!(steps < STEP_LIMIT, "program did not halt");
            self.step();
        }
        self.ram[STACK_BASE]
    }

    pub fn ram(&self, address: usize) -> i16 {
        self.ram[address]
    }

    pub fn static_value(&self, class: &str, index: usize) -> i16 {
        self.ram[self.statics[class] + index]
    }

    /// Reads a string object built by String.new / String.appendChar.
    pub fn string_at(&self, pointer: i16) -> String {
        let base = pointer as usize;
        let len = self.ram[base + 1] as usize;
        (0..len)
            .map(|i| char::from_u32(self.ram[base + 2 + i] as u32).unwrap())
            .collect()
    }

    fn step(&mut self) {
        let instruction = self.code[self.pc].clone();
        self.pc += 1;
        match instruction {
            Instruction::Push(segment, index) => {
                let value = self.read(segment, index);
                self.push(value);
            }
            Instruction::Pop(segment, index) => {
                let value = self.pop();
                self.write(segment, index, value);
            }
            Instruction::Arithmetic(command) => self.arithmetic(command),
            Instruction::Label(_) => {}
            Instruction::Goto(label) => self.pc = self.label(label),
            Instruction::IfGoto(label) => {
                if self.pop() != 0 {
                    self.pc = self.label(label);
                }
            }
            Instruction::Call(name, n_args) => {
                let return_to = self.pc;
                self.call(&name, n_args, return_to);
            }
            Instruction::Function(_, n_locals) => {
                for _ in 0..n_locals {
                    self.push(0);
                }
            }
            Instruction::Return => self.ret(),
        }
    }

    fn call(&mut self, name: &str, n_args: usize, return_to: usize) {
        if self.builtin(name, n_args) {
            self.pc = return_to;
            return;
        }
        let target = *self
            .functions
            .get(name)
            .unwrap_or_else(|| panic!("no function {name}"));
        self.push(return_to as i16);
        for register in [LCL, ARG, THIS, THAT] {
            self.push(self.ram[register]);
        }
        let sp = self.ram[SP] as usize;
        self.ram[ARG] = (sp - n_args - 5) as i16;
        self.ram[LCL] = sp as i16;
        self.pc = target;
    }

    fn ret(&mut self) {
        let frame = self.ram[LCL] as usize;
        let return_to = self.ram[frame - 5] as usize;
        let value = self.pop();
        let arg = self.ram[ARG] as usize;
        self.ram[arg] = value;
        self.ram[SP] = (arg + 1) as i16;
        self.ram[THAT] = self.ram[frame - 1];
        self.ram[THIS] = self.ram[frame - 2];
        self.ram[ARG] = self.ram[frame - 3];
        self.ram[LCL] = self.ram[frame - 4];
        self.pc = return_to;
    }

    fn builtin(&mut self, name: &str, n_args: usize) -> bool {
        let result = match (name, n_args) {
            ("Memory.alloc", 1) | ("Array.new", 1) => {
                let size = self.pop() as usize;
                self.alloc(size)
            }
            ("Math.multiply", 2) => {
                let b = self.pop();
                let a = self.pop();
                a.wrapping_mul(b)
            }
            ("Math.divide", 2) => {
                let b = self.pop();
                let a = self.pop();
                a / b
            }
            ("String.new", 1) => {
                let capacity = self.pop();
                let pointer = self.alloc(capacity as usize + 2);
                self.ram[pointer as usize] = capacity;
                pointer
            }
            ("String.appendChar", 2) => {
                let c = self.pop();
                let pointer = self.pop();
                let base = pointer as usize;
                let len = self.ram[base + 1];
                assert!(len < self.ram[base], "string overflow");
                self.ram[base + 2 + len as usize] = c;
                self.ram[base + 1] = len + 1;
                pointer
            }
            _ => return false,
        };
        self.push(result);
        true
    }

    fn alloc(&mut self, size: usize) -> i16 {
        let pointer = self.heap_next;
        self.heap_next += size.max(1);
        pointer as i16
    }

    fn arithmetic(&mut self, command: Command) {
        let value = match command {
            Command::Neg => self.pop().wrapping_neg(),
            Command::Not => !self.pop(),
            binary => {
                let b = self.pop();
                let a = self.pop();
                match binary {
                    Command::Add => a.wrapping_add(b),
                    Command::Sub => a.wrapping_sub(b),
                    Command::And => a & b,
                    Command::Or => a | b,
                    Command::Eq => -((a == b) as i16),
                    Command::Gt => -((a > b) as i16),
                    Command::Lt => -((a < b) as i16),
                    Command::Neg | Command::Not => unreachable!(),
                }
            }
        };
        self.push(value);
    }

    fn label(&self, label: Label) -> usize {
        let owner = self.owners[self.pc - 1].clone();
        self.labels[&(owner, label)]
    }

    fn address(&self, segment: Segment, index: usize) -> usize {
        let base = |register: usize| self.ram[register] as usize;
        match segment {
            Segment::Local => base(LCL) + index,
            Segment::Argument => base(ARG) + index,
            Segment::This => base(THIS) + index,
            Segment::That => base(THAT) + index,
            Segment::Pointer => THIS + index,
            Segment::Temp => TEMP + index,
            Segment::Static => self.statics[&self.owners[self.pc - 1]] + index,
            Segment::Constant => panic!("constant has no address"),
        }
    }

    fn read(&self, segment: Segment, index: usize) -> i16 {
        match segment {
            Segment::Constant => index as i16,
            _ => self.ram[self.address(segment, index)],
        }
    }

    fn write(&mut self, segment: Segment, index: usize, value: i16) {
        let address = self.address(segment, index);
        self.ram[address] = value;
    }

    fn push(&mut self, value: i16) {
        let sp = self.ram[SP] as usize;
        self.ram[sp] = value;
        self.ram[SP] += 1;
    }

    fn pop(&mut self) -> i16 {
        self.ram[SP] -= 1;
        self.ram[self.ram[SP] as usize]
    }
}
