//! Main execution loop and opcode dispatch for the EVM.

use std::io::Write;

use crate::error::RuntimeError;
use crate::machine::VM;
use evm_common::Opcode;

/// Outcome of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// More instructions remain.
    Continue,
    /// `halt` was executed.
    Halted,
}

impl<W: Write> VM<W> {
    /// Execute the program until `halt` or a fault.
    ///
    /// Output is flushed before returning, whether or not the run faulted.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let result = self.run_to_halt();
        let flushed = self.out.flush().map_err(|e| self.output_failed(e));
        result?;
        flushed
    }

    fn run_to_halt(&mut self) -> Result<(), RuntimeError> {
        while self.step()? == Step::Continue {}
        Ok(())
    }

    /// Fetch, decode and execute a single instruction.
    ///
    /// Once the VM has halted, further calls do nothing and return
    /// [`Step::Halted`].
    pub fn step(&mut self) -> Result<Step, RuntimeError> {
        if self.halted {
            return Ok(Step::Halted);
        }

        self.at = self.ip;
        let word = self.fetch()?;
        let opcode = Opcode::try_from(word)
            .map_err(|_| RuntimeError::InvalidOpcode { at: self.at, word })?;

        if self.config.trace {
            eprintln!(
                "ip={} op={} stack={:?}",
                self.at,
                opcode,
                self.stack.as_slice()
            );
        }

        match opcode {
            // Stack
            Opcode::Push => {
                let value = self.fetch()?;
                self.push(value)?;
            }
            Opcode::Dup => {
                let offset = self.fetch()?;
                let value = self.peek(offset)?;
                self.push(value)?;
            }
            Opcode::Swap => {
                let a = self.pop()?;
                let b = self.pop()?;
                self.push(a)?;
                self.push(b)?;
            }

            // Arithmetic
            Opcode::Add => self.exec_binary(|b, a| b.wrapping_add(a))?,
            Opcode::Sub => self.exec_binary(|b, a| b.wrapping_sub(a))?,
            Opcode::Multu => self.exec_binary(|b, a| b.wrapping_mul(a))?,

            // Comparison
            Opcode::Gt => self.exec_comparison(|a, b| a > b)?,
            Opcode::Lt => self.exec_comparison(|a, b| a < b)?,
            Opcode::Eq => self.exec_comparison(|a, b| a == b)?,
            Opcode::Ge => self.exec_comparison(|a, b| a >= b)?,
            Opcode::Le => self.exec_comparison(|a, b| a <= b)?,

            // Memory
            Opcode::Read8 => self.exec_read8()?,
            Opcode::Read64 => self.exec_read64()?,
            Opcode::Write8 => self.exec_write8()?,
            Opcode::Write64 => self.exec_write64()?,

            // Output
            Opcode::Printu => self.exec_printu()?,
            Opcode::Puts => self.exec_puts()?,

            // Control flow
            Opcode::Call => {
                let addr = self.pop()?;
                self.push_return(self.ip)?;
                self.ip = addr;
            }
            Opcode::Ret => {
                self.ip = self.pop_return()?;
            }
            Opcode::Jp => {
                self.ip = self.pop()?;
            }
            Opcode::Jpc => {
                let cond = self.pop()?;
                let addr = self.pop()?;
                if cond != 0 {
                    self.ip = addr;
                }
            }
            Opcode::Jr => {
                let offset = self.pop()?;
                self.ip = self.ip.wrapping_add(offset);
            }
            Opcode::Jrc => {
                let cond = self.pop()?;
                let offset = self.pop()?;
                if cond != 0 {
                    self.ip = self.ip.wrapping_add(offset);
                }
            }
            Opcode::Halt => {
                self.halted = true;
                return Ok(Step::Halted);
            }
        }

        Ok(Step::Continue)
    }

    /// Pop a, pop b, push `op(b, a)`.
    fn exec_binary(&mut self, op: fn(u64, u64) -> u64) -> Result<(), RuntimeError> {
        let a = self.pop()?;
        let b = self.pop()?;
        self.push(op(b, a))
    }

    /// Pop a, pop b, push 1 if `cmp(a, b)` holds, else 0.
    fn exec_comparison(&mut self, cmp: fn(u64, u64) -> bool) -> Result<(), RuntimeError> {
        let a = self.pop()?;
        let b = self.pop()?;
        self.push(u64::from(cmp(a, b)))
    }

    fn exec_read8(&mut self) -> Result<(), RuntimeError> {
        let addr = self.pop()?;
        let byte = self
            .memory
            .read8(addr)
            .ok_or_else(|| self.out_of_bounds(addr, 1))?;
        self.push(u64::from(byte))
    }

    fn exec_read64(&mut self) -> Result<(), RuntimeError> {
        let addr = self.pop()?;
        let word = self
            .memory
            .read64(addr)
            .ok_or_else(|| self.out_of_bounds(addr, 8))?;
        self.push(word)
    }

    fn exec_write8(&mut self) -> Result<(), RuntimeError> {
        let addr = self.pop()?;
        let value = self.pop()?;
        if self.memory.write8(addr, value as u8).is_none() {
            return Err(self.out_of_bounds(addr, 1));
        }
        Ok(())
    }

    fn exec_write64(&mut self) -> Result<(), RuntimeError> {
        let addr = self.pop()?;
        let value = self.pop()?;
        if self.memory.write64(addr, value).is_none() {
            return Err(self.out_of_bounds(addr, 8));
        }
        Ok(())
    }

    fn exec_printu(&mut self) -> Result<(), RuntimeError> {
        let value = self.pop()?;
        write!(self.out, "{value}").map_err(|e| self.output_failed(e))
    }

    fn exec_puts(&mut self) -> Result<(), RuntimeError> {
        let ptr = self.pop()?;
        let size = self.pop()?;
        let bytes = self
            .memory
            .slice(ptr, size)
            .ok_or_else(|| self.out_of_bounds(ptr, size))?;
        self.out
            .write_all(bytes)
            .and_then(|()| self.out.flush())
            .map_err(|e| self.output_failed(e))
    }
}
