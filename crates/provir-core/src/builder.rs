/*! Fluent API for constructing functions programmatically.
 *
 * Hand-wiring IR structures is tedious and error-prone. `FunctionBuilder`
 * allocates result temps, tracks the current block, and checks that every
 * block ends in a terminator before handing the finished function back.
 */

use crate::block::{BlockId, Terminator};
use crate::function::{Function, FunctionSignature, Parameter};
use crate::instructions::{Callee, Instruction};
use crate::types::Type;
use crate::values::{Constant, ParamId, TempId, Value};
use crate::{ProvError, Result};

pub struct FunctionBuilder {
    function: Function,
    current_block: BlockId,
    next_temp: u32,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let signature = FunctionSignature {
            name: name.into(),
            params: Vec::new(),
            return_type: Type::Void,
        };
        let function = Function::new(signature);
        let current_block = function.body.entry_block();

        Self {
            function,
            current_block,
            next_temp: 0,
        }
    }

    pub fn param(&mut self, name: &str, ty: Type) -> Value {
        let id = ParamId(self.function.signature.params.len() as u32);
        self.function.signature.params.push(Parameter::new(name, ty));
        Value::Param(id)
    }

    pub fn returns(&mut self, ty: Type) -> &mut Self {
        self.function.signature.return_type = ty;
        self
    }

    pub fn create_block(&mut self) -> BlockId {
        self.function.body.create_block()
    }

    pub fn switch_to_block(&mut self, block: BlockId) -> Result<()> {
        if self.function.body.get_block(block).is_none() {
            return Err(ProvError::Builder(format!(
                "{} does not exist in function {}",
                block,
                self.function.name()
            )));
        }
        self.current_block = block;
        Ok(())
    }

    pub fn current_block(&self) -> BlockId {
        self.current_block
    }

    fn new_temp(&mut self) -> Value {
        let id = TempId(self.next_temp);
        self.next_temp += 1;
        Value::Temp(id)
    }

    fn push(&mut self, inst: Instruction) {
        self.function
            .body
            .get_block_mut(self.current_block)
            .expect("current block exists")
            .add_instruction(inst);
    }

    fn terminate(&mut self, term: Terminator) {
        self.function
            .body
            .get_block_mut(self.current_block)
            .expect("current block exists")
            .set_terminator(term);
    }

    pub fn add(&mut self, left: Value, right: Value, ty: Type) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Add {
            result: result.clone(),
            left,
            right,
            ty,
        });
        result
    }

    pub fn sub(&mut self, left: Value, right: Value, ty: Type) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Sub {
            result: result.clone(),
            left,
            right,
            ty,
        });
        result
    }

    pub fn mul(&mut self, left: Value, right: Value, ty: Type) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Mul {
            result: result.clone(),
            left,
            right,
            ty,
        });
        result
    }

    pub fn div(&mut self, left: Value, right: Value, ty: Type) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Div {
            result: result.clone(),
            left,
            right,
            ty,
        });
        result
    }

    pub fn and(&mut self, left: Value, right: Value) -> Value {
        let result = self.new_temp();
        self.push(Instruction::And {
            result: result.clone(),
            left,
            right,
        });
        result
    }

    pub fn or(&mut self, left: Value, right: Value) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Or {
            result: result.clone(),
            left,
            right,
        });
        result
    }

    pub fn xor(&mut self, left: Value, right: Value) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Xor {
            result: result.clone(),
            left,
            right,
        });
        result
    }

    pub fn not(&mut self, operand: Value) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Not {
            result: result.clone(),
            operand,
        });
        result
    }

    pub fn eq(&mut self, left: Value, right: Value) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Eq {
            result: result.clone(),
            left,
            right,
        });
        result
    }

    pub fn lt(&mut self, left: Value, right: Value) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Lt {
            result: result.clone(),
            left,
            right,
        });
        result
    }

    pub fn select(&mut self, condition: Value, then_val: Value, else_val: Value, ty: Type) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Select {
            result: result.clone(),
            condition,
            then_val,
            else_val,
            ty,
        });
        result
    }

    pub fn gep(&mut self, base: Value, indices: Vec<Value>, ty: Type) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Gep {
            result: result.clone(),
            base,
            indices,
            ty,
        });
        result
    }

    pub fn alloca(&mut self, ty: Type) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Alloca {
            result: result.clone(),
            ty,
        });
        result
    }

    pub fn load(&mut self, address: Value, ty: Type) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Load {
            result: result.clone(),
            address,
            ty,
        });
        result
    }

    pub fn store(&mut self, value: Value, address: Value) {
        self.push(Instruction::Store { address, value });
    }

    pub fn cast(&mut self, value: Value, to: Type) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Cast {
            result: result.clone(),
            value,
            to,
        });
        result
    }

    pub fn phi(&mut self, incoming: Vec<(BlockId, Value)>, ty: Type) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Phi {
            result: result.clone(),
            incoming,
            ty,
        });
        result
    }

    /// Phi nodes referencing their own result (loop-carried values) cannot
    /// use [`phi`](Self::phi), since the result does not exist yet. This
    /// reserves the result first, then lets the caller name it in the
    /// incoming list.
    pub fn phi_with(
        &mut self,
        build_incoming: impl FnOnce(&Value) -> Vec<(BlockId, Value)>,
        ty: Type,
    ) -> Value {
        let result = self.new_temp();
        let incoming = build_incoming(&result);
        self.push(Instruction::Phi {
            result: result.clone(),
            incoming,
            ty,
        });
        result
    }

    pub fn call(&mut self, callee: &str, args: Vec<Value>, ty: Type) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Call {
            result: result.clone(),
            callee: Callee::Direct(callee.to_string()),
            args,
            ty,
        });
        result
    }

    pub fn call_indirect(&mut self, target: Value, args: Vec<Value>, ty: Type) -> Value {
        let result = self.new_temp();
        self.push(Instruction::Call {
            result: result.clone(),
            callee: Callee::Indirect(target),
            args,
            ty,
        });
        result
    }

    pub fn jump(&mut self, target: BlockId) {
        self.terminate(Terminator::Jump(target));
    }

    pub fn branch(&mut self, condition: Value, then_block: BlockId, else_block: BlockId) {
        self.terminate(Terminator::Branch {
            condition,
            then_block,
            else_block,
        });
    }

    pub fn switch(&mut self, value: Value, default: BlockId, cases: Vec<(Constant, BlockId)>) {
        self.terminate(Terminator::Switch {
            value,
            default,
            cases,
        });
    }

    pub fn ret(&mut self, value: Option<Value>) {
        self.terminate(Terminator::Return(value));
    }

    pub fn unreachable(&mut self) {
        self.terminate(Terminator::Unreachable);
    }

    pub fn build(self) -> Result<Function> {
        for (id, block) in &self.function.body.blocks {
            if !block.is_terminated() {
                return Err(ProvError::Builder(format!(
                    "{} in function {} has no terminator",
                    id,
                    self.function.name()
                )));
            }
        }
        Ok(self.function)
    }
}
