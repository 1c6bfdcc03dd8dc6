use std::collections::HashMap;

use super::data::{
    Argument, CallArg, Command, ObjectArg, ProgrammableMoveCall, ProgrammableTransaction, TypeTag,
};
use crate::domain::{ObjectId, ObjectRef, SuiAddress};
use crate::error::{ClaimerError, Result};

/// Incrementally builds a [`ProgrammableTransaction`].
///
/// Object inputs are deduplicated by id so the same coin can be referenced
/// from several commands. Inputs and commands are addressed by `u16`, so
/// anything past `u16::MAX` is rejected rather than wrapped.
#[derive(Debug, Default)]
pub struct ProgrammableTransactionBuilder {
    inputs: Vec<CallArg>,
    object_inputs: HashMap<ObjectId, u16>,
    commands: Vec<Command>,
}

fn next_index(len: usize, what: &str) -> Result<u16> {
    u16::try_from(len).map_err(|_| {
        ClaimerError::Validation(format!("transaction exceeds {} {}", u16::MAX, what))
    })
}

impl ProgrammableTransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The gas coin of the transaction being built.
    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    fn push_input(&mut self, arg: CallArg) -> Result<u16> {
        let index = next_index(self.inputs.len(), "inputs")?;
        self.inputs.push(arg);
        Ok(index)
    }

    pub fn pure_u64(&mut self, value: u64) -> Result<Argument> {
        self.push_input(CallArg::Pure(value.to_le_bytes().to_vec()))
            .map(Argument::Input)
    }

    pub fn pure_address(&mut self, address: SuiAddress) -> Result<Argument> {
        self.push_input(CallArg::Pure(address.as_bytes().to_vec()))
            .map(Argument::Input)
    }

    fn object_input(&mut self, id: ObjectId, arg: ObjectArg) -> Result<Argument> {
        if let Some(index) = self.object_inputs.get(&id) {
            return Ok(Argument::Input(*index));
        }
        let index = self.push_input(CallArg::Object(arg))?;
        self.object_inputs.insert(id, index);
        Ok(Argument::Input(index))
    }

    /// Owned (or immutable) object at a fixed version.
    pub fn object(&mut self, object_ref: ObjectRef) -> Result<Argument> {
        self.object_input(object_ref.object_id, ObjectArg::ImmOrOwnedObject(object_ref))
    }

    pub fn shared_object(
        &mut self,
        id: ObjectId,
        initial_shared_version: u64,
        mutable: bool,
    ) -> Result<Argument> {
        self.object_input(
            id,
            ObjectArg::SharedObject {
                id,
                initial_shared_version,
                mutable,
            },
        )
    }

    fn command(&mut self, command: Command) -> Result<u16> {
        let index = next_index(self.commands.len(), "commands")?;
        self.commands.push(command);
        Ok(index)
    }

    pub fn move_call(
        &mut self,
        package: ObjectId,
        module: &str,
        function: &str,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> Result<Argument> {
        let index = self.command(Command::MoveCall(Box::new(ProgrammableMoveCall {
            package,
            module: module.to_string(),
            function: function.to_string(),
            type_arguments,
            arguments,
        })))?;
        Ok(Argument::Result(index))
    }

    /// Split one amount off `coin`; returns the new coin.
    pub fn split_coins(&mut self, coin: Argument, amounts: Vec<Argument>) -> Result<Argument> {
        let index = self.command(Command::SplitCoins(coin, amounts))?;
        Ok(Argument::NestedResult(index, 0))
    }

    pub fn merge_coins(&mut self, primary: Argument, coins: Vec<Argument>) -> Result<()> {
        self.command(Command::MergeCoins(primary, coins)).map(|_| ())
    }

    pub fn transfer_objects(&mut self, objects: Vec<Argument>, recipient: Argument) -> Result<()> {
        self.command(Command::TransferObjects(objects, recipient))
            .map(|_| ())
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn inputs(&self) -> &[CallArg] {
        &self.inputs
    }

    pub fn finish(self) -> ProgrammableTransaction {
        ProgrammableTransaction {
            inputs: self.inputs,
            commands: self.commands,
        }
    }
}
