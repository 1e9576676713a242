//! Driving adapters that translate host calls into contract operations.

mod invocation;

pub use invocation::{
    CONTRACT_NAME, HouseFunction, Invocation, InvocationError, InvocationResponse, dispatch,
    execute,
};
