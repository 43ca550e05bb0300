// While many parts of the compiler are in heavy development,
// there are lots of placeholders and code that will possibly be used, but isn't atm.
#![allow(dead_code, unused_macros, unused_variables)]

pub mod position;
pub mod compiler_messages;
pub mod types;
pub mod environment;
pub mod tokenizer;
pub mod ast;
pub mod forward_declare;
pub mod host_bridge;
pub mod containers;
pub mod analysis;
pub mod projects;
