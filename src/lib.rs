pub mod alu;
pub mod fault;
pub mod memory;
pub mod processor;
pub mod registers;
