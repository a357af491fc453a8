//! Log processor implementations

pub mod console;
pub mod file;
pub mod file_factory;
pub mod memory;
pub mod rotating_file;

pub use console::ConsoleProcessor;
pub use file::FileProcessor;
pub use file_factory::{LogFile, LogFileFactory};
pub use memory::MemoryProcessor;
pub use rotating_file::{RotatingFileSink, RotationStrategy};
