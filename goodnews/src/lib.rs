// Library interface for goodnews modules
// This allows tests and other binaries to import modules

pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod publish;
pub mod sentiment;
