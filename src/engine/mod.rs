pub mod error;
pub mod executor;
pub mod kernels;
pub mod workspace;

pub use error::EngineError;
pub use executor::Executor;
pub use kernels::{CpuKernels, KernelDispatcher, KernelError};
pub use workspace::Workspace;
