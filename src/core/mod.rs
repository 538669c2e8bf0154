pub mod config;
pub mod dtype;
pub mod store;
pub mod tensor;
pub mod value;

// Re-export commonly used types
pub use config::{EngineConfig, ShapePolicy};
pub use dtype::DataType;
pub use tensor::{Shape, Storage, Tensor, TensorId, TensorMeta};
pub use value::ExtraArg;
