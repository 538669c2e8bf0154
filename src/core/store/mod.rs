mod tensor_store;

pub use tensor_store::{InMemoryTensorStore, StoreError};
