//! Token-to-table mapping.
//!
//! Each opaque token presented in the `Authorization` header selects one
//! [`TableDescriptor`]: the destination table, its columns, and the payload keys
//! that feed those columns. The [`MappingRegistry`] holding them is loaded once
//! from the mapping file at startup.

pub mod descriptor;
pub mod registry;
pub mod resolver;

pub use descriptor::{DescriptorError, TableDescriptor};
pub use registry::{MappingError, MappingRegistry, MappingRegistryBuilder};
pub use resolver::MappingResolver;
