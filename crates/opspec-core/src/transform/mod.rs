pub mod assemble;
pub mod content;
pub mod extract;
pub mod registry;
pub mod responses;
pub mod route;
pub mod schema_gen;
pub mod tags;
pub mod verb;

pub use assemble::Generator;
pub use extract::{EndpointOperation, OperationParameter, endpoint_events, endpoint_operations};
pub use registry::SchemaRegistry;
pub use schema_gen::{CatalogSchemaGenerator, SchemaGenerator};
pub use verb::VerbConventions;
