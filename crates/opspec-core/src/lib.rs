pub mod config;
pub mod decl;
pub mod docs;
pub mod error;
pub mod openapi;
pub mod transform;

pub use config::Options;
pub use decl::ApiDeclaration;
pub use openapi::spec::Document;
pub use transform::Generator;
