// Infrastructure: file loading, configuration, name binding, symbol
// resolution and output.

pub mod binder;
pub mod concurrency;
pub mod exporters;
pub mod logging;
pub mod module_resolution;
pub mod project_loader;
pub mod resolver;
pub mod tsconfig;

pub use exporters::{DotExporter, JsonExporter, OutputFormat, TextExporter};
pub use project_loader::{Project, ProjectLoader};
pub use resolver::TypeScriptResolver;
pub use tsconfig::ProjectConfig;
