pub mod analysis;
pub mod call_resolver;
pub mod callgraph;
pub mod classifier;
pub mod language;
pub mod module;
pub mod node_key;
pub mod source;
pub mod syntax;
