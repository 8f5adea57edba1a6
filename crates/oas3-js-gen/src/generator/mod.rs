pub mod document;
pub(crate) mod function_emitter;
pub(crate) mod grouper;
pub mod metrics;
pub(crate) mod model_emitter;
pub mod orchestrator;
pub(crate) mod type_mapper;
pub mod writer;

#[cfg(test)]
mod tests;
