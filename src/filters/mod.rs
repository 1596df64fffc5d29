// Copyright @yucwang 2026

pub mod box_filter;
pub mod gaussian;
pub mod tabulated;
pub mod tent;

use crate::core::error::RenderResult;
use crate::core::filter::ReconstructionFilter;
use crate::core::registry::ClassRegistry;

pub type FilterRegistry = ClassRegistry<dyn ReconstructionFilter>;

/// Registry of the reconstruction filters that can be named in a
/// configuration file, already resolved.
pub fn filter_registry() -> RenderResult<FilterRegistry> {
    let mut registry = FilterRegistry::new();
    registry.register_abstract("filter", None);
    registry.register("box", Some("filter"), |props| {
        Ok(Box::new(box_filter::BoxFilter::from_properties(props)?) as Box<dyn ReconstructionFilter>)
    });
    registry.register("tent", Some("filter"), |props| {
        Ok(Box::new(tent::TentFilter::from_properties(props)?) as Box<dyn ReconstructionFilter>)
    });
    registry.register("gaussian", Some("filter"), |props| {
        Ok(Box::new(gaussian::GaussianFilter::from_properties(props)?) as Box<dyn ReconstructionFilter>)
    });
    registry.resolve()?;
    Ok(registry)
}
