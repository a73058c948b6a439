pub(crate) mod displacement;
pub(crate) mod driver;
pub(crate) mod geometry;
pub(crate) mod normal;
pub(crate) mod orchestrator;
pub(crate) mod rasterizer;
pub(crate) mod resolver;
