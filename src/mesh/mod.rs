pub(crate) mod grids;
pub(crate) mod lowres;
pub(crate) mod tangent;
