mod decode;
mod feature;
mod topology;

pub use feature::{Feature, FeatureCollection};
pub use topology::Topology;

pub(crate) use decode::expand_object;
