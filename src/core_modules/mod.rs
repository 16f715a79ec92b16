// Pipeline stages, leaves first: color conversion, thresholding, mask cleanup,
// contour selection, geometry, region statistics. `utils` holds frame plumbing.

pub mod pixel;
pub mod threshold;
pub mod morphology;
pub mod smart_blob;
pub mod contour;
pub mod moment;
pub mod chunk;
pub mod utils;
