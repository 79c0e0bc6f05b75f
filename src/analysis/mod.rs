pub mod color_deviation;
pub mod compression;
pub mod contour;
pub mod edge;
pub mod pattern;

pub use color_deviation::ColorDeviationDetector;
pub use compression::CompressionArtifactDetector;
pub use contour::ContourDetector;
pub use edge::EdgeDetector;
pub use pattern::PatternDetector;
