pub mod classification;
pub mod morphology;
pub mod extraction;
pub mod simplification;
pub mod analysis;

pub use classification::*;
pub use morphology::*;
pub use extraction::*;
pub use simplification::*;
pub use analysis::*;
