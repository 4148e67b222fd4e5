pub mod lanes;
pub mod model;
pub mod onset;
pub mod profile;

pub use lanes::*;
pub use model::*;
pub use onset::*;
pub use profile::*;
