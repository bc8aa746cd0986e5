pub mod background;
pub mod blob;
pub mod camera;
pub mod color;
pub mod constants;
pub mod deform;
pub mod error;
pub mod mesh;
pub mod modes;
pub mod motion;
pub mod noise_field;
pub mod population;
pub mod scene;

pub use background::*;
pub use blob::*;
pub use camera::*;
pub use deform::*;
pub use error::*;
pub use mesh::*;
pub use modes::*;
pub use motion::*;
pub use noise_field::*;
pub use population::*;
pub use scene::*;
