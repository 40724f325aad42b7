pub mod aggregate;
pub mod centroid;
pub mod observation;
pub mod quality;
pub mod ssid;

pub use aggregate::*;
pub use centroid::*;
pub use observation::*;
pub use quality::*;
pub use ssid::*;
