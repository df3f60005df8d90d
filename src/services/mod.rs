pub mod calories;
pub mod detector;
pub mod remote; // External inference server client

pub use calories::CalorieTable;
pub use detector::{DetectorService, MockDetector};
pub use remote::RemoteDetector;
