mod cache;
mod error;
mod propagation;
mod retriever;
mod tle_loader;

pub use cache::{FacilityFrame, GeometryCache};
pub use error::PredictError;
pub use propagation::{ecef_to_enu, enu_to_ecef, teme_to_ecef_position, topocentric_position};
pub use retriever::{PositionRetriever, Sgp4Retriever, TabulatedPositions};
pub use tle_loader::{parse_tle_content, TleLoader};
