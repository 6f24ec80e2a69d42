mod antenna_path;
mod coordinator;
mod engine;
mod error;
mod facility;
mod filter;
mod power;
mod settings;
mod time_sampler;
mod types;
mod window_builder;

pub use antenna_path::{pair_with_antenna_path, validate_antenna_path};
pub use coordinator::Coordinator;
pub use engine::{OverheadEngine, PowerSeries};
pub use error::{ConfigurationError, EngineError};
pub use facility::{Coordinates, Facility};
pub use filter::{AboveHorizonFilter, FilterStrategy, WithinMainBeamFilter};
pub use power::{
    accumulate_power, antenna_frame_angles, free_space_path_loss, received_power_watts,
    wavelength_m, PowerAggregator, SPEED_OF_LIGHT_M_S,
};
pub use settings::{OnFail, RuntimeSettings};
pub use time_sampler::{sample_times, TimeSampler};
pub use types::{
    AntennaPosition, FrequencyRange, OverheadWindow, Position, PositionTime, PowerTime,
    PowerWindow, Reservation, Satellite, TimeWindow, Transmitter,
};
pub use window_builder::{InViewRun, InViewSample, WindowBuilder};
