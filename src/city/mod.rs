pub mod import;
pub mod input;
pub mod record;

pub use import::{load_cities, read_csv, read_json, sample_cities};
pub use input::CityInput;
pub use record::{CityRecord, TrafficDensity};
