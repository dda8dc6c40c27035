//! Pipeline module - loading, descriptive analysis and the conversion predictor

pub mod columns;
pub mod describe;
pub mod encoding;
pub mod grouping;
pub mod loader;
pub mod predictor;
pub mod scaling;
pub mod split;
pub mod target;

pub use columns::KnownColumns;
pub use describe::*;
pub use encoding::LabelEncoder;
pub use grouping::*;
pub use loader::*;
pub use predictor::*;
pub use scaling::StandardScaler;
pub use split::{stratified_split, SplitIndices};
pub use target::*;
