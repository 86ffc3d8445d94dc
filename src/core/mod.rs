pub mod charts;
pub mod etl;
pub mod pipeline;
pub mod stats;

pub use crate::domain::model::{
    AnalysisReport, CuisineLeader, DietAverages, FillStrategy, RawRecord, Recipe,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
