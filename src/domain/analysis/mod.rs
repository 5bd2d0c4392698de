pub mod entities;
pub mod labels;
pub mod projector;
pub mod value_objects;

pub use entities::{ChartDataset, MacdPoint, PricePoint, RawBar, RawBands, RawMacd, RawSeries,
    RsiPoint, extract_series};
pub use projector::ChartDataProjector;
pub use value_objects::{AnalysisDomain, Interval, OperationId, Subject};
