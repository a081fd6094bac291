pub mod hormone;
pub mod panel;

pub use hormone::{Hormone, Metric, Status};
pub use panel::{LabPanel, PanelError};
