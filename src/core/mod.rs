pub mod athlete;
pub mod catalog;
pub mod etl;
pub mod event_page;
pub mod export;
pub(crate) mod html;
pub mod locator;
pub mod pipeline;
pub mod rows;
pub mod site;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{Extraction, ResultRecord, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Document, PageSource, Pipeline, Storage};
pub use crate::utils::error::Result;
