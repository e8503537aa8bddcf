use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Runs extract, transform and load. Returns `None` without writing
    /// anything when extraction produced no records.
    pub async fn run(&self) -> Result<Option<String>> {
        tracing::info!("Starting scrape...");

        tracing::info!("Extracting results...");
        let extraction = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", extraction.records.len());

        if extraction.records.is_empty() {
            tracing::warn!("No results found, nothing written");
            return Ok(None);
        }

        tracing::info!("Transforming results...");
        let transformed = self.pipeline.transform(extraction).await?;
        tracing::info!(
            "Prepared {} records in {} discipline files",
            transformed.records.len(),
            transformed.discipline_outputs.len()
        );

        tracing::info!("Writing archive...");
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(Some(output_path))
    }
}
