use std::path::Path;

use tract_onnx::prelude::*;

/// Regressor exported to ONNX, run through tract with a fixed `[1, width]` input.
pub struct OnnxRegressor {
    plan: SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>,
    width: usize,
}

impl OnnxRegressor {
    pub fn load<P: AsRef<Path>>(model_path: P, width: usize) -> TractResult<Self> {
        let plan = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), tvec!(1, width)))?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { plan, width })
    }

    pub fn predict(&self, row: &[f32]) -> TractResult<f64> {
        if row.len() != self.width {
            ::anyhow::bail!("expected {} features, got {}", self.width, row.len());
        }

        let input = Tensor::from_shape(&[1, self.width], row)?;
        let outputs = self.plan.run(tvec!(input.into()))?;

        let fare: f32 = *outputs[0]
            .to_array_view::<f32>()?
            .iter()
            .next()
            .ok_or_else(|| ::anyhow::anyhow!("model produced no output"))?;

        Ok(f64::from(fare))
    }
}

impl std::fmt::Debug for OnnxRegressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxRegressor")
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}
