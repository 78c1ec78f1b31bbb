use async_trait::async_trait;

use crate::api::VisionApiError;
use crate::image::InlineImage;

/// A hosted vision-language model: one prompt plus one image in, free
/// text out.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(&self, prompt: &str, image: &InlineImage) -> Result<String, VisionApiError>;
}
