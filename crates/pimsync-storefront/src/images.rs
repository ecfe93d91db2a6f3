use base64::Engine as _;

use crate::client::{legacy_id, StorefrontClient};
use crate::types::{ImageAttachment, ImageUploadRequest, RestImageResponse};

impl StorefrontClient {
    /// Attaches `bytes` to the product as a new image (base64 attachment via
    /// REST). Only throttled uploads are retried, so a timed-out request never
    /// attaches a second copy. Failures are logged; returns whether the upload
    /// succeeded.
    pub async fn upload_image(&self, product_id: &str, bytes: &[u8]) -> bool {
        if bytes.is_empty() {
            tracing::warn!(product_id, "skipping upload of empty image");
            return false;
        }

        let body = ImageUploadRequest {
            image: ImageAttachment {
                attachment: base64::engine::general_purpose::STANDARD.encode(bytes),
            },
        };
        let product = legacy_id(product_id);
        match self
            .rest_create::<_, RestImageResponse>(&format!("products/{product}/images.json"), &body)
            .await
        {
            Ok(response) => {
                let image_id = response.image.map(|i| i.id);
                tracing::info!(product_id, ?image_id, size = bytes.len(), "image uploaded");
                true
            }
            Err(e) => {
                tracing::error!(product_id, error = %e, "image upload failed");
                false
            }
        }
    }
}
