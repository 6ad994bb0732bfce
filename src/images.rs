//! Image prefetch and decode.
//!
//! Intrinsic dimensions are required inputs to section measurement, so
//! every question's image is fetched and decoded concurrently before
//! layout begins. Failures are logged and degrade that question to
//! "no image"; they never abort the export.

use std::sync::Arc;

use futures::future::join_all;
use image::GenericImageView;

use crate::error::ImageError;
use crate::model::Question;
use crate::theme::PX_TO_PT;

/// A decoded bitmap ready for embedding: tightly packed 8-bit RGB.
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl DecodedImage {
    /// Intrinsic size in points.
    pub fn natural_size(&self) -> (f32, f32) {
        (self.width as f32 * PX_TO_PT, self.height as f32 * PX_TO_PT)
    }
}

/// Fetch and decode every question's image as one unordered concurrent
/// batch. The result is parallel to `questions`; entries are `None` for
/// questions without an image or whose image failed.
pub async fn prefetch_images(questions: &[Question]) -> Vec<Option<Arc<DecodedImage>>> {
    let fetches = questions.iter().enumerate().map(|(i, q)| async move {
        let Some(source) = q.image.as_deref() else {
            return None;
        };
        match fetch_and_decode(source).await {
            Ok(img) => Some(Arc::new(img)),
            Err(e) => {
                log::warn!("question {}: image {source:?} skipped: {e}", i + 1);
                None
            }
        }
    });
    join_all(fetches).await
}

async fn fetch_and_decode(source: &str) -> Result<DecodedImage, ImageError> {
    let bytes: Vec<u8> = if source.starts_with("http://") || source.starts_with("https://") {
        reqwest::get(source)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    } else {
        std::fs::read(source)?
    };
    let decoded = image::load_from_memory(&bytes)?;
    let (width, height) = decoded.dimensions();
    Ok(DecodedImage {
        width,
        height,
        rgb: decoded.to_rgb8().into_raw(),
    })
}

/// Width-first aspect-preserving fit: take the full budget width, and only
/// if the implied height overflows, clamp to the height and shrink the
/// width instead.
pub fn fit_box(natural_w: f32, natural_h: f32, max_w: f32, max_h: f32) -> (f32, f32) {
    if natural_w <= 0.0 || natural_h <= 0.0 {
        return (0.0, 0.0);
    }
    let aspect = natural_w / natural_h;
    let mut w = max_w;
    let mut h = w / aspect;
    if h > max_h {
        h = max_h;
        w = h * aspect;
    }
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_is_width_first() {
        let (w, h) = fit_box(400.0, 100.0, 200.0, 300.0);
        assert_eq!((w, h), (200.0, 50.0));
    }

    #[test]
    fn fit_clamps_height_for_tall_images() {
        let (w, h) = fit_box(100.0, 400.0, 200.0, 100.0);
        assert_eq!(h, 100.0);
        assert_eq!(w, 25.0);
    }

    #[tokio::test]
    async fn failed_image_degrades_to_none() {
        let q = Question {
            prompt: "p".into(),
            options: vec!["a".into(), "b".into()],
            correct: Some(0),
            explanation: None,
            image: Some("/nonexistent/path/img.png".into()),
        };
        let images = prefetch_images(&[q]).await;
        assert_eq!(images.len(), 1);
        assert!(images[0].is_none());
    }
}
