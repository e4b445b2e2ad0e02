//! The boundary to the remote creature classifier.
//!
//! The classifier itself (transport, credentials, model choice) lives outside
//! this crate; it is reached through [`CreatureClassifier`]. What lives here is
//! the shape of its answer, the failures it may report, and the local
//! quantizer fallback used when it cannot answer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{ColorInfo, MAX_COLOR_COUNT};
use crate::quantize::extract_dominant_colors_with;
use crate::{PaletteConfig, Result, decode_image};

/// Species identification plus the colors suggested for it, most dominant first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub creature_name: String,
    pub description: String,
    pub colors: Vec<ColorInfo>,
}

impl AnalysisResult {
    /// Parse and validate a JSON answer from the classifier.
    pub fn from_json(text: &str) -> Result<Self, ClassifierError> {
        let result: AnalysisResult = serde_json::from_str(text)
            .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;
        result.validate()?;
        Ok(result)
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        if self.creature_name.trim().is_empty() {
            return Err(ClassifierError::MalformedResponse("missing creatureName".into()));
        }
        if self.description.trim().is_empty() {
            return Err(ClassifierError::MalformedResponse("missing description".into()));
        }
        Ok(())
    }

    /// Same result with the palette narrowed to `count` colors.
    pub fn with_color_count(&self, count: usize) -> Self {
        Self {
            creature_name: self.creature_name.clone(),
            description: self.description.clone(),
            colors: crate::color::select_colors(&self.colors, count).to_vec(),
        }
    }
}

/// Failures reported by the remote classifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("no API credential configured")]
    MissingCredential,

    #[error("the API credential was rejected")]
    Unauthorized,

    #[error("rate limited by the classification service")]
    RateLimited,

    #[error("the classification service is overloaded")]
    Overloaded,

    #[error("network failure: {0}")]
    Network(String),

    #[error("invalid response structure: {0}")]
    MalformedResponse(String),

    #[error("unsupported image: {0}")]
    UnsupportedImage(String),
}

impl ClassifierError {
    /// Whether trying again later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClassifierError::RateLimited | ClassifierError::Overloaded | ClassifierError::Network(_)
        )
    }

    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ClassifierError::MissingCredential | ClassifierError::Unauthorized => {
                "The image analysis service is not configured correctly.".to_string()
            }
            ClassifierError::RateLimited | ClassifierError::Overloaded => {
                "The AI model is busy right now. Please try again later.".to_string()
            }
            ClassifierError::Network(_) => {
                "Could not reach the image analysis service. Check your connection and try again."
                    .to_string()
            }
            ClassifierError::MalformedResponse(_) => {
                "The AI model returned an unexpected answer. Please try again.".to_string()
            }
            ClassifierError::UnsupportedImage(_) => {
                "This image could not be processed. Please try a different file.".to_string()
            }
        }
    }
}

/// Something that can name the creature in an image and suggest its colors.
pub trait CreatureClassifier {
    fn classify(
        &self,
        image: &[u8],
        color_count: usize,
    ) -> Result<AnalysisResult, ClassifierError>;
}

/// Where a palette came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteSource {
    Remote,
    Local,
}

/// Outcome of [`analyze_with_fallback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Name and description, present only when the classifier answered.
    pub creature: Option<(String, String)>,
    /// Up to [`MAX_COLOR_COUNT`] colors, most dominant first.
    pub colors: Vec<ColorInfo>,
    pub source: PaletteSource,
    /// The classifier failure that triggered the local fallback.
    pub remote_error: Option<ClassifierError>,
}

/// Ask `classifier` for the full palette; when it fails, decode the image and
/// run the local quantizer instead.
///
/// Decode failures on the fallback path are returned unchanged.
pub fn analyze_with_fallback<C: CreatureClassifier + ?Sized>(
    classifier: &C,
    image: &[u8],
    config: &PaletteConfig,
) -> Result<Analysis> {
    match classifier.classify(image, MAX_COLOR_COUNT) {
        Ok(result) => Ok(Analysis {
            creature: Some((result.creature_name, result.description)),
            colors: result.colors,
            source: PaletteSource::Remote,
            remote_error: None,
        }),
        Err(err) => {
            tracing::warn!(error = %err, "classifier failed, using local palette");
            let pixels = decode_image(image)?;
            let colors = extract_dominant_colors_with(&pixels, MAX_COLOR_COUNT, &config.quantizer)?;
            Ok(Analysis {
                creature: None,
                colors,
                source: PaletteSource::Local,
                remote_error: Some(err),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaletteError;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    struct Fixed(Result<AnalysisResult, ClassifierError>);

    impl CreatureClassifier for Fixed {
        fn classify(
            &self,
            _image: &[u8],
            color_count: usize,
        ) -> Result<AnalysisResult, ClassifierError> {
            assert_eq!(color_count, MAX_COLOR_COUNT);
            self.0.clone()
        }
    }

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        buf
    }

    const RESPONSE: &str = r##"{
        "creatureName": "Scarlet Macaw",
        "description": "A large, colorful parrot.",
        "colors": [
            { "hex": "#FF2400", "rgb": "rgb(255, 36, 0)", "hsl": "hsl(8, 100%, 50%)" },
            { "hex": "#0047AB", "rgb": "rgb(0, 71, 171)", "hsl": "hsl(215, 100%, 34%)" }
        ]
    }"##;

    #[test]
    fn parses_classifier_json() {
        let result = AnalysisResult::from_json(RESPONSE).unwrap();
        assert_eq!(result.creature_name, "Scarlet Macaw");
        assert_eq!(result.colors.len(), 2);
        assert_eq!(result.colors[1].hex, "#0047AB");
    }

    #[test]
    fn rejects_incomplete_json() {
        let missing_colors = r#"{ "creatureName": "Cat", "description": "Feline." }"#;
        assert!(matches!(
            AnalysisResult::from_json(missing_colors),
            Err(ClassifierError::MalformedResponse(_))
        ));
        let blank_name = r#"{ "creatureName": " ", "description": "x", "colors": [] }"#;
        assert!(matches!(
            AnalysisResult::from_json(blank_name),
            Err(ClassifierError::MalformedResponse(_))
        ));
        assert!(AnalysisResult::from_json("not json").is_err());
    }

    #[test]
    fn retryable_classification() {
        assert!(ClassifierError::RateLimited.is_retryable());
        assert!(ClassifierError::Network("timeout".into()).is_retryable());
        assert!(!ClassifierError::Unauthorized.is_retryable());
        assert!(!ClassifierError::MalformedResponse(String::new()).is_retryable());
    }

    #[test]
    fn remote_answer_is_used_when_available() {
        let classifier = Fixed(AnalysisResult::from_json(RESPONSE));
        let analysis = analyze_with_fallback(&classifier, b"ignored", &PaletteConfig::default()).unwrap();
        assert_eq!(analysis.source, PaletteSource::Remote);
        assert_eq!(analysis.creature.unwrap().0, "Scarlet Macaw");
        assert_eq!(analysis.colors.len(), 2);
    }

    #[test]
    fn local_palette_replaces_failed_classifier() {
        let img = RgbaImage::from_pixel(20, 10, Rgba([0, 128, 255, 255]));
        let classifier = Fixed(Err(ClassifierError::Overloaded));
        let analysis = analyze_with_fallback(&classifier, &png_bytes(&img), &PaletteConfig::default()).unwrap();
        assert_eq!(analysis.source, PaletteSource::Local);
        assert_eq!(analysis.creature, None);
        assert_eq!(analysis.remote_error, Some(ClassifierError::Overloaded));
        assert_eq!(analysis.colors, vec![ColorInfo::from_rgb(0, 128, 255)]);
    }

    #[test]
    fn fallback_surfaces_decode_failures() {
        let classifier = Fixed(Err(ClassifierError::Network("offline".into())));
        let err = analyze_with_fallback(&classifier, b"not an image", &PaletteConfig::default()).unwrap_err();
        assert!(matches!(err, PaletteError::Decode(_)));
    }

    #[test]
    fn narrowing_keeps_the_most_dominant() {
        let mut result = AnalysisResult::from_json(RESPONSE).unwrap();
        result.colors = (0..12u8).map(|i| ColorInfo::from_rgb(i, 0, 0)).collect();
        let narrowed = result.with_color_count(5);
        assert_eq!(narrowed.colors.len(), 5);
        assert_eq!(narrowed.colors[0], result.colors[0]);
        assert_eq!(narrowed.creature_name, result.creature_name);
    }
}
