//! Original media: photos and video the author produced

use super::{band, Detector, DocumentContext};
use crate::{EvidenceItem, VariableId, VariableResult};

const ORIGINAL_IMAGE_BANDS: [(f64, f64); 2] = [(3.0, 2.5), (1.0, 1.5)];
const ALT_COVERAGE_BANDS: [(f64, f64); 2] = [(0.9, 1.0), (0.5, 0.5)];
const VIDEO_POINTS: f64 = 1.5;
/// Any imagery at all, even if none of it is original
const IMAGERY_POINTS: f64 = 0.5;

pub struct OriginalMediaDetector;

impl OriginalMediaDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OriginalMediaDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for OriginalMediaDetector {
    fn id(&self) -> VariableId {
        VariableId::OriginalMedia
    }

    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult {
        let media = ctx.document.media;
        if media.images == 0 && media.videos == 0 {
            return VariableResult::scored(
                self.id(),
                0.0,
                vec![EvidenceItem::note("No images or video found")],
            );
        }

        // Upstream counts can disagree; never credit more originals than images
        let originals = media.original_images.min(media.images);
        let alt_coverage = if media.images > 0 {
            media.images_with_alt.min(media.images) as f64 / media.images as f64
        } else {
            0.0
        };

        let mut score = band(originals as f64, &ORIGINAL_IMAGE_BANDS);
        if media.images > 0 && originals == 0 {
            score += IMAGERY_POINTS;
        }
        if media.videos > 0 {
            score += VIDEO_POINTS;
        }
        score += band(alt_coverage, &ALT_COVERAGE_BANDS);

        let mut evidence = vec![
            EvidenceItem::metric("Images", media.images),
            EvidenceItem::metric("Original images", originals),
            EvidenceItem::metric("Videos", media.videos),
        ];
        if media.images > 0 {
            evidence.push(EvidenceItem::metric(
                "Alt text coverage",
                format!("{:.0}%", alt_coverage * 100.0),
            ));
        }
        if originals == 0 && media.images > 0 {
            evidence.push(EvidenceItem::note("All images appear to be stock or reused"));
        }

        VariableResult::scored(self.id(), score, evidence)
    }
}
