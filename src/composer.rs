//! Topic catalog and prompt composition
//!
//! Maps topic keys to base scene descriptions and combines them with
//! randomized style and region modifiers to produce image prompts.

use rand::prelude::*;

/// Base description used for topics outside the catalog.
const GENERIC_BASE: &str = "Modern business visualization, professional corporate environment";

const TOPIC_PROMPTS: &[(&str, &str)] = &[
    (
        "análisis de mercados",
        "Professional data visualization showing market analysis, modern infographics with business charts, corporate style",
    ),
    (
        "inteligencia comercial",
        "Modern business intelligence dashboard with real-time analytics, professional data visualization, corporate theme",
    ),
    (
        "comercio internacional",
        "Global trade network visualization with connected markets, professional business infographic, world trade flow",
    ),
    (
        "estrategia global",
        "Strategic business planning visualization, modern corporate style with growth indicators and global markets",
    ),
];

const STYLE_ELEMENTS: &[&str] = &[
    "minimalist design",
    "corporate blue tones",
    "professional environment",
    "modern office setting",
    "digital interface",
    "data visualization",
    "global connectivity",
    "business analytics",
    "strategic planning",
];

const BUSINESS_REGIONS: &[&str] = &[
    "España",
    "Latinoamérica",
    "Europa",
    "Asia",
    "Norteamérica",
    "Mercados emergentes",
    "Mercados globales",
    "Economías en desarrollo",
    "Mercados internacionales",
    "Zonas de libre comercio",
];

/// Builds descriptive image prompts from topic keys.
pub struct PromptComposer;

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    /// Topic keys known to the catalog.
    pub fn topics(&self) -> impl Iterator<Item = &'static str> {
        TOPIC_PROMPTS.iter().map(|(key, _)| *key)
    }

    /// Choose a topic uniformly from the catalog.
    pub fn random_topic(&self) -> String {
        let mut rng = thread_rng();
        self.pick_topic(&mut rng)
    }

    /// Compose a full image prompt for `topic`. Unknown topics fall back to a
    /// generic business scene, so composition never fails.
    pub fn compose(&self, topic: &str) -> String {
        let mut rng = thread_rng();
        self.compose_with_rng(topic, &mut rng)
    }

    fn pick_topic(&self, rng: &mut impl Rng) -> String {
        TOPIC_PROMPTS[rng.gen_range(0..TOPIC_PROMPTS.len())]
            .0
            .to_string()
    }

    fn compose_with_rng(&self, topic: &str, rng: &mut impl Rng) -> String {
        let base = TOPIC_PROMPTS
            .iter()
            .find(|(key, _)| *key == topic)
            .map(|(_, description)| *description)
            .unwrap_or(GENERIC_BASE);

        let style = STYLE_ELEMENTS[rng.gen_range(0..STYLE_ELEMENTS.len())];
        let region = BUSINESS_REGIONS[rng.gen_range(0..BUSINESS_REGIONS.len())];

        format!(
            "{}, {}, focus on {}, professional lighting, 4k, detailed",
            base, style, region
        )
    }
}
