//! Page sampling for expensive analyzers

use rand::Rng;
use url::Url;

/// Path fragments that mark a page as key to a site's trustworthiness
const KEY_PATH_MARKERS: &[&str] = &["about", "contact", "trust", "terms", "privacy"];

/// Decides whether an analyzer should run on a page
pub trait SamplingPolicy: Send + Sync {
    fn should_analyze(&self, url: &str) -> bool;
}

impl<F> SamplingPolicy for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn should_analyze(&self, url: &str) -> bool {
        self(url)
    }
}

/// Selects every page
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysSample;

impl SamplingPolicy for AlwaysSample {
    fn should_analyze(&self, _url: &str) -> bool {
        true
    }
}

/// Selects key pages plus a random share of the rest
#[derive(Debug, Clone, Copy)]
pub struct KeyPageSampler {
    sample_rate: f64,
}

impl KeyPageSampler {
    /// `sample_rate` is clamped to `[0, 1]`
    pub fn new(sample_rate: f64) -> Self {
        let sample_rate = if sample_rate.is_nan() {
            0.0
        } else {
            sample_rate.clamp(0.0, 1.0)
        };
        Self { sample_rate }
    }
}

impl SamplingPolicy for KeyPageSampler {
    fn should_analyze(&self, url: &str) -> bool {
        is_key_page(url) || rand::thread_rng().gen_bool(self.sample_rate)
    }
}

/// Home, about, contact, trust, terms, and privacy pages
pub fn is_key_page(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let path = parsed.path().to_ascii_lowercase();
    path == "/" || KEY_PATH_MARKERS.iter().any(|marker| path.contains(marker))
}
