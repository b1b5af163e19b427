//! Kokoro voice catalog, grouped by language and gender.

use artifact_mcp_common::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Voices available for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageVoices {
    pub language: &'static str,
    pub female: &'static [&'static str],
    pub male: &'static [&'static str],
}

pub static VOICE_CATALOG: &[LanguageVoices] = &[
    LanguageVoices {
        language: "en-us",
        female: &[
            "af_alloy", "af_bella", "af_nicole", "af_sarah", "af_sky", "af_star", "af_nova", "af_jessica",
            "af_emma", "af_isabella", "af_river",
        ],
        male: &[
            "am_adam", "am_echo", "am_liam", "am_michael", "am_eric", "am_lewis", "am_danny", "am_matthew",
        ],
    },
    LanguageVoices {
        language: "en-gb",
        female: &["bf_alice", "bf_emma", "bf_isabella", "bf_lily"],
        male: &["bm_daniel", "bm_george", "bm_lewis", "bm_william"],
    },
    LanguageVoices {
        language: "fr",
        female: &["ff_siwis"],
        male: &[],
    },
    LanguageVoices {
        language: "it",
        female: &["if_sara"],
        male: &["im_nicola"],
    },
    LanguageVoices {
        language: "ja",
        female: &["jf_alpha", "jf_ema", "jf_hina"],
        male: &["jm_kumo", "jm_yuki"],
    },
    LanguageVoices {
        language: "zh",
        female: &["zf_xiaobei", "zf_xiaoni", "zf_xiaoxiao", "zf_yunxi"],
        male: &["zm_yunxi", "zm_yunxia", "zm_yunyang", "zm_yunjian"],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

/// One row of a voice listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceGroup {
    pub language: &'static str,
    pub gender: Gender,
    pub voices: &'static [&'static str],
}

impl LanguageVoices {
    fn voices(&self, gender: Gender) -> &'static [&'static str] {
        match gender {
            Gender::Female => self.female,
            Gender::Male => self.male,
        }
    }
}

/// Catalog entry for a language code, ignoring case.
pub fn language(code: &str) -> Option<&'static LanguageVoices> {
    VOICE_CATALOG.iter().find(|l| l.language.eq_ignore_ascii_case(code.trim()))
}

/// Whether `voice` appears anywhere in the catalog.
pub fn contains_voice(voice: &str) -> bool {
    VOICE_CATALOG
        .iter()
        .any(|l| l.female.contains(&voice) || l.male.contains(&voice))
}

/// Voice groups matching the optional language and gender filters.
///
/// # Errors
/// Returns `Error::Validation` for a language the catalog does not have.
pub fn filter(language_code: Option<&str>, gender: Option<Gender>) -> Result<Vec<VoiceGroup>> {
    let languages: Vec<&LanguageVoices> = match language_code {
        Some(code) => vec![language(code).ok_or_else(|| {
            let known: Vec<&str> = VOICE_CATALOG.iter().map(|l| l.language).collect();
            Error::validation(format!("Unknown language '{}'. Must be one of: {}", code, known.join(", ")))
        })?],
        None => VOICE_CATALOG.iter().collect(),
    };

    let genders: &[Gender] = match gender {
        Some(Gender::Female) => &[Gender::Female],
        Some(Gender::Male) => &[Gender::Male],
        None => &[Gender::Female, Gender::Male],
    };

    Ok(languages
        .into_iter()
        .flat_map(|l| {
            genders.iter().map(move |&g| VoiceGroup {
                language: l.language,
                gender: g,
                voices: l.voices(g),
            })
        })
        .collect())
}
