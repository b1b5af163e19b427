//! Input parameter validation tests.
//!
//! Invalid tool input must be rejected with a validation error before any
//! artifact, model, or engine work happens.

#[cfg(test)]
mod tests {
    use artifact_mcp_common::artifact::ArtifactRef;
    use artifact_mcp_common::error::Error;
    use artifact_mcp_host::HostArtifactParams;
    use artifact_mcp_host::hosting::validate_hosted_filename;
    use artifact_mcp_tts::handler::TextSource;
    use artifact_mcp_tts::{AudioFormat, ListVoicesParams, TextToSpeechParams};
    use proptest::prelude::*;

    fn speech(text: Option<&str>, text_file: Option<&str>, format: &str) -> TextToSpeechParams {
        TextToSpeechParams {
            text: text.map(String::from),
            text_file: text_file.map(String::from),
            output_format: format.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn speech_requires_a_text_source() {
        let err = speech(None, None, "mp3").validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("Either 'text' or 'text_file' must be provided"));
    }

    #[test]
    fn speech_rejects_both_sources() {
        let err = speech(Some("hi"), Some("notes.txt"), "mp3").validate().unwrap_err();
        assert!(err.to_string().contains("Provide either 'text' or 'text_file', not both"));
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let params = speech(Some(""), Some("notes.txt"), "wav");
        let (source, _) = params.validate().unwrap();
        assert_eq!(source, TextSource::Artifact("notes.txt"));
    }

    #[test]
    fn speech_rejects_unknown_format() {
        let err = speech(Some("hi"), None, "ogg").validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Invalid output_format 'ogg'. Must be 'mp3' or 'wav'"
        );
    }

    #[test]
    fn host_params_require_artifact_filename() {
        let result = serde_json::from_value::<HostArtifactParams>(serde_json::json!({ "custom_filename": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn list_voices_rejects_unknown_gender() {
        let result = serde_json::from_value::<ListVoicesParams>(serde_json::json!({ "gender": "robot" }));
        assert!(result.is_err());
    }

    #[test]
    fn hosted_names_must_be_single_components() {
        for name in ["", ".", "..", "a/b", "a\\b", "nul\0"] {
            assert!(validate_hosted_filename(name).is_err(), "{:?}", name);
        }
        validate_hosted_filename("report.pdf").unwrap();
    }

    #[test]
    fn artifact_reference_rejects_empty_name() {
        assert!(ArtifactRef::parse("").is_err());
    }

    proptest! {
        #[test]
        fn any_format_besides_mp3_and_wav_is_rejected(format in "[a-z0-9]{1,6}") {
            prop_assume!(format != "mp3" && format != "wav");
            prop_assert!(AudioFormat::parse(&format).is_err());
            let params = speech(Some("hello"), None, &format);
            let result = params.validate();
            let is_validation = matches!(result, Err(Error::Validation(_)));
            prop_assert!(is_validation);
        }

        #[test]
        fn both_sources_are_always_rejected(text in "[a-zA-Z ]{1,40}", file in "[a-z]{1,10}\\.txt") {
            let params = speech(Some(&text), Some(&file), "mp3");
            let result = params.validate();
            let is_validation = matches!(result, Err(Error::Validation(_)));
            prop_assert!(is_validation);
        }

        #[test]
        fn exactly_one_source_is_accepted(text in "[a-zA-Z ]{1,40}", wav in any::<bool>()) {
            let format = if wav { "wav" } else { "mp3" };
            let params = speech(Some(&text), None, format);
            let (source, parsed) = params.validate().unwrap();
            prop_assert_eq!(source, TextSource::Direct(text.as_str()));
            prop_assert_eq!(parsed.as_str(), format);
        }
    }
}
