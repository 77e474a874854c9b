//! Generation request types and the form-to-request builder.

use crate::{Error, ErrorContext};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Default episode length in minutes.
pub const DEFAULT_LENGTH_MINUTES: u32 = 3;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire spelling, also used in download filenames.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok($name::$variant), )+
                    other => {
                        let expected: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        Err(Error::validation_with_context(
                            format!("unknown {} '{}'", $field, other),
                            ErrorContext::new()
                                .with_field_path(concat!("form.", $field))
                                .with_details(format!("expected one of: {}", expected.join(", "))),
                        ))
                    }
                }
            }
        }
    };
}

wire_enum! {
    /// Audience the generated audio is aimed at.
    AudienceTarget, "target" {
        #[default]
        Internal => "internal",
        External => "external",
    }
}

wire_enum! {
    /// Narrative detail level requested from the generation service.
    PersonaLevel, "persona" {
        #[default]
        HighLevel => "highLevel",
        Detailed => "detailed",
        Technical => "technical",
    }
}

wire_enum! {
    /// Customer category that sets the tone of the content.
    Segment, "segment" {
        #[default]
        RetailEcommerce => "retailEcommerce",
        FinancialServices => "financialServices",
        Healthcare => "healthcare",
        Manufacturing => "manufacturing",
        PublicSector => "publicSector",
    }
}

/// Request body sent to the audio generation endpoint.
///
/// Built fresh per submission and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub text: String,
    pub target: AudienceTarget,
    pub persona: PersonaLevel,
    pub segment: Segment,
    pub length_minutes: NonZeroU32,
}

/// Raw form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub text: String,
    pub target: AudienceTarget,
    pub persona: PersonaLevel,
    pub segment: Segment,
    pub length_minutes: NonZeroU32,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            text: String::new(),
            target: AudienceTarget::default(),
            persona: PersonaLevel::default(),
            segment: Segment::default(),
            length_minutes: NonZeroU32::new(DEFAULT_LENGTH_MINUTES).unwrap_or(NonZeroU32::MIN),
        }
    }
}

impl FormState {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: AudienceTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_persona(mut self, persona: PersonaLevel) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segment = segment;
        self
    }

    pub fn with_length_minutes(mut self, minutes: NonZeroU32) -> Self {
        self.length_minutes = minutes;
        self
    }

    /// True when the text is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Build a request from the form, or `None` when the text is blank.
    ///
    /// The text is passed through as typed; trimming only decides whether
    /// a request is issued at all.
    pub fn build(&self) -> Option<GenerationRequest> {
        if self.is_blank() {
            return None;
        }
        Some(GenerationRequest {
            text: self.text.clone(),
            target: self.target,
            persona: self.persona,
            segment: self.segment,
            length_minutes: self.length_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_builds_nothing() {
        for text in ["", " ", "\t\n", "   \r\n  "] {
            assert!(FormState::new(text).build().is_none(), "{:?}", text);
        }
    }

    #[test]
    fn build_passes_fields_through() {
        let form = FormState::new("  Hello team  ")
            .with_target(AudienceTarget::External)
            .with_persona(PersonaLevel::Technical)
            .with_segment(Segment::Healthcare)
            .with_length_minutes(NonZeroU32::new(7).unwrap());
        let req = form.build().unwrap();
        assert_eq!(req.text, "  Hello team  ");
        assert_eq!(req.target, AudienceTarget::External);
        assert_eq!(req.persona, PersonaLevel::Technical);
        assert_eq!(req.segment, Segment::Healthcare);
        assert_eq!(req.length_minutes.get(), 7);
    }

    #[test]
    fn defaults_match_presets() {
        let req = FormState::new("x").build().unwrap();
        assert_eq!(req.target, AudienceTarget::Internal);
        assert_eq!(req.persona, PersonaLevel::HighLevel);
        assert_eq!(req.segment, Segment::RetailEcommerce);
        assert_eq!(req.length_minutes.get(), DEFAULT_LENGTH_MINUTES);
    }

    #[test]
    fn wire_schema_is_camel_case() {
        let req = FormState::new("Hi").build().unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "text": "Hi",
                "target": "internal",
                "persona": "highLevel",
                "segment": "retailEcommerce",
                "lengthMinutes": 3
            })
        );
    }

    #[test]
    fn parse_rejects_unknown_spelling() {
        assert_eq!("detailed".parse::<PersonaLevel>().unwrap(), PersonaLevel::Detailed);
        let err = "HighLevel".parse::<PersonaLevel>().unwrap_err();
        let ctx = err.context().unwrap();
        assert_eq!(ctx.field_path.as_deref(), Some("form.persona"));
        assert!(ctx.details.as_deref().unwrap().contains("highLevel"));
    }
}
