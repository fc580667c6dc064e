use std::collections::BTreeMap;

use sp_core::{Configuration, ParticipantError, Phase};

use crate::xml::{parse_xml_document, XmlElementNode};

/// Where one phase's script comes from, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRef {
    /// Element name, used to identify inline scripts in diagnostics.
    pub element: String,
    /// Value of the `src` attribute, when present.
    pub src: Option<String>,
    /// Inline element text; empty when the element has none.
    pub text: String,
    pub line: u32,
}

impl ScriptRef {
    pub fn inline(phase: Phase, text: impl Into<String>) -> Self {
        Self {
            element: phase.element_name().to_string(),
            src: None,
            text: text.into(),
            line: 0,
        }
    }

    pub fn file(phase: Phase, src: impl Into<String>) -> Self {
        Self {
            element: phase.element_name().to_string(),
            src: Some(src.into()),
            text: String::new(),
            line: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantConfig {
    pub realm: Option<String>,
    pub properties: Configuration,
    pub scripts: BTreeMap<Phase, ScriptRef>,
}

impl ParticipantConfig {
    pub fn script(&self, phase: Phase) -> Option<&ScriptRef> {
        self.scripts.get(&phase)
    }

    pub fn compiled(&self) -> bool {
        self.properties.get_bool("compiled", true)
    }
}

pub fn parse_participant_config(source: &str) -> Result<ParticipantConfig, ParticipantError> {
    let document = parse_xml_document(source)?;
    participant_config_from_element(&document.root)
}

fn participant_config_from_element(
    root: &XmlElementNode,
) -> Result<ParticipantConfig, ParticipantError> {
    let mut config = ParticipantConfig {
        realm: root.attribute("realm").map(str::to_string),
        ..ParticipantConfig::default()
    };

    for element in root.elements() {
        if element.name == "property" {
            let Some(name) = element.attribute("name") else {
                return Err(ParticipantError::config(
                    "CONFIG_PROPERTY_NAME_MISSING",
                    format!("<property> at line {} has no name attribute.", element.line),
                ));
            };
            let value = element
                .attribute("value")
                .map(str::to_string)
                .unwrap_or_else(|| element.text().trim().to_string());
            config.properties.put(name, value);
            continue;
        }

        let Some(phase) = Phase::from_element_name(&element.name) else {
            continue;
        };
        // first element wins, later duplicates are ignored
        config.scripts.entry(phase).or_insert_with(|| ScriptRef {
            element: element.name.clone(),
            src: element.attribute("src").map(str::to_string),
            text: element.text(),
            line: element.line,
        });
    }

    Ok(config)
}
