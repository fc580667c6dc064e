mod participant;
mod xml;

pub use participant::{parse_participant_config, ParticipantConfig, ScriptRef};
pub use xml::{parse_xml_document, XmlDocument, XmlElementNode, XmlNode};
