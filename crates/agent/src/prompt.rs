//! System prompt and scripted greeting.

use cyclemate_config::PersonaConfig;

use crate::topics::TopicAnnotation;

/// The system prompt template, built once from the persona config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPromptTemplate {
    pub assistant_name: String,
    pub platform_identity: String,
    pub capabilities: Vec<String>,
    pub guardrails: Vec<String>,
}

impl From<&PersonaConfig> for SystemPromptTemplate {
    fn from(persona: &PersonaConfig) -> Self {
        Self {
            assistant_name: persona.assistant_name.clone(),
            platform_identity: persona.platform_identity.clone(),
            capabilities: persona.capabilities.clone(),
            guardrails: persona.guardrails.clone(),
        }
    }
}

impl Default for SystemPromptTemplate {
    fn default() -> Self {
        Self::from(&PersonaConfig::default())
    }
}

impl SystemPromptTemplate {
    /// Render the system turn text.
    ///
    /// The annotation, when present, is appended as the final paragraph.
    pub fn render(
        &self,
        requester_name: Option<&str>,
        annotation: Option<&TopicAnnotation>,
    ) -> String {
        let mut sections = vec![self.platform_identity.trim().to_string()];

        if !self.capabilities.is_empty() {
            sections.push(bullets("You can help with:", &self.capabilities));
        }

        if !self.guardrails.is_empty() {
            sections.push(bullets("Always follow these rules:", &self.guardrails));
        }

        sections.push(match requester_name {
            Some(name) => format!(
                "The user's name is {name}. Use it occasionally to keep the conversation personal."
            ),
            None => "The user's name is not known. Do not guess or invent one.".to_string(),
        });

        if let Some(annotation) = annotation {
            sections.push(annotation.render());
        }

        sections.join("\n\n")
    }

    /// The scripted assistant turn that follows the system turn.
    pub fn greeting(&self, requester_name: Option<&str>) -> String {
        let salutation = match requester_name {
            Some(name) => format!("Hi {name}!"),
            None => "Hi there!".to_string(),
        };
        format!(
            "{salutation} I'm {}, your CycleMate companion. I'm here to help with anything \
             about your cycle, symptoms, or period care. What's on your mind?",
            self.assistant_name
        )
    }
}

fn bullets(heading: &str, items: &[String]) -> String {
    let mut out = String::from(heading);
    for item in items {
        out.push_str("\n- ");
        out.push_str(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclemate_core::message::Turn;

    #[test]
    fn greeting_uses_known_name() {
        let template = SystemPromptTemplate::default();
        let greeting = template.greeting(Some("Maya"));
        assert!(greeting.starts_with("Hi Maya!"));
        assert!(greeting.contains("Luna"));
    }

    #[test]
    fn greeting_without_name() {
        let greeting = SystemPromptTemplate::default().greeting(None);
        assert!(greeting.starts_with("Hi there!"));
    }

    #[test]
    fn render_lists_capabilities_and_guardrails() {
        let template = SystemPromptTemplate {
            assistant_name: "Ivy".into(),
            platform_identity: "You are Ivy.".into(),
            capabilities: vec!["Explain cycles".into()],
            guardrails: vec!["Never diagnose".into()],
        };
        let text = template.render(None, None);
        assert!(text.starts_with("You are Ivy."));
        assert!(text.contains("\n- Explain cycles"));
        assert!(text.contains("\n- Never diagnose"));
        assert!(text.contains("not known"));
    }

    #[test]
    fn render_mentions_name_flag() {
        let text = SystemPromptTemplate::default().render(Some("Maya"), None);
        assert!(text.contains("The user's name is Maya."));
    }

    #[test]
    fn annotation_is_the_last_paragraph() {
        let older = vec![Turn::requester("my period was late")];
        let annotation = TopicAnnotation::extract(&older).unwrap();
        let text = SystemPromptTemplate::default().render(None, Some(&annotation));
        let last = text.rsplit("\n\n").next().unwrap();
        assert_eq!(last, annotation.render());
        assert!(last.contains("irregular cycles"));
    }

    #[test]
    fn empty_lists_are_omitted() {
        let template = SystemPromptTemplate {
            capabilities: vec![],
            guardrails: vec![],
            ..SystemPromptTemplate::default()
        };
        let text = template.render(None, None);
        assert!(!text.contains("You can help with:"));
        assert!(!text.contains("Always follow these rules:"));
    }
}
