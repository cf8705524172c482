//! System prompt for the SMS assistant.
//!
//! Sections are wrapped in XML tags so the model can tell persona, channel
//! limits, and the caller's identity apart. Guidance that names a tool is
//! only emitted when that tool is registered.

use crate::tool::ToolRegistry;

const USER_LOOKUP_TOOL: &str = "get_user_by_phone_number";
const LOCATION_TOOLS: [&str; 3] = ["get_counties", "get_subcounties", "get_wards"];
const NDVI_TOOL: &str = "ndvi_analysis_for_ai";
const SEND_MESSAGE_TOOL: &str = "send_message";

/// Builds the per-user system prompt.
pub struct SystemPromptBuilder;

impl SystemPromptBuilder {
    /// Layout:
    /// ```text
    /// <persona>...</persona>
    /// <channel>...</channel>
    /// <locations>...</locations>      (location tools registered)
    /// <phone_numbers>...</phone_numbers>
    /// <caller>...</caller>
    /// <instructions>...</instructions>
    /// ```
    pub fn build(user_phone: &str, tools: &ToolRegistry) -> String {
        let has = |name: &str| tools.get(name).is_some();
        let mut prompt = String::with_capacity(3072);

        prompt.push_str("<persona>\n");
        prompt.push_str(
            "You are AgriAid, an agricultural assistant for farmers, gardeners and \
             agricultural professionals in Kenya. Give accurate, practical and kind advice.\n",
        );
        prompt.push_str("</persona>\n\n");

        prompt.push_str("<channel>\n");
        prompt.push_str(
            "You reply over SMS. Aim for fewer than 300 characters. Use plain words a \
             farmer would use and lead with the action to take. When the tools cannot \
             answer a question, answer from your own agronomy knowledge. If a feature \
             is not available, say so politely.\n",
        );
        prompt.push_str("</channel>\n\n");

        let location_tools: Vec<&str> = LOCATION_TOOLS.into_iter().filter(|t| has(*t)).collect();
        if !location_tools.is_empty() {
            prompt.push_str("<locations>\n");
            prompt.push_str(&format!(
                "Users may misspell county, subcounty or ward names. Before passing a \
                 location to any other tool, confirm it exists with {}, narrowing from \
                 county to ward. If you only find a close match, ask the user to confirm \
                 it. If nothing matches, tell them the place was not found.\n",
                location_tools.join(", ")
            ));
            prompt.push_str("</locations>\n\n");
        }

        prompt.push_str("<phone_numbers>\n");
        prompt.push_str(
            "Phone numbers without a country code are Kenyan: drop a leading 0 and \
             prefix +254.\n",
        );
        prompt.push_str("</phone_numbers>\n\n");

        prompt.push_str("<caller>\n");
        prompt.push_str(&format!("The user's phone number is {user_phone}.\n"));
        prompt.push_str(
            "Use it for tools that need the caller's number and as the registrar of \
             anything they register. Never ask them for it. It is not the contact \
             number of an agro center.\n",
        );
        prompt.push_str("</caller>\n\n");

        prompt.push_str("<instructions>\n");
        if has(USER_LOOKUP_TOOL) {
            prompt.push_str(&format!(
                "- At the start of a conversation look the user up with {USER_LOOKUP_TOOL} \
                 using {user_phone}. If they are registered, greet them by name. If not, \
                 offer to register them and act on their answer.\n\
                 - Before registering an agro center or farm, make sure the user is registered.\n"
            ));
        }
        prompt.push_str("- New users get a short overview of what you can help with.\n");
        if has(NDVI_TOOL) {
            prompt.push_str(&format!(
                "- For planting advice use {NDVI_TOOL} together with weather and soil \
                 tools where useful.\n"
            ));
        }
        if has(SEND_MESSAGE_TOOL) {
            prompt.push_str(&format!(
                "- For pests, diseases or anything needing a specialist, share the contacts \
                 of agro centers you know of along with your advice.\n\
                 - Only contact an agro center with {SEND_MESSAGE_TOOL} when the request is \
                 about agriculture and the user agrees to share their phone number with the \
                 center. Without that consent, explain you cannot contact the center.\n"
            ));
        }
        prompt.push_str("- Only change records that belong to the current user.\n");
        prompt.push_str("</instructions>");

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::EchoTool;

    fn registry(names: &[&str]) -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        for name in names {
            tools.register(EchoTool::new(name));
        }
        tools
    }

    #[test]
    fn includes_caller_number() {
        let prompt = SystemPromptBuilder::build("+254712345678", &registry(&[USER_LOOKUP_TOOL]));
        assert!(prompt.contains("The user's phone number is +254712345678."));
        assert!(prompt.contains("get_user_by_phone_number using +254712345678"));
    }

    #[test]
    fn has_balanced_sections() {
        let all = [USER_LOOKUP_TOOL, "get_counties", "get_subcounties", "get_wards"];
        let prompt = SystemPromptBuilder::build("+254700000000", &registry(&all));
        for tag in ["persona", "channel", "locations", "phone_numbers", "caller", "instructions"] {
            assert!(prompt.contains(&format!("<{tag}>")), "missing <{tag}>");
            assert!(prompt.contains(&format!("</{tag}>")), "missing </{tag}>");
        }
    }

    #[test]
    fn only_registered_tools_are_named() {
        let prompt = SystemPromptBuilder::build("+254700000000", &registry(&[SEND_MESSAGE_TOOL]));
        assert!(prompt.contains("send_message"));
        for absent in [USER_LOOKUP_TOOL, NDVI_TOOL, "get_counties", "get_wards"] {
            assert!(!prompt.contains(absent), "prompt names unregistered {absent}");
        }
        assert!(!prompt.contains("<locations>"));
    }

    #[test]
    fn location_section_lists_registered_subset() {
        let prompt = SystemPromptBuilder::build("+254700000000", &registry(&["get_counties"]));
        assert!(prompt.contains("confirm it exists with get_counties, narrowing"));
        assert!(!prompt.contains("get_subcounties"));
    }

    #[test]
    fn empty_registry_names_no_tools() {
        let prompt = SystemPromptBuilder::build("+254700000000", &ToolRegistry::new());
        assert!(!prompt.contains("send_message"));
        assert!(!prompt.contains(USER_LOOKUP_TOOL));
        assert!(prompt.ends_with("</instructions>"));
    }
}
