//! Fixed prompts used by the pipeline nodes.

/// Value surfaced by the human-input gate while the run is suspended.
pub const HUMAN_INPUT_PROMPT: &str = "Ready for user input.";

/// Marker the dialogue agent emits once every fact has been collected.
pub const COMPLETION_SENTINEL: &str = "All information have been extracted!";

/// System instruction for the dialogue turn.
pub fn dialogue_system_prompt() -> String {
    format!(
        "You are a dialogue agent specialised in the GDPR and the EU AI Act. \
Your goal is to collect the following information about the user's company:\n\
- Company name: string\n\
- Sector or industry: string\n\
- Country: string\n\
- Size of the company (number of employees): integer\n\
- Categories of data being collected or processed: list of strings\n\n\
If something is missing, politely ask the user for it. Keep track of the values \
gathered so far after every answer and continue until everything is known.\n\
When all required information has been collected, reply with \"**{}**\" and say nothing after it.",
        COMPLETION_SENTINEL
    )
}

/// System instruction for the structured extractor.
pub const EXTRACTOR_PROMPT: &str = "Record the company details stated in the user's message by calling \
the company_facts function. Only use values present in the message.";

/// System instruction for the GDPR analyser.
pub const GDPR_ANALYSER_PROMPT: &str = "You are a GDPR expert. Analyse the information about the company \
and give brief recommendations to keep it compliant with the GDPR. Cite the GDPR article for each \
recommendation in parentheses.\nUse your general knowledge and the documents returned by the retrieval \
tool. Do not add anything after your analysis.";

/// System instruction for the AI Act analyser.
pub const AI_ACT_ANALYSER_PROMPT: &str = "You are an EU AI Act expert. Analyse the information about the \
company and its use of AI, and give a brief risk analysis under the AI Act. Cite the AI Act article for \
each recommendation in parentheses.\nUse your general knowledge and the documents returned by the retrieval \
tool. Do not add anything after your analysis.";

/// System instruction for the summarizer.
pub const SUMMARIZER_PROMPT: &str = "You are a legal expert specialised in the GDPR and the EU AI Act. \
Summarise the GDPR and AI Act analyses into a brief, clear overview of obligations, risks and \
recommendations.\nDo not add anything after the summary.";

/// Instruction used when extraction fails and the user must clarify.
pub fn clarification_request(reason: &str) -> String {
    format!(
        "I could not record the company details yet ({}). \
Could you restate the company's name, country, industry, number of employees \
and the kinds of data it processes?",
        reason
    )
}

/// Summarizer input built from two tagged analyses.
pub fn summary_input(first: &str, second: &str) -> String {
    format!(
        "This is the first analysis:\n{}\nThis is the second analysis:\n{}",
        first, second
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialogue_prompt_contains_sentinel_and_fields() {
        let prompt = dialogue_system_prompt();
        assert!(prompt.contains(COMPLETION_SENTINEL));
        assert!(prompt.contains("Company name"));
        assert!(prompt.contains("Country"));
        assert!(prompt.contains("industry"));
        assert!(prompt.contains("number of employees"));
        assert!(prompt.contains("Categories of data"));
    }

    #[test]
    fn summary_input_matches_template() {
        assert_eq!(
            summary_input("A", "B"),
            "This is the first analysis:\nA\nThis is the second analysis:\nB"
        );
    }

    #[test]
    fn clarification_mentions_reason() {
        let text = clarification_request("missing country");
        assert!(text.contains("missing country"));
    }
}
