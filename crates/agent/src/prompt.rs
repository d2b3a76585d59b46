//! Prompt construction
//!
//! Pure functions of their inputs: no I/O, no model calls.

use crate::parser::FINAL_ANSWER_MARKER;
use crate::registry::ActionRegistry;
use crate::scratchpad::Scratchpad;

const EXAMPLE_QUESTION: &str = "What is the capital of France?";
const EXAMPLE_QUERY: &str = "What is the capital of France";

/// Builds the text sent to the model for one run
pub struct PromptBuilder<'a> {
    question: &'a str,
    backstory: &'a str,
    registry: &'a ActionRegistry,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(question: &'a str, backstory: &'a str, registry: &'a ActionRegistry) -> Self {
        Self {
            question,
            backstory,
            registry,
        }
    }

    /// Prompt for a single action choice
    pub fn single_shot(&self) -> String {
        format!(
            r#"You are a helpful assistant with access to the following actions.
Choose the single most relevant action to answer the user's query.

## Available actions
{actions}

## Backstory
{backstory}

## Output format
Provide a single response in the following format:

<output>
{template}
</output>

## Example
--Query:
{example_question}
<output>
{example}
</output>

## Guidelines
1. If no action matches the user's request, respond politely that you cannot help.
2. Choose at most one action and make sure the call is complete and correctly formatted.
3. `arguments.module` must be copied exactly from the chosen action's module.
4. Only provide a single JSON output, enclosed within <output></output> delimiters.

-- User Query:
{question}"#,
            actions = self.render_actions(),
            backstory = self.backstory,
            template = template_block(),
            example_question = EXAMPLE_QUESTION,
            example = self.example_block(),
            question = self.question,
        )
    }

    /// Prompt for one think/act/observe cycle, carrying the history so far
    pub fn iterative(&self, scratchpad: &Scratchpad) -> String {
        let marker = FINAL_ANSWER_MARKER.trim_end_matches(':');
        format!(
            r#"You are a helpful assistant with the following backstory:
{backstory}

Answer the following question as best you can:
{question}

## Available tools
{actions}

You use a tool by writing a JSON blob. The only values allowed in the "name" field are: {names}
The blob must contain a SINGLE action, never a list. Its shape is:

{template}

Example of a valid blob:

{example}

ALWAYS use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action:
$JSON_BLOB
Observation: the result of the action
... (this Thought/Action/Observation can repeat N times)
Thought: I now know the final answer
{final_marker} the final answer to the original input question

Begin! Reminder to always use the exact characters `{marker}` when responding.

This is your previous work:
{scratchpad}"#,
            backstory = self.backstory,
            question = self.question,
            actions = self.render_actions(),
            names = self.registry.names().join(", "),
            template = template_block(),
            example = self.example_block(),
            final_marker = FINAL_ANSWER_MARKER,
            marker = marker,
            scratchpad = scratchpad.transcript(),
        )
    }

    fn render_actions(&self) -> String {
        self.registry
            .specs()
            .into_iter()
            .map(|spec| {
                format!(
                    "- {} (module: {})\n{}",
                    spec.name,
                    spec.module,
                    spec.schema_json()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn example_block(&self) -> String {
        let (name, module) = self
            .registry
            .first()
            .map(|a| (a.name().to_string(), a.module().to_string()))
            .unwrap_or_else(|| ("WikiSearch".to_string(), "tools::wiki".to_string()));

        let example = serde_json::json!({
            "name": name,
            "arguments": {
                "query": EXAMPLE_QUERY,
                "type": "str",
                "module": module,
            }
        });
        fenced(&serde_json::to_string_pretty(&example).unwrap_or_default())
    }
}

fn template_block() -> String {
    fenced(
        r#"{
  "name": "<relevant_action_name>",
  "arguments": {
    "query": "<query_from_user>",
    "type": "<data_type_of_query>",
    "module": "<module_name>"
  }
}"#,
    )
}

fn fenced(body: &str) -> String {
    format!("```json\n{}\n```", body)
}

/// Prompt that condenses a raw tool response
pub fn summary_prompt(tool_response: &str) -> String {
    format!(
        r#"You are an expert at summarizing information concisely and clearly.
Summarize the following output into bullet points, giving only the title, link and a brief summary of the body for each item.
Do not include any additional text or explanations, only the bullet points.

{}"#,
        tool_response
    )
}
