//! Tests for prompt construction

mod common;

use automind_agent::prompt::summary_prompt;
use automind_agent::{PromptBuilder, Scratchpad, ScratchpadEntry};
use common::{lookup_registry, Rephrase};

#[test]
fn test_single_shot_teaches_output_grammar() {
    let registry = lookup_registry();
    let prompt =
        PromptBuilder::new("Who wrote Dune?", "You are a librarian", &registry).single_shot();

    assert!(prompt.contains("<output>"));
    assert!(prompt.contains("</output>"));
    assert!(prompt.contains("```json"));
    for key in ["\"name\"", "\"query\"", "\"type\"", "\"module\""] {
        assert!(prompt.contains(key), "missing {}", key);
    }
    assert!(prompt.contains("You are a librarian"));
    assert!(prompt.ends_with("Who wrote Dune?"));
}

#[test]
fn test_single_shot_lists_schema_and_module() {
    let registry = lookup_registry();
    let prompt = PromptBuilder::new("q", "b", &registry).single_shot();

    assert!(prompt.contains("- EchoLookup (module: fixtures::lookup)"));
    assert!(prompt.contains("\"kls\": \"EchoLookup\""));
    assert!(prompt.contains("The search string. be simple"));
    assert!(!prompt.contains("injected model"));
}

#[test]
fn test_worked_example_uses_first_registered_action() {
    let mut registry = lookup_registry();
    registry.register::<Rephrase>().unwrap();
    let prompt = PromptBuilder::new("q", "b", &registry).single_shot();

    assert!(prompt.contains("\"query\": \"What is the capital of France\""));
    assert!(prompt.contains("\"module\": \"fixtures::lookup\""));
}

#[test]
fn test_iterative_teaches_markers() {
    let registry = lookup_registry();
    let prompt = PromptBuilder::new("q", "b", &registry).iterative(&Scratchpad::new());

    for marker in ["Thought:", "Action:", "Observation:", "Final Answer:"] {
        assert!(prompt.contains(marker), "missing {}", marker);
    }
    assert!(prompt.contains("exact characters `Final Answer`"));
    assert!(prompt.contains("\"name\" field are: EchoLookup"));
}

#[test]
fn test_iterative_is_pure() {
    let registry = lookup_registry();
    let mut pad = Scratchpad::new();
    pad.push(ScratchpadEntry::new(
        Some("look".to_string()),
        Some("```json\n{}\n```".to_string()),
        "result",
    ));
    let builder = PromptBuilder::new("q", "b", &registry);

    assert_eq!(builder.iterative(&pad), builder.iterative(&pad));
    assert!(builder
        .iterative(&pad)
        .ends_with("Thought: look\nAction:\n```json\n{}\n```\nObservation: result\n"));
}

#[test]
fn test_summary_prompt_asks_for_bullets() {
    let prompt = summary_prompt("1. Rust\n   https://rust-lang.org");
    assert!(prompt.contains("bullet points"));
    assert!(prompt.contains("https://rust-lang.org"));
}
