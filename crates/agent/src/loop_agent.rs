//! Agent loops - single-shot and think/act/observe

use automind_config::Config;
use automind_provider::SharedBackend;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::dispatcher::ActionDispatcher;
use crate::parser;
use crate::prompt::{summary_prompt, PromptBuilder};
use crate::registry::ActionRegistry;
use crate::scratchpad::{Scratchpad, ScratchpadEntry};
use crate::{AgentError, Result};

/// Inputs of one run. Not modified while the run is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRunConfig {
    pub question: String,
    pub backstory: String,
    /// Think/act/observe cycles; ignored by the single-shot agent
    pub num_iterations: u32,
}

impl AgentRunConfig {
    pub fn new(question: impl Into<String>, backstory: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            backstory: backstory.into(),
            num_iterations: 1,
        }
    }

    /// Backstory and iteration count from the config file
    pub fn from_config(question: impl Into<String>, config: &Config) -> Self {
        Self::new(question, config.backstory()).with_iterations(config.num_iterations())
    }

    pub fn with_iterations(mut self, num_iterations: u32) -> Self {
        self.num_iterations = num_iterations;
        self
    }

    /// Preconditions for leaving Init
    pub fn validate(&self, registry: &ActionRegistry) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(AgentError::InvalidRun("question is empty".to_string()));
        }
        if registry.is_empty() {
            return Err(AgentError::InvalidRun("no actions registered".to_string()));
        }
        if self.num_iterations == 0 {
            return Err(AgentError::InvalidRun(
                "num_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Terminal state of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Raw result of the single tool call
    ToolResponse { tool: String, response: String },
    /// Model summary of the tool result
    Summary(String),
    /// Text after the final-answer marker, unmodified
    FinalAnswer(String),
    /// The iteration bound was reached and the last response had no final answer
    BudgetExhausted { iterations: u32 },
}

impl RunOutcome {
    /// Terminal text; `None` is the absence value
    pub fn text(&self) -> Option<&str> {
        match self {
            RunOutcome::ToolResponse { response, .. } => Some(response),
            RunOutcome::Summary(text) | RunOutcome::FinalAnswer(text) => Some(text),
            RunOutcome::BudgetExhausted { .. } => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RunOutcome::BudgetExhausted { .. })
    }
}

/// One model call, one tool call, optional summary
pub struct SingleAgent {
    config: AgentRunConfig,
    registry: ActionRegistry,
    model: SharedBackend,
    summarize: bool,
}

impl SingleAgent {
    pub fn new(
        config: AgentRunConfig,
        registry: ActionRegistry,
        model: SharedBackend,
        summarize: bool,
    ) -> Result<Self> {
        config.validate(&registry)?;
        Ok(Self {
            config,
            registry,
            model,
            summarize,
        })
    }

    pub fn prompt(&self) -> String {
        PromptBuilder::new(&self.config.question, &self.config.backstory, &self.registry)
            .single_shot()
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        let span = info_span!("agent_run", run_id = %Uuid::new_v4(), mode = "single");
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> Result<RunOutcome> {
        info!("◆ SINGLE RUN: {}", self.config.question);

        let prompt = self.prompt();
        debug!("◆ PROMPT: {} chars", prompt.len());
        let response = self.model.run(&prompt).await?;
        debug!("◆ RESPONSE: {} chars", response.len());

        if parser::extract_json_block(&response).is_none() {
            return Err(AgentError::malformed("no fenced json block", response));
        }
        let intent = parser::extract_intent(&response)?;
        debug!("◆ INTENT: {}", intent.locator());

        let dispatcher = ActionDispatcher::new(&self.registry, Arc::clone(&self.model));
        let tool_response = dispatcher.dispatch(&intent).await?;

        if self.summarize {
            info!("◆ SUMMARIZING {} RESPONSE", intent.name);
            let summary = self.model.run(&summary_prompt(&tool_response)).await?;
            return Ok(RunOutcome::Summary(summary));
        }

        Ok(RunOutcome::ToolResponse {
            tool: intent.name,
            response: tool_response,
        })
    }
}

/// Outcome plus the reasoning trace that led to it
#[derive(Debug, Clone)]
pub struct ThinkReport {
    pub outcome: RunOutcome,
    pub scratchpad: Scratchpad,
    pub iterations: u32,
}

/// Bounded think/act/observe loop. Always runs exactly `num_iterations` cycles.
pub struct ThinkAgent {
    config: AgentRunConfig,
    registry: ActionRegistry,
    model: SharedBackend,
}

impl ThinkAgent {
    pub fn new(
        config: AgentRunConfig,
        registry: ActionRegistry,
        model: SharedBackend,
    ) -> Result<Self> {
        config.validate(&registry)?;
        Ok(Self {
            config,
            registry,
            model,
        })
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        Ok(self.run_traced().await?.outcome)
    }

    pub async fn run_traced(&self) -> Result<ThinkReport> {
        let span = info_span!("agent_run", run_id = %Uuid::new_v4(), mode = "think");
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> Result<ThinkReport> {
        let builder =
            PromptBuilder::new(&self.config.question, &self.config.backstory, &self.registry);
        let dispatcher = ActionDispatcher::new(&self.registry, Arc::clone(&self.model));
        let mut scratchpad = Scratchpad::new();
        let mut last_response = String::new();

        for step in 1..=self.config.num_iterations {
            info!("◆ ITERATION {}/{}", step, self.config.num_iterations);

            let prompt = builder.iterative(&scratchpad);
            let response = self.model.run(&prompt).await?;
            debug!("◆ RESPONSE: {} chars", response.len());

            let thought = parser::extract_thought(&response);
            match &thought {
                Some(t) => debug!("◆ THOUGHT: {}", t),
                None => warn!("◆ NO THOUGHT IN RESPONSE {}", step),
            }

            let action = parser::extract_action(&response)
                .ok_or_else(|| AgentError::malformed("no `Action:` json block", response.clone()))?;
            let intent = parser::extract_intent(&action)?;
            info!("◆ ACTION: {}", intent.locator());

            let observation = dispatcher.dispatch(&intent).await?;
            scratchpad.push(ScratchpadEntry::new(thought, Some(action), observation));
            last_response = response;
        }

        let iterations = self.config.num_iterations;
        let outcome = match parser::extract_final_answer(&last_response) {
            Some(answer) => RunOutcome::FinalAnswer(answer),
            None => {
                warn!("◆ NO FINAL ANSWER AFTER {} ITERATIONS", iterations);
                RunOutcome::BudgetExhausted { iterations }
            }
        };

        Ok(ThinkReport {
            outcome,
            scratchpad,
            iterations,
        })
    }
}
