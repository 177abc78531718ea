// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments substituted into those templates.

/// Missing data must come back as an empty string, never as a placeholder token.
pub const EMPTY_FOR_UNKNOWN_INSTRUCTION: &str = "\
    IMPORTANT: For any missing or uncertain information, return an empty string (\"\"). \
    NEVER return \"<UNKNOWN>\", \"N/A\", \"unknown\" or any similar placeholder.";

/// Keeps rewrites anchored to the supplied material.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    Ensure all modifications are strictly based on the provided data. \
    Never invent new employers, tools, versions, credentials or experiences.";

/// Output must go through the structured output tool only.
pub const STRUCTURED_OUTPUT_INSTRUCTION: &str = "\
    Return your final answer only through the provided output tool, using the exact \
    field names of its schema. Do not include chain-of-thought or intermediate reasoning.";
