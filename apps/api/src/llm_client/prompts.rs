// Shared prompt fragments. Each service that calls the generator defines its own
// prompts.rs alongside it; only cross-cutting instructions live here.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every tailoring prompt.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Every claim must come from the master resume provided. \
    Do NOT invent employers, dates, degrees, metrics or technologies. \
    You may reorder, rephrase and emphasise content to match the job posting, \
    but if the resume does not support a claim, omit it entirely.";

/// Forbids the placeholder strings the renderer would otherwise have to scrub.
pub const NO_PLACEHOLDER_INSTRUCTION: &str = "\
    For ANY field not found in the resume, use \"\" (empty string). \
    NEVER write \"Not Specified\", \"N/A\", \"Unknown\", \"None\", \"TBD\" or any other placeholder text.";
