//! Centralized limits and thresholds for the trace engine.

/// Maximum nesting depth of the resolution walk. Self-referential aliases
/// and pathological nesting fail with a resolution error instead of
/// overflowing the stack.
pub const MAX_RESOLUTION_DEPTH: u32 = 64;

/// Maximum number of Cartesian combinations a template-literal expansion may
/// produce.
pub const TEMPLATE_LITERAL_EXPANSION_LIMIT: usize = 1_000;

/// Default cap on emitted trace steps per request.
pub const DEFAULT_MAX_TRACE_STEPS: usize = 10_000;
