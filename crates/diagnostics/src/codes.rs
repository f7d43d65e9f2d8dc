//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete. IDs are grouped by pipeline stage:
//! `TF1xxx` scan/decode/repair, `TF2xxx` parse/validate,
//! `TF3xxx` normalize/sanitize.

/// Opening `tool_call` marker has no closing fence.
pub const UNTERMINATED_BLOCK: &str = "TF1001";

/// Block interior was double-encoded and has been unescaped.
pub const DOUBLE_ENCODING_REVERSED: &str = "TF1101";

/// The whole reply was a JSON string literal and has been decoded.
pub const DOCUMENT_UNWRAPPED: &str = "TF1102";

/// Literal line breaks inside string values were escaped.
pub const LINE_BREAKS_ESCAPED: &str = "TF1201";

/// Block contained no payload.
pub const EMPTY_BLOCK: &str = "TF2001";

/// Payload could not be deserialized.
pub const PARSE_FAILURE: &str = "TF2002";

/// Payload deserialized to something other than an object.
pub const NOT_AN_OBJECT: &str = "TF2003";

/// Mandatory `action` field is absent, empty, or not a string.
pub const MISSING_ACTION: &str = "TF2101";

/// A field the profile requires for this action is absent.
pub const MISSING_REQUIRED_FIELD: &str = "TF2102";

/// Action synonym folded onto its canonical name.
pub const ACTION_FOLDED: &str = "TF3001";

/// Nested value serialized into a string.
pub const VALUE_COERCED: &str = "TF3002";

/// Field holding `null` was removed.
pub const NULL_FIELD_DROPPED: &str = "TF3003";

/// Absolute path rewritten to a project-relative path.
pub const PATH_REWRITTEN: &str = "TF3101";

/// Every known diagnostic code, in ID order.
pub const ALL: &[&str] = &[
    UNTERMINATED_BLOCK,
    DOUBLE_ENCODING_REVERSED,
    DOCUMENT_UNWRAPPED,
    LINE_BREAKS_ESCAPED,
    EMPTY_BLOCK,
    PARSE_FAILURE,
    NOT_AN_OBJECT,
    MISSING_ACTION,
    MISSING_REQUIRED_FIELD,
    ACTION_FOLDED,
    VALUE_COERCED,
    NULL_FIELD_DROPPED,
    PATH_REWRITTEN,
];
