//! Stateless builtin tools: echo, current_time

use chrono::{SecondsFormat, Utc};
use gateway_domain::Tool;

/// Tool name constants
pub const ECHO: &str = "echo";
pub const CURRENT_TIME: &str = "current_time";

/// Returns its input unchanged
pub fn echo_tool() -> Tool {
    Tool::from_fn(ECHO, "Return the input unchanged", |input| {
        Ok(input.to_string())
    })
}

/// Current UTC time as RFC 3339; input is ignored
pub fn current_time_tool() -> Tool {
    Tool::from_fn(
        CURRENT_TIME,
        "Current UTC time in RFC 3339 format",
        |_| Ok(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use gateway_domain::CancellationToken;

    #[tokio::test]
    async fn test_echo() {
        let out = echo_tool()
            .call(r#"{"a":1}"#, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_current_time_is_rfc3339() {
        let out = current_time_tool()
            .call("", &CancellationToken::new())
            .await
            .unwrap();
        assert!(out.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&out).is_ok());
    }
}
