use std::fmt::Display;

use sp_core::ParticipantError;

fn map_error(code: &'static str, error: impl Display) -> ParticipantError {
    ParticipantError::config(code, error.to_string())
}

pub(crate) fn emit_error(error: ParticipantError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_else(|_| "\"\"".to_string())
    );
    1
}

pub(crate) fn map_cli_config_read(error: std::io::Error) -> ParticipantError {
    map_error("CLI_CONFIG_READ", error)
}

pub(crate) fn map_cli_context_read(error: std::io::Error) -> ParticipantError {
    map_error("CLI_CONTEXT_READ", error)
}

pub(crate) fn map_cli_context_invalid(error: serde_json::Error) -> ParticipantError {
    map_error("CLI_CONTEXT_INVALID", error)
}

pub(crate) fn map_cli_report(error: serde_json::Error) -> ParticipantError {
    map_error("CLI_REPORT_SERIALIZE", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn io_errors_map_to_cli_codes() {
        let error = map_cli_config_read(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert_eq!(error.code, "CLI_CONFIG_READ");
        assert_eq!(error.message, "missing");
        assert_eq!(emit_error(error), 1);
    }

    #[test]
    fn json_errors_map_to_cli_codes() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{").expect_err("bad json");
        assert_eq!(map_cli_context_invalid(parse_error).code, "CLI_CONTEXT_INVALID");
    }
}
