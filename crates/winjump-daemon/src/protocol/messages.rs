//! Request vocabulary of the daemon socket.

/// A parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    List,
    /// Same payload as `List`, kept for front-ends that ask for JSON explicitly.
    ListJson,
    Focus { window_id: String },
    Refresh,
    Quit,
}

/// Why a request line was rejected. The display text is sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("empty command")]
    Empty,

    #[error("missing window id")]
    MissingWindowId,

    #[error("unknown command: {0}")]
    Unknown(String),
}

/// Parse `<command> [argument]`. Extra arguments are ignored.
pub fn parse_request(line: &str) -> Result<Request, RequestError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Err(RequestError::Empty);
    };

    match command {
        "list" => Ok(Request::List),
        "list-json" => Ok(Request::ListJson),
        "focus" => match words.next() {
            Some(id) => Ok(Request::Focus {
                window_id: id.to_string(),
            }),
            None => Err(RequestError::MissingWindowId),
        },
        "refresh" => Ok(Request::Refresh),
        "quit" => Ok(Request::Quit),
        other => Err(RequestError::Unknown(other.to_string())),
    }
}
